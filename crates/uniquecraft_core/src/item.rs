//! # Produced Item Description
//!
//! Typed rendition of what a unique recipe produces: material, amount,
//! cosmetics, enchantments and attribute modifiers. The host turns an
//! [`ItemSpec`] into its own item representation at registration time.

use std::fmt;
use std::hash::Hasher;

use siphasher::sip128::{Hasher128, SipHasher24};
use uuid::Uuid;

use crate::id::RecipeId;

/// Fixed keys for attribute modifier identifiers. Changing them changes every
/// modifier UUID ever handed to the host.
const MODIFIER_KEYS: (u64, u64) = (0x756E_6971_7565_6372, 0x6166_745F_6D6F_6473);

/// A host material name, normalized to upper case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Material(String);

impl Material {
    /// Normalizes a material name.
    ///
    /// Returns `None` if the name is empty or contains characters other
    /// than ASCII letters, digits and underscores.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self(name.to_ascii_uppercase()))
    }

    /// The normalized name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepted enchantment names (upper case) and their canonical form.
/// Legacy names are kept so older crafts documents keep loading.
const ENCHANTMENT_ALIASES: &[(&str, &str)] = &[
    ("PROTECTION", "PROTECTION"),
    ("PROTECTION_ENVIRONMENTAL", "PROTECTION"),
    ("FIRE_PROTECTION", "FIRE_PROTECTION"),
    ("PROTECTION_FIRE", "FIRE_PROTECTION"),
    ("FEATHER_FALLING", "FEATHER_FALLING"),
    ("PROTECTION_FALL", "FEATHER_FALLING"),
    ("BLAST_PROTECTION", "BLAST_PROTECTION"),
    ("PROTECTION_EXPLOSIONS", "BLAST_PROTECTION"),
    ("PROJECTILE_PROTECTION", "PROJECTILE_PROTECTION"),
    ("PROTECTION_PROJECTILE", "PROJECTILE_PROTECTION"),
    ("RESPIRATION", "RESPIRATION"),
    ("OXYGEN", "RESPIRATION"),
    ("AQUA_AFFINITY", "AQUA_AFFINITY"),
    ("WATER_WORKER", "AQUA_AFFINITY"),
    ("THORNS", "THORNS"),
    ("DEPTH_STRIDER", "DEPTH_STRIDER"),
    ("FROST_WALKER", "FROST_WALKER"),
    ("SOUL_SPEED", "SOUL_SPEED"),
    ("SHARPNESS", "SHARPNESS"),
    ("DAMAGE_ALL", "SHARPNESS"),
    ("SMITE", "SMITE"),
    ("DAMAGE_UNDEAD", "SMITE"),
    ("BANE_OF_ARTHROPODS", "BANE_OF_ARTHROPODS"),
    ("DAMAGE_ARTHROPODS", "BANE_OF_ARTHROPODS"),
    ("KNOCKBACK", "KNOCKBACK"),
    ("FIRE_ASPECT", "FIRE_ASPECT"),
    ("LOOTING", "LOOTING"),
    ("LOOT_BONUS_MOBS", "LOOTING"),
    ("SWEEPING_EDGE", "SWEEPING_EDGE"),
    ("SWEEPING", "SWEEPING_EDGE"),
    ("EFFICIENCY", "EFFICIENCY"),
    ("DIG_SPEED", "EFFICIENCY"),
    ("SILK_TOUCH", "SILK_TOUCH"),
    ("UNBREAKING", "UNBREAKING"),
    ("DURABILITY", "UNBREAKING"),
    ("FORTUNE", "FORTUNE"),
    ("LOOT_BONUS_BLOCKS", "FORTUNE"),
    ("POWER", "POWER"),
    ("ARROW_DAMAGE", "POWER"),
    ("PUNCH", "PUNCH"),
    ("ARROW_KNOCKBACK", "PUNCH"),
    ("FLAME", "FLAME"),
    ("ARROW_FIRE", "FLAME"),
    ("INFINITY", "INFINITY"),
    ("ARROW_INFINITE", "INFINITY"),
    ("LUCK_OF_THE_SEA", "LUCK_OF_THE_SEA"),
    ("LUCK", "LUCK_OF_THE_SEA"),
    ("LURE", "LURE"),
    ("LOYALTY", "LOYALTY"),
    ("IMPALING", "IMPALING"),
    ("RIPTIDE", "RIPTIDE"),
    ("CHANNELING", "CHANNELING"),
    ("MULTISHOT", "MULTISHOT"),
    ("QUICK_CHARGE", "QUICK_CHARGE"),
    ("PIERCING", "PIERCING"),
    ("MENDING", "MENDING"),
    ("VANISHING_CURSE", "VANISHING_CURSE"),
    ("BINDING_CURSE", "BINDING_CURSE"),
];

/// A recognized enchantment, stored under its canonical name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Enchantment(&'static str);

impl Enchantment {
    /// Looks up an enchantment by modern or legacy name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        ENCHANTMENT_ALIASES
            .iter()
            .find(|(alias, _)| *alias == upper)
            .map(|&(_, canonical)| Self(canonical))
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

/// Equipment slot an attribute modifier applies in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EquipmentSlot {
    /// Main hand.
    Hand,
    /// Boots slot.
    Feet,
    /// Chestplate slot.
    Chest,
}

/// Attributes a unique item may modify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Melee damage.
    AttackDamage,
    /// Attack cooldown speed.
    AttackSpeed,
    /// Maximum health.
    MaxHealth,
    /// Walking speed.
    MovementSpeed,
    /// Armor points.
    Armor,
    /// Armor toughness.
    ArmorToughness,
    /// Luck.
    Luck,
    /// Knockback resistance.
    KnockbackResistance,
}

impl Attribute {
    /// Looks up an attribute by name, with or without the `generic.` prefix.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let bare = lower.strip_prefix("generic.").unwrap_or(&lower);
        match bare {
            "attack_damage" => Some(Self::AttackDamage),
            "attack_speed" => Some(Self::AttackSpeed),
            "max_health" => Some(Self::MaxHealth),
            "movement_speed" => Some(Self::MovementSpeed),
            "armor" => Some(Self::Armor),
            "armor_toughness" => Some(Self::ArmorToughness),
            "luck" => Some(Self::Luck),
            "knockback_resistance" => Some(Self::KnockbackResistance),
            _ => None,
        }
    }

    /// Slot the modifier is bound to.
    #[must_use]
    pub const fn slot(self) -> EquipmentSlot {
        match self {
            Self::MovementSpeed => EquipmentSlot::Feet,
            Self::Armor | Self::ArmorToughness | Self::KnockbackResistance => EquipmentSlot::Chest,
            Self::AttackDamage | Self::AttackSpeed | Self::MaxHealth | Self::Luck => {
                EquipmentSlot::Hand
            }
        }
    }
}

/// An additive attribute modifier on the produced item.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeModifier {
    /// Stable identifier, see [`modifier_id`].
    pub id: Uuid,
    /// Name as written in the crafts document.
    pub name: String,
    /// Attribute being modified.
    pub attribute: Attribute,
    /// Amount added.
    pub amount: f64,
    /// Slot the modifier applies in.
    pub slot: EquipmentSlot,
}

/// Tooltip sections hidden on the produced item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemFlag {
    /// Hide the enchantment list.
    HideEnchants,
    /// Hide attribute modifiers.
    HideAttributes,
    /// Hide the unbreakable tag.
    HideUnbreakable,
}

/// Everything the host needs to build the crafted result.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSpec {
    /// Result material.
    pub material: Material,
    /// Stack size, `1..=64`.
    pub amount: u8,
    /// Display name with color codes translated.
    pub display_name: Option<String>,
    /// Lore lines with color codes translated.
    pub lore: Vec<String>,
    /// Enchantments and their levels.
    pub enchantments: Vec<(Enchantment, u8)>,
    /// Attribute modifiers.
    pub attributes: Vec<AttributeModifier>,
    /// Whether the item never loses durability.
    pub unbreakable: bool,
    /// Hidden tooltip sections.
    pub flags: Vec<ItemFlag>,
}

/// Derives the identifier of an attribute modifier.
///
/// SipHash-128 of the recipe identifier and the attribute name as written:
/// the same pair yields the same UUID on every load.
#[must_use]
pub fn modifier_id(recipe: &RecipeId, attribute_name: &str) -> Uuid {
    let mut hasher = SipHasher24::new_with_keys(MODIFIER_KEYS.0, MODIFIER_KEYS.1);
    hasher.write(recipe.as_str().as_bytes());
    hasher.write_u8(0xFF);
    hasher.write(attribute_name.as_bytes());
    let hash = hasher.finish128();
    Uuid::from_u128((u128::from(hash.h1) << 64) | u128::from(hash.h2))
}

/// Translates `&` color codes to the host's `§` section sign.
#[must_use]
pub fn translate_color_codes(text: &str) -> String {
    text.replace('&', "§")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_normalization() {
        assert_eq!(Material::parse(" diamond_sword ").unwrap().as_str(), "DIAMOND_SWORD");
        assert!(Material::parse("").is_none());
        assert!(Material::parse("minecraft:stone").is_none());
    }

    #[test]
    fn test_enchantment_aliases() {
        assert_eq!(Enchantment::from_name("sharpness").unwrap().name(), "SHARPNESS");
        assert_eq!(Enchantment::from_name("DAMAGE_ALL").unwrap().name(), "SHARPNESS");
        assert_eq!(Enchantment::from_name("durability").unwrap().name(), "UNBREAKING");
        assert!(Enchantment::from_name("super_sharp").is_none());
    }

    #[test]
    fn test_attribute_slots() {
        assert_eq!(Attribute::from_name("generic.armor"), Some(Attribute::Armor));
        assert_eq!(Attribute::from_name("ATTACK_DAMAGE"), Some(Attribute::AttackDamage));
        assert_eq!(Attribute::Armor.slot(), EquipmentSlot::Chest);
        assert_eq!(Attribute::MovementSpeed.slot(), EquipmentSlot::Feet);
        assert_eq!(Attribute::Luck.slot(), EquipmentSlot::Hand);
        assert!(Attribute::from_name("jump_strength").is_none());
    }

    #[test]
    fn test_modifier_id_is_deterministic() {
        let recipe = RecipeId::from("golden_sword");
        let a = modifier_id(&recipe, "attack_damage");
        let b = modifier_id(&recipe, "attack_damage");
        let other = modifier_id(&recipe, "attack_speed");
        let elsewhere = modifier_id(&RecipeId::from("golden_axe"), "attack_damage");

        assert_eq!(a, b);
        assert_ne!(a, other);
        assert_ne!(a, elsewhere);
    }

    #[test]
    fn test_color_codes() {
        assert_eq!(translate_color_codes("&6Gold &lBold"), "§6Gold §lBold");
    }
}
