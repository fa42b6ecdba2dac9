//! # Recipe Catalogue
//!
//! **Validating parser for the `[crafts]` section.**
//!
//! Each `[crafts.<id>]` entry becomes a typed [`RecipeDefinition`], or a
//! typed [`CraftError`] naming the offending field. One bad recipe never
//! prevents the others from loading.
//!
//! ## Example
//!
//! ```toml
//! [crafts.golden_sword]
//! shape = ["GGG", " S ", " S "]
//! message = "%player% forged the Golden Sword!"
//! [crafts.golden_sword.ingredients]
//! G = "GOLD_BLOCK"
//! S = "STICK"
//! [crafts.golden_sword.result]
//! material = "GOLDEN_SWORD"
//! ```
//!
//! The catalogue is immutable once built; a reload builds a new one.

use std::collections::BTreeMap;

use serde::Deserialize;
use toml::{Table, Value};
use tracing::{error, info, warn};

use crate::config::render_template;
use crate::error::{CraftError, CraftResult};
use crate::host::{MaterialLookup, ShapedRegistration};
use crate::id::{KeyScheme, RecipeId};
use crate::item::{
    modifier_id, translate_color_codes, Attribute, AttributeModifier, Enchantment, ItemFlag,
    ItemSpec, Material,
};

/// Rows in a shaped recipe grid.
pub const SHAPE_ROWS: usize = 3;

/// Maximum symbols per row.
pub const MAX_ROW_WIDTH: usize = 3;

/// Maximum stack size of a result.
pub const MAX_AMOUNT: i64 = 64;

#[derive(Debug, Default, Deserialize)]
struct RawCraft {
    shape: Option<Vec<String>>,
    ingredients: Option<BTreeMap<String, String>>,
    result: Option<RawResult>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawResult {
    material: Option<String>,
    amount: Option<i64>,
    name: Option<String>,
    lore: Option<Vec<String>>,
    enchantments: Option<BTreeMap<String, i64>>,
    attributes: Option<BTreeMap<String, f64>>,
    unbreakable: Option<bool>,
}

/// A validated unique-craft recipe.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeDefinition {
    /// Ledger key.
    pub id: RecipeId,
    /// Three rows of symbols; space is an empty slot.
    pub shape: [String; 3],
    /// Symbol → ingredient material, in symbol order.
    pub ingredients: Vec<(char, Material)>,
    /// Produced item.
    pub result: ItemSpec,
    /// Broadcast template with a `%player%` placeholder.
    pub message: Option<String>,
}

impl RecipeDefinition {
    /// Parses and validates one `[crafts.<id>]` section.
    ///
    /// # Errors
    ///
    /// The first invalid field found, as a recipe-scoped [`CraftError`].
    pub fn parse(id: &str, section: &Value, materials: &dyn MaterialLookup) -> CraftResult<Self> {
        let recipe = id.to_string();
        let raw: RawCraft = section
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| CraftError::MalformedRecipe {
                recipe: recipe.clone(),
                reason: e.message().to_string(),
            })?;

        let shape = parse_shape(&recipe, raw.shape)?;
        let ingredients = parse_ingredients(&recipe, &shape, raw.ingredients, materials)?;
        let result = parse_result(&recipe, raw.result, materials)?;

        Ok(Self {
            id: RecipeId::new(recipe),
            shape,
            ingredients,
            result,
            message: raw.message,
        })
    }

    /// Renders the completion broadcast for `player`, falling back to
    /// `default_template` when the recipe has no message of its own.
    #[must_use]
    pub fn broadcast_message(&self, player: &str, default_template: &str) -> String {
        render_template(self.message.as_deref().unwrap_or(default_template), player)
    }

    /// Builds the host registration under `scheme`.
    #[must_use]
    pub fn registration(&self, scheme: &KeyScheme) -> ShapedRegistration {
        ShapedRegistration {
            key: scheme.key_for(&self.id),
            shape: self.shape.clone(),
            ingredients: self.ingredients.clone(),
            result: self.result.clone(),
        }
    }
}

fn invalid_shape(recipe: &str, reason: impl Into<String>) -> CraftError {
    CraftError::InvalidShape {
        recipe: recipe.to_string(),
        reason: reason.into(),
    }
}

fn parse_shape(recipe: &str, rows: Option<Vec<String>>) -> CraftResult<[String; 3]> {
    let rows = rows.ok_or_else(|| CraftError::MissingField {
        recipe: recipe.to_string(),
        field: "shape",
    })?;
    let count = rows.len();
    let rows: [String; SHAPE_ROWS] = rows
        .try_into()
        .map_err(|_| invalid_shape(recipe, format!("expected {SHAPE_ROWS} rows, found {count}")))?;

    let width = rows[0].chars().count();
    if width == 0 || width > MAX_ROW_WIDTH {
        return Err(invalid_shape(
            recipe,
            format!("rows must be 1 to {MAX_ROW_WIDTH} symbols wide, found {width}"),
        ));
    }
    if rows.iter().any(|row| row.chars().count() != width) {
        return Err(invalid_shape(recipe, "rows must all have the same width"));
    }
    if rows.iter().all(|row| row.trim().is_empty()) {
        return Err(invalid_shape(recipe, "shape has no ingredients"));
    }
    Ok(rows)
}

fn parse_ingredients(
    recipe: &str,
    shape: &[String; 3],
    raw: Option<BTreeMap<String, String>>,
    materials: &dyn MaterialLookup,
) -> CraftResult<Vec<(char, Material)>> {
    let raw = raw.ok_or_else(|| CraftError::MissingField {
        recipe: recipe.to_string(),
        field: "ingredients",
    })?;

    let mut ingredients = Vec::with_capacity(raw.len());
    for (key, name) in raw {
        let mut chars = key.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(c), None) if c != ' ' => c,
            _ => {
                return Err(invalid_shape(
                    recipe,
                    format!("ingredient key `{key}` must be a single non-space character"),
                ))
            }
        };
        if !shape.iter().any(|row| row.contains(symbol)) {
            return Err(invalid_shape(
                recipe,
                format!("ingredient '{symbol}' does not appear in the shape"),
            ));
        }
        let material = resolve_material(recipe, &name, materials)?;
        ingredients.push((symbol, material));
    }

    for symbol in shape.iter().flat_map(|row| row.chars()).filter(|&c| c != ' ') {
        if !ingredients.iter().any(|(s, _)| *s == symbol) {
            return Err(CraftError::UnknownSymbol {
                recipe: recipe.to_string(),
                symbol,
            });
        }
    }
    Ok(ingredients)
}

fn resolve_material(
    recipe: &str,
    name: &str,
    materials: &dyn MaterialLookup,
) -> CraftResult<Material> {
    Material::parse(name)
        .filter(|m| materials.is_known(m))
        .ok_or_else(|| CraftError::UnknownMaterial {
            recipe: recipe.to_string(),
            material: name.to_string(),
        })
}

fn parse_result(
    recipe: &str,
    raw: Option<RawResult>,
    materials: &dyn MaterialLookup,
) -> CraftResult<ItemSpec> {
    let raw = raw.ok_or_else(|| CraftError::MissingField {
        recipe: recipe.to_string(),
        field: "result",
    })?;
    let material_name = raw.material.ok_or_else(|| CraftError::MissingField {
        recipe: recipe.to_string(),
        field: "result.material",
    })?;
    let material = resolve_material(recipe, &material_name, materials)?;

    let amount = raw.amount.unwrap_or(1);
    let amount = u8::try_from(amount)
        .ok()
        .filter(|a| (1..=MAX_AMOUNT).contains(&i64::from(*a)))
        .ok_or_else(|| CraftError::InvalidAmount {
            recipe: recipe.to_string(),
            amount,
        })?;

    let mut enchantments = Vec::new();
    for (name, level) in raw.enchantments.unwrap_or_default() {
        let enchantment =
            Enchantment::from_name(&name).ok_or_else(|| CraftError::UnknownEnchantment {
                recipe: recipe.to_string(),
                enchantment: name.clone(),
            })?;
        let level = u8::try_from(level)
            .ok()
            .filter(|&l| l >= 1)
            .ok_or_else(|| CraftError::InvalidLevel {
                recipe: recipe.to_string(),
                enchantment: name.clone(),
                level,
            })?;
        enchantments.push((enchantment, level));
    }

    let id = RecipeId::from(recipe);
    let mut attributes = Vec::new();
    for (name, amount) in raw.attributes.unwrap_or_default() {
        let attribute = Attribute::from_name(&name).ok_or_else(|| CraftError::UnknownAttribute {
            recipe: recipe.to_string(),
            attribute: name.clone(),
        })?;
        attributes.push(AttributeModifier {
            id: modifier_id(&id, &name),
            slot: attribute.slot(),
            name,
            attribute,
            amount,
        });
    }

    let unbreakable = raw.unbreakable.unwrap_or(false);
    let mut flags = vec![ItemFlag::HideEnchants, ItemFlag::HideAttributes];
    if unbreakable {
        flags.push(ItemFlag::HideUnbreakable);
    }

    Ok(ItemSpec {
        material,
        amount,
        display_name: raw.name.as_deref().map(translate_color_codes),
        lore: raw
            .lore
            .unwrap_or_default()
            .iter()
            .map(|line| translate_color_codes(line))
            .collect(),
        enchantments,
        attributes,
        unbreakable,
        flags,
    })
}

/// Outcome of building a catalogue: the valid recipes plus every skipped one.
#[derive(Debug, Default)]
pub struct CatalogueLoad {
    /// Recipes that passed validation.
    pub catalogue: Catalogue,
    /// One error per skipped recipe.
    pub errors: Vec<CraftError>,
}

/// The loaded set of unique-craft recipes.
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    recipes: BTreeMap<RecipeId, RecipeDefinition>,
}

impl Catalogue {
    /// Builds a catalogue from the `[crafts]` section, skipping invalid entries.
    #[must_use]
    pub fn from_section(section: Option<&Table>, materials: &dyn MaterialLookup) -> CatalogueLoad {
        let Some(section) = section else {
            error!("section [crafts] not found in the crafts document; no recipes loaded");
            return CatalogueLoad::default();
        };

        info!("loading {} crafts", section.len());
        let mut load = CatalogueLoad::default();
        for (id, value) in section {
            match RecipeDefinition::parse(id, value, materials) {
                Ok(recipe) => {
                    info!("loaded craft {id}");
                    load.catalogue.recipes.insert(recipe.id.clone(), recipe);
                }
                Err(e) => {
                    warn!("skipping craft {id}: {e}");
                    load.errors.push(e);
                }
            }
        }
        info!(
            "catalogue ready: {} loaded, {} skipped",
            load.catalogue.len(),
            load.errors.len()
        );
        load
    }

    /// Looks up a recipe.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RecipeDefinition> {
        self.recipes.get(id)
    }

    /// Returns true if the catalogue defines `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.recipes.contains_key(id)
    }

    /// Recipes in identifier order.
    pub fn recipes(&self) -> impl Iterator<Item = &RecipeDefinition> {
        self.recipes.values()
    }

    /// Identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &RecipeId> {
        self.recipes.keys()
    }

    /// Number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if there are no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
