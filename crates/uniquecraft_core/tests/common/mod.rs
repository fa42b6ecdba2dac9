//! In-memory host doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use uniquecraft_core::{
    CompleteCraft, CraftError, CraftingHost, Material, MaterialLookup, Party, PrepareCraft,
    RecipeKey, ShapedRegistration, UniqueCraftConfig,
};

pub const GOLDEN_SWORD_STORE: &str = r#"
[crafts.golden_sword]
shape = ["GGG", " S ", " S "]
message = "%player% forged the Golden Sword!"

[crafts.golden_sword.ingredients]
G = "GOLD_BLOCK"
S = "STICK"

[crafts.golden_sword.result]
material = "GOLDEN_SWORD"

[crafts.crown]
shape = ["G G", "GDG", "GGG"]

[crafts.crown.ingredients]
G = "GOLD_INGOT"
D = "DIAMOND"

[crafts.crown.result]
material = "GOLDEN_HELMET"
name = "&eCrown"
"#;

pub fn temp_store_path() -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("test_uniquecraft_{id}_{n}.toml"))
}

/// Config pointing at a fresh store seeded with `document`.
pub fn config_with_store(document: &str) -> UniqueCraftConfig {
    let path = temp_store_path();
    std::fs::write(&path, document).unwrap();
    let mut config = UniqueCraftConfig::default();
    config.store_path = path;
    config.persistence.flush_backoff_ms = 1;
    config
}

#[derive(Default)]
pub struct RecordingHost {
    pub registered: Mutex<Vec<RecipeKey>>,
    pub broadcasts: Mutex<Vec<String>>,
    pub reject: HashSet<String>,
    pub unknown_materials: HashSet<String>,
}

impl RecordingHost {
    pub fn with_foreign(keys: &[RecipeKey]) -> Self {
        let host = Self::default();
        host.registered.lock().unwrap().extend(keys.iter().cloned());
        host
    }

    pub fn keys(&self) -> Vec<String> {
        self.registered
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }
}

impl MaterialLookup for RecordingHost {
    fn is_known(&self, material: &Material) -> bool {
        !self.unknown_materials.contains(material.as_str())
    }
}

impl CraftingHost for RecordingHost {
    fn register_recipe(&self, recipe: &ShapedRegistration) -> Result<(), CraftError> {
        let mut registered = self.registered.lock().unwrap();
        if self.reject.contains(&recipe.key.key) {
            return Err(CraftError::RegistrationRejected {
                recipe: recipe.key.key.clone(),
                reason: "malformed shape".to_string(),
            });
        }
        if registered.contains(&recipe.key) {
            return Err(CraftError::DuplicateRecipe(recipe.key.to_string()));
        }
        registered.push(recipe.key.clone());
        Ok(())
    }

    fn unregister_namespace(&self, namespace: &str) -> usize {
        let mut registered = self.registered.lock().unwrap();
        let before = registered.len();
        registered.retain(|key| key.namespace != namespace);
        before - registered.len()
    }

    fn registered_keys(&self) -> Vec<RecipeKey> {
        self.registered.lock().unwrap().clone()
    }

    fn broadcast(&self, message: &str) {
        self.broadcasts.lock().unwrap().push(message.to_string());
    }
}

pub struct TestParty {
    pub name: String,
    pub messages: Mutex<Vec<String>>,
    pub permissions: Vec<String>,
}

impl TestParty {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            messages: Mutex::new(Vec::new()),
            permissions: Vec::new(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Party for TestParty {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

pub struct PrepareEvent {
    pub key: Option<RecipeKey>,
    pub viewers: Vec<TestParty>,
    pub result_present: bool,
}

impl PrepareEvent {
    pub fn new(key: Option<RecipeKey>, viewer: &str) -> Self {
        Self {
            key,
            viewers: vec![TestParty::new(viewer)],
            result_present: true,
        }
    }
}

impl PrepareCraft for PrepareEvent {
    fn recipe_key(&self) -> Option<&RecipeKey> {
        self.key.as_ref()
    }

    fn first_viewer(&self) -> Option<&dyn Party> {
        self.viewers.first().map(|p| p as &dyn Party)
    }

    fn withhold_result(&mut self) {
        self.result_present = false;
    }
}

pub struct CompleteEvent {
    pub key: Option<RecipeKey>,
    pub actor: TestParty,
    pub cancelled: bool,
}

impl CompleteEvent {
    pub fn new(key: Option<RecipeKey>, actor: &str) -> Self {
        Self {
            key,
            actor: TestParty::new(actor),
            cancelled: false,
        }
    }
}

impl CompleteCraft for CompleteEvent {
    fn recipe_key(&self) -> Option<&RecipeKey> {
        self.key.as_ref()
    }

    fn actor(&self) -> &dyn Party {
        &self.actor
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}
