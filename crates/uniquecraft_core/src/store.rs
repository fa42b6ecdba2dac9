//! # Crafts Document
//!
//! The flat TOML document behind both the catalogue and the ledger:
//!
//! ```text
//! [crafts.<id>]      recipe definitions (read-only here)
//! [crafted]          <id> = true for every produced recipe
//! ```
//!
//! Writes go to a sibling temp file which is synced and renamed over the
//! original, so a crash mid-write leaves the previous document intact.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{info, warn};

use crate::error::{CraftError, CraftResult};
use crate::id::RecipeId;

/// Section holding recipe definitions.
pub const CRAFTS_SECTION: &str = "crafts";

/// Section holding crafted flags.
pub const CRAFTED_SECTION: &str = "crafted";

/// Document written when the store does not exist yet.
pub const DEFAULT_DOCUMENT: &str = include_str!("../resources/crafts.toml");

/// In-memory copy of the crafts document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CraftsDocument {
    table: Table,
}

impl CraftsDocument {
    /// Reads the document at `path`. A missing file is an empty document.
    ///
    /// # Errors
    ///
    /// `Io` if the file exists but cannot be read, `Parse` if it is not TOML.
    pub fn read(path: &Path) -> CraftResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("crafts document {} not found, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(CraftError::io(path, e)),
        };
        Self::parse(&text).map_err(|source| CraftError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a document from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error for malformed input.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        Ok(Self {
            table: text.parse::<Table>()?,
        })
    }

    /// The recipe definitions section, if present and a table.
    #[must_use]
    pub fn crafts(&self) -> Option<&Table> {
        self.table.get(CRAFTS_SECTION).and_then(Value::as_table)
    }

    /// All crafted flags. Non-boolean entries are skipped with a warning.
    #[must_use]
    pub fn crafted_flags(&self) -> BTreeMap<RecipeId, bool> {
        let Some(section) = self.table.get(CRAFTED_SECTION).and_then(Value::as_table) else {
            return BTreeMap::new();
        };
        section
            .iter()
            .filter_map(|(id, value)| match value.as_bool() {
                Some(flag) => Some((RecipeId::from(id.as_str()), flag)),
                None => {
                    warn!("ignoring non-boolean crafted flag for {id}");
                    None
                }
            })
            .collect()
    }

    /// Sets `crafted.<id> = true`.
    pub fn mark_crafted(&mut self, id: &RecipeId) {
        let section = self
            .table
            .entry(CRAFTED_SECTION)
            .or_insert_with(|| Value::Table(Table::new()));
        if !section.is_table() {
            warn!("replacing malformed [{CRAFTED_SECTION}] section");
            *section = Value::Table(Table::new());
        }
        if let Value::Table(flags) = section {
            flags.insert(id.to_string(), Value::Boolean(true));
        }
    }

    /// Removes `crafted.<id>`. Returns true if an entry was removed.
    pub fn clear_crafted(&mut self, id: &RecipeId) -> bool {
        self.table
            .get_mut(CRAFTED_SECTION)
            .and_then(Value::as_table_mut)
            .is_some_and(|flags| flags.remove(id.as_str()).is_some())
    }

    /// Renders the document as TOML.
    ///
    /// # Errors
    ///
    /// `Serialize` if the table cannot be rendered.
    pub fn to_toml_string(&self) -> CraftResult<String> {
        Ok(toml::to_string_pretty(&self.table)?)
    }

    /// Writes the document to `path` via temp file and rename.
    ///
    /// # Errors
    ///
    /// `Io` on any filesystem failure, `Serialize` if rendering fails.
    pub fn write_atomic(&self, path: &Path) -> CraftResult<()> {
        let text = self.to_toml_string()?;
        let tmp = temp_path(path);
        {
            let mut file = File::create(&tmp).map_err(|e| CraftError::io(&tmp, e))?;
            file.write_all(text.as_bytes())
                .map_err(|e| CraftError::io(&tmp, e))?;
            file.sync_all().map_err(|e| CraftError::io(&tmp, e))?;
        }
        fs::rename(&tmp, path).map_err(|e| CraftError::io(path, e))?;
        Ok(())
    }
}

/// Seeds the store with [`DEFAULT_DOCUMENT`] if nothing exists at `path`.
///
/// Returns true if the file was created.
///
/// # Errors
///
/// `Io` if the parent directory or the file cannot be created.
pub fn ensure_exists(path: &Path) -> CraftResult<bool> {
    if path.exists() {
        info!("crafts document found at {}", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CraftError::io(parent, e))?;
    }
    fs::write(path, DEFAULT_DOCUMENT).map_err(|e| CraftError::io(path, e))?;
    info!("crafts document not found, created default at {}", path.display());
    Ok(true)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn temp_store_path() -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("test_store_{id}_{n}.toml"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let doc = CraftsDocument::read(&temp_store_path()).unwrap();
        assert!(doc.crafts().is_none());
        assert!(doc.crafted_flags().is_empty());
    }

    #[test]
    fn test_crafted_flags_skip_non_booleans() {
        let doc = CraftsDocument::parse(
            r#"
            [crafted]
            golden_sword = true
            old_axe = false
            broken = "yes"
            "#,
        )
        .unwrap();

        let flags = doc.crafted_flags();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags.get("golden_sword"), Some(&true));
        assert_eq!(flags.get("old_axe"), Some(&false));
    }

    #[test]
    fn test_mark_and_clear_preserve_recipes() {
        let path = temp_store_path();
        let mut doc = CraftsDocument::parse(
            r#"
            [crafts.golden_sword]
            shape = ["GGG", " S ", " S "]
            "#,
        )
        .unwrap();

        doc.mark_crafted(&"golden_sword".into());
        doc.write_atomic(&path).unwrap();

        let mut reread = CraftsDocument::read(&path).unwrap();
        assert!(reread.crafts().unwrap().contains_key("golden_sword"));
        assert_eq!(reread.crafted_flags().get("golden_sword"), Some(&true));

        assert!(reread.clear_crafted(&"golden_sword".into()));
        assert!(!reread.clear_crafted(&"golden_sword".into()));
        assert!(reread.crafted_flags().is_empty());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_ensure_exists_seeds_default() {
        let path = temp_store_path();
        assert!(ensure_exists(&path).unwrap());
        assert!(!ensure_exists(&path).unwrap());

        let doc = CraftsDocument::read(&path).unwrap();
        assert!(!doc.crafts().unwrap().is_empty());
        assert!(doc.crafted_flags().is_empty());

        fs::remove_file(&path).ok();
    }
}
