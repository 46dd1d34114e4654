//! Persisted option storage.
//!
//! Every user setting lives in a three-level namespace
//! (`category / group / name`) and is stored as text in `conf/options.toml`.
//! The typed handles in this module parse on read, so a damaged value only
//! costs the user that one setting rather than the whole file. Values equal to
//! the option's default are never written; the file only records deviations.

mod typed;

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

pub use typed::{
    Boolean3, Boolean3Option, BooleanOption, Color, ColorOption, IntegerRangeOption, StringOption,
};

pub const LOOK_AND_FEEL_CATEGORY: &str = "LookAndFeel";
pub const EXTERNAL_CATEGORY: &str = "ExternalPrograms";
pub const FORMATS_CATEGORY: &str = "Formats";
pub const KEYS_CATEGORY: &str = "Keys";
pub const CONFIG_CATEGORY: &str = "Options";

type OptionTree = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

#[derive(Debug, Default)]
struct StoreInner {
    values: OptionTree,
    path: Option<PathBuf>,
    dirty: bool,
}

/// Shared handle to the option values of one UI session.
///
/// Cloning is cheap and every clone sees the same values. The store is meant
/// to be used from the UI thread only.
#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl OptionStore {
    /// A store with no backing file; `save` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`. A missing file yields an empty store bound to
    /// that path; a file that is not valid TOML is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let values = match fs::read_to_string(path) {
            Ok(data) => {
                let values: OptionTree = toml::from_str(&data)
                    .with_context(|| format!("Invalid option file {}", path.display()))?;
                info!(path = %path.display(), categories = values.len(), "Loaded option store");
                values
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No option file yet; starting empty");
                OptionTree::new()
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read option file {}", path.display()));
            }
        };
        Ok(Self {
            inner: Rc::new(RefCell::new(StoreInner {
                values,
                path: Some(path.to_path_buf()),
                dirty: false,
            })),
        })
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.inner.borrow().path.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().dirty
    }

    /// Write all values back to the file the store was loaded from.
    pub fn save(&self) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let Some(path) = inner.path.clone() else {
            debug!("In-memory option store; nothing to save");
            inner.dirty = false;
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create option dir {}", parent.display()))?;
        }
        let contents =
            toml::to_string(&inner.values).context("Failed to serialize option values")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write option file {}", path.display()))?;
        inner.dirty = false;
        info!(path = %path.display(), "Saved option store");
        Ok(())
    }

    pub fn get(&self, category: &str, group: &str, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .values
            .get(category)
            .and_then(|groups| groups.get(group))
            .and_then(|names| names.get(name))
            .cloned()
    }

    pub fn set(&self, category: &str, group: &str, name: &str, value: &str) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let names = inner
            .values
            .entry(category.to_string())
            .or_default()
            .entry(group.to_string())
            .or_default();
        match names.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                inner.dirty = true;
            }
            Entry::Occupied(mut slot) => {
                if slot.get() != value {
                    slot.insert(value.to_string());
                    inner.dirty = true;
                }
            }
        }
    }

    /// Remove a value, pruning groups and categories that become empty.
    pub fn unset(&self, category: &str, group: &str, name: &str) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let Some(groups) = inner.values.get_mut(category) else {
            return;
        };
        let mut removed = false;
        if let Some(names) = groups.get_mut(group) {
            removed = names.remove(name).is_some();
            if names.is_empty() {
                groups.remove(group);
            }
        }
        if groups.is_empty() {
            inner.values.remove(category);
        }
        if removed {
            inner.dirty = true;
        }
    }

    /// Names stored under one group, in sorted order.
    pub fn names(&self, category: &str, group: &str) -> Vec<String> {
        self.inner
            .borrow()
            .values
            .get(category)
            .and_then(|groups| groups.get(group))
            .map(|names| names.keys().cloned().collect())
            .unwrap_or_default()
    }
}
