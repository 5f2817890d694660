//! Custom marker icons.
//!
//! The document keeps the decoded RGBA pixels so icon deletion can be undone.
//! Uploading icons to a texture atlas is the renderer's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
    pub category: String,
}

impl IconData {
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

/// Icons keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconLibrary {
    icons: BTreeMap<String, IconData>,
}

impl IconLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an icon, returning the replaced data.
    pub fn insert(&mut self, name: impl Into<String>, icon: IconData) -> Option<IconData> {
        self.icons.insert(name.into(), icon)
    }

    pub fn remove(&mut self, name: &str) -> Option<IconData> {
        self.icons.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&IconData> {
        self.icons.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.icons.contains_key(name)
    }

    /// Renames an icon. Fails if `old` is missing or `new` is taken.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old == new || self.icons.contains_key(new) {
            return false;
        }
        match self.icons.remove(old) {
            Some(icon) => {
                self.icons.insert(new.to_owned(), icon);
                true
            }
            None => false,
        }
    }

    /// Icons in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IconData)> {
        self.icons.iter().map(|(name, icon)| (name.as_str(), icon))
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
