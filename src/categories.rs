use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CATEGORIES: [&str; 4] = ["Studying", "Coding", "Project", "Reading"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Please enter a category name")]
    Empty,
    #[error("This category already exists")]
    Duplicate(String),
    #[error("Unknown category \"{0}\"")]
    Unknown(String),
}

/// User-defined categories plus the one new sessions are tagged with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "StoredCategories")]
pub struct CategoryList {
    categories: Vec<String>,
    selected: String,
}

/// On-disk shape; either field may be missing from a hand-edited file.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StoredCategories {
    categories: Option<Vec<String>>,
    selected: Option<String>,
}

impl From<StoredCategories> for CategoryList {
    fn from(stored: StoredCategories) -> Self {
        let defaults = Self::default();
        let categories = match stored.categories {
            Some(names) if !names.is_empty() => names,
            _ => defaults.categories,
        };
        // The selection must name a listed category.
        let selected = stored
            .selected
            .filter(|name| categories.contains(name))
            .or_else(|| categories.first().cloned())
            .unwrap_or(defaults.selected);

        Self {
            categories,
            selected,
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl Default for CategoryList {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect(),
            selected: DEFAULT_CATEGORIES[0].to_string(),
        }
    }
}

impl CategoryList {
    pub fn names(&self) -> &[String] {
        &self.categories
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    fn find(&self, name: &str) -> Option<&String> {
        self.categories
            .iter()
            .find(|existing| existing.as_str() == name)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|existing| same_name(existing, name))
            })
    }

    /// Adds a trimmed, case-insensitively unique name and selects it.
    pub fn add(&mut self, name: &str) -> Result<&str, CategoryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CategoryError::Empty);
        }
        if let Some(existing) = self
            .categories
            .iter()
            .find(|existing| same_name(existing, trimmed))
        {
            return Err(CategoryError::Duplicate(existing.clone()));
        }

        self.categories.push(trimmed.to_string());
        self.selected = trimmed.to_string();
        Ok(&self.selected)
    }

    pub fn select(&mut self, name: &str) -> Result<&str, CategoryError> {
        let found = self
            .find(name.trim())
            .cloned()
            .ok_or_else(|| CategoryError::Unknown(name.trim().to_string()))?;
        self.selected = found;
        Ok(&self.selected)
    }
}
