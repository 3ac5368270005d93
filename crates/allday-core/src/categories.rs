use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One ranking category: display name, the site's numeric category code,
/// and an optional override of the per-category listing target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub target_count: Option<usize>,
}

impl CategoryConfig {
    /// Listing target for this category, falling back to `default_target`.
    #[must_use]
    pub fn target_or(&self, default_target: usize) -> usize {
        self.target_count.unwrap_or(default_target)
    }
}

/// Top-level shape of `config/categories.yaml`. Order is preserved and is the
/// order in which categories are crawled.
#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryConfig>,
}

impl CategoriesFile {
    /// Restrict the table to the category with `name`, if present.
    #[must_use]
    pub fn only(self, name: &str) -> Option<CategoryConfig> {
        self.categories.into_iter().find(|c| c.name == name)
    }
}

/// Load and validate the category table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_categories(&content)
}

/// Parse and validate a category table from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_categories(content: &str) -> Result<CategoriesFile, ConfigError> {
    let file: CategoriesFile = serde_yaml::from_str(content)?;
    validate_categories(&file)?;
    Ok(file)
}

fn validate_categories(file: &CategoriesFile) -> Result<(), ConfigError> {
    if file.categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut seen_codes = HashSet::new();

    for category in &file.categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }

        if category.code.is_empty() || !category.code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::Validation(format!(
                "category '{}' has invalid code '{}'; must be numeric",
                category.name, category.code
            )));
        }

        if category.target_count == Some(0) {
            return Err(ConfigError::Validation(format!(
                "category '{}' has target_count 0",
                category.name
            )));
        }

        if !seen_names.insert(category.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category name: '{}'",
                category.name
            )));
        }

        if !seen_codes.insert(category.code.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category code: '{}' (from category '{}')",
                category.code, category.name
            )));
        }
    }

    Ok(())
}
