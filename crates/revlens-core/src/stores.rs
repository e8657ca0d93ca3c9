use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::review::Platform;
use crate::ConfigError;

/// One tenant location as configured in `stores.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    pub timezone: Option<String>,
    pub platforms: Vec<Platform>,
    pub notes: Option<String>,
}

impl StoreConfig {
    /// Generate a URL-safe slug from the store name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

/// Load and validate the stores configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name must be non-empty".to_string(),
            ));
        }

        if store.platforms.is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' must list at least one connected platform",
                store.name
            )));
        }

        let mut platforms = HashSet::new();
        for platform in &store.platforms {
            if !platforms.insert(platform) {
                return Err(ConfigError::Validation(format!(
                    "store '{}' lists platform '{platform}' more than once",
                    store.name
                )));
            }
        }

        let lower_name = store.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate store name: '{}'",
                store.name
            )));
        }

        let slug = store.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store slug: '{slug}' (from store '{}')",
                store.name
            )));
        }
    }

    Ok(())
}
