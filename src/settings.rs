//! Storefront settings

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::storage::DEFAULT_CART_KEY, currency::Locale};

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error reading the settings file
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse settings: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Cart key is empty or contains characters unsafe for a file name
    #[error("Invalid cart key: {0:?}")]
    InvalidCartKey(String),
}

/// Storefront settings
///
/// Every field has a default, so an empty document is valid. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorefrontSettings {
    /// Store name printed on receipts
    pub store_name: String,

    /// Display locale for amounts and messages
    pub locale: Locale,

    /// Key the cart blob is stored under
    pub cart_key: String,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            store_name: "Athfal Playhouse".to_string(),
            locale: Locale::default(),
            cart_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

impl StorefrontSettings {
    /// Parse settings from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the document is invalid.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        let settings: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_norway::from_str(yaml)?
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let valid = !self.cart_key.is_empty()
            && self
                .cart_key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');

        if valid {
            Ok(())
        } else {
            Err(SettingsError::InvalidCartKey(self.cart_key.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn empty_document_uses_defaults() -> TestResult {
        let settings = StorefrontSettings::from_yaml("")?;

        assert_eq!(settings, StorefrontSettings::default());
        assert_eq!(settings.cart_key, "athfal-cart");
        assert_eq!(settings.locale, Locale::Indonesian);

        Ok(())
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() -> TestResult {
        let settings = StorefrontSettings::from_yaml("locale: en\n")?;

        assert_eq!(settings.locale, Locale::English);
        assert_eq!(settings.store_name, "Athfal Playhouse");

        Ok(())
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = StorefrontSettings::from_yaml("currency: USD\n");

        assert!(matches!(result, Err(SettingsError::Yaml(_))));
    }

    #[test]
    fn rejects_path_like_cart_key() {
        let result = StorefrontSettings::from_yaml("cart_key: ../escape\n");

        assert!(matches!(result, Err(SettingsError::InvalidCartKey(_))));
    }
}
