use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for the inventory client.
///
/// This struct holds the location of the remote inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Base URL of the inventory service.
    ///
    /// Endpoint paths such as `login.php` are resolved against it.
    base_url: String,

    /// Base URL serving the component-by-id lookup used by the scanner.
    ///
    /// Some deployments host the lookup on a different server. When unset,
    /// `base_url` is used.
    lookup_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            lookup_url: None,
        }
    }
}

impl Config {
    /// Creates a configuration pointing at the given service.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            lookup_url: None,
        }
    }

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the base URL of the inventory service.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the base URL for component lookups.
    #[must_use]
    pub fn lookup_url(&self) -> &str {
        self.lookup_url.as_deref().unwrap_or(&self.base_url)
    }

    /// Points the client at a different service.
    ///
    /// A separately configured lookup URL is kept.
    pub fn set_base_url(&mut self, base_url: String) {
        self.base_url = base_url;
    }

    /// Sets or clears the lookup URL.
    pub fn set_lookup_url(&mut self, lookup_url: Option<String>) {
        self.lookup_url = lookup_url;
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_base_url")]
        base_url: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        lookup_url: Option<String>,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                base_url,
                lookup_url,
            } => Self {
                base_url,
                lookup_url: lookup_url.filter(|url| !url.trim().is_empty()),
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            base_url: config.base_url,
            lookup_url: config.lookup_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\n\
              base_url = \"https://inventory.example.edu\"\n\
              lookup_url = \"https://scanner.example.edu\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.base_url(), "https://inventory.example.edu");
        assert_eq!(config.lookup_url(), "https://scanner.example.edu");
    }

    #[test]
    fn lookup_url_falls_back_to_base_url() {
        let config = Config::new("https://inventory.example.edu");
        assert_eq!(config.lookup_url(), "https://inventory.example.edu");
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::new("https://inventory.example.edu");
        config.set_lookup_url(Some("https://scanner.example.edu".to_string()));

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nbase_url = 3\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }
}
