use std::{fs, path::Path};

use labinv::Config;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Base URL for component lookups, when served by a different host
    #[arg(long, value_name = "URL")]
    lookup_url: Option<String>,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path, base_url: Option<&str>) -> anyhow::Result<()> {
        let config_path = super::config_path(root);
        if config_path.exists() {
            anyhow::bail!(
                "Already initialized (found existing {})",
                config_path.display()
            );
        }

        fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

        let mut config = base_url.map_or_else(Config::default, Config::new);
        config.set_lookup_url(self.lookup_url);
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized lab inventory client in {}", root.display());
        println!("  Created: {}", config_path.display());
        println!("  Service: {}", config.base_url());
        if config.lookup_url() != config.base_url() {
            println!("  Lookups: {}", config.lookup_url());
        }
        println!();
        println!("Next steps:");
        println!("  labinv login");
        println!("  labinv hierarchy");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_root_and_config() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(".labinv");

        Command { lookup_url: None }
            .run(&root, Some("https://inventory.example.edu"))
            .unwrap();

        let config = Config::load(&root.join("config.toml")).unwrap();
        assert_eq!(config.base_url(), "https://inventory.example.edu");
        assert_eq!(config.lookup_url(), "https://inventory.example.edu");
    }

    #[test]
    fn refuses_to_overwrite_existing_config() {
        let tmp = tempfile::tempdir().unwrap();
        Command { lookup_url: None }.run(tmp.path(), None).unwrap();

        let error = Command {
            lookup_url: Some("http://scanner".to_string()),
        }
        .run(tmp.path(), None)
        .unwrap_err();

        assert!(error.to_string().contains("Already initialized"));
    }
}
