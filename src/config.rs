use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::namespace::{current_identity, PathTranslator};

/// user configuration stored in config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub identity: Identity,
}

/// whose home directory is tracked, and who signs commits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub home: PathBuf,
    pub user: String,
    /// defaults to the user name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Config {
    pub fn new(home: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            identity: Identity {
                home: home.into(),
                user: user.into(),
                author: None,
            },
        }
    }

    /// config for the user running this process
    pub fn detect() -> Result<Self> {
        let (home, user) = current_identity()?;
        Ok(Self::new(home, user))
    }

    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }

    /// author recorded in new commits
    pub fn author(&self) -> &str {
        self.identity
            .author
            .as_deref()
            .unwrap_or(&self.identity.user)
    }

    /// validate the home/user relationship and build the path translator
    pub fn translator(&self) -> Result<PathTranslator> {
        PathTranslator::new(&self.identity.home, &self.identity.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = Config::new("/home/achin", "achin");
        config.identity.author = Some("A. Chin".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
        assert_eq!(parsed.author(), "A. Chin");
    }

    #[test]
    fn test_config_minimal_toml() {
        let toml_str = r#"
[identity]
home = "/home/achin"
user = "achin"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.identity.home, PathBuf::from("/home/achin"));
        assert_eq!(config.author(), "achin");
        assert!(config.translator().is_ok());
    }

    #[test]
    fn test_config_rejects_mismatched_home() {
        let config = Config::new("/home/renamed", "achin");
        assert!(matches!(
            config.translator(),
            Err(Error::ConfigInvariant { .. })
        ));
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::new("/home/achin", "achin");
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
