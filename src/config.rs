//! Configuration handling for jitzu
//!
//! Settings are layered: command-line flags (which also read `JITZU_*`
//! environment variables) override the TOML config file, which overrides
//! built-in defaults. The config file lives at
//! `~/.config/jitzu/config.toml` (platform equivalent) unless `--config` is
//! given.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::templates::expand_home;
use crate::tracker::JiraConfig;

/// Default location of the template directory
pub const DEFAULT_TEMPLATE_PATH: &str = "~/.jitzu-templates";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Missing setting '{name}' (set it with --{flag}, {env} or in the config file)")]
    Missing {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },
}

/// Effective settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Jira base URL, e.g. `https://example.atlassian.net`
    pub base_url: Option<String>,

    pub username: Option<String>,

    /// Password or API token
    pub password: Option<String>,

    /// Default project key
    pub project: Option<String>,

    /// Directory holding templates; `~` is expanded
    pub template_path: String,

    /// Accept invalid TLS certificates
    pub insecure_tls: bool,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            password: None,
            project: None,
            template_path: DEFAULT_TEMPLATE_PATH.to_string(),
            insecure_tls: false,
            timeout_secs: 30,
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub project: Option<String>,
    pub template_path: Option<String>,
    pub insecure_tls: bool,
}

impl Config {
    /// Returns the default config file path
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "jitzu", "jitzu").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the config file
    ///
    /// An explicitly given path must exist; a missing default file yields
    /// the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()).into());
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies command-line and environment overrides
    pub fn apply(&mut self, overrides: &Overrides) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        set(&mut self.base_url, &overrides.base_url);
        set(&mut self.username, &overrides.username);
        set(&mut self.password, &overrides.password);
        set(&mut self.project, &overrides.project);
        if let Some(path) = &overrides.template_path {
            self.template_path = path.clone();
        }
        if overrides.insecure_tls {
            self.insecure_tls = true;
        }
    }

    /// Template directory with `~` expanded
    pub fn template_dir(&self) -> PathBuf {
        expand_home(&self.template_path)
    }

    /// Project key from the argument, falling back to the configured default
    pub fn project_key(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .map(str::to_string)
            .or_else(|| self.project.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or(ConfigError::Missing {
                name: "project",
                flag: "project",
                env: "JITZU_PROJECT",
            })
    }

    /// Connection settings for the Jira client
    pub fn jira(&self) -> Result<JiraConfig, ConfigError> {
        let base_url = self
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::Missing {
                name: "base_url",
                flag: "base-url",
                env: "JITZU_BASE_URL",
            })?;

        let mut jira = JiraConfig::new(
            base_url,
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        );
        jira.timeout = Duration::from_secs(self.timeout_secs.max(1));
        jira.insecure_tls = self.insecure_tls;
        Ok(jira)
    }

    /// Copy safe to print, with the password masked
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if masked.password.is_some() {
            masked.password = Some("********".to_string());
        }
        masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.template_path, "~/.jitzu-templates");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.insecure_tls);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn parse_config_file() {
        let toml = r#"
base_url = "https://jira.example.com"
username = "me@example.com"
password = "token"
project = "OPS"
template_path = "/srv/templates"
insecure_tls = true
"#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(config.project.as_deref(), Some("OPS"));
        assert_eq!(config.template_dir(), PathBuf::from("/srv/templates"));
        assert!(config.insecure_tls);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(
            Config::from_toml("base_url = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn overrides_win_over_file() {
        let mut config = Config::from_toml("project = \"OPS\"\nusername = \"file\"\n").unwrap();
        config.apply(&Overrides {
            project: Some("DEV".into()),
            template_path: Some("/tmp/tpl".into()),
            ..Default::default()
        });

        assert_eq!(config.project.as_deref(), Some("DEV"));
        assert_eq!(config.username.as_deref(), Some("file"));
        assert_eq!(config.template_path, "/tmp/tpl");
    }

    #[test]
    fn project_key_resolution() {
        let mut config = Config::default();
        assert!(matches!(
            config.project_key(None),
            Err(ConfigError::Missing { name: "project", .. })
        ));

        config.project = Some("OPS".into());
        assert_eq!(config.project_key(None).unwrap(), "OPS");
        assert_eq!(config.project_key(Some("DEV")).unwrap(), "DEV");
    }

    #[test]
    fn jira_settings_require_base_url() {
        let mut config = Config::default();
        assert!(config.jira().is_err());

        config.base_url = Some("https://jira.example.com".into());
        config.timeout_secs = 5;
        let jira = config.jira().unwrap();
        assert_eq!(jira.timeout, Duration::from_secs(5));
        assert_eq!(jira.username, "");
    }

    #[test]
    fn masked_hides_password() {
        let config = Config {
            password: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(config.masked().password.as_deref(), Some("********"));
        assert!(Config::default().masked().password.is_none());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "project = \"OPS\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.project.as_deref(), Some("OPS"));
    }
}
