//! Note Graph
//!
//! Turns a Markdown note vault into a typed entity/relation graph:
//! - Content extraction of titles, tags, links, headings and blocks
//! - A cached tag index with co-occurrence analytics and bulk rename/delete
//! - Relationship inference between notes (links, shared tags, similarity)
//! - Compilation of notes into property/type/entity/relation ops
//! - Publication of op logs to a content store anchored in a space

pub mod error;
pub mod extract;
pub mod graph;
pub mod publish;
pub mod relations;
pub mod tags;
pub mod vault;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{BatchOutcome, Error, ItemFailure, Result};

use graph::{CompileOptions, IdentityStrategy};
use publish::{Network, PublishSettings, Secret};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub vault: VaultYamlConfig,
    pub publish: PublishYamlConfig,
    pub tags: TagsYamlConfig,
}

/// Vault configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultYamlConfig {
    pub path: String,
    /// Folders (relative to the vault root) never published
    pub excluded_folders: Vec<String>,
}

impl Default for VaultYamlConfig {
    fn default() -> Self {
        Self {
            path: ".".into(),
            excluded_folders: Vec::new(),
        }
    }
}

/// Publication configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishYamlConfig {
    pub network: Network,
    pub space_id: String,
    pub author_address: String,
    pub private_key: Option<Secret>,
    pub api_url: Option<String>,
    pub include_tags: bool,
    pub include_links: bool,
    pub debounce_ms: u64,
    /// Derive ids from note paths instead of generating fresh ones
    pub stable_ids: bool,
}

impl Default for PublishYamlConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            space_id: String::new(),
            author_address: String::new(),
            private_key: None,
            api_url: None,
            include_tags: true,
            include_links: true,
            debounce_ms: 2000,
            stable_ids: false,
        }
    }
}

/// Tag index configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TagsYamlConfig {
    pub cache_ttl_secs: u64,
}

impl Default for TagsYamlConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: tags::DEFAULT_TAG_CACHE_TTL.as_secs(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub vault_path: PathBuf,
    pub excluded_folders: Vec<String>,
    pub network: Network,
    pub space_id: String,
    pub author_address: String,
    pub private_key: Option<Secret>,
    pub api_url: Option<String>,
    pub include_tags: bool,
    pub include_links: bool,
    pub stable_ids: bool,
    pub debounce_ms: u64,
    pub tag_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from `config.yaml` in the CWD (if any) and env vars.
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. A missing or
    /// unparsable file falls back to env vars / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let network = match std::env::var("NOTE_GRAPH_NETWORK") {
            Ok(value) => value.parse()?,
            Err(_) => yaml.publish.network,
        };

        Ok(Self {
            vault_path: PathBuf::from(
                std::env::var("NOTE_GRAPH_VAULT_PATH").unwrap_or(yaml.vault.path),
            ),
            excluded_folders: yaml.vault.excluded_folders,
            network,
            space_id: std::env::var("NOTE_GRAPH_SPACE_ID").unwrap_or(yaml.publish.space_id),
            author_address: std::env::var("NOTE_GRAPH_AUTHOR_ADDRESS")
                .unwrap_or(yaml.publish.author_address),
            private_key: std::env::var("NOTE_GRAPH_PRIVATE_KEY")
                .ok()
                .map(Secret::from)
                .or(yaml.publish.private_key),
            api_url: std::env::var("NOTE_GRAPH_API_URL")
                .ok()
                .or(yaml.publish.api_url),
            include_tags: yaml.publish.include_tags,
            include_links: yaml.publish.include_links,
            stable_ids: yaml.publish.stable_ids,
            debounce_ms: yaml.publish.debounce_ms,
            tag_cache_ttl: Duration::from_secs(yaml.tags.cache_ttl_secs),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    /// Publication settings, refused when credentials or the space are missing.
    pub fn publish_settings(&self) -> Result<PublishSettings> {
        let settings = PublishSettings {
            network: self.network,
            space_id: self.space_id.clone(),
            author_address: self.author_address.clone(),
            private_key: self.private_key.clone(),
            api_url: self.api_url.clone(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            include_tags: self.include_tags,
            include_links: self.include_links,
            target_space: (!self.space_id.is_empty()).then(|| self.space_id.clone()),
            identity: if self.stable_ids {
                IdentityStrategy::PathKeyed
            } else {
                IdentityStrategy::Fresh
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod config_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_config_loading() {
        let yaml = r#"
vault:
  path: /tmp/vault
  excluded_folders: [Templates, Archive]

publish:
  network: mainnet
  space_id: space-1
  author_address: "0xabc"
  private_key: "0xkey"
  include_links: false
  debounce_ms: 500
  stable_ids: true

tags:
  cache_ttl_secs: 60
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.vault.path, "/tmp/vault");
        assert_eq!(config.vault.excluded_folders, vec!["Templates", "Archive"]);
        assert_eq!(config.publish.network, Network::Mainnet);
        assert_eq!(config.publish.space_id, "space-1");
        assert_eq!(
            config.publish.private_key.as_ref().map(|k| k.expose()),
            Some("0xkey")
        );
        assert!(config.publish.include_tags);
        assert!(!config.publish.include_links);
        assert_eq!(config.publish.debounce_ms, 500);
        assert!(config.publish.stable_ids);
        assert_eq!(config.tags.cache_ttl_secs, 60);
    }

    #[test]
    fn test_yaml_defaults() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.vault.path, ".");
        assert!(config.vault.excluded_folders.is_empty());
        assert_eq!(config.publish.network, Network::Testnet);
        assert!(config.publish.include_tags);
        assert!(config.publish.include_links);
        assert!(!config.publish.stable_ids);
        assert_eq!(config.publish.debounce_ms, 2000);
        assert!(config.publish.private_key.is_none());
        assert_eq!(config.tags.cache_ttl_secs, 300);
    }

    #[test]
    fn test_private_key_redacted_in_debug() {
        let yaml = "publish:\n  private_key: super-secret\n";
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("Secret(***)"));
    }

    /// Combined test for YAML file loading, env var overrides, and defaults.
    /// Runs as a single test to avoid parallel env var race conditions.
    #[test]
    fn test_yaml_and_env_lifecycle() {
        fn clear_env() {
            for var in &[
                "NOTE_GRAPH_VAULT_PATH",
                "NOTE_GRAPH_NETWORK",
                "NOTE_GRAPH_SPACE_ID",
                "NOTE_GRAPH_AUTHOR_ADDRESS",
                "NOTE_GRAPH_PRIVATE_KEY",
                "NOTE_GRAPH_API_URL",
            ] {
                std::env::remove_var(var);
            }
        }

        // --- Phase 1: YAML values loaded correctly ---
        let yaml = r#"
vault:
  path: /yaml/vault
publish:
  space_id: yaml-space
  author_address: "0xyaml"
  private_key: yaml-key
"#;
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&file_path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        clear_env();

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.vault_path, PathBuf::from("/yaml/vault"));
        assert_eq!(config.space_id, "yaml-space");
        assert_eq!(config.network, Network::Testnet);
        let settings = config.publish_settings().unwrap();
        assert_eq!(settings.api_url(), Network::Testnet.default_api_url());
        assert_eq!(
            config.compile_options().target_space.as_deref(),
            Some("yaml-space")
        );

        // --- Phase 2: Env vars override YAML ---
        std::env::set_var("NOTE_GRAPH_SPACE_ID", "env-space");
        std::env::set_var("NOTE_GRAPH_NETWORK", "MAINNET");
        std::env::set_var("NOTE_GRAPH_API_URL", "http://localhost:4000");

        let config = Config::from_yaml_and_env(Some(&file_path)).unwrap();
        assert_eq!(config.space_id, "env-space");
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(
            config.publish_settings().unwrap().api_url(),
            "http://localhost:4000"
        );
        // YAML value still used where no env override
        assert_eq!(config.author_address, "0xyaml");

        std::env::set_var("NOTE_GRAPH_NETWORK", "moonnet");
        assert!(matches!(
            Config::from_yaml_and_env(Some(&file_path)),
            Err(Error::Validation(_))
        ));

        clear_env();

        // --- Phase 3: No YAML file → defaults, publishing refused ---
        let nonexistent = Path::new("/tmp/nonexistent-note-graph-config-12345.yaml");
        let config = Config::from_yaml_and_env(Some(nonexistent)).unwrap();
        assert_eq!(config.vault_path, PathBuf::from("."));
        assert_eq!(config.tag_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.compile_options(), CompileOptions::default());
        assert!(matches!(
            config.publish_settings(),
            Err(Error::Validation(_))
        ));
    }
}
