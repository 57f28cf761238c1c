//! Publication data models and settings.

use crate::error::{Error, Result};
use crate::graph::Op;
use serde::{Deserialize, Serialize};

/// Target knowledge-store environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    /// Calldata API used when no explicit URL is configured.
    pub fn default_api_url(&self) -> &'static str {
        match self {
            Self::Testnet => "https://api-testnet.grc-20.thegraph.com",
            Self::Mainnet => "https://api.grc-20.thegraph.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Testnet => "TESTNET",
            Self::Mainnet => "MAINNET",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Testnet => write!(f, "testnet"),
            Self::Mainnet => write!(f, "mainnet"),
        }
    }
}

impl std::str::FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Self::Testnet),
            "mainnet" => Ok(Self::Mainnet),
            other => Err(Error::Validation(format!("unknown network: {}", other))),
        }
    }
}

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret(***)")
    }
}

/// Everything publication needs from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishSettings {
    pub network: Network,
    pub space_id: String,
    pub author_address: String,
    pub private_key: Option<Secret>,
    /// Overrides [`Network::default_api_url`]
    pub api_url: Option<String>,
}

impl PublishSettings {
    /// Refuse to publish without credentials and a target space.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.space_id.trim().is_empty() {
            missing.push("space id");
        }
        if self.author_address.trim().is_empty() {
            missing.push("author address");
        }
        if self
            .private_key
            .as_ref()
            .map(|k| k.expose().trim().is_empty())
            .unwrap_or(true)
        {
            missing.push("private key");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "missing publish settings: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_api_url())
    }
}

/// Op log submitted to the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub name: String,
    pub ops: Vec<Op>,
    pub author_address: String,
    pub network: Network,
}

/// Calldata for anchoring a content id in a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPayload {
    pub to: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub to: String,
    pub value: u64,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub hash: String,
}

/// Outcome of one successful publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub content_id: String,
    pub transaction: TransactionResult,
}
