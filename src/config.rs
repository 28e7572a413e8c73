//! Declarative composition config: named chains and transition edges.
//!
//! The registry's key -> factory bindings are code, registered at
//! startup; what a config file may describe is the *wiring* — which
//! keys form which chain, and which state succeeds which.

use crate::transitions::TransitionTable;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate chain name: {0}")]
    DuplicateChain(String),
    #[error("duplicate transition source: {0}")]
    DuplicateTransition(String),
}

/// Composition configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Named chains, each an ordered list of registry keys.
    #[serde(default, rename = "chain")]
    pub chains: Vec<ChainConfig>,
    /// Transition edges.
    #[serde(default, rename = "transition")]
    pub transitions: Vec<TransitionConfig>,
}

/// One named chain.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Chain name.
    pub name: String,
    /// Ordered registry keys, head first.
    pub links: Vec<String>,
}

/// One transition edge.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionConfig {
    /// Current-state key.
    pub from: String,
    /// Successor-state key.
    pub to: String,
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse and validate config text.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for chain in &self.chains {
            if !names.insert(chain.name.as_str()) {
                return Err(ConfigError::DuplicateChain(chain.name.clone()));
            }
        }
        let mut sources = HashSet::new();
        for edge in &self.transitions {
            if !sources.insert(edge.from.as_str()) {
                return Err(ConfigError::DuplicateTransition(edge.from.clone()));
            }
        }
        Ok(())
    }

    /// Look up a chain by name.
    pub fn chain(&self, name: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.name == name)
    }

    /// Install every configured edge into `table`.
    pub fn apply_transitions(&self, table: &TransitionTable) {
        for edge in &self.transitions {
            table.add_transition(edge.from.clone(), edge.to.clone());
        }
    }
}
