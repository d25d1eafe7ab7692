//! Market configuration

use crate::{MarketError, MarketResult};
use metacoin_core::Amount;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Supply minted to the owner when no configuration says otherwise
pub const DEFAULT_TOTAL_SUPPLY: Amount = 12_000;

/// Parameters fixed when a market is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Total token supply, credited to the owner at creation
    pub total_supply: Amount,
    /// Question cost in effect before the owner changes it
    pub initial_question_cost: Amount,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            total_supply: DEFAULT_TOTAL_SUPPLY,
            initial_question_cost: 0,
        }
    }
}

impl MarketConfig {
    /// Create a configuration with the given supply
    pub fn new(total_supply: Amount) -> Self {
        Self {
            total_supply,
            ..Self::default()
        }
    }

    /// Set the initial question cost
    pub fn with_initial_question_cost(mut self, cost: Amount) -> Self {
        self.initial_question_cost = cost;
        self
    }

    /// Parse configuration from TOML
    pub fn from_toml(toml_str: &str) -> MarketResult<Self> {
        let config: MarketConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> MarketResult<String> {
        toml::to_string(self)
            .map_err(|e| MarketError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MarketResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| MarketError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> MarketResult<()> {
        if self.total_supply == 0 {
            return Err(MarketError::Config(
                "Total supply must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
