//! Pair Configuration Module
//!
//! Provides configuration loading and validation for elastic-supply pairs.
//! Supports loading from TOML files with environment-specific overrides.

use crate::constants::{env, fees, BASIS_POINTS};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default location of the pair configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/pair.toml";

/// What a double-asset entry does when the desired quantities cannot be
/// honored at the current reserve ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadRatioPolicy {
    /// Abort the operation with a `BadRatio` error
    #[default]
    Fail,
    /// Return an all-zero contribution so the call can be composed
    ReturnZero,
}

/// Protocol share of invariant growth, minted as claim tokens on the next
/// liquidity event
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolFeeConfig {
    pub enabled: bool,
    /// Protocol receives `1 / share_denominator` of the growth in `sqrt(k)`
    pub share_denominator: u32,
}

impl Default for ProtocolFeeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            share_denominator: fees::DEFAULT_PROTOCOL_FEE_DENOMINATOR,
        }
    }
}

/// Main pair configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PairConfig {
    /// Liquidity fee taken from swap input, in basis points (30 = 0.3%)
    pub fee_bps: u32,

    /// Protocol fee on invariant growth
    pub protocol_fee: ProtocolFeeConfig,

    /// Behaviour of double-asset entry on an unusable ratio
    pub bad_ratio: BadRatioPolicy,
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            fee_bps: fees::DEFAULT_FEE_BPS,
            protocol_fee: ProtocolFeeConfig::default(),
            bad_ratio: BadRatioPolicy::Fail,
        }
    }
}

impl PairConfig {
    /// Load configuration from files with environment overrides
    ///
    /// An explicit `base_path` must exist. Without one, `config/pair.toml` is
    /// used when present and built-in defaults otherwise.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let (base, required) = match base_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        let mut builder = Config::builder().add_source(File::from(base.as_path()).required(required));

        // Add environment-specific overrides if specified
        if let Some(env_name) = environment {
            let env_file = base
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env_name));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (ELASTIC__ prefix)
        builder = builder.add_source(
            Environment::with_prefix(env::PREFIX)
                .separator(env::SEPARATOR)
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(
            fee_bps = config.fee_bps,
            protocol_fee = config.protocol_fee.enabled,
            "Pair configuration loaded"
        );
        Ok(config)
    }

    /// Reject settings the pricing formulas cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.fee_bps >= BASIS_POINTS {
            bail!(
                "fee_bps must be below {} (got {})",
                BASIS_POINTS,
                self.fee_bps
            );
        }
        if self.protocol_fee.enabled && self.protocol_fee.share_denominator == 0 {
            bail!("protocol_fee.share_denominator must be at least 1 when enabled");
        }
        Ok(())
    }

    /// Protocol share denominator, or `None` when the protocol fee is off
    pub fn protocol_fee_denominator(&self) -> Option<u32> {
        if self.protocol_fee.enabled {
            Some(self.protocol_fee.share_denominator)
        } else {
            None
        }
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(environment: Option<&str>) -> Result<PairConfig> {
    PairConfig::load(None, environment)
}
