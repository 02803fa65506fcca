//! # Device Client Configuration
//!
//! One [`DeviceConfig`] per counterparty credential set. Construction
//! enforces the credential invariant: live modes (production, sandbox)
//! require a signing key; simulation runs keyless.
//!
//! Custom `Debug` implementation redacts the key so a config can be logged
//! without leaking credentials.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use vscu_core::{BranchId, KraPin, ValidationError};
use vscu_crypto::{KeyError, SigningKey};

use crate::endpoint::EndpointRegistry;

/// Operating mode for a counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceMode {
    /// Live traffic against the production host.
    Production,
    /// Live traffic against the sandbox host.
    Sandbox,
    /// Fully offline; every call is answered by the simulation responder.
    Simulation,
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Sandbox => write!(f, "sandbox"),
            Self::Simulation => write!(f, "simulation"),
        }
    }
}

impl std::str::FromStr for DeviceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "sandbox" | "test" => Ok(Self::Sandbox),
            "simulation" | "demo" => Ok(Self::Simulation),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("environment variable {0} is required")]
    MissingVar(&'static str),

    /// An identifier failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The signing key is malformed.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A live mode was selected without a signing key.
    #[error("mode {0} requires a signing key")]
    MissingKey(DeviceMode),

    /// The mode string is not one of production/sandbox/simulation.
    #[error("unknown device mode: {0:?}")]
    InvalidMode(String),

    /// A base URL failed to parse.
    #[error("invalid URL for {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Per-counterparty credentials, mode, endpoints, and timeout.
#[derive(Clone)]
pub struct DeviceConfig {
    /// Taxpayer PIN used as the `tin` identity header.
    pub pin: KraPin,
    /// Branch code used as the `bhfId` identity header.
    pub branch_id: BranchId,
    /// Operating mode.
    pub mode: DeviceMode,
    /// Per-mode base URLs.
    pub endpoints: EndpointRegistry,
    /// Overrides each operation's default timeout when set. The timeout
    /// bounds the full round trip, not just connection establishment.
    pub timeout: Option<Duration>,
    cmc_key: Option<SigningKey>,
}

impl DeviceConfig {
    /// Create a configuration, enforcing that live modes carry a key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] when `mode` is not
    /// [`DeviceMode::Simulation`] and `cmc_key` is `None`.
    pub fn new(
        pin: KraPin,
        branch_id: BranchId,
        mode: DeviceMode,
        cmc_key: Option<SigningKey>,
        endpoints: EndpointRegistry,
    ) -> Result<Self, ConfigError> {
        if mode != DeviceMode::Simulation && cmc_key.is_none() {
            return Err(ConfigError::MissingKey(mode));
        }
        Ok(Self {
            pin,
            branch_id,
            mode,
            endpoints,
            timeout: None,
            cmc_key,
        })
    }

    /// Override the per-operation default call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The signing key, present for every non-simulation config.
    pub fn signing_key(&self) -> Option<&SigningKey> {
        self.cmc_key.as_ref()
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `VSCU_PIN` (required)
    /// - `VSCU_BRANCH_ID` (default: `00`)
    /// - `VSCU_MODE` (default: `production`)
    /// - `VSCU_CMC_KEY` (required unless mode is `simulation`)
    /// - `VSCU_PROD_URL` (default: published production host)
    /// - `VSCU_SANDBOX_URL` (default: published sandbox host)
    /// - `VSCU_LOCAL_URL` (optional)
    /// - `VSCU_TIMEOUT_SECS` (default: 120)
    pub fn from_env() -> Result<Self, ConfigError> {
        let pin = KraPin::new(
            std::env::var("VSCU_PIN").map_err(|_| ConfigError::MissingVar("VSCU_PIN"))?,
        )?;
        let branch_id = match std::env::var("VSCU_BRANCH_ID") {
            Ok(raw) => BranchId::new(raw)?,
            Err(_) => BranchId::default(),
        };
        let mode: DeviceMode = std::env::var("VSCU_MODE")
            .unwrap_or_else(|_| "production".to_string())
            .parse()?;
        let cmc_key = match std::env::var("VSCU_CMC_KEY") {
            Ok(raw) => Some(SigningKey::new(raw)?),
            Err(_) => None,
        };

        let mut endpoints = EndpointRegistry::new(env_url(
            "VSCU_PROD_URL",
            crate::endpoint::PRODUCTION_BASE_URL,
        )?)
        .with_sandbox(env_url(
            "VSCU_SANDBOX_URL",
            crate::endpoint::SANDBOX_BASE_URL,
        )?);
        if let Ok(raw) = std::env::var("VSCU_LOCAL_URL") {
            let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
                var: "VSCU_LOCAL_URL",
                reason: e.to_string(),
            })?;
            endpoints = endpoints.with_local(url);
        }

        let mut config = Self::new(pin, branch_id, mode, cmc_key, endpoints)?;
        config.timeout = std::env::var("VSCU_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);
        Ok(config)
    }
}

impl std::fmt::Debug for DeviceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceConfig")
            .field("pin", &self.pin)
            .field("branch_id", &self.branch_id)
            .field("mode", &self.mode)
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("cmc_key", &"[REDACTED]")
            .finish()
    }
}

fn env_url(var: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin() -> KraPin {
        KraPin::new("P052386110T").unwrap()
    }

    #[test]
    fn live_mode_without_key_is_rejected() {
        for mode in [DeviceMode::Production, DeviceMode::Sandbox] {
            let result = DeviceConfig::new(
                pin(),
                BranchId::default(),
                mode,
                None,
                EndpointRegistry::published(),
            );
            assert!(matches!(result, Err(ConfigError::MissingKey(_))));
        }
    }

    #[test]
    fn simulation_mode_runs_keyless() {
        let config = DeviceConfig::new(
            pin(),
            BranchId::default(),
            DeviceMode::Simulation,
            None,
            EndpointRegistry::published(),
        )
        .unwrap();
        assert!(config.signing_key().is_none());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn mode_parses_aliases() {
        assert_eq!("prod".parse::<DeviceMode>().unwrap(), DeviceMode::Production);
        assert_eq!("test".parse::<DeviceMode>().unwrap(), DeviceMode::Sandbox);
        assert_eq!("demo".parse::<DeviceMode>().unwrap(), DeviceMode::Simulation);
        assert!("staging".parse::<DeviceMode>().is_err());
    }

    #[test]
    fn mode_serde_uses_lowercase() {
        let json = serde_json::to_string(&DeviceMode::Sandbox).unwrap();
        assert_eq!(json, "\"sandbox\"");
        let back: DeviceMode = serde_json::from_str("\"simulation\"").unwrap();
        assert_eq!(back, DeviceMode::Simulation);
    }

    #[test]
    fn debug_redacts_signing_key() {
        let config = DeviceConfig::new(
            pin(),
            BranchId::default(),
            DeviceMode::Production,
            Some(SigningKey::new("very-secret-key").unwrap()),
            EndpointRegistry::published(),
        )
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very-secret-key"));
        assert!(rendered.contains("REDACTED"));
    }
}
