//! Bridge deployment configuration.
//!
//! Both values are fixed for the lifetime of a deployment: the domain tag is
//! mixed into every digest and the threshold decides every signature check.

use std::env;
use std::path::Path;

use pg_01_checkpoint_encoder::{label_bytes32, DomainTag};
use serde::{Deserialize, Serialize};
use shared_types::{BridgeError, BridgeResult, Threshold};

/// Default domain tag label.
pub const DEFAULT_DOMAIN_LABEL: &str = "peggy";

/// Deployment configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub domain_tag: DomainTag,
    pub threshold: Threshold,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            domain_tag: DomainTag::new(label_bytes32(DEFAULT_DOMAIN_LABEL)),
            threshold: Threshold::default(),
        }
    }
}

impl BridgeConfig {
    pub fn new(domain_tag: DomainTag, threshold: Threshold) -> Self {
        Self {
            domain_tag,
            threshold,
        }
    }

    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PG_DOMAIN_TAG`: domain tag label, at most 31 ASCII bytes (default: peggy)
    /// - `PG_THRESHOLD_NUMERATOR`: threshold numerator (default: 6666)
    /// - `PG_THRESHOLD_DENOMINATOR`: threshold denominator (default: 10000)
    pub fn from_env() -> BridgeResult<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> BridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let domain_tag = match lookup("PG_DOMAIN_TAG") {
            Some(label) => DomainTag::from_label(&label)?,
            None => defaults.domain_tag,
        };

        let numerator = parse_part(&lookup, "PG_THRESHOLD_NUMERATOR")?
            .unwrap_or(defaults.threshold.numerator());
        let denominator = parse_part(&lookup, "PG_THRESHOLD_DENOMINATOR")?
            .unwrap_or(defaults.threshold.denominator());

        Ok(Self {
            domain_tag,
            threshold: Threshold::new(numerator, denominator)?,
        })
    }

    /// Load from a JSON file and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| BridgeError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| BridgeError::Config {
            reason: format!("cannot parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that deserialization alone does not enforce.
    pub fn validate(&self) -> BridgeResult<()> {
        Threshold::new(self.threshold.numerator(), self.threshold.denominator())?;
        if self.domain_tag.as_bytes() == &[0u8; 32] {
            return Err(BridgeError::Config {
                reason: "domain tag is all zero".into(),
            });
        }
        Ok(())
    }
}

fn parse_part<F>(lookup: &F, key: &str) -> BridgeResult<Option<u32>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<u32>().map_err(|e| BridgeError::Config {
                reason: format!("{key}={raw:?}: {e}"),
            })
        })
        .transpose()
}
