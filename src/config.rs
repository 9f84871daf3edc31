use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Chance that a new element lands as a leaf of a node that has no slots yet.
/// Every existing slot multiplies the chance by this value again.
pub const DEFAULT_BALANCE: f64 = 0.7;

/// Construction-time knobs for a [`crate::Forest`].
///
/// `balance` close to 1 favours wide, flat nodes (fewer branches, but a
/// higher risk of long slot lists); close to 0 it nests aggressively, giving
/// small nodes at the cost of more branch overhead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub balance: f64,
    /// Seed for the balance coin. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            balance: DEFAULT_BALANCE,
            seed: None,
        }
    }
}

impl TreeConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_balance(self, balance: f64) -> Self {
        Self { balance, ..self }
    }

    pub fn validate(&self) -> Result<()> {
        // `!(x > 0.0)` also rejects NaN
        if !(self.balance > 0.0) || self.balance > 1.0 {
            return Err(Error::Config(format!(
                "balance must be within (0, 1], got {}",
                self.balance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TreeConfig::default();
        assert_eq!(config.balance, DEFAULT_BALANCE);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_balance_bounds() {
        assert!(TreeConfig::default().with_balance(1.0).validate().is_ok());
        assert!(TreeConfig::default().with_balance(0.01).validate().is_ok());

        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let err = TreeConfig::default().with_balance(bad).validate();
            assert!(matches!(err, Err(Error::Config(_))), "{bad} accepted");
        }
    }

    #[test]
    fn test_config_from_json() {
        let config: TreeConfig = serde_json::from_str(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(config, TreeConfig::seeded(42));

        let config: TreeConfig = serde_json::from_str(r#"{ "balance": 0.5 }"#).unwrap();
        assert_eq!(config.balance, 0.5);
        assert_eq!(config.seed, None);

        let json = serde_json::to_string(&TreeConfig::seeded(7)).unwrap();
        let back: TreeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TreeConfig::seeded(7));
    }
}
