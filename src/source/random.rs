use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::trace;

use super::BalanceSource;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomSourceConfig {
    /// Upper bound (inclusive) of a drawn balance.
    pub max_balance: u32,
    /// Probability in `0.0..=1.0` that a lookup fails.
    pub failure_rate: f64,
}

impl Default for RandomSourceConfig {
    fn default() -> Self {
        Self {
            max_balance: 100,
            failure_rate: 0.5,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SourceConfigError {
    #[error("Failure rate must be within 0.0..=1.0, got {0}")]
    FailureRateOutOfRange(f64),
}

/// Stand-in for a remote service: whole-number balances, unreliable by design.
#[derive(Debug, Clone, Copy)]
pub struct RandomBalanceSource {
    config: RandomSourceConfig,
}

impl RandomBalanceSource {
    pub fn new(config: RandomSourceConfig) -> Result<Self, SourceConfigError> {
        if !(0.0..=1.0).contains(&config.failure_rate) {
            return Err(SourceConfigError::FailureRateOutOfRange(
                config.failure_rate,
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &RandomSourceConfig {
        &self.config
    }

    fn draw(&self) -> Option<Decimal> {
        let mut rng = rand::thread_rng();
        let balance = rng.gen_range(0..=self.config.max_balance);
        let failed = rng.gen_bool(self.config.failure_rate);
        trace!(balance, failed, "Drew remote balance");
        (!failed).then(|| Decimal::from(balance))
    }
}

impl Default for RandomBalanceSource {
    fn default() -> Self {
        Self {
            config: RandomSourceConfig::default(),
        }
    }
}

#[async_trait]
impl BalanceSource for RandomBalanceSource {
    async fn fetch_balance(&self) -> Option<Decimal> {
        self.draw()
    }
}
