use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::trace;

pub mod random;

/// Remote lookup of an account's authoritative balance.
///
/// A failed lookup is reported as `None`, never as a panic or an error.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balance(&self) -> Option<Decimal>;
}

/// Always resolves to the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedBalanceSource(pub Option<Decimal>);

#[async_trait]
impl BalanceSource for FixedBalanceSource {
    async fn fetch_balance(&self) -> Option<Decimal> {
        self.0
    }
}

/// Returns queued values one per call, then falls back to the wrapped source.
///
/// Handy for overriding single lookups without replacing the source an
/// account was built with.
pub struct QueuedBalanceSource {
    queued: Mutex<VecDeque<Option<Decimal>>>,
    fallback: Arc<dyn BalanceSource>,
}

impl QueuedBalanceSource {
    pub fn new(fallback: Arc<dyn BalanceSource>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
        }
    }

    /// Makes the next unanswered lookup resolve to `value`.
    pub fn resolve_once(&self, value: Option<Decimal>) -> &Self {
        self.lock_queue().push_back(value);
        self
    }

    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Option<Decimal>>> {
        // the queue holds plain values, a poisoned lock leaves it consistent
        self.queued.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BalanceSource for QueuedBalanceSource {
    async fn fetch_balance(&self) -> Option<Decimal> {
        let queued = self.lock_queue().pop_front();
        match queued {
            Some(value) => {
                trace!(?value, "Resolved balance lookup from queue");
                value
            }
            None => self.fallback.fetch_balance().await,
        }
    }
}
