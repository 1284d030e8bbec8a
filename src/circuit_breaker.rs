use crate::errors::RepositoryError;
use failsafe::backoff::{self, Exponential};
use failsafe::failure_policy::{self, ConsecutiveFailures};
use failsafe::futures::CircuitBreaker as _;
use failsafe::{Config, StateMachine};
use std::future::Future;
use std::time::Duration;

type Breaker = StateMachine<ConsecutiveFailures<Exponential>, ()>;

/// Circuit breaker in front of the remote candidate store.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures open the circuit.
/// - **Backoff**: exponential from 10s to 60s before a trial call is let through.
///
/// While open, calls fail immediately with [`RepositoryError::CircuitOpen`] so
/// the fallback repository can serve from the local store without waiting on
/// connection timeouts.
#[derive(Clone)]
pub struct RemoteStoreBreaker {
    inner: Breaker,
}

impl Default for RemoteStoreBreaker {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(10), Duration::from_secs(60))
    }
}

impl RemoteStoreBreaker {
    pub fn new(threshold: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        let backoff_strategy = backoff::exponential(initial_backoff, max_backoff);
        let failure_policy = failure_policy::consecutive_failures(threshold, backoff_strategy);

        Self {
            inner: Config::new().failure_policy(failure_policy).build(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.inner.is_call_permitted()
    }

    /// Run one remote call. `NotFound` is an answer, not a store failure, so it
    /// never counts towards opening the circuit.
    pub async fn call<T, F>(&self, work: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        let result = self
            .inner
            .call_with(
                |e: &RepositoryError| !matches!(e, RepositoryError::NotFound(_)),
                work,
            )
            .await;

        match result {
            Ok(value) => Ok(value),
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("Remote store circuit open, rejecting call");
                Err(RepositoryError::CircuitOpen)
            }
        }
    }
}
