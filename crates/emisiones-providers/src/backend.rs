//! The two consumed interfaces of the reconciliation engine.
//!
//! [`RemoteSchedule`] reads the account state; [`CreationBackend`] creates
//! one missing broadcast per call. Both are object-safe async traits using
//! boxed futures, so the engine can hold either concrete backend behind a
//! `dyn` reference and stays testable with in-memory implementations.

use std::future::Future;
use std::pin::Pin;

use emisiones_core::{EventSpec, RemoteEvent};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Async functions in traits do not yet mix well with dynamic dispatch;
/// boxed futures keep the traits object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The outcome of one creation attempt.
///
/// Quota exhaustion is an expected terminal condition of a run, not an
/// error, so it is part of the outcome rather than an `Err`.
#[derive(Debug)]
pub enum CreateOutcome {
    /// The event was created.
    Created,
    /// The provider refused further creations for this run.
    QuotaExceeded {
        /// Provider-supplied reason, for the stop log line.
        detail: String,
    },
    /// A condition a caller might retry (network blip, UI timing).
    TransientFailure(ProviderError),
    /// A condition retrying will not resolve (bad config, desync).
    PermanentFailure(ProviderError),
}

impl CreateOutcome {
    /// Returns true if the event was created.
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Read access to the broadcasts that exist on the remote account.
///
/// Failures here are fatal to a run; retry, if any, belongs to the
/// implementation or to whatever re-invokes the whole run.
pub trait RemoteSchedule: Send + Sync {
    /// Lists the account's broadcasts, ascending by scheduled start,
    /// pagination handled internally.
    ///
    /// The sequence must contain every future event; past events may be
    /// included and feed template resolution.
    fn list_broadcasts(&self) -> BoxFuture<'_, ProviderResult<Vec<RemoteEvent>>>;
}

/// Creates one scheduled broadcast per call.
pub trait CreationBackend: Send + Sync {
    /// Returns the name of this backend (e.g., "api", "studio").
    fn name(&self) -> &str;

    /// Creates the event described by `spec`, copying configuration from
    /// `template` when one is given.
    ///
    /// Implementations report every failure through the returned
    /// [`CreateOutcome`]; they never panic on provider misbehavior.
    fn create<'a>(
        &'a self,
        spec: &'a EventSpec,
        template: Option<&'a RemoteEvent>,
    ) -> BoxFuture<'a, CreateOutcome>;

    /// How many days ahead this backend is willing to plan, if it wants
    /// to cap the window below the configured maximum.
    fn planning_horizon_days(&self) -> Option<u32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RefusingBackend;

    impl CreationBackend for RefusingBackend {
        fn name(&self) -> &str {
            "refusing"
        }

        fn create<'a>(
            &'a self,
            _spec: &'a EventSpec,
            _template: Option<&'a RemoteEvent>,
        ) -> BoxFuture<'a, CreateOutcome> {
            Box::pin(async {
                CreateOutcome::QuotaExceeded {
                    detail: "quotaExceeded".to_string(),
                }
            })
        }
    }

    #[test]
    fn default_horizon_is_unbounded() {
        assert_eq!(RefusingBackend.planning_horizon_days(), None);
    }

    #[test]
    fn outcome_created_check() {
        assert!(CreateOutcome::Created.is_created());
        assert!(
            !CreateOutcome::QuotaExceeded {
                detail: String::new()
            }
            .is_created()
        );
    }
}
