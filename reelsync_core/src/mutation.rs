//! Ack-then-invalidate mutation layer
//!
//! Writes wait for server acknowledgment, then notify the user and
//! invalidate the cache key prefixes the mutation's factory declared as
//! affected. No success state is ever shown before the ack. Failures are
//! mapped to a user-visible message through a fixed fallback chain so raw
//! error payloads never leak to the UI.

use crate::cache::CacheStore;
use crate::error::{BackendError, Error, InternalError, Result};
use crate::key::QueryKey;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;

/// User-visible acknowledgment seam (toast/banner)
pub trait Notifier: Send + Sync {
    fn success(&self, title: &str, description: Option<&str>);
    fn error(&self, title: &str, description: Option<&str>);
}

/// Localized message catalog seam
pub trait MessageCatalog: Send + Sync {
    /// Resolve a message key to localized text; unknown keys return the key
    fn t(&self, key: &str) -> String;
}

/// Catalog key for the generic failure message
pub const GENERIC_ERROR_KEY: &str = "errors.generic";
/// Catalog key for the failure toast title
pub const ERROR_TITLE_KEY: &str = "errors.title";

/// Raw rejection payload of a failed write
///
/// Backends reject with anything from a structured error to a bare string;
/// this enum captures every shape the display chain must handle.
#[derive(Debug)]
pub enum MutationRejection {
    /// Structured backend error with its own message
    Backend(BackendError),
    /// A typed library error
    Failure(Error),
    /// A literal string payload
    Text(String),
    /// Anything else; only the generic localized message is safe to show
    Unknown,
}

impl From<Error> for MutationRejection {
    fn from(error: Error) -> Self {
        match error {
            Error::Backend(backend) => Self::Backend(backend),
            other => Self::Failure(other),
        }
    }
}

impl From<BackendError> for MutationRejection {
    fn from(error: BackendError) -> Self {
        Self::Backend(error)
    }
}

/// Map a rejection to the message shown to the user
///
/// Priority order is a hard contract: backend message, then error display,
/// then the literal string, then the generic localized fallback.
pub fn failure_message(rejection: &MutationRejection, catalog: &dyn MessageCatalog) -> String {
    match rejection {
        MutationRejection::Backend(backend) => backend.message.clone(),
        MutationRejection::Failure(error) => error.to_string(),
        MutationRejection::Text(text) => text.clone(),
        MutationRejection::Unknown => catalog.t(GENERIC_ERROR_KEY),
    }
}

/// Declared side effects of a mutation
///
/// `invalidates` is the complete list of key prefixes the write can affect.
/// Missing a prefix here is a correctness bug (stale UI), so factories keep
/// these tables next to the corresponding query keys.
#[derive(Debug, Clone)]
pub struct MutationSpec {
    /// Catalog key for the success toast
    pub success_key: &'static str,
    /// Every cache key prefix whose data this write can change
    pub invalidates: Vec<QueryKey>,
}

/// Result of running a mutation through the runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    /// The write was acknowledged
    Completed(T),
    /// A guard clause declined to send a degenerate request
    Skipped,
}

impl<T> MutationOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, MutationOutcome::Skipped)
    }
}

/// Runs writes with their declared side effects
#[derive(Clone)]
pub struct MutationRunner {
    cache: CacheStore,
    notifier: Arc<dyn Notifier>,
    catalog: Arc<dyn MessageCatalog>,
}

impl MutationRunner {
    pub fn new(
        cache: CacheStore,
        notifier: Arc<dyn Notifier>,
        catalog: Arc<dyn MessageCatalog>,
    ) -> Self {
        Self {
            cache,
            notifier,
            catalog,
        }
    }

    /// Run a write with its declared spec
    ///
    /// A `None` spec means a guard clause rejected the call (nothing
    /// selected, missing identifier); the future is dropped unexecuted and
    /// no request is sent. On ack the user is notified and every declared
    /// prefix invalidated; on rejection the fallback-chain message is shown
    /// and the error returned to the call site.
    pub async fn run<T, Fut>(
        &self,
        spec: Option<MutationSpec>,
        mutate: Fut,
    ) -> Result<MutationOutcome<T>>
    where
        Fut: Future<Output = std::result::Result<T, MutationRejection>>,
    {
        let spec = match spec {
            Some(spec) => spec,
            None => {
                debug!("mutation skipped by guard clause");
                return Ok(MutationOutcome::Skipped);
            }
        };

        match mutate.await {
            Ok(value) => {
                self.notifier.success(&self.catalog.t(spec.success_key), None);
                for prefix in &spec.invalidates {
                    self.cache.invalidate_prefix(prefix).await;
                }
                Ok(MutationOutcome::Completed(value))
            }
            Err(rejection) => {
                let message = failure_message(&rejection, self.catalog.as_ref());
                warn!("mutation failed: {message}");
                self.notifier
                    .error(&self.catalog.t(ERROR_TITLE_KEY), Some(&message));
                Err(rejection_to_error(rejection, message))
            }
        }
    }
}

fn rejection_to_error(rejection: MutationRejection, message: String) -> Error {
    match rejection {
        MutationRejection::Backend(backend) => Error::Backend(backend),
        MutationRejection::Failure(error) => error,
        MutationRejection::Text(_) | MutationRejection::Unknown => {
            Error::Internal(InternalError::mutation(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingNotifier {
        successes: Mutex<Vec<String>>,
        errors: Mutex<Vec<(String, Option<String>)>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                successes: Mutex::new(vec![]),
                errors: Mutex::new(vec![]),
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, title: &str, _description: Option<&str>) {
            self.successes.lock().unwrap().push(title.to_string());
        }

        fn error(&self, title: &str, description: Option<&str>) {
            self.errors
                .lock()
                .unwrap()
                .push((title.to_string(), description.map(String::from)));
        }
    }

    struct MapCatalog(HashMap<&'static str, &'static str>);

    impl MessageCatalog for MapCatalog {
        fn t(&self, key: &str) -> String {
            self.0.get(key).map_or_else(|| key.to_string(), |v| v.to_string())
        }
    }

    fn catalog() -> Arc<MapCatalog> {
        let mut map = HashMap::new();
        map.insert(GENERIC_ERROR_KEY, "An error occurred");
        map.insert(ERROR_TITLE_KEY, "Something went wrong");
        map.insert("watchlist.deleted", "Removed from watchlist");
        Arc::new(MapCatalog(map))
    }

    fn runner() -> (MutationRunner, Arc<RecordingNotifier>, CacheStore) {
        let cache = CacheStore::new();
        let notifier = Arc::new(RecordingNotifier::new());
        let runner = MutationRunner::new(cache.clone(), notifier.clone(), catalog());
        (runner, notifier, cache)
    }

    fn spec() -> MutationSpec {
        MutationSpec {
            success_key: "watchlist.deleted",
            invalidates: vec![],
        }
    }

    #[tokio::test]
    async fn test_none_spec_skips_without_executing() {
        let (runner, notifier, _cache) = runner();

        let outcome: MutationOutcome<()> = runner
            .run(None, async { panic!("must not execute") })
            .await
            .unwrap();

        assert!(outcome.is_skipped());
        assert!(notifier.successes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_notifies_with_catalog_message() {
        let (runner, notifier, _cache) = runner();

        let outcome = runner.run(Some(spec()), async { Ok(()) }).await.unwrap();

        assert_eq!(outcome, MutationOutcome::Completed(()));
        assert_eq!(
            notifier.successes.lock().unwrap().as_slice(),
            ["Removed from watchlist"]
        );
    }

    #[tokio::test]
    async fn test_fallback_chain_backend_message() {
        let (runner, notifier, _cache) = runner();

        let result: Result<MutationOutcome<()>> = runner
            .run(Some(spec()), async {
                Err(MutationRejection::Backend(BackendError::new(
                    409,
                    "already in your watchlist",
                )))
            })
            .await;

        assert!(result.is_err());
        let errors = notifier.errors.lock().unwrap();
        assert_eq!(
            errors[0],
            (
                "Something went wrong".to_string(),
                Some("already in your watchlist".to_string())
            )
        );
    }

    #[tokio::test]
    async fn test_fallback_chain_error_display() {
        let (runner, notifier, _cache) = runner();

        let result: Result<MutationOutcome<()>> = runner
            .run(Some(spec()), async {
                Err(MutationRejection::Failure(
                    InternalError::channel("socket closed").into(),
                ))
            })
            .await;

        assert!(result.is_err());
        let errors = notifier.errors.lock().unwrap();
        assert_eq!(
            errors[0].1.as_deref(),
            Some("realtime channel error: socket closed")
        );
    }

    #[tokio::test]
    async fn test_fallback_chain_literal_string() {
        let (runner, notifier, _cache) = runner();

        let result: Result<MutationOutcome<()>> = runner
            .run(Some(spec()), async {
                Err(MutationRejection::Text("quota exceeded".to_string()))
            })
            .await;

        assert!(result.is_err());
        let errors = notifier.errors.lock().unwrap();
        assert_eq!(errors[0].1.as_deref(), Some("quota exceeded"));
    }

    #[tokio::test]
    async fn test_fallback_chain_unknown_uses_generic_message() {
        let (runner, notifier, _cache) = runner();

        let result: Result<MutationOutcome<()>> = runner
            .run(Some(spec()), async { Err(MutationRejection::Unknown) })
            .await;

        assert!(result.is_err());
        let errors = notifier.errors.lock().unwrap();
        assert_eq!(errors[0].1.as_deref(), Some("An error occurred"));
    }

    #[tokio::test]
    async fn test_success_invalidates_declared_prefixes() {
        use crate::key::watchlist_key;
        use crate::types::UserId;

        let (runner, _notifier, cache) = runner();
        let user = UserId("u-1".to_string());
        let key = watchlist_key(&user);
        cache.put(&key, &vec![1u32, 2, 3]).await.unwrap();

        let spec = MutationSpec {
            success_key: "watchlist.deleted",
            invalidates: vec![watchlist_key(&user)],
        };
        runner.run(Some(spec), async { Ok(()) }).await.unwrap();

        assert_eq!(
            cache.state(&key).await,
            crate::cache::EntryState::Stale
        );
    }
}
