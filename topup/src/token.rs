//! Fetch-once cache of the account's first API key.
//!
//! The landing page wants the user's most recent API key without hitting
//! the token endpoint on every visit. [`FirstKeyCache`] checks the injected
//! store first and only fetches on a miss, then persists the result under
//! [`FIRST_API_KEY`]. The cache is intentionally never invalidated or
//! refreshed by this flow, even if the underlying token is later revoked;
//! hosts that need to recover clear the store key out-of-band.

use tokio::sync::Mutex;

use crate::api::ConsoleApi;
use crate::error::FlowError;
use crate::proto::TokenQuery;
use crate::store::KeyValueStore;

/// Store key under which the first API key is persisted.
pub const FIRST_API_KEY: &str = "first_apikey";

/// A fetch-once cache for the account's first API key.
///
/// The check-fetch-store sequence runs behind an async mutex, so concurrent
/// callers still produce exactly one token-list request, which a
/// single-threaded event-loop host would get for free.
#[derive(Debug)]
pub struct FirstKeyCache<S> {
    store: S,
    fetch_gate: Mutex<()>,
}

impl<S: KeyValueStore> FirstKeyCache<S> {
    /// Wraps a store with fetch-once semantics.
    pub fn new(store: S) -> Self {
        Self {
            store,
            fetch_gate: Mutex::new(()),
        }
    }

    /// Returns the account's first API key, fetching it at most once.
    ///
    /// On a store hit the cached value is returned without any network
    /// call. On a miss the token list is fetched (first page, newest
    /// first), the first record's key is persisted and returned.
    ///
    /// # Errors
    ///
    /// [`FlowError::Transport`] if the request never completed,
    /// [`FlowError::Rejected`] with the server message on a
    /// `success = false` envelope, and [`FlowError::MissingToken`] when the
    /// account has no tokens to cache. Nothing is persisted on any error.
    pub async fn first_api_key<A: ConsoleApi>(
        &self,
        api: &A,
    ) -> Result<String, FlowError<A::Error>> {
        let _guard = self.fetch_gate.lock().await;

        if let Some(key) = self.store.get(FIRST_API_KEY) {
            return Ok(key);
        }

        let envelope = api
            .tokens(&TokenQuery::first_page())
            .await
            .map_err(FlowError::Transport)?;
        let page = envelope.into_data().map_err(|m| FlowError::rejected(m))?;
        let first = page.data.into_iter().next().ok_or(FlowError::MissingToken)?;

        self.store.set(FIRST_API_KEY, &first.key);
        Ok(first.key)
    }
}
