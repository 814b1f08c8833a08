//! Read path: following a token back to its URL.
//!
//! Resolution never takes part in allocation. Its only write is the access
//! counter, which is incremented atomically by the store but treated as
//! best-effort here: a failed increment is logged and the redirect still
//! succeeds.

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{COUNT_FIELD, RecordStore, ShortLink, StoreError, Token, URL_FIELD};

/// A successfully resolved token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Destination URL.
    pub url: String,
    /// Access count after this resolution, or `None` if the increment failed
    /// or the record expired between the read and the increment.
    pub count: Option<i64>,
}

/// Resolves and inspects ShortLink records.
#[derive(Clone, Debug)]
pub struct Resolver<S> {
    store: S,
}

impl<S> Resolver<S>
where
    S: RecordStore,
{
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Looks up the URL for `token` and bumps its access count.
    ///
    /// Returns `Ok(None)` if no record exists.
    ///
    /// # Errors
    ///
    /// Returns the store error if the URL itself cannot be read.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(token = %token)))]
    pub async fn resolve(&self, token: &Token) -> Result<Option<Resolution>, StoreError> {
        let Some(url) = self.store.get_field(token.as_str(), URL_FIELD).await? else {
            #[cfg(feature = "tracing")]
            tracing::info!(token = %token, "token not found");
            return Ok(None);
        };

        let count = match self.store.increment_field(token.as_str(), COUNT_FIELD, 1).await {
            Ok(Some(count)) => Some(count),
            Ok(None) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(token = %token, "record expired before its count was incremented");
                None
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %_e, token = %token, "error while incrementing count");
                None
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(token = %token, url = %url, count, "redirection data retrieved");
        Ok(Some(Resolution { url, count }))
    }

    /// Reads the full record for `token` without touching its counter.
    ///
    /// # Errors
    ///
    /// Returns the store error, or [`StoreError::Corrupt`] when a numeric
    /// field cannot be parsed.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(token = %token)))]
    pub async fn inspect(&self, token: &Token) -> Result<Option<ShortLink>, StoreError> {
        let fields = self.store.get_all_fields(token.as_str()).await?;
        ShortLink::from_fields(token.as_str(), fields)
    }

    /// Returns whether a record currently holds `token`.
    ///
    /// # Errors
    ///
    /// Returns the store error unchanged.
    pub async fn is_claimed(&self, token: &Token) -> Result<bool, StoreError> {
        self.store.exists(token.as_str()).await
    }
}
