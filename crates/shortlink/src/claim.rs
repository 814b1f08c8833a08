#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{RecordStore, StoreError, Token, URL_FIELD};

/// Outcome of a single claim attempt.
///
/// - [`ClaimStatus::Acquired`]: this caller now owns the token.
/// - [`ClaimStatus::Taken`]: another record already holds it; try another
///   candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    Acquired,
    Taken,
}

impl ClaimStatus {
    pub const fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

/// Reserves `token` for `url` with a single conditional create of the record's
/// `url` field.
///
/// This is the only synchronization point between allocators: the existence
/// check and the write are one store operation, so two callers racing on the
/// same token can never both observe [`ClaimStatus::Acquired`].
///
/// # Errors
///
/// Propagates any [`StoreError`] from the adapter. A token that is already
/// taken is **not** an error.
#[cfg_attr(feature = "tracing", instrument(level = "trace", skip_all, fields(token = %token)))]
pub async fn try_claim<S>(store: &S, token: &Token, url: &str) -> Result<ClaimStatus, StoreError>
where
    S: RecordStore,
{
    let created = store
        .create_field_if_absent(token.as_str(), URL_FIELD, url)
        .await?;
    Ok(if created {
        ClaimStatus::Acquired
    } else {
        ClaimStatus::Taken
    })
}
