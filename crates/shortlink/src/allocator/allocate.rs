#[cfg(feature = "tracing")]
use tracing::instrument;

use super::context::Interrupted;
use crate::{
    AllocError, AllocatorConfig, COUNT_FIELD, CREATION_TIME_FIELD, CandidateState, ClaimStatus,
    RandSource, RecordStore, RequestContext, Result, SystemClock, ThreadRandom, TimeSource, Token,
    try_claim, validate_hint,
};

/// Turns a token hint into a unique token in a shared [`RecordStore`].
///
/// The allocator holds no mutable state of its own: every call to
/// [`Self::allocate`] owns its [`CandidateState`] and the only shared
/// resources are the store and the random source. One allocator can serve
/// any number of concurrent requests, and any number of allocators (in this
/// or other processes) can share the store.
///
/// ## Allocation
/// 1. The hint must match `^[0-9a-zA-Z]{0,L}$`, else
///    [`AllocError::InvalidHint`].
/// 2. Candidates are claimed one at a time with [`try_claim`]. A taken
///    candidate widens the random suffix per [`CandidateState`]; after
///    `max_retries` taken candidates the call fails with
///    [`AllocError::Exhausted`]. A store failure aborts with
///    [`AllocError::StoreUnavailable`].
/// 3. The claimed record receives `creationTime`, `count = 0` and an expiry
///    of now + `retention`. A failure here yields
///    [`AllocError::PartialWriteFailure`] and the token stays claimed; a new
///    token is never tried once one was claimed.
///
/// # Example
/// ```
/// use shortlink::{Allocator, AllocatorConfig, MemoryStore, RecordStore};
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let store = MemoryStore::new();
/// let allocator = Allocator::new(store.clone(), AllocatorConfig::default());
///
/// let token = allocator.allocate("hello", "https://example.com").await.unwrap();
/// assert_eq!(token.len(), 6);
/// assert!(token.as_str().starts_with("hello"));
/// assert!(store.exists(token.as_str()).await.unwrap());
/// # });
/// ```
#[derive(Debug)]
pub struct Allocator<S, R = ThreadRandom, T = SystemClock> {
    store: S,
    rng: R,
    clock: T,
    config: AllocatorConfig,
}

impl<S> Allocator<S>
where
    S: RecordStore,
{
    /// Creates an allocator drawing randomness from the thread-local RNG and
    /// time from the system clock.
    pub fn new(store: S, config: AllocatorConfig) -> Self {
        Self::from_components(store, ThreadRandom, SystemClock, config)
    }
}

impl<S, R, T> Allocator<S, R, T>
where
    S: RecordStore,
    R: RandSource<u64>,
    T: TimeSource<u64>,
{
    /// Creates an allocator from explicit collaborators, typically a seeded
    /// or mocked random source and clock.
    pub const fn from_components(store: S, rng: R, clock: T, config: AllocatorConfig) -> Self {
        Self {
            store,
            rng,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocates a token for `url` with no deadline and no cancellation.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate_in`].
    pub async fn allocate(&self, hint: &str, url: &str) -> Result<Token> {
        self.allocate_in(&RequestContext::new(), hint, url).await
    }

    /// Allocates a token for `url`, bounding every store call by the
    /// context's deadline and stopping as soon as it is cancelled.
    ///
    /// # Errors
    ///
    /// - [`AllocError::InvalidConfig`]: the [`AllocatorConfig`] is out of
    ///   range. No store call is made.
    /// - [`AllocError::InvalidHint`]: `hint` is not up to `token_length`
    ///   alphanumeric characters. No store call is made.
    /// - [`AllocError::Exhausted`]: `max_retries` candidates were all taken.
    /// - [`AllocError::StoreUnavailable`]: a claim failed or timed out.
    /// - [`AllocError::PartialWriteFailure`]: the token was claimed but its
    ///   metadata or expiry could not be written.
    /// - [`AllocError::Cancelled`]: the context was cancelled. A claim that
    ///   landed before or during the cancellation is reported in `claimed`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(hint = %hint)))]
    pub async fn allocate_in(&self, ctx: &RequestContext, hint: &str, url: &str) -> Result<Token> {
        self.config.validate().map_err(AllocError::InvalidConfig)?;
        if !validate_hint(hint, self.config.token_length) {
            return Err(AllocError::InvalidHint {
                hint: hint.to_owned(),
                token_length: self.config.token_length,
            });
        }

        let token = self.claim_free_token(ctx, hint, url).await?;
        self.finalize(ctx, token, url).await
    }

    async fn claim_free_token(&self, ctx: &RequestContext, hint: &str, url: &str) -> Result<Token> {
        let mut state = CandidateState::new(hint, self.config.token_length, self.config.raise_interval);

        while state.attempt() < self.config.max_retries {
            let candidate = state.candidate(&self.rng);
            match ctx.guard(try_claim(&self.store, &candidate, url)).await {
                Ok(ClaimStatus::Acquired) if ctx.is_cancelled() => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(token = %candidate, "cancelled after claiming token");
                    return Err(AllocError::Cancelled {
                        claimed: Some(candidate),
                    });
                }
                Ok(ClaimStatus::Acquired) => return Ok(candidate),
                Ok(ClaimStatus::Taken) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        token = %candidate,
                        retry = state.attempt(),
                        offset = state.offset(),
                        "collision while generating new token"
                    );
                    state.record_collision();
                }
                Err(Interrupted::Store(source)) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(error = %source, token = %candidate, "claim failed, aborting allocation");
                    return Err(AllocError::StoreUnavailable(source));
                }
                Err(Interrupted::Cancelled) => return Err(AllocError::Cancelled { claimed: None }),
            }
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(attempts = state.attempt(), "maximum number of retries reached");
        Err(AllocError::Exhausted {
            attempts: state.attempt(),
        })
    }

    async fn finalize(&self, ctx: &RequestContext, token: Token, _url: &str) -> Result<Token> {
        let now_secs = self.clock.current_millis() / 1000;
        let expires_at = now_secs.saturating_add(self.config.retention.as_secs());
        let fields = [
            (CREATION_TIME_FIELD, now_secs.to_string()),
            (COUNT_FIELD, "0".to_owned()),
        ];

        let written = async {
            ctx.guard(self.store.set_fields(token.as_str(), &fields))
                .await?;
            ctx.guard(self.store.expire_at(token.as_str(), expires_at))
                .await
        }
        .await;

        match written {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::info!(url = _url, token = %token, expires_at, "new short link created");
                Ok(token)
            }
            Err(Interrupted::Store(source)) => {
                #[cfg(feature = "tracing")]
                tracing::error!(error = %source, token = %token, "token claimed but finalizing it failed");
                Err(AllocError::PartialWriteFailure { token, source })
            }
            Err(Interrupted::Cancelled) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(token = %token, "cancelled after claiming token");
                Err(AllocError::Cancelled {
                    claimed: Some(token),
                })
            }
        }
    }
}
