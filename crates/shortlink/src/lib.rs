//! Short token allocation over a shared key-value store.
//!
//! An [`Allocator`] turns an optional user hint into a token that no other
//! record in the store holds. Uniqueness rests on a single primitive, the
//! store's atomic create-if-absent ([`RecordStore::create_field_if_absent`]),
//! so any number of allocators in any number of processes can share one
//! store without coordinating.
//!
//! - [`CandidateState`] produces candidates: a prefix of the hint followed by
//!   random characters from [`ALPHABET`]. Every few collisions one more
//!   trailing character is randomized.
//! - [`try_claim`] reserves one candidate.
//! - [`Allocator`] drives the bounded retry loop and writes the record's
//!   metadata and expiry once a candidate is claimed.
//! - [`Resolver`] reads records back and counts accesses.
//! - [`MemoryStore`] is an in-process [`RecordStore`] for tests and
//!   single-node deployments.
//!
//! ## Example
//! ```
//! use shortlink::{Allocator, AllocatorConfig, MemoryStore, Resolver};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let store = MemoryStore::new();
//! let allocator = Allocator::new(store.clone(), AllocatorConfig::default());
//! let resolver = Resolver::new(store);
//!
//! let token = allocator.allocate("docs", "https://docs.rs").await.unwrap();
//! assert!(token.as_str().starts_with("docs"));
//!
//! let hit = resolver.resolve(&token).await.unwrap().unwrap();
//! assert_eq!(hit.url, "https://docs.rs");
//! assert_eq!(hit.count, Some(1));
//! # });
//! ```
//!
//! ## Features
//! - `tracing`: emit spans and events through the `tracing` crate.
//! - `serde`: derive `Serialize`/`Deserialize` for [`Token`] and
//!   [`ShortLink`].

mod allocator;
mod claim;
mod error;
mod generator;
mod rand;
mod record;
mod resolver;
mod store;
mod time;
mod token;

pub use crate::allocator::*;
pub use crate::claim::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::rand::*;
pub use crate::record::*;
pub use crate::resolver::*;
pub use crate::store::*;
pub use crate::time::*;
pub use crate::token::*;
