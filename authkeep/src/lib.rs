//! Cached identity-provider tokens for a single user
//!
//! Logging in to an identity provider is slow and, for short-lived processes such as
//! command line tools or add-ons, it tends to be repeated on every run. This library keeps
//! the tokens issued at login around, both in memory and in a cache on disk, so that later
//! requests, and later runs of the process, can skip the round-trip entirely.
//!
//! # Acquisition
//!
//! A [`TokenManager`] hands out ID tokens. Each request tries the following, in order:
//!
//! 1. **Memory**: the ID token held in memory, if its expiry is still in the future.
//! 2. **Refresh**: exchanging the held refresh token for a new ID token. A failure here is
//!    logged and otherwise ignored.
//! 3. **Login**: authenticating with the user's credentials. A failure here is returned to
//!    the caller, as there is nothing left to fall back on.
//!
//! A newly obtained ID token is trusted for one hour. The provider's own notion of the
//! token's lifetime is not consulted.
//!
//! Whenever the refresh or login tier produces a token, the full set of tokens is written to
//! the manager's [`SnapshotStore`][stores::SnapshotStore], if one is configured. A manager
//! constructed later over the same store starts from those tokens. A cache that is missing
//! or cannot be read is never an error: the manager simply starts without tokens.
//!
//! ```
//! use authkeep::{providers::StaticProvider, Credentials, TokenManager, TokenStatus};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("alice", "hunter2");
//! let provider = StaticProvider::new("id-token", "refresh-token");
//!
//! let mut manager = TokenManager::new(credentials, provider);
//! assert_eq!(manager.status(), TokenStatus::Empty);
//!
//! let token = manager.get_token().await?;
//! assert_eq!(token.as_str(), "id-token");
//! assert_eq!(manager.status(), TokenStatus::Valid);
//! # Ok(())
//! # }
//! ```
//!
//! Identity providers implement [`IdentityProvider`][providers::IdentityProvider]. The
//! manager takes `&mut self` for every request, so a manager shared between tasks must be
//! wrapped in a lock, which also keeps those tasks from racing each other to the provider.
//!
//! # Features
//!
//! The following features are supported by this crate, all of which are enabled by default:
//!
//! * `file`: Provides a [`FileSnapshotStore`][stores::FileSnapshotStore] which caches tokens in
//!   `auth-tokens.json` within a directory.
//! * `oauth2`: Provides an identity provider using the OAuth2 _password_ and _refresh token_
//!   grants against a token endpoint.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod braids;
mod manager;
pub mod providers;
mod snapshot;
pub mod stores;

pub use authkeep_clock as clock;
pub use braids::*;
pub use manager::{Acquisition, Tier, TokenError, TokenManager, DEFAULT_VALIDITY};
pub use providers::{Credentials, IdentityProvider, LoginTokens};
pub use snapshot::{TokenSnapshot, TokenStatus};
