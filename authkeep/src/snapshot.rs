use authkeep_clock::UnixTime;
use serde::{Deserialize, Serialize};

use crate::{IdToken, IdTokenRef, RefreshToken};

/// The tokens held for a user, as kept in memory and persisted to a cache
///
/// Missing fields deserialize as absent tokens and an expiry of `0`, which is never valid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// The current ID token, if any
    #[serde(default)]
    pub id_token: Option<IdToken>,

    /// The refresh token used to renew the ID token, if any
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,

    /// The time after which `id_token` must not be used
    #[serde(default)]
    pub expiry: UnixTime,
}

/// A token's lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
    /// No ID token is held
    Empty,
    /// The ID token can be used as-is
    Valid,
    /// The ID token has expired and must be renewed or replaced
    Stale,
}

impl TokenSnapshot {
    /// Gets the ID token if it is still valid at `time`
    ///
    /// A token expiring exactly at `time` is no longer valid.
    #[inline]
    pub fn valid_token_at(&self, time: UnixTime) -> Option<&IdTokenRef> {
        self.id_token.as_deref().filter(|_| self.expiry > time)
    }

    /// Gets the status of the held ID token as of `time`
    pub fn status_at(&self, time: UnixTime) -> TokenStatus {
        if self.id_token.is_none() {
            TokenStatus::Empty
        } else if self.expiry > time {
            TokenStatus::Valid
        } else {
            TokenStatus::Stale
        }
    }
}
