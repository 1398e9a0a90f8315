//! The token lifecycle manager

use std::{error, fmt, io};

use authkeep_clock::{Clock, DurationSecs, System, UnixTime};
use thiserror::Error;

use crate::{
    providers::{Credentials, IdentityProvider},
    stores::SnapshotStore,
    IdToken, IdTokenRef, TokenSnapshot, TokenStatus,
};

/// How long a newly obtained ID token is trusted, unless configured otherwise
pub const DEFAULT_VALIDITY: DurationSecs = DurationSecs(3600);

/// The tier that produced a token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// The ID token held in memory was still valid
    Memory,
    /// The refresh token was exchanged for a new ID token
    Refresh,
    /// A full login with the user's credentials
    Login,
}

/// A token along with the tier that produced it
#[derive(Clone, Debug)]
pub struct Acquisition {
    /// The ID token
    pub token: IdToken,

    /// The tier that produced the token
    pub tier: Tier,
}

/// An error while acquiring a token
#[derive(Debug, Error)]
pub enum TokenError<E: error::Error + 'static> {
    /// Logging in failed, leaving no tier to fall back on
    #[error("unable to log in with identity provider")]
    Login(#[source] E),

    /// A token was acquired but could not be written to the cache
    ///
    /// The token is already held in memory and will be returned by the next request.
    #[error("acquired token could not be written to cache")]
    Persist {
        /// The underlying store error
        #[source]
        source: io::Error,

        /// The token that was acquired
        token: IdToken,
    },
}

impl<E: error::Error + 'static> TokenError<E> {
    /// The token acquired before a cache write failed, if any
    pub fn token(&self) -> Option<&IdTokenRef> {
        match self {
            Self::Login(_) => None,
            Self::Persist { token, .. } => Some(token),
        }
    }
}

enum Renewal<E> {
    Renewed(IdToken),
    NoRefreshToken,
    Failed(E),
}

/// Manages the ID token for a single user
///
/// Each request for a token tries, in order:
///
/// 1. the ID token held in memory, if it has not yet expired,
/// 2. exchanging the refresh token for a new ID token, if a refresh token is held,
/// 3. logging in with the user's credentials.
///
/// A failed refresh is logged and falls through to a login; only a failed login is
/// reported to the caller. Whenever a new token is obtained, the tokens are written to
/// the configured [`SnapshotStore`], so that a later manager over the same store can
/// start with a valid token.
pub struct TokenManager<P, C = System> {
    credentials: Credentials,
    provider: P,
    store: Option<Box<dyn SnapshotStore>>,
    state: TokenSnapshot,
    validity: DurationSecs,
    clock: C,
}

impl<P> TokenManager<P, System> {
    /// Constructs a manager that keeps tokens only in memory
    pub fn new(credentials: Credentials, provider: P) -> Self {
        Self {
            credentials,
            provider,
            store: None,
            state: TokenSnapshot::default(),
            validity: DEFAULT_VALIDITY,
            clock: System,
        }
    }

    /// Constructs a manager that caches tokens in `cache_dir`
    ///
    /// See [`with_store`](Self::with_store) for how an existing cache is loaded.
    #[cfg(feature = "file")]
    pub async fn with_cache_dir(
        credentials: Credentials,
        provider: P,
        cache_dir: impl Into<std::path::PathBuf>,
    ) -> Self {
        let store = crate::stores::FileSnapshotStore::new(cache_dir);
        Self::with_store(credentials, provider, store).await
    }

    /// Constructs a manager that caches tokens in `store`
    ///
    /// Any snapshot already in the store is loaded. If it cannot be loaded for any
    /// reason, the manager starts without tokens.
    pub async fn with_store(
        credentials: Credentials,
        provider: P,
        store: impl SnapshotStore + 'static,
    ) -> Self {
        let mut store: Box<dyn SnapshotStore> = Box::new(store);

        let loaded = store.load().await;
        let state = match loaded {
            Ok(snapshot) => {
                tracing::debug!(
                    store = ?store,
                    has_id_token = snapshot.id_token.is_some(),
                    has_refresh_token = snapshot.refresh_token.is_some(),
                    expiry = snapshot.expiry.0,
                    "loaded tokens from cache"
                );
                snapshot
            }
            Err(error) => {
                tracing::info!(
                    store = ?store,
                    error = (&error as &dyn error::Error),
                    "cached tokens are missing or invalid, starting without them"
                );
                TokenSnapshot::default()
            }
        };

        Self {
            credentials,
            provider,
            store: Some(store),
            state,
            validity: DEFAULT_VALIDITY,
            clock: System,
        }
    }
}

impl<P, C> TokenManager<P, C> {
    /// Sets a custom clock to be used
    ///
    /// Useful for testing purposes
    pub fn with_clock<D>(self, clock: D) -> TokenManager<P, D> {
        TokenManager {
            credentials: self.credentials,
            provider: self.provider,
            store: self.store,
            state: self.state,
            validity: self.validity,
            clock,
        }
    }

    /// Sets how long a newly obtained ID token is trusted
    pub fn with_validity(mut self, validity: DurationSecs) -> Self {
        self.validity = validity;
        self
    }

    /// The identity provider tokens are requested from
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The tokens currently held in memory
    pub fn snapshot(&self) -> &TokenSnapshot {
        &self.state
    }

    /// The time after which the held ID token must not be used
    pub fn expiry(&self) -> UnixTime {
        self.state.expiry
    }

    /// Removes the cached tokens and forgets the tokens held in memory
    ///
    /// Does nothing if the manager has no store. If the snapshot cannot be removed,
    /// including because there is none, the error is returned and the tokens held in
    /// memory are kept.
    pub async fn clear_cache(&mut self) -> io::Result<()> {
        let Some(store) = &mut self.store else {
            return Ok(());
        };

        store.clear().await?;
        self.state = TokenSnapshot::default();

        tracing::info!("cleared cached tokens");
        Ok(())
    }
}

impl<P, C: Clock> TokenManager<P, C> {
    /// The status of the held ID token according to the manager's clock
    pub fn status(&self) -> TokenStatus {
        self.state.status_at(self.clock.now())
    }
}

impl<P: IdentityProvider, C: Clock> TokenManager<P, C> {
    /// Gets a valid ID token, renewing it or logging in as needed
    pub async fn get_token(&mut self) -> Result<IdToken, TokenError<P::Error>> {
        self.acquire().await.map(|acquisition| acquisition.token)
    }

    /// Gets a valid ID token and reports which tier produced it
    pub async fn acquire(&mut self) -> Result<Acquisition, TokenError<P::Error>> {
        let now = self.clock.now();

        if let Some(token) = self.state.valid_token_at(now) {
            tracing::trace!(
                token = format_args!("{:#?}", token),
                expiry = self.state.expiry.0,
                "using id token from memory"
            );
            return Ok(Acquisition {
                token: token.to_owned(),
                tier: Tier::Memory,
            });
        }

        let renewal = self.renew().await;
        let (token, tier) = match renewal {
            Renewal::Renewed(token) => {
                self.state.id_token = Some(token.clone());
                self.state.expiry = now + self.validity;
                tracing::info!(
                    token = format_args!("{:#?}", token),
                    expiry = self.state.expiry.0,
                    "renewed id token"
                );
                (token, Tier::Refresh)
            }
            Renewal::NoRefreshToken => {
                tracing::debug!("no refresh token held, logging in");
                (self.login(now).await?, Tier::Login)
            }
            Renewal::Failed(error) => {
                tracing::warn!(
                    error = (&error as &dyn error::Error),
                    "unable to renew id token, logging in"
                );
                (self.login(now).await?, Tier::Login)
            }
        };

        if let Some(store) = &mut self.store {
            let persisted = store.persist(&self.state).await;
            if let Err(source) = persisted {
                tracing::warn!(
                    store = ?store,
                    error = (&source as &dyn error::Error),
                    "unable to write tokens to cache"
                );
                return Err(TokenError::Persist { source, token });
            }
            tracing::trace!(store = ?store, "wrote tokens to cache");
        }

        Ok(Acquisition { token, tier })
    }

    async fn renew(&self) -> Renewal<P::Error> {
        let Some(refresh_token) = &self.state.refresh_token else {
            return Renewal::NoRefreshToken;
        };

        match self.provider.renew_token(refresh_token).await {
            Ok(token) => Renewal::Renewed(token),
            Err(error) => Renewal::Failed(error),
        }
    }

    async fn login(&mut self, now: UnixTime) -> Result<IdToken, TokenError<P::Error>> {
        let tokens = self
            .provider
            .authenticate(&self.credentials)
            .await
            .map_err(TokenError::Login)?;

        self.state.id_token = Some(tokens.id_token.clone());
        self.state.refresh_token = Some(tokens.refresh_token);
        self.state.expiry = now + self.validity;

        tracing::info!(
            username = %self.credentials.username,
            token = format_args!("{:#?}", tokens.id_token),
            expiry = self.state.expiry.0,
            "logged in"
        );

        Ok(tokens.id_token)
    }
}

impl<P, C> fmt::Debug for TokenManager<P, C>
where
    P: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("credentials", &self.credentials)
            .field("provider", &self.provider)
            .field("store", &self.store)
            .field("state", &self.state)
            .field("validity", &self.validity)
            .field("clock", &self.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use authkeep_clock::TestClock;

    use super::*;
    use crate::{
        providers::LoginTokens, stores::InMemorySnapshotStore, RefreshToken, RefreshTokenRef,
    };

    const NOW: UnixTime = UnixTime(1_700_000_000);

    #[derive(Debug, Error)]
    #[error("identity provider rejected the request")]
    struct Rejected;

    #[derive(Debug, Default)]
    struct ScriptedProvider {
        logins: AtomicUsize,
        renewals: AtomicUsize,
        reject_login: bool,
        reject_renewal: bool,
    }

    impl ScriptedProvider {
        fn rejecting_renewals() -> Self {
            Self {
                reject_renewal: true,
                ..Self::default()
            }
        }

        fn rejecting_everything() -> Self {
            Self {
                reject_login: true,
                reject_renewal: true,
                ..Self::default()
            }
        }

        fn logins(&self) -> usize {
            self.logins.load(Ordering::Acquire)
        }

        fn renewals(&self) -> usize {
            self.renewals.load(Ordering::Acquire)
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedProvider {
        type Error = Rejected;

        async fn authenticate(&self, credentials: &Credentials) -> Result<LoginTokens, Rejected> {
            self.logins.fetch_add(1, Ordering::AcqRel);
            assert_eq!(credentials.username.as_str(), "alice");
            assert_eq!(credentials.password.as_str(), "hunter2");

            if self.reject_login {
                return Err(Rejected);
            }

            Ok(LoginTokens {
                id_token: IdToken::from_static("token-A"),
                refresh_token: RefreshToken::from_static("refresh-A"),
            })
        }

        async fn renew_token(&self, _: &RefreshTokenRef) -> Result<IdToken, Rejected> {
            self.renewals.fetch_add(1, Ordering::AcqRel);

            if self.reject_renewal {
                return Err(Rejected);
            }

            Ok(IdToken::from_static("token-renewed"))
        }
    }

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl SnapshotStore for BrokenStore {
        async fn load(&mut self) -> io::Result<TokenSnapshot> {
            Err(io::Error::new(io::ErrorKind::InvalidData, "garbled"))
        }

        async fn persist(&mut self, _: &TokenSnapshot) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        async fn clear(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("alice", "hunter2")
    }

    fn stale_snapshot() -> TokenSnapshot {
        TokenSnapshot {
            id_token: Some(IdToken::from_static("token-old")),
            refresh_token: Some(RefreshToken::from_static("refresh-old")),
            expiry: UnixTime(NOW.0 - 10),
        }
    }

    fn memory_manager(provider: ScriptedProvider) -> TokenManager<ScriptedProvider, TestClock> {
        TokenManager::new(credentials(), provider).with_clock(TestClock::new(NOW))
    }

    async fn stored_manager(
        provider: ScriptedProvider,
        snapshot: TokenSnapshot,
    ) -> TokenManager<ScriptedProvider, TestClock> {
        TokenManager::with_store(
            credentials(),
            provider,
            InMemorySnapshotStore::with_snapshot(snapshot),
        )
        .await
        .with_clock(TestClock::new(NOW))
    }

    mod when_no_tokens_are_held {
        use super::*;

        #[tokio::test]
        async fn logs_in_with_the_given_credentials() {
            let mut manager = memory_manager(ScriptedProvider::default());

            let acquisition = manager.acquire().await.unwrap();

            assert_eq!(acquisition.token.as_str(), "token-A");
            assert_eq!(acquisition.tier, Tier::Login);
            assert_eq!(manager.provider().logins(), 1);
            assert_eq!(manager.provider().renewals(), 0);

            let state = manager.snapshot();
            assert_eq!(state.id_token.as_deref().map(|t| t.as_str()), Some("token-A"));
            assert_eq!(
                state.refresh_token.as_deref().map(|t| t.as_str()),
                Some("refresh-A")
            );
            assert_eq!(manager.expiry(), NOW + DurationSecs(3600));
            assert_eq!(manager.status(), TokenStatus::Valid);
        }

        #[tokio::test]
        async fn later_requests_are_served_from_memory_until_expiry() {
            let mut manager = memory_manager(ScriptedProvider::default());

            manager.get_token().await.unwrap();
            manager.clock.inc(3599);
            let acquisition = manager.acquire().await.unwrap();

            assert_eq!(acquisition.tier, Tier::Memory);
            assert_eq!(acquisition.token.as_str(), "token-A");
            assert_eq!(manager.provider().logins(), 1);
            assert_eq!(manager.provider().renewals(), 0);
        }

        #[tokio::test]
        async fn login_failure_is_reported() {
            let mut manager = memory_manager(ScriptedProvider::rejecting_everything());

            let error = manager.get_token().await.unwrap_err();

            assert!(matches!(error, TokenError::Login(Rejected)));
            assert!(error.token().is_none());
            assert_eq!(manager.status(), TokenStatus::Empty);
        }

        #[tokio::test]
        async fn custom_validity_sets_expiry() {
            let mut manager = memory_manager(ScriptedProvider::default())
                .with_validity(DurationSecs(60));

            manager.get_token().await.unwrap();

            assert_eq!(manager.expiry(), NOW + DurationSecs(60));
        }
    }

    mod when_the_id_token_has_expired {
        use super::*;

        #[tokio::test]
        async fn token_expiring_exactly_now_is_renewed() {
            let mut manager = memory_manager(ScriptedProvider::default());
            manager.get_token().await.unwrap();
            manager.clock.inc(3600);

            let acquisition = manager.acquire().await.unwrap();

            assert_eq!(acquisition.tier, Tier::Refresh);
            assert_eq!(acquisition.token.as_str(), "token-renewed");
            assert_eq!(manager.expiry(), NOW + DurationSecs(7200));
            assert_eq!(manager.provider().logins(), 1);
            assert_eq!(manager.provider().renewals(), 1);
        }

        #[tokio::test]
        async fn refresh_token_is_used_instead_of_logging_in() {
            let mut manager = stored_manager(ScriptedProvider::default(), stale_snapshot()).await;
            assert_eq!(manager.status(), TokenStatus::Stale);

            let token = manager.get_token().await.unwrap();

            assert_eq!(token.as_str(), "token-renewed");
            assert_eq!(manager.provider().renewals(), 1);
            assert_eq!(manager.provider().logins(), 0);
            assert_eq!(manager.expiry(), NOW + DurationSecs(3600));
            assert_eq!(
                manager.snapshot().refresh_token.as_deref().map(|t| t.as_str()),
                Some("refresh-old")
            );
        }

        #[tokio::test]
        async fn failed_refresh_falls_through_to_login() {
            let mut manager =
                stored_manager(ScriptedProvider::rejecting_renewals(), stale_snapshot()).await;

            let acquisition = manager.acquire().await.unwrap();

            assert_eq!(acquisition.tier, Tier::Login);
            assert_eq!(acquisition.token.as_str(), "token-A");
            assert_eq!(manager.provider().renewals(), 1);
            assert_eq!(manager.provider().logins(), 1);
            assert_eq!(
                manager.snapshot().refresh_token.as_deref().map(|t| t.as_str()),
                Some("refresh-A")
            );
        }

        #[tokio::test]
        async fn failed_refresh_and_login_reports_the_login_error() {
            let mut manager =
                stored_manager(ScriptedProvider::rejecting_everything(), stale_snapshot()).await;

            let error = manager.get_token().await.unwrap_err();

            assert!(matches!(error, TokenError::Login(Rejected)));
            assert_eq!(manager.provider().renewals(), 1);
            assert_eq!(manager.provider().logins(), 1);
        }

        #[tokio::test]
        async fn empty_refresh_token_is_still_tried() {
            let snapshot = TokenSnapshot {
                refresh_token: Some(RefreshToken::from_static("")),
                ..stale_snapshot()
            };
            let mut manager =
                stored_manager(ScriptedProvider::rejecting_renewals(), snapshot).await;

            manager.get_token().await.unwrap();

            assert_eq!(manager.provider().renewals(), 1);
            assert_eq!(manager.provider().logins(), 1);
        }

        #[tokio::test]
        async fn missing_refresh_token_goes_straight_to_login() {
            let snapshot = TokenSnapshot {
                refresh_token: None,
                ..stale_snapshot()
            };
            let mut manager = stored_manager(ScriptedProvider::default(), snapshot).await;

            let acquisition = manager.acquire().await.unwrap();

            assert_eq!(acquisition.tier, Tier::Login);
            assert_eq!(manager.provider().renewals(), 0);
        }
    }

    mod when_a_store_is_configured {
        use super::*;

        #[tokio::test]
        async fn valid_cached_token_needs_no_network() {
            let snapshot = TokenSnapshot {
                expiry: NOW + DurationSecs(10),
                ..stale_snapshot()
            };
            let mut manager = stored_manager(ScriptedProvider::default(), snapshot).await;

            let acquisition = manager.acquire().await.unwrap();

            assert_eq!(acquisition.tier, Tier::Memory);
            assert_eq!(acquisition.token.as_str(), "token-old");
            assert_eq!(manager.provider().logins(), 0);
            assert_eq!(manager.provider().renewals(), 0);
        }

        #[tokio::test]
        async fn unreadable_cache_starts_empty() {
            let manager = TokenManager::with_store(
                credentials(),
                ScriptedProvider::default(),
                BrokenStore,
            )
            .await
            .with_clock(TestClock::new(NOW));

            assert_eq!(manager.status(), TokenStatus::Empty);
            assert_eq!(manager.expiry(), UnixTime(0));
        }

        #[tokio::test]
        async fn persist_failure_is_reported_but_token_is_kept() {
            let mut manager = TokenManager::with_store(
                credentials(),
                ScriptedProvider::default(),
                BrokenStore,
            )
            .await
            .with_clock(TestClock::new(NOW));

            let error = manager.get_token().await.unwrap_err();

            match &error {
                TokenError::Persist { source, token } => {
                    assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
                    assert_eq!(token.as_str(), "token-A");
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(error.token().map(|t| t.as_str()), Some("token-A"));

            let acquisition = manager.acquire().await.unwrap();
            assert_eq!(acquisition.tier, Tier::Memory);
            assert_eq!(manager.provider().logins(), 1);
        }

        #[tokio::test]
        async fn memory_hits_do_not_write_to_the_store() {
            let mut manager = TokenManager::with_store(
                credentials(),
                ScriptedProvider::default(),
                BrokenStore,
            )
            .await
            .with_clock(TestClock::new(NOW));

            let first = manager.acquire().await;
            assert!(matches!(first, Err(TokenError::Persist { .. })));

            let second = manager.acquire().await.unwrap();
            assert_eq!(second.tier, Tier::Memory);
            assert_eq!(second.token.as_str(), "token-A");
            assert_eq!(manager.provider().logins(), 1);
        }

        #[tokio::test]
        async fn clear_cache_forces_a_login() {
            let snapshot = TokenSnapshot {
                expiry: NOW + DurationSecs(10),
                ..stale_snapshot()
            };
            let mut manager = stored_manager(ScriptedProvider::default(), snapshot).await;

            manager.clear_cache().await.unwrap();
            assert_eq!(manager.status(), TokenStatus::Empty);
            assert_eq!(manager.snapshot(), &TokenSnapshot::default());

            let acquisition = manager.acquire().await.unwrap();
            assert_eq!(acquisition.tier, Tier::Login);
            assert_eq!(manager.provider().renewals(), 0);
        }

        #[tokio::test]
        async fn clearing_an_absent_cache_is_an_error() {
            let mut manager = TokenManager::with_store(
                credentials(),
                ScriptedProvider::default(),
                InMemorySnapshotStore::new(),
            )
            .await;

            let error = manager.clear_cache().await.unwrap_err();

            assert_eq!(error.kind(), io::ErrorKind::NotFound);
        }

        #[tokio::test]
        async fn failed_clear_keeps_tokens_in_memory() {
            let mut manager = TokenManager::with_store(
                credentials(),
                ScriptedProvider::default(),
                BrokenStore,
            )
            .await
            .with_clock(TestClock::new(NOW));
            let _ = manager.get_token().await;

            assert!(manager.clear_cache().await.is_err());
            assert_eq!(manager.status(), TokenStatus::Valid);
        }
    }

    mod when_no_store_is_configured {
        use super::*;

        #[tokio::test]
        async fn clear_cache_is_a_no_op() {
            let mut manager = memory_manager(ScriptedProvider::default());
            manager.get_token().await.unwrap();

            manager.clear_cache().await.unwrap();

            assert_eq!(manager.status(), TokenStatus::Valid);
        }
    }

    #[cfg(feature = "file")]
    mod with_a_cache_directory {
        use super::*;

        #[tokio::test]
        async fn new_manager_reuses_cached_tokens() {
            let cache = tempfile::tempdir().unwrap();
            let dir = cache.path().join("cache");

            let mut first =
                TokenManager::with_cache_dir(credentials(), ScriptedProvider::default(), &dir)
                    .await
                    .with_clock(TestClock::new(NOW));
            first.get_token().await.unwrap();
            assert_eq!(first.provider().logins(), 1);

            let mut second =
                TokenManager::with_cache_dir(credentials(), ScriptedProvider::default(), &dir)
                    .await
                    .with_clock(TestClock::new(NOW + DurationSecs(60)));
            let acquisition = second.acquire().await.unwrap();

            assert_eq!(acquisition.tier, Tier::Memory);
            assert_eq!(acquisition.token.as_str(), "token-A");
            assert_eq!(second.provider().logins(), 0);
            assert_eq!(second.provider().renewals(), 0);
        }

        #[tokio::test]
        async fn renewed_token_is_written_to_the_cache() {
            let cache = tempfile::tempdir().unwrap();
            let mut seed = crate::stores::FileSnapshotStore::new(cache.path());
            seed.persist(&stale_snapshot()).await.unwrap();

            let mut first =
                TokenManager::with_cache_dir(credentials(), ScriptedProvider::default(), cache.path())
                    .await
                    .with_clock(TestClock::new(NOW));
            let acquisition = first.acquire().await.unwrap();
            assert_eq!(acquisition.tier, Tier::Refresh);

            let raw = std::fs::read_to_string(seed.path()).unwrap();
            let written: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(
                written,
                serde_json::json!({
                    "id_token": "token-renewed",
                    "refresh_token": "refresh-old",
                    "expiry": (NOW + DurationSecs(3600)).0,
                })
            );

            let mut second =
                TokenManager::with_cache_dir(credentials(), ScriptedProvider::default(), cache.path())
                    .await
                    .with_clock(TestClock::new(NOW + DurationSecs(60)));
            let acquisition = second.acquire().await.unwrap();

            assert_eq!(acquisition.tier, Tier::Memory);
            assert_eq!(acquisition.token.as_str(), "token-renewed");
            assert_eq!(second.provider().logins(), 0);
            assert_eq!(second.provider().renewals(), 0);
        }

        #[tokio::test]
        async fn corrupt_cache_file_is_ignored() {
            let cache = tempfile::tempdir().unwrap();
            std::fs::write(
                cache.path().join(crate::stores::file::TOKEN_FILE),
                br#"{"id_token": 17, "expiry": "later"}"#,
            )
            .unwrap();

            let mut manager =
                TokenManager::with_cache_dir(credentials(), ScriptedProvider::default(), cache.path())
                    .await
                    .with_clock(TestClock::new(NOW));
            assert_eq!(manager.status(), TokenStatus::Empty);

            let acquisition = manager.acquire().await.unwrap();
            assert_eq!(acquisition.tier, Tier::Login);
        }

        #[tokio::test]
        async fn cleared_cache_is_not_reused() {
            let cache = tempfile::tempdir().unwrap();

            let mut first =
                TokenManager::with_cache_dir(credentials(), ScriptedProvider::default(), cache.path())
                    .await
                    .with_clock(TestClock::new(NOW));
            first.get_token().await.unwrap();
            first.clear_cache().await.unwrap();

            let second =
                TokenManager::with_cache_dir(credentials(), ScriptedProvider::default(), cache.path())
                    .await
                    .with_clock(TestClock::new(NOW));

            assert_eq!(second.status(), TokenStatus::Empty);
        }
    }
}
