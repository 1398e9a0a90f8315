//! Identity providers

use std::{convert::Infallible, error};

use async_trait::async_trait;

use crate::{IdToken, Password, RefreshToken, RefreshTokenRef, Username};

#[cfg(feature = "oauth2")]
pub mod oauth2;

/// The credentials a user logs in with
#[derive(Clone, Debug)]
pub struct Credentials {
    /// The user name
    pub username: Username,

    /// The user's password
    pub password: Password,
}

impl Credentials {
    /// Constructs a new set of credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Username::from(username.into()),
            password: Password::from(password.into()),
        }
    }
}

/// The tokens issued on a successful login
#[derive(Clone, Debug)]
pub struct LoginTokens {
    /// The bearer ID token
    pub id_token: IdToken,

    /// The refresh token that can later be exchanged for a new ID token
    pub refresh_token: RefreshToken,
}

/// A remote authority that can log a user in and renew their ID tokens
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The error type returned when the provider refuses or fails a request
    type Error: error::Error + Send + Sync + 'static;

    /// Logs in with a username and password
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginTokens, Self::Error>;

    /// Exchanges a refresh token for a new ID token
    async fn renew_token(&self, refresh_token: &RefreshTokenRef) -> Result<IdToken, Self::Error>;
}

/// An identity provider that always hands out the same tokens
#[derive(Clone, Debug)]
pub struct StaticProvider {
    tokens: LoginTokens,
}

impl StaticProvider {
    /// Constructs a provider that issues `id_token` and `refresh_token` for any request
    pub fn new(id_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            tokens: LoginTokens {
                id_token: IdToken::from(id_token.into()),
                refresh_token: RefreshToken::from(refresh_token.into()),
            },
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    type Error = Infallible;

    async fn authenticate(&self, _: &Credentials) -> Result<LoginTokens, Self::Error> {
        Ok(self.tokens.clone())
    }

    async fn renew_token(&self, _: &RefreshTokenRef) -> Result<IdToken, Self::Error> {
        Ok(self.tokens.id_token.clone())
    }
}
