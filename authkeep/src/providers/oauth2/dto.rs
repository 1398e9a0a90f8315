//! DTOs for interacting with OAuth2 token endpoints

use authkeep_clock::DurationSecs;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    providers::Credentials, AccessToken, ClientId, ClientIdRef, ClientSecret, IdToken,
    RefreshToken, RefreshTokenRef,
};

/// How the client identifies itself to the authority
#[derive(Debug)]
pub struct ClientAuthentication {
    /// The client ID
    pub client_id: ClientId,

    /// The client secret, if required
    pub client_secret: Option<ClientSecret>,
}

/// A grant that can be posted to a token endpoint
pub trait Grant: Serialize + Sync {
    /// The `grant_type` sent with the request
    fn grant_type() -> &'static str;
    /// The client ID of the client making the request
    fn client_id(&self) -> &ClientIdRef;
}

/// A resource owner password grant
#[derive(Debug)]
pub struct PasswordGrant<'a> {
    /// The client making the request
    pub client_auth: &'a ClientAuthentication,

    /// The user's credentials
    pub credentials: &'a Credentials,

    /// The requested scopes
    pub scope: Option<&'a str>,
}

impl Serialize for PasswordGrant<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut ser = serializer.serialize_struct("PasswordGrant", 6)?;
        ser.serialize_field("grant_type", Self::grant_type())?;
        ser.serialize_field("client_id", &self.client_auth.client_id)?;
        if let Some(secret) = &self.client_auth.client_secret {
            ser.serialize_field("client_secret", secret)?;
        } else {
            ser.skip_field("client_secret")?;
        }
        ser.serialize_field("username", &self.credentials.username)?;
        ser.serialize_field("password", &self.credentials.password)?;
        if let Some(scope) = self.scope {
            ser.serialize_field("scope", scope)?;
        } else {
            ser.skip_field("scope")?;
        }
        ser.end()
    }
}

impl Grant for PasswordGrant<'_> {
    fn grant_type() -> &'static str {
        "password"
    }
    fn client_id(&self) -> &ClientIdRef {
        &self.client_auth.client_id
    }
}

/// A refresh token grant
#[derive(Debug)]
pub struct RefreshGrant<'a> {
    /// The client making the request
    pub client_auth: &'a ClientAuthentication,

    /// The refresh token to exchange
    pub refresh_token: &'a RefreshTokenRef,

    /// The requested scopes
    pub scope: Option<&'a str>,
}

impl Serialize for RefreshGrant<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut ser = serializer.serialize_struct("RefreshGrant", 5)?;
        ser.serialize_field("grant_type", Self::grant_type())?;
        ser.serialize_field("client_id", &self.client_auth.client_id)?;
        if let Some(secret) = &self.client_auth.client_secret {
            ser.serialize_field("client_secret", secret)?;
        } else {
            ser.skip_field("client_secret")?;
        }
        ser.serialize_field("refresh_token", self.refresh_token)?;
        if let Some(scope) = self.scope {
            ser.serialize_field("scope", scope)?;
        } else {
            ser.skip_field("scope")?;
        }
        ser.end()
    }
}

impl Grant for RefreshGrant<'_> {
    fn grant_type() -> &'static str {
        "refresh_token"
    }
    fn client_id(&self) -> &ClientIdRef {
        &self.client_auth.client_id
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: AccessToken,
    #[serde(default)]
    pub id_token: Option<IdToken>,
    #[serde(default)]
    pub refresh_token: Option<RefreshToken>,
    #[serde(default)]
    pub expires_in: Option<DurationSecs>,
}

impl TokenResponse {
    /// Splits the response into the bearer token to hand out and any refresh token
    pub(super) fn into_tokens(self) -> (IdToken, Option<RefreshToken>) {
        let bearer = self
            .id_token
            .unwrap_or_else(|| IdToken::from(String::from(self.access_token.as_str())));
        (bearer, self.refresh_token)
    }
}
