//! An identity provider that uses an OAuth2 server as an authority

use std::marker::PhantomData;

use async_trait::async_trait;
use thiserror::Error;

use super::{Credentials, IdentityProvider, LoginTokens};
use crate::{ClientId, ClientSecret, IdToken, RefreshTokenRef};

pub mod dto;

/// An identity provider using the OAuth2 _password_ and _refresh token_ grants
///
/// Logins post the user's credentials to the token endpoint; renewals post the refresh
/// token. The ID token from the response is used when present, otherwise the access token.
#[derive(Debug)]
pub struct PasswordGrantProvider<T = JsonBody> {
    client: reqwest::Client,
    token_url: reqwest::Url,
    client_auth: dto::ClientAuthentication,
    scope: Option<String>,
    content_type: PhantomData<fn() -> T>,
}

impl PasswordGrantProvider<JsonBody> {
    /// Constructs a new password grant provider
    pub fn new(client: reqwest::Client, token_url: reqwest::Url, client_id: ClientId) -> Self {
        Self {
            client,
            token_url,
            client_auth: dto::ClientAuthentication {
                client_id,
                client_secret: None,
            },
            scope: None,
            content_type: PhantomData,
        }
    }

    /// Configures the provider to send requests to
    /// the authority as form data
    pub fn using_form_data(self) -> PasswordGrantProvider<FormBody> {
        PasswordGrantProvider {
            client: self.client,
            token_url: self.token_url,
            client_auth: self.client_auth,
            scope: self.scope,
            content_type: PhantomData,
        }
    }
}

impl<T> PasswordGrantProvider<T> {
    /// Identifies the client to the authority with a client secret
    pub fn with_client_secret(mut self, client_secret: ClientSecret) -> Self {
        self.client_auth.client_secret = Some(client_secret);
        self
    }

    /// Requests the given space-separated scopes
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[async_trait]
impl<T: RequestType> IdentityProvider for PasswordGrantProvider<T> {
    type Error = TokenRequestError;

    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginTokens, Self::Error> {
        let grant = dto::PasswordGrant {
            client_auth: &self.client_auth,
            credentials,
            scope: self.scope.as_deref(),
        };

        let resp = request_token::<_, T>(&self.client, self.token_url.clone(), &grant).await?;
        let (id_token, refresh_token) = resp.into_tokens();

        Ok(LoginTokens {
            id_token,
            refresh_token: refresh_token.ok_or(TokenRequestError::MissingRefreshToken)?,
        })
    }

    async fn renew_token(&self, refresh_token: &RefreshTokenRef) -> Result<IdToken, Self::Error> {
        let grant = dto::RefreshGrant {
            client_auth: &self.client_auth,
            refresh_token,
            scope: self.scope.as_deref(),
        };

        let resp = request_token::<_, T>(&self.client, self.token_url.clone(), &grant).await?;
        let (id_token, rotated) = resp.into_tokens();

        if rotated.is_some() {
            tracing::debug!("authority rotated the refresh token, keeping the original");
        }

        Ok(id_token)
    }
}

/// An error while attempting to request a new token from the authority
#[derive(Debug, Error)]
pub enum TokenRequestError {
    /// An error from the authority with an error body
    #[error("error requesting token from authority: {body}")]
    ErrorWithBody {
        /// The underlying request error
        source: reqwest::Error,
        /// The body of the error
        body: String,
    },
    /// Unable to deserialize the token body
    #[error("error deserializing token body from authority")]
    TokenBodyError(#[from] serde_json::Error),
    /// Unable to read the response
    #[error("error reading response body")]
    BodyReadError(reqwest::Error),
    /// Unable to send a token request to the authority
    #[error("error sending request to authority")]
    RequestSend(reqwest::Error),
    /// The authority did not issue a refresh token on login
    #[error("authority did not issue a refresh token")]
    MissingRefreshToken,
}

#[tracing::instrument(
    err,
    skip(client, token_url, grant),
    fields(
        token_url = %token_url,
        grant.grant_type = G::grant_type(),
        grant.client_id = %grant.client_id(),
    ),
)]
async fn request_token<G: dto::Grant, T: RequestType>(
    client: &reqwest::Client,
    token_url: reqwest::Url,
    grant: &G,
) -> Result<dto::TokenResponse, TokenRequestError> {
    tracing::trace!("requesting token from authority");

    let req = T::attach_payload(client.post(token_url), grant);
    let resp = req.send().await.map_err(TokenRequestError::RequestSend)?;

    tracing::debug!(
        response.status = resp.status().as_u16(),
        "received token response from issuing authority"
    );

    if let Err(error) = resp.error_for_status_ref() {
        let body = resp
            .text()
            .await
            .map_err(TokenRequestError::BodyReadError)?;
        return Err(TokenRequestError::ErrorWithBody {
            source: error,
            body,
        });
    }

    let body = resp
        .bytes()
        .await
        .map_err(TokenRequestError::BodyReadError)?;
    let resp: dto::TokenResponse = serde_json::from_slice(&body)?;

    tracing::info!(
        has_id_token = resp.id_token.is_some(),
        has_refresh_token = resp.refresh_token.is_some(),
        expires_in = resp.expires_in.map(|e| e.0),
        "received new tokens"
    );

    Ok(resp)
}

/// A manner of attaching a serializable payload to a request
pub trait RequestType {
    /// Attaches the serializable payload to the request body
    fn attach_payload<S: serde::Serialize>(
        request: reqwest::RequestBuilder,
        payload: &S,
    ) -> reqwest::RequestBuilder;
}

/// Attaches the grant to the request body as JSON
#[derive(Debug)]
pub struct JsonBody;

/// Attaches the grant to the request body as URL-encoded form data
#[derive(Debug)]
pub struct FormBody;

impl RequestType for JsonBody {
    fn attach_payload<S: serde::Serialize>(
        request: reqwest::RequestBuilder,
        payload: &S,
    ) -> reqwest::RequestBuilder {
        request.json(payload)
    }
}

impl RequestType for FormBody {
    fn attach_payload<S: serde::Serialize>(
        request: reqwest::RequestBuilder,
        payload: &S,
    ) -> reqwest::RequestBuilder {
        request.form(payload)
    }
}
