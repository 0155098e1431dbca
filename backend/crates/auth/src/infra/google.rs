//! Google ID token verification through the tokeninfo endpoint

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::services::OAuthVerifier;
use crate::domain::value_object::google_identity::GoogleIdentity;
use crate::error::{AuthError, AuthResult};

const USER_AGENT: &str = "auth-service/1.0";
pub const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const ACCEPTED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: Option<String>,
    iss: Option<String>,
    sub: Option<String>,
    email: Option<String>,
    /// tokeninfo returns `"true"` as a string; tolerate a real bool too
    email_verified: Option<Value>,
    name: Option<String>,
    picture: Option<String>,
}

impl TokenInfo {
    fn email_verified(&self) -> bool {
        match &self.email_verified {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    fn into_identity(self, expected_audience: &str) -> AuthResult<GoogleIdentity> {
        if self.aud.as_deref() != Some(expected_audience) {
            return Err(AuthError::InvalidOAuthToken("audience mismatch".into()));
        }
        if !self
            .iss
            .as_deref()
            .is_some_and(|iss| ACCEPTED_ISSUERS.contains(&iss))
        {
            return Err(AuthError::InvalidOAuthToken("unexpected issuer".into()));
        }
        if !self.email_verified() {
            return Err(AuthError::InvalidOAuthToken("email not verified".into()));
        }

        let (Some(email), Some(sub)) = (self.email.as_deref(), self.sub.as_deref()) else {
            return Err(AuthError::InvalidOAuthToken("missing email or subject".into()));
        };

        GoogleIdentity::new(email, self.name.as_deref(), sub, self.picture.as_deref())
            .map_err(|e| AuthError::InvalidOAuthToken(e.message().to_string()))
    }
}

/// Asks Google to validate the ID token, then checks audience, issuer and
/// verified email locally.
#[derive(Clone)]
pub struct GoogleOAuthVerifier {
    client: Client,
    endpoint: String,
}

impl GoogleOAuthVerifier {
    pub fn new(timeout: Duration) -> AuthResult<Self> {
        Self::with_endpoint(TOKENINFO_URL, timeout)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> AuthResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl OAuthVerifier for GoogleOAuthVerifier {
    async fn verify(&self, id_token: &str, expected_audience: &str) -> AuthResult<GoogleIdentity> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(format!("google tokeninfo: {e}")))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AuthError::ServiceUnavailable(format!(
                "google tokeninfo returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(AuthError::InvalidOAuthToken(format!(
                "google tokeninfo returned {status}"
            )));
        }

        let info = response
            .json::<TokenInfo>()
            .await
            .map_err(|e| AuthError::InvalidOAuthToken(format!("unreadable tokeninfo: {e}")))?;

        info.into_identity(expected_audience)
    }
}
