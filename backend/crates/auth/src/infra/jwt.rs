//! HS256 session tokens

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::dangerous::insecure_decode;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::entity::session::{
    IntrospectedToken, IssuedToken, SessionClaims, SessionIdentity,
};
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// HS256 keys shorter than the digest size are brute-forceable.
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    sub: String,
    email_id: String,
    role: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct ExpClaim {
    exp: Option<i64>,
}

/// Signs, verifies and introspects session tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> AuthResult<Self> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Internal(format!(
                "token signing secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn sign(&self, identity: &SessionIdentity, ttl: Duration) -> AuthResult<IssuedToken> {
        self.sign_at(identity, Utc::now(), ttl)
    }

    pub(crate) fn sign_at(
        &self,
        identity: &SessionIdentity,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> AuthResult<IssuedToken> {
        let ttl = chrono::Duration::from_std(ttl)
            .ok()
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| AuthError::Internal("token TTL must be positive".to_string()))?;
        let expires_at = issued_at + ttl;

        let claims = Claims {
            sub: identity.user_id.to_string(),
            email_id: identity.email.as_str().to_string(),
            role: identity.user_role.code().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry and parse the claims.
    ///
    /// A token is valid only while `now < exp`, the same boundary the revocation
    /// store uses. The library check alone still accepts the `exp` second itself.
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;
        let claims = data.claims;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::ExpiredToken);
        }

        let user_id = UserId::parse(&claims.sub).ok_or(AuthError::InvalidToken)?;
        let user_role = UserRole::from_code(&claims.role).ok_or(AuthError::InvalidToken)?;
        let email = Email::new(claims.email_id).map_err(|_| AuthError::InvalidToken)?;
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(AuthError::InvalidToken)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;

        Ok(SessionClaims {
            identity: SessionIdentity {
                user_id,
                email,
                user_role,
            },
            issued_at,
            expires_at,
        })
    }

    /// Read `exp` without checking the signature.
    ///
    /// Only logout uses this, and only to size the deny-list entry.
    pub fn introspect(&self, token: &str) -> AuthResult<IntrospectedToken> {
        let data = insecure_decode::<ExpClaim>(token).map_err(|_| AuthError::InvalidToken)?;
        let exp = data.claims.exp.ok_or(AuthError::InvalidToken)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::InvalidToken)?;
        Ok(IntrospectedToken::new(expires_at))
    }
}
