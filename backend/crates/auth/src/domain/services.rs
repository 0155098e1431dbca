//! Domain Service Interfaces
//!
//! External collaborators the use cases depend on.

use crate::domain::value_object::google_identity::GoogleIdentity;
use crate::error::AuthResult;

/// Validates a third-party identity token.
#[trait_variant::make(OAuthVerifier: Send)]
pub trait LocalOAuthVerifier {
    /// Fails with `InvalidOAuthToken` when the provider rejects the token or the
    /// audience does not match; `ServiceUnavailable` when the provider is unreachable.
    async fn verify(&self, id_token: &str, expected_audience: &str) -> AuthResult<GoogleIdentity>;
}
