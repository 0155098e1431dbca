//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub cookie_name: String,
    /// HS256 signing secret (at least 32 bytes)
    pub token_secret: Vec<u8>,
    /// Lifetime of every issued token, also the cookie Max-Age
    pub token_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Expected `aud` of Google ID tokens
    pub oauth_client_id: String,
    /// Upper bound for each store round trip and the OAuth call
    pub dependency_timeout: Duration,
    /// Upper bound for one Argon2 hash or verify
    pub hashing_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "token".to_string(),
            token_secret: Vec::new(),
            token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            oauth_client_id: String::new(),
            dependency_timeout: Duration::from_secs(5),
            hashing_timeout: Duration::from_secs(10),
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.token_ttl.as_secs() as i64),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("cookie_name", &self.cookie_name)
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .field("oauth_client_id", &self.oauth_client_id)
            .field("dependency_timeout", &self.dependency_timeout)
            .field("hashing_timeout", &self.hashing_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.cookie_name, "token");
        assert_eq!(config.token_ttl, Duration::from_secs(604_800));
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_development_is_usable() {
        let config = AuthConfig::development();
        assert_eq!(config.token_secret.len(), 32);
        assert!(!config.cookie_secure);
        assert_ne!(config.token_secret, AuthConfig::development().token_secret);
    }

    #[test]
    fn test_cookie_max_age_matches_ttl() {
        let cookie = AuthConfig::default().cookie_config();
        assert_eq!(cookie.max_age_secs, Some(604_800));
        assert!(cookie.http_only);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AuthConfig::development();
        config.password_pepper = Some(b"pepper-value".to_vec());
        let debug = format!("{config:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("pepper-value"));
    }
}
