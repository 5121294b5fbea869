//! Shared utility functions for the Mistral adapter.

use mc_domain::config::AuthConfig;
use mc_domain::error::{Error, Result};
use reqwest::StatusCode;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Transport problems of every flavour (timeout, refused, reset) are
/// connectivity failures.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Connectivity(format!("request timed out: {e}"))
    } else {
        Error::Connectivity(e.to_string())
    }
}

/// Map a non-success HTTP status to the error taxonomy.
///
/// 401 → [`Error::Auth`], 429 → [`Error::RateLimited`], everything else →
/// [`Error::Api`] carrying the status and body.
pub(crate) fn status_error(status: StatusCode, body: String) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Auth("invalid Mistral AI API key".into()),
        StatusCode::TOO_MANY_REQUESTS => {
            Error::RateLimited("Mistral AI rate limit exceeded".into())
        }
        other => Error::Api {
            status: other.as_u16(),
            body,
        },
    }
}

/// Resolve the API key from an [`AuthConfig`].
///
/// Precedence:
/// 1. `key` field (plaintext, warns)
/// 2. `env` field (reads environment variable)
/// 3. [`Error::Config`]
pub fn resolve_api_key(auth: &AuthConfig) -> Result<String> {
    // 1. Plaintext key (warn the user)
    if let Some(ref key) = auth.key {
        tracing::warn!(
            "API key loaded from plaintext config field 'key'; \
             prefer 'env' instead"
        );
        return Ok(key.clone());
    }

    // 2. Env var
    if let Some(ref env_var) = auth.env {
        return match std::env::var(env_var) {
            Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
            _ => Err(Error::Config(format!(
                "environment variable '{}' not set or empty",
                env_var
            ))),
        };
    }

    Err(Error::Config(
        "no API key configured: set 'key' or 'env' in [api.auth]".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            Error::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            Error::RateLimited(_)
        ));
        match status_error(StatusCode::BAD_REQUEST, "nope".into()) {
            Error::Api { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "nope");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn resolve_api_key_plaintext() {
        let auth = AuthConfig {
            key: Some("sk-test-123".into()),
            env: None,
        };
        assert_eq!(resolve_api_key(&auth).unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_env_var() {
        let var_name = "MC_TEST_RESOLVE_ENV_KEY_1234";
        std::env::set_var(var_name, "env-secret-value\n");
        let auth = AuthConfig {
            env: Some(var_name.into()),
            key: None,
        };
        assert_eq!(resolve_api_key(&auth).unwrap(), "env-secret-value");
        std::env::remove_var(var_name);
    }

    #[test]
    fn resolve_api_key_env_var_missing() {
        let auth = AuthConfig {
            env: Some("MC_TEST_NONEXISTENT_VAR_8888".into()),
            key: None,
        };
        let err = resolve_api_key(&auth).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("MC_TEST_NONEXISTENT_VAR_8888"));
    }

    #[test]
    fn resolve_api_key_no_config() {
        let auth = AuthConfig { env: None, key: None };
        let err = resolve_api_key(&auth).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("no API key configured"));
    }

    #[test]
    fn plaintext_takes_precedence_over_env() {
        let auth = AuthConfig {
            key: Some("plaintext-wins".into()),
            env: Some("MC_TEST_SHOULD_NOT_BE_READ".into()),
        };
        assert_eq!(resolve_api_key(&auth).unwrap(), "plaintext-wins");
    }
}
