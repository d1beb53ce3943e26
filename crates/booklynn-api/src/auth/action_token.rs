//! Single-use action tokens for email links
//!
//! Verification and password-reset links carry a compact token signed
//! separately from the bearer-token path:
//! `base64url(payload) "." base64url(HMAC-SHA256(payload))`, where the
//! payload is JSON recording the email and the issue time. The redemption
//! window is enforced when the link is used, not when it is minted, so a
//! stale link fails with `Expired` no matter how it was produced.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use booklynn_core::config::AuthConfig;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Action token redemption errors
///
/// `Expired` only ever applies to authentically signed tokens; anything
/// that fails the signature or format checks is `Invalid`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionTokenError {
    #[error("This link has expired")]
    Expired,

    #[error("This link is invalid")]
    Invalid,
}

#[derive(Debug, Deserialize)]
struct ActionPayload {
    email: String,
    iat: u64,
}

/// Key the MAC off a digest of salt + secret so action tokens never share
/// signing material with bearer tokens.
fn mac_for(config: &AuthConfig) -> HmacSha256 {
    let mut key = Sha256::new();
    key.update(config.action_token_salt.as_bytes());
    key.update(config.jwt_secret.as_bytes());
    HmacSha256::new_from_slice(&key.finalize()).expect("HMAC can take key of any size")
}

fn now_secs() -> u64 {
    // A clock before the epoch mints an already-expired token, which is
    // the safe direction.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn sign_with_iat(config: &AuthConfig, email: &str, iat: u64) -> String {
    let payload = serde_json::json!({ "email": email, "iat": iat });
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.to_string());

    let mut mac = mac_for(config);
    mac.update(payload_b64.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{payload_b64}.{sig_b64}")
}

/// Mint an action token for the given email address
pub fn sign(config: &AuthConfig, email: &str) -> String {
    sign_with_iat(config, email, now_secs())
}

/// Redeem an action token, returning the email it was minted for
///
/// Signature and format problems report `Invalid`; an authentic token
/// older than `max_age_secs` reports `Expired`. The signature check runs
/// first in constant time.
pub fn redeem(
    config: &AuthConfig,
    token: &str,
    max_age_secs: u64,
) -> Result<String, ActionTokenError> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or(ActionTokenError::Invalid)?;
    let sig = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| ActionTokenError::Invalid)?;

    let mut mac = mac_for(config);
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&sig).map_err(|_| ActionTokenError::Invalid)?;

    let payload_json = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| ActionTokenError::Invalid)?;
    let payload: ActionPayload =
        serde_json::from_slice(&payload_json).map_err(|_| ActionTokenError::Invalid)?;

    if now_secs().saturating_sub(payload.iat) > max_age_secs {
        return Err(ActionTokenError::Expired);
    }

    Ok(payload.email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig::default()
    }

    #[test]
    fn test_sign_and_redeem() {
        let config = test_config();
        let token = sign(&config, "reader@example.com");

        let email = redeem(&config, &token, 3600).expect("Failed to redeem token");
        assert_eq!(email, "reader@example.com");
    }

    #[test]
    fn test_expired_token_is_distinct_from_invalid() {
        let config = test_config();

        // Minted two hours ago against a one hour window
        let stale = sign_with_iat(&config, "reader@example.com", now_secs() - 7200);
        assert_eq!(redeem(&config, &stale, 3600), Err(ActionTokenError::Expired));

        // Tampering is never reported as expiry
        let mut tampered = stale.clone();
        tampered.replace_range(0..1, "x");
        assert_eq!(
            redeem(&config, &tampered, 3600),
            Err(ActionTokenError::Invalid)
        );
    }

    #[test]
    fn test_wrong_secret() {
        let config = test_config();
        let other = AuthConfig {
            jwt_secret: "a completely different secret".to_string(),
            ..AuthConfig::default()
        };

        let token = sign(&config, "reader@example.com");
        assert_eq!(redeem(&other, &token, 3600), Err(ActionTokenError::Invalid));
    }

    #[test]
    fn test_salt_separates_token_domains() {
        let config = test_config();
        let other_salt = AuthConfig {
            action_token_salt: "another-purpose".to_string(),
            ..AuthConfig::default()
        };

        let token = sign(&config, "reader@example.com");
        assert_eq!(
            redeem(&other_salt, &token, 3600),
            Err(ActionTokenError::Invalid)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let config = test_config();

        assert_eq!(redeem(&config, "", 3600), Err(ActionTokenError::Invalid));
        assert_eq!(
            redeem(&config, "no-separator", 3600),
            Err(ActionTokenError::Invalid)
        );
        assert_eq!(
            redeem(&config, "!!!.###", 3600),
            Err(ActionTokenError::Invalid)
        );

        // Valid base64 halves that were never signed by us
        let fake = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"email":"x@y.z","iat":0}"#),
            URL_SAFE_NO_PAD.encode("not a real signature")
        );
        assert_eq!(redeem(&config, &fake, 3600), Err(ActionTokenError::Invalid));
    }
}
