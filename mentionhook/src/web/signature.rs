//! HMAC-SHA256 signing shared by the handshake and delivery paths.
//!
//! Both paths use the same digest: `sha256=` followed by the base64
//! encoding of `HMAC-SHA256(api_secret_key, data)`.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::secrets::{fetch_api_credentials, SecretStore};

type HmacSha256 = Hmac<Sha256>;

/// Prefix carried by signature headers and response tokens.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Base64 HMAC-SHA256 digest of `data` keyed by `secret`.
///
/// Returns `None` only if the key is rejected by the MAC, which HMAC never
/// does in practice.
pub fn sign(secret: &str, data: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(data);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Signature in header form: `sha256=<base64>`.
pub fn signature_header(secret: &str, data: &[u8]) -> Option<String> {
    sign(secret, data).map(|digest| format!("{}{}", SIGNATURE_PREFIX, digest))
}

/// Constant-time comparison.
///
/// Unequal lengths compare as not equal. For equal lengths every byte is
/// examined regardless of where the first difference is.
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Verify a `sha256=<base64>` header against the raw body.
///
/// A header without the algorithm prefix is invalid.
pub fn verify_signature(secret: &str, body: &[u8], header: &str) -> bool {
    let provided = match header.strip_prefix(SIGNATURE_PREFIX) {
        Some(digest) => digest,
        None => {
            warn!(header_length = header.len(), "webhook_signature_prefix_missing");
            return false;
        }
    };

    let expected = match sign(secret, body) {
        Some(digest) => digest,
        None => {
            warn!("webhook_signature_invalid_key");
            return false;
        }
    };

    let valid = constant_time_compare(expected.as_bytes(), provided.as_bytes());

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = provided.len(),
            "webhook_signature_mismatch"
        );
    }

    valid
}

/// Fetch the signing key and verify the delivery signature.
///
/// Every failure, including an unavailable secret, collapses to `false`.
pub async fn verify_delivery(
    secrets: &dyn SecretStore,
    secret_id: &str,
    body: &[u8],
    header: &str,
) -> bool {
    match fetch_api_credentials(secrets, secret_id).await {
        Ok(creds) => verify_signature(&creds.api_secret_key, body, header),
        Err(e) => {
            warn!(error = %e, "webhook_signature_secret_unavailable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_sign_known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let digest = sign("key", b"The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(digest, "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=");
    }

    #[test]
    fn test_signature_header_prefix() {
        let header = signature_header("shh", b"abc123").unwrap();
        assert!(header.starts_with("sha256="));
        assert_eq!(&header[7..], sign("shh", b"abc123").unwrap());
    }

    #[test]
    fn test_verify_signature_valid() {
        let body = br#"{"events":[]}"#;
        let header = signature_header("secret", body).unwrap();
        assert!(verify_signature("secret", body, &header));
    }

    #[test]
    fn test_verify_signature_body_mutation() {
        let body = br#"{"events":[{"id_str":"1"}]}"#.to_vec();
        let header = signature_header("secret", &body).unwrap();

        for i in 0..body.len() {
            let mut mutated = body.clone();
            mutated[i] ^= 0x01;
            assert!(!verify_signature("secret", &mutated, &header), "byte {}", i);
        }
    }

    #[test]
    fn test_verify_signature_header_mutation() {
        let body = b"payload";
        let header = signature_header("secret", body).unwrap();

        for i in SIGNATURE_PREFIX.len()..header.len() {
            let mut bytes = header.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!verify_signature("secret", body, &mutated), "byte {}", i);
        }
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let header = signature_header("secret", b"payload").unwrap();
        assert!(!verify_signature("other", b"payload", &header));
    }

    #[test]
    fn test_verify_signature_truncated_header() {
        let header = signature_header("secret", b"payload").unwrap();
        assert!(!verify_signature("secret", b"payload", &header[..header.len() - 4]));
        assert!(!verify_signature("secret", b"payload", "sha256="));
        assert!(!verify_signature("secret", b"payload", ""));
    }

    #[test]
    fn test_verify_signature_requires_prefix() {
        let digest = sign("secret", b"payload").unwrap();
        assert!(!verify_signature("secret", b"payload", &digest));
        assert!(!verify_signature("secret", b"payload", &format!("sha1={}", digest)));
        assert!(verify_signature("secret", b"payload", &format!("sha256={}", digest)));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
        assert!(!constant_time_compare(b"", b"a"));
        assert!(constant_time_compare(b"", b""));
    }

    #[tokio::test]
    async fn test_verify_delivery_uses_stored_key() {
        let store = MemorySecretStore::new().with_secret(
            "api",
            r#"{"ApiKey":"k","ApiSecretKey":"shh","AccessToken":"t","AccessTokenSecret":"ts"}"#,
        );
        let header = signature_header("shh", b"body").unwrap();

        assert!(verify_delivery(&store, "api", b"body", &header).await);
        assert!(!verify_delivery(&store, "api", b"other", &header).await);
    }

    #[tokio::test]
    async fn test_verify_delivery_missing_secret_is_invalid() {
        let store = MemorySecretStore::new();
        let header = signature_header("shh", b"body").unwrap();
        assert!(!verify_delivery(&store, "api", b"body", &header).await);
    }
}
