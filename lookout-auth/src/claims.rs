//! Access token claims.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use lookout_core::{LookoutError, Result};
use serde::{Deserialize, Serialize};

/// Claims read from an access token.
///
/// The backend signs and verifies tokens; the client only reads the payload
/// to learn who the token belongs to and when it stops being usable. No
/// signature verification happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable subject (user) identifier.
    pub sub: String,
    /// Expiry as Unix seconds.
    pub exp: i64,
}

impl Claims {
    /// Decode the claims of an access token without verifying its signature.
    ///
    /// Tokens missing `sub` or `exp` are rejected: a session without a known
    /// expiry could never uphold the never-use-past-expiry rule.
    pub fn decode(token: &str) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data =
            jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
                .map_err(|e| LookoutError::token(format!("cannot decode access token: {e}")))?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    fn sign(claims: &serde_json::Value) -> String {
        jsonwebtoken::encode(&Header::default(), claims, &EncodingKey::from_secret(b"test"))
            .unwrap()
    }

    #[test]
    fn decodes_sub_and_exp() {
        let token = sign(&serde_json::json!({"sub": "user-7", "exp": 1_900_000_000}));
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.sub, "user-7");
        assert_eq!(claims.exp, 1_900_000_000);
    }

    #[test]
    fn decodes_expired_tokens_too() {
        // Expiry enforcement is the session manager's job, not the decoder's.
        let token = sign(&serde_json::json!({"sub": "user-7", "exp": 1}));
        assert!(Claims::decode(&token).is_ok());
    }

    #[test]
    fn rejects_tokens_without_subject() {
        let token = sign(&serde_json::json!({"exp": 1_900_000_000}));
        let err = Claims::decode(&token).unwrap_err();
        assert!(matches!(err, LookoutError::Token(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(Claims::decode("not.a.jwt"), Err(LookoutError::Token(_))));
    }
}
