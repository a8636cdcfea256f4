use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde_json::{Map, Value};

use crate::services::identity::verifier::{TokenError, TokenVerifier, VerifiedToken};

/// JWT verifier for identity-provider tokens.
///
/// `jsonwebtoken::Validation` checks signature, `exp` (with leeway), `iss` and `aud`.
/// On top of that `sub` must be present and non-empty.
///
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtTokenVerifier {
    /// EdDSA (Ed25519) verifier from a PEM-encoded public key.
    pub fn from_ed_pem(
        public_key_pem: &str,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_ed_pem(public_key_pem.as_bytes())?;
        Ok(Self::with_key(
            decoding_key,
            Algorithm::EdDSA,
            issuer,
            audience,
            leeway_seconds,
        ))
    }

    pub fn with_key(
        decoding_key: DecodingKey,
        algorithm: Algorithm,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
        }
    }

    fn decode(&self, token: &str) -> Result<Map<String, Value>, TokenError> {
        jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(err.to_string()),
            })
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let claims = self.decode(token)?;

        let subject_id = claims
            .get("sub")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TokenError::Malformed("empty 'sub' claim".into()))?
            .to_string();

        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(VerifiedToken {
            subject_id,
            email,
            claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-signing-secret";
    const ISSUER: &str = "https://idp.example.test";
    const AUDIENCE: &str = "identity-api";

    fn verifier() -> JwtTokenVerifier {
        JwtTokenVerifier::with_key(
            DecodingKey::from_secret(SECRET),
            Algorithm::HS256,
            ISSUER,
            AUDIENCE,
            0,
        )
    }

    fn sign(claims: Value, secret: &[u8]) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn claims(sub: &str, exp_offset: i64) -> Value {
        json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": sub,
            "email": "alice@example.com",
            "exp": chrono::Utc::now().timestamp() + exp_offset,
        })
    }

    #[tokio::test]
    async fn valid_token_yields_subject_and_email() {
        let token = sign(claims("uid-1", 600), SECRET);
        let verified = verifier().verify(&token).await.unwrap();

        assert_eq!(verified.subject_id, "uid-1");
        assert_eq!(verified.email.as_deref(), Some("alice@example.com"));
        assert_eq!(verified.claims["iss"], json!(ISSUER));
    }

    #[tokio::test]
    async fn wrong_key_is_invalid_signature() {
        let token = sign(claims("uid-1", 600), b"someone-else");
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, TokenError::InvalidSignature));
    }

    #[tokio::test]
    async fn past_exp_is_expired() {
        let token = sign(claims("uid-1", -3600), SECRET);
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let err = verifier().verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let mut c = claims("uid-1", 600);
        c["aud"] = json!("another-api");
        let err = verifier().verify(&sign(c, SECRET)).await.unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }

    #[tokio::test]
    async fn blank_subject_is_malformed() {
        let token = sign(claims("   ", 600), SECRET);
        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }
}
