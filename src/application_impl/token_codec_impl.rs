use crate::application_port::{AccessToken, AuthError, TokenCodec};
use crate::domain_model::TokenIdentity;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // user e-mail
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String,
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.leeway = 0;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        v
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        subject: &str,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let iat_dt = Utc::now();
        let exp_dt = iat_dt + self.cfg.access_ttl;
        let claims = AccessClaims {
            sub: subject.to_string(),
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn verify_access_token(&self, token: &AccessToken) -> Result<TokenIdentity, AuthError> {
        let data = decode::<AccessClaims>(
            &token.0,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &self.validation(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;

        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or(AuthError::TokenInvalid)?;

        Ok(TokenIdentity {
            subject: data.claims.sub,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(key: &str, ttl: Duration) -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            issuer: "test-issuer".to_string(),
            audience: "test-aud".to_string(),
            access_ttl: ttl,
            signing_key: key.as_bytes().to_vec(),
        })
    }

    #[tokio::test]
    async fn issued_token_verifies_to_its_subject() {
        let codec = codec("secret", Duration::from_secs(60));
        let (token, exp) = codec.issue_access_token("test@test.com").await.unwrap();

        let identity = codec.verify_access_token(&token).await.unwrap();

        assert_eq!(identity.subject, "test@test.com");
        assert_eq!(identity.expires_at.timestamp(), exp.timestamp());
    }

    #[tokio::test]
    async fn token_signed_with_other_key_is_invalid() {
        let (token, _) = codec("secret", Duration::from_secs(60))
            .issue_access_token("test@test.com")
            .await
            .unwrap();

        let err = codec("another", Duration::from_secs(60))
            .verify_access_token(&token)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let codec = codec("secret", Duration::from_secs(0));
        let (token, _) = codec.issue_access_token("test@test.com").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;

        let err = codec.verify_access_token(&token).await.unwrap_err();

        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let err = codec("secret", Duration::from_secs(60))
            .verify_access_token(&AccessToken("not.a.jwt".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }
}
