//! JWT issuance and validation

use imbds_shared::user::Role;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use ulid::Ulid;

use super::Principal;
use crate::config::AuthConfig;

/// Which slot a token was minted for. A token presented in the wrong slot is
/// rejected even when its signature and expiry are fine.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Principal id
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub token_type: TokenType,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("expected a {expected:?} token, got {actual:?}")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds, mirrored into the cookie max-age.
    pub ttl: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Signs and verifies HS256 tokens with the process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: config.access_token_lifetime_seconds,
            refresh_ttl: config.refresh_token_lifetime_seconds,
        }
    }

    /// Issue a fresh access/refresh pair for a principal.
    pub fn issue(&self, principal: &Principal) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.sign(principal, TokenType::Access, self.access_ttl)?,
            refresh: self.sign(principal, TokenType::Refresh, self.refresh_ttl)?,
        })
    }

    /// Issue a lone access token, used by the refresh exchange.
    pub fn issue_access(&self, principal: &Principal) -> Result<IssuedToken, TokenError> {
        self.sign(principal, TokenType::Access, self.access_ttl)
    }

    /// Verify signature, issuer, expiry and slot, then rebuild the principal.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Principal, TokenError> {
        let claims = self.decode_claims(token)?;

        if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(TokenError::Expired);
        }

        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }

        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Malformed(format!("subject '{}' is not an id", claims.sub)))?;

        Ok(Principal {
            id,
            username: claims.username,
            role: claims.role,
        })
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }

    fn sign(
        &self,
        principal: &Principal,
        token_type: TokenType,
        ttl: i64,
    ) -> Result<IssuedToken, TokenError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: principal.id.to_string(),
            username: principal.username.clone(),
            role: principal.role,
            token_type,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl,
            jti: Ulid::new().to_string(),
        };

        let token = self.encode_claims(&claims)?;

        Ok(IssuedToken {
            token,
            ttl,
            expires_at: claims.exp,
        })
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Encode)
    }
}
