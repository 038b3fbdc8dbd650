use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};
use serde::{Deserialize, Serialize};
use shop_local_engine::db_types::{Actor, Role, User};

use crate::{config::AuthConfig, errors::AuthError, errors::ServerError};

/// The claims carried by every access token. `sub` is the user id; the role is baked into the token at login, so a
/// role change requires a fresh login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: i64,
    pub name: String,
    pub role: Role,
    pub exp: i64,
}

impl JwtClaims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role)
    }
}

/// Issues and verifies access tokens. Registered as app data so that both the ACL middleware and the websocket
/// handshake validate tokens against the same key.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: config.token_lifetime,
        }
    }

    /// Issue a new access token for the given user. The caller must have verified the user's credentials first.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let claims = JwtClaims {
            sub: user.id,
            name: user.name.clone(),
            role: user.role,
            exp: (chrono::Utc::now() + self.lifetime).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| AuthError::ValidationError(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(data.claims)
    }
}

/// Extracts the bearer token from the `Authorization` header, if any.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Claims can be used directly as a handler parameter. Routes behind the ACL middleware get the claims from the
/// request extensions; on bare routes the token is validated here instead.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<JwtClaims>() {
            return ready(Ok(claims.clone()));
        }
        let result = match req.app_data::<web::Data<TokenIssuer>>() {
            None => Err(ServerError::InitializeError("No token issuer registered".to_string())),
            Some(issuer) => match bearer_token(req) {
                None => Err(AuthError::MissingToken.into()),
                Some(token) => issuer.verify_token(token).map_err(|e| {
                    debug!("💻️ Token failed verification. {e}");
                    e.into()
                }),
            },
        };
        ready(result)
    }
}

//-------------------------------------------------  Passwords  ------------------------------------------------------

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashingError(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Scrypt.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::config::AuthConfig;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: sl_common::Secret::new("0123456789abcdef0123456789abcdef".to_string()),
            token_lifetime: chrono::Duration::hours(1),
        }
    }

    fn sample_user() -> User {
        User {
            id: 42,
            name: "Meera".to_string(),
            phone: None,
            email: Some("meera@shoplocal.test".to_string()),
            password_hash: String::new(),
            role: Role::Vendor,
            language: "en".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tokens_round_trip() {
        let issuer = TokenIssuer::new(&test_config());
        let token = issuer.issue_token(&sample_user()).unwrap();
        let claims = issuer.verify_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Vendor);
        assert_eq!(claims.name, "Meera");
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let mut token = issuer.issue_token(&sample_user()).unwrap();
        token.replace_range(token.len() - 6..token.len() - 1, "AAAAA");
        assert!(issuer.verify_token(&token).is_err());
    }

    #[test]
    fn tokens_from_another_key_are_rejected() {
        let issuer = TokenIssuer::new(&test_config());
        let other = TokenIssuer::new(&AuthConfig {
            jwt_secret: sl_common::Secret::new("ffffffffffffffffffffffffffffffff".to_string()),
            token_lifetime: chrono::Duration::hours(1),
        });
        let token = other.issue_token(&sample_user()).unwrap();
        assert!(issuer.verify_token(&token).is_err());
    }

    #[test]
    fn password_hashing_round_trips() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }
}
