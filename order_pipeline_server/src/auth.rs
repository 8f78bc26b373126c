//! JWT bearer-token authentication for the order endpoints.
//!
//! Tokens are HS256-signed JWTs carrying the standard `sub` and `exp` claims. The `Authorization` header may carry
//! the token bare or with a `Bearer ` prefix. A missing header is a 401; a token that fails verification (bad
//! signature, malformed, or expired) is a 403.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies bearer tokens against the configured HMAC secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        Self { decoding_key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map(|data| data.claims).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })
    }
}

/// Signs tokens with the same secret the verifier checks against. The server itself never issues tokens over HTTP;
/// this is used by operator tooling and the endpoint tests.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        Self { encoding_key }
    }

    pub fn issue(&self, claims: &JwtClaims) -> Result<String, ServerError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| ServerError::Unspecified(format!("Could not sign access token. {e}")))
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, ServerError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| ServerError::InitializeError("TokenVerifier is not registered on the app".to_string()))?;
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let token = header.to_str().map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken.into());
    }
    Ok(verifier.verify(token)?)
}
