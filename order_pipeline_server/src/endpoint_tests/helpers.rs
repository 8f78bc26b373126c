use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Utc};
use omp_common::Secret;
use serde_json::Value;

use crate::{
    auth::{JwtClaims, TokenIssuer, TokenVerifier},
    config::AuthConfig,
};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("c0ffee1234test5678secret9abcdef0".to_string()) }
}

pub fn issue_token(sub: &str, expiry: DateTime<Utc>) -> String {
    let issuer = TokenIssuer::new(&get_auth_config());
    let claims = JwtClaims { sub: sub.to_string(), exp: expiry.timestamp() as usize };
    issuer.issue(&claims).expect("Failed to sign token")
}

pub async fn get_request<F>(auth_header: &str, path: &str, configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    let mut req = TestRequest::get().uri(path);
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    send(req, configure).await
}

pub async fn post_request<F>(auth_header: &str, path: &str, body: Value, configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    post_raw(auth_header, path, body.to_string(), configure).await
}

pub async fn post_raw<F>(auth_header: &str, path: &str, body: String, configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    let mut req =
        TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body);
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    send(req, configure).await
}

async fn send<F>(req: TestRequest, configure: F) -> (StatusCode, Value)
where F: FnOnce(&mut ServiceConfig) {
    let _ = env_logger::try_init().ok();
    let verifier = TokenVerifier::new(&get_auth_config());
    let app = App::new().app_data(web::Data::new(verifier)).configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let bytes = res.into_body().try_into_bytes().expect("Could not read response body");
    let body = serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null);
    (status, body)
}
