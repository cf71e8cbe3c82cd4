//! Authentication layer.
//!
//! A pluggable [`Authenticator`] resolves the current user from request
//! parts; [`require_user`] enforces the decision in front of protected
//! routes. Requests without a resolvable user get 401, requests whose
//! credentials resolve but are denied get 403, everything else continues
//! with the user attached as an extension.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

use plinth_core::Envelope;

use crate::http::respond;

/// Authenticated principal injected into protected handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    /// Arbitrary claims carried by the credential source.
    pub claims: Value,
}

/// Outcome of resolving the current user.
#[derive(Debug, Clone)]
pub enum AuthDecision {
    /// Authenticated; the user is attached to the request.
    User(AuthUser),
    /// No usable credentials (missing token, expired session).
    Anonymous,
    /// Credentials resolved but access is denied.
    Forbidden,
}

/// Resolves the current user from request parts.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn resolve(&self, parts: &Parts) -> AuthDecision;
}

/// Middleware state: the configured authenticator.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<dyn Authenticator>,
}

/// Enforce authentication in front of protected routes.
pub async fn require_user(State(state): State<AuthState>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();

    match state.authenticator.resolve(&parts).await {
        AuthDecision::User(user) => {
            let mut req = Request::from_parts(parts, body);
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        AuthDecision::Anonymous => respond::json(Envelope::unauthorized()),
        AuthDecision::Forbidden => respond::json(Envelope::forbidden()),
    }
}

/// Bearer-token authenticator for single-token deployments and tests.
///
/// A missing or malformed Authorization header is anonymous; a present
/// but wrong token is forbidden.
pub struct BearerAuthenticator {
    token: String,
}

impl BearerAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authenticator for BearerAuthenticator {
    async fn resolve(&self, parts: &Parts) -> AuthDecision {
        let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            return AuthDecision::Anonymous;
        };
        let Ok(header) = header.to_str() else {
            return AuthDecision::Anonymous;
        };
        let Some(token) = header.strip_prefix("Bearer ") else {
            return AuthDecision::Anonymous;
        };

        if token.trim() == self.token {
            AuthDecision::User(AuthUser {
                id: "bearer".to_string(),
                name: "bearer".to_string(),
                claims: Value::Null,
            })
        } else {
            AuthDecision::Forbidden
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = HttpRequest::builder().uri("/notes");
        if let Some(value) = value {
            builder = builder.header("authorization", value);
        }
        let (parts, _) = builder.body(Body::empty()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        let auth = BearerAuthenticator::new("sekret");
        let decision = auth.resolve(&parts_with_auth(None)).await;
        assert!(matches!(decision, AuthDecision::Anonymous));
    }

    #[tokio::test]
    async fn wrong_scheme_is_anonymous() {
        let auth = BearerAuthenticator::new("sekret");
        let decision = auth.resolve(&parts_with_auth(Some("Basic abc"))).await;
        assert!(matches!(decision, AuthDecision::Anonymous));
    }

    #[tokio::test]
    async fn wrong_token_is_forbidden() {
        let auth = BearerAuthenticator::new("sekret");
        let decision = auth.resolve(&parts_with_auth(Some("Bearer nope"))).await;
        assert!(matches!(decision, AuthDecision::Forbidden));
    }

    #[tokio::test]
    async fn matching_token_is_a_user() {
        let auth = BearerAuthenticator::new("sekret");
        let decision = auth.resolve(&parts_with_auth(Some("Bearer sekret"))).await;
        assert!(matches!(decision, AuthDecision::User(_)));
    }
}
