use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use adapt::session::Session;

use crate::error::Error;
use crate::state::AppState;

/// Token from `Authorization: Bearer <token>`, if present and well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Admin-only routes: resolve the bearer token to a live session and hand it
/// to the handler as an `Extension<Session>`.
#[tracing::instrument(skip_all)]
pub async fn gate(State(app): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let session = bearer_token(req.headers()).and_then(|t| app.services.sessions.resolve(t));
    match session {
        Some(session) => {
            tracing::debug!("request by admin {}", session.admin.id);
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => Error::Unauthorized.into_response(),
    }
}

/// The caller's admin session on routes that are public but behave
/// differently for admins. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeAdmin(pub Option<Session>);

impl MaybeAdmin {
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

impl FromRequestParts<AppState> for MaybeAdmin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAdmin(
            bearer_token(&parts.headers).and_then(|t| state.services.sessions.resolve(t)),
        ))
    }
}
