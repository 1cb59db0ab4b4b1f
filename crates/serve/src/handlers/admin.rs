use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use adapt::auth::{Credentials, SessionState};
use adapt::service::{DashboardStats, PledgeListing, Viewer};
use adapt::session::Session;
use domain::card::CardSummary;
use domain::pledge::InviteeForm;
use domain::report::{InviteeReport, CSV_FILE_NAME};
use domain::{AdminView, CardForm, NewAdmin, PledgeView};

use crate::body::JsonBody;
use crate::error::{Context, Error, Result};
use crate::gate::bearer_token;
use crate::handlers::public::SearchQuery;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminView,
    pub expires_at: DateTime<Utc>,
}

#[tracing::instrument(skip_all)]
pub async fn login(
    State(app): State<AppState>,
    JsonBody(creds): JsonBody<Credentials>,
) -> Result<Json<LoginResponse>> {
    let session = app
        .services
        .auth
        .login(&creds)
        .await
        .context("Failed to log in")?
        .ok_or(Error::BadCredentials)?;
    let expires_at = session.expires_at(app.services.sessions.policy());
    Ok(Json(LoginResponse {
        token: session.token,
        admin: session.admin,
        expires_at,
    }))
}

#[tracing::instrument(skip_all)]
pub async fn logout(State(app): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        app.services.auth.logout(token);
    }
    StatusCode::NO_CONTENT
}

#[tracing::instrument(skip_all)]
pub async fn session_state(State(app): State<AppState>, headers: HeaderMap) -> Json<SessionState> {
    Json(app.services.auth.state(bearer_token(&headers)))
}

#[tracing::instrument(skip_all)]
pub async fn dashboard(State(app): State<AppState>) -> Result<Json<DashboardStats>> {
    let stats = app
        .services
        .dashboard()
        .await
        .context("Failed to load dashboard")?;
    Ok(Json(stats))
}

// ─────────────────────────────────────────────────────────────────────────────
// Admins
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn list_admins(State(app): State<AppState>) -> Result<Json<Vec<AdminView>>> {
    let admins = app
        .services
        .admins
        .list()
        .await
        .context("Failed to load admins")?;
    Ok(Json(admins))
}

#[tracing::instrument(skip_all)]
pub async fn register_admin(
    State(app): State<AppState>,
    JsonBody(form): JsonBody<NewAdmin>,
) -> Result<(StatusCode, Json<AdminView>)> {
    let admin = app
        .services
        .admins
        .register(form)
        .await
        .context("Failed to register admin")?;
    Ok((StatusCode::CREATED, Json(admin)))
}

#[tracing::instrument(skip_all)]
pub async fn delete_admin(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    app.services
        .admins
        .delete(&session.admin, &id)
        .await
        .context("Failed to delete admin")?;
    let closed = app.services.sessions.close_all_for(&id);
    if closed > 0 {
        info!("closed {} session(s) of deleted admin {}", closed, id);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Invitation cards
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn list_cards(State(app): State<AppState>) -> Result<Json<Vec<CardSummary>>> {
    let cards = app
        .services
        .cards
        .list()
        .await
        .context("Failed to load invitation cards")?;
    Ok(Json(cards))
}

#[tracing::instrument(skip_all)]
pub async fn create_card(
    State(app): State<AppState>,
    JsonBody(form): JsonBody<CardForm>,
) -> Result<(StatusCode, Json<CardSummary>)> {
    let card = app
        .services
        .cards
        .create(form)
        .await
        .context("Failed to save invitation card")?;
    Ok((StatusCode::CREATED, Json(card)))
}

#[tracing::instrument(skip_all)]
pub async fn update_card(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<CardForm>,
) -> Result<Json<CardSummary>> {
    let card = app
        .services
        .cards
        .update(&id, form)
        .await
        .context("Failed to save invitation card")?;
    Ok(Json(card))
}

#[tracing::instrument(skip_all)]
pub async fn delete_card(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    app.services
        .cards
        .delete(&id)
        .await
        .context("Failed to delete invitation card")?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Invitees, payments, reports
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn list_invitees(
    State(app): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PledgeListing>> {
    let listing = app
        .services
        .pledges
        .listing(&query.q, Viewer::Admin)
        .await
        .context("Failed to load invitees")?;
    Ok(Json(listing))
}

#[tracing::instrument(skip_all)]
pub async fn register_invitee(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    JsonBody(form): JsonBody<InviteeForm>,
) -> Result<(StatusCode, Json<PledgeView>)> {
    let view = app
        .services
        .pledges
        .register(&session.admin, form)
        .await
        .context("Failed to register invitee")?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(skip_all)]
pub async fn delete_invitee(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    app.services
        .pledges
        .delete(&id)
        .await
        .context("Failed to delete invitee")?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub amount: f64,
}

#[tracing::instrument(skip_all)]
pub async fn record_payment(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<PaymentForm>,
) -> Result<Json<PledgeView>> {
    let view = app
        .services
        .pledges
        .record_payment(&id, form.amount)
        .await
        .context("Failed to record payment")?;
    Ok(Json(view))
}

#[tracing::instrument(skip_all)]
pub async fn report(State(app): State<AppState>) -> Result<Json<InviteeReport>> {
    let report = app
        .services
        .pledges
        .report()
        .await
        .context("Failed to load report")?;
    Ok(Json(report))
}

#[tracing::instrument(skip_all)]
pub async fn export_csv(State(app): State<AppState>) -> Result<impl IntoResponse> {
    let csv = app
        .services
        .pledges
        .export_csv(&app.event.currency)
        .await
        .context("Failed to export pledges")?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILE_NAME}\""),
            ),
        ],
        csv,
    ))
}
