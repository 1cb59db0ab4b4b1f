use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use adapt::service::{PledgeListing, Viewer};
use domain::card::CardView;
use domain::pledge::PledgeDraft;
use domain::{PledgeForm, PledgeUpdate, PledgeView};

use crate::body::JsonBody;
use crate::error::{Context, Result};
use crate::gate::MaybeAdmin;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PledgeCreated {
    pub pledge: PledgeView,
    pub whatsapp_link: Option<String>,
}

fn viewer(caller: &MaybeAdmin) -> Viewer {
    if caller.is_admin() {
        Viewer::Admin
    } else {
        Viewer::Public
    }
}

pub async fn get_root() -> &'static str {
    "pledgebook is running"
}

#[tracing::instrument(skip_all)]
pub async fn list_pledges(
    State(app): State<AppState>,
    caller: MaybeAdmin,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PledgeListing>> {
    let listing = app
        .services
        .pledges
        .listing(&query.q, viewer(&caller))
        .await
        .context("Failed to load pledges")?;
    Ok(Json(listing))
}

#[tracing::instrument(skip_all)]
pub async fn create_pledge(
    State(app): State<AppState>,
    JsonBody(form): JsonBody<PledgeForm>,
) -> Result<(StatusCode, Json<PledgeCreated>)> {
    let pledge = app
        .services
        .pledges
        .create(form)
        .await
        .context("Failed to save pledge")?;
    Ok((
        StatusCode::CREATED,
        Json(PledgeCreated {
            pledge,
            whatsapp_link: app.event.whatsapp_link.clone(),
        }),
    ))
}

#[tracing::instrument(skip_all)]
pub async fn update_pledge(
    State(app): State<AppState>,
    caller: MaybeAdmin,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<PledgeUpdate>,
) -> Result<Json<PledgeView>> {
    let view = app
        .services
        .pledges
        .update(&id, update, viewer(&caller))
        .await
        .context("Failed to update pledge")?;
    Ok(Json(view))
}

#[tracing::instrument(skip_all)]
pub async fn pledge_draft_by_card(
    State(app): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PledgeDraft>> {
    let draft = app
        .services
        .cards
        .draft(&token)
        .await
        .context("Failed to load invitation card")?;
    Ok(Json(draft))
}

#[tracing::instrument(skip_all)]
pub async fn view_card(
    State(app): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<CardView>> {
    let card = app
        .services
        .cards
        .view(&token)
        .await
        .context("Failed to load invitation card")?;
    Ok(Json(card))
}
