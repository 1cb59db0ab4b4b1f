pub mod body;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod state;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

pub use error::Error;
pub use state::AppState;

use handlers::{admin, public};

fn admin_routes(app: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/admins", get(admin::list_admins).post(admin::register_admin))
        .route("/admins/{id}", delete(admin::delete_admin))
        .route("/cards", get(admin::list_cards).post(admin::create_card))
        .route(
            "/cards/{id}",
            put(admin::update_card).delete(admin::delete_card),
        )
        .route(
            "/invitees",
            get(admin::list_invitees).post(admin::register_invitee),
        )
        .route("/invitees/{id}", delete(admin::delete_invitee))
        .route("/reports", get(admin::report))
        .route("/pledges/{id}/payments", post(admin::record_payment))
        .route("/pledges/export.csv", get(admin::export_csv))
        .route_layer(middleware::from_fn_with_state(app, gate::gate))
}

/// Build the whole HTTP surface. Login, logout and session state stay
/// outside the gate; everything else under `/api/admin` needs a session.
pub fn app_router(app: AppState) -> NormalizePath<Router> {
    let routes = Router::new()
        .route("/", get(public::get_root))
        .route(
            "/api/pledges",
            get(public::list_pledges).post(public::create_pledge),
        )
        .route("/api/pledges/{id}", put(public::update_pledge))
        .route(
            "/api/pledges/by-card/{token}",
            get(public::pledge_draft_by_card),
        )
        .route("/api/cards/{token}", get(public::view_card))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/session", get(admin::session_state))
        .nest("/api/admin", admin_routes(app.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app);

    // Normalize before routing so /api/pledges/ == /api/pledges
    tower::Layer::layer(&NormalizePathLayer::trim_trailing_slash(), routes)
}
