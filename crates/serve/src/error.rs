use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use domain::FieldErrors;

/// Everything a handler can fail with. Service errors carry the
/// user-facing message shown when the failure is not the caller's fault.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        #[source]
        source: adapt::Error,
    },

    #[error("authentication required")]
    Unauthorized,

    #[error("invalid email or password")]
    BadCredentials,

    #[error("unreadable request body: {0}")]
    Body(#[from] JsonRejection),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait Context<T> {
    /// Attach the message returned to the client if this turns out to be a
    /// server-side failure.
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> Context<T> for std::result::Result<T, adapt::Error> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Service { context, source })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

fn reply(status: StatusCode, error: impl Into<String>, fields: Option<FieldErrors>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            fields,
        }),
    )
        .into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        use adapt::Error as E;

        match self {
            Error::Unauthorized => reply(StatusCode::UNAUTHORIZED, "Please log in", None),
            Error::BadCredentials => {
                reply(StatusCode::UNAUTHORIZED, "Invalid email or password", None)
            }
            Error::Body(rejection) => {
                warn!("rejected request body: {}", rejection.body_text());
                reply(rejection.status(), "Invalid request body", None)
            }
            Error::Service { context, source } => match source {
                E::Invalid(fields) => {
                    reply(StatusCode::UNPROCESSABLE_ENTITY, "Validation failed", Some(fields))
                }
                E::Payment(e) => {
                    let msg = e.to_string();
                    reply(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "Validation failed",
                        Some(FieldErrors::single("amount", msg)),
                    )
                }
                E::NotFound { collection, id } => {
                    warn!("{}: no {} document '{}'", context, collection, id);
                    reply(StatusCode::NOT_FOUND, not_found_message(collection), None)
                }
                E::Token(e) => {
                    warn!("{}: {}", context, e);
                    reply(StatusCode::NOT_FOUND, "Invitation card not found", None)
                }
                E::Conflict(msg) => reply(StatusCode::CONFLICT, msg, None),
                E::Forbidden(msg) => reply(StatusCode::FORBIDDEN, msg, None),
                other => {
                    error!("{}: {}", context, other);
                    reply(StatusCode::INTERNAL_SERVER_ERROR, context, None)
                }
            },
        }
    }
}

fn not_found_message(collection: adapt::store::Collection) -> &'static str {
    use adapt::store::Collection;
    match collection {
        Collection::Admins => "Admin not found",
        Collection::InvitationCards => "Invitation card not found",
        Collection::Invitees => "Invitee not found",
    }
}
