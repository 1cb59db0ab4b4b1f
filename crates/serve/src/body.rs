use axum::extract::FromRequest;

use crate::Error;

/// `axum::Json`, except a body that does not parse is answered with the
/// usual `{error}` JSON instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
