//! Shared request plumbing: actor resolution from the identity header and
//! the role gate for back-office endpoints.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::access::{Actor, ActorDirectory, ActorId};

/// Identity arrives pre-verified from the gateway as a bare actor id; the
/// directory decides whether it names a live account.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub fn resolve_actor<D>(directory: &D, headers: &HeaderMap) -> Result<Actor, Response>
where
    D: ActorDirectory + ?Sized,
{
    let Some(raw) = headers.get(ACTOR_HEADER) else {
        return Err(unauthorized(
            "Authentication credentials were not provided.",
        ));
    };

    let id = raw
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or_else(|| unauthorized("Invalid actor credentials."))?;

    match directory.fetch(ActorId(id)) {
        Ok(Some(actor)) => Ok(actor),
        Ok(None) => Err(unauthorized("Invalid actor credentials.")),
        Err(error) => Err(server_error(error.to_string())),
    }
}

pub fn require_back_office(actor: &Actor) -> Result<(), Response> {
    if actor.role.is_back_office() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "detail": "You do not have permission to perform this action.",
            })),
        )
            .into_response())
    }
}

fn unauthorized(detail: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": detail })),
    )
        .into_response()
}

pub fn server_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

pub fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
