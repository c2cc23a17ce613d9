use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::schemas::{CreateInviteRequest, InviteResponse, ValidateInviteRequest};
use crate::services::invites::{self, RememberedInvite};
use crate::state::AppState;

pub fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/invites/validate", post(validate_invite))
        .with_state(state)
}

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/invites", get(list_invites).post(create_invite))
        .route("/api/admin/invites/{id}/notify", post(notify_invite))
        .with_state(state)
}

/// Check a code before sign-in. The response is what the client remembers.
async fn validate_invite(
    State(state): State<AppState>,
    Json(req): Json<ValidateInviteRequest>,
) -> Result<Json<RememberedInvite>> {
    req.validate()?;
    let invite = invites::validate(&state.db, &req.code).await?;
    Ok(Json(RememberedInvite::from(&invite)))
}

async fn list_invites(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<InviteResponse>>> {
    let invites = invites::list(&state.db).await?;
    Ok(Json(invites.into_iter().map(InviteResponse::from).collect()))
}

async fn create_invite(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<InviteResponse>)> {
    req.validate()?;
    let invite = invites::create(&state.db, req.into()).await?;
    tracing::info!("Admin {} created invite {}", admin.id, invite.code);
    Ok((StatusCode::CREATED, Json(InviteResponse::from(invite))))
}

/// DM the code to the invitee's Discord account. Refused once it has been sent.
async fn notify_invite(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<InviteResponse>> {
    let invite = state.notification.notify_invite(&state.db, id).await?;
    tracing::info!("Admin {} sent invite {}", admin.id, invite.code);
    Ok(Json(InviteResponse::from(invite)))
}
