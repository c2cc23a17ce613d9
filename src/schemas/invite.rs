use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::invite;
use crate::services::invites;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInviteRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Generated from the name when omitted
    #[validate(length(max = 64))]
    pub code: Option<String>,
    #[serde(default = "default_max_uses")]
    #[validate(range(min = 1, message = "Number of uses must be at least 1"))]
    pub max_uses: i32,
    /// Numeric Discord user id to send the code to
    #[validate(length(max = 32))]
    pub discord_id: Option<String>,
}

fn default_max_uses() -> i32 {
    1
}

impl From<CreateInviteRequest> for invites::NewInvite {
    fn from(req: CreateInviteRequest) -> Self {
        Self {
            name: req.name,
            code: req.code,
            max_uses: req.max_uses,
            discord_id: req.discord_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidateInviteRequest {
    #[validate(length(min = 1, max = 64, message = "Enter an invite code"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub max_uses: i32,
    pub used_count: i32,
    pub remaining_uses: i32,
    pub share_url: String,
    pub discord_id: Option<String>,
    pub invite_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<invite::Model> for InviteResponse {
    fn from(invite: invite::Model) -> Self {
        Self {
            share_url: invites::share_url(&invite.code),
            remaining_uses: invite.remaining_uses(),
            id: invite.id,
            code: invite.code,
            name: invite.name,
            max_uses: invite.max_uses,
            used_count: invite.used_count,
            discord_id: invite.discord_id,
            invite_sent_at: invite.invite_sent_at,
            created_at: invite.created_at,
        }
    }
}
