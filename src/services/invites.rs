//! Invite registry
//!
//! Looks up invite codes, checks their remaining budget and consumes uses.
//! Consumption is a single conditional `UPDATE` so concurrent redemptions can
//! never push `used_count` past `max_uses`.

use chrono::Utc;
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::invite;
use crate::models::prelude::*;

const GENERATED_SUFFIX_LEN: usize = 4;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Why a presented code could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum InviteRejection {
    #[error("Invalid invite code")]
    NotFound,
    #[error("This invite code has been used up")]
    Exhausted,
}

impl InviteRejection {
    /// Picks the rejection out of a registry error, leaving persistence errors alone.
    pub fn from_error(error: &AppError) -> Option<Self> {
        match error {
            AppError::InvalidInviteCode => Some(InviteRejection::NotFound),
            AppError::ExhaustedInviteCode => Some(InviteRejection::Exhausted),
            _ => None,
        }
    }
}

impl From<InviteRejection> for AppError {
    fn from(rejection: InviteRejection) -> Self {
        match rejection {
            InviteRejection::NotFound => AppError::InvalidInviteCode,
            InviteRejection::Exhausted => AppError::ExhaustedInviteCode,
        }
    }
}

/// Invite as remembered by a client between the code entry and the identity step.
///
/// Only advisory: it must go through [`RememberedInvite::revalidate`] before it
/// can approve anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedInvite {
    pub code: String,
    pub name: String,
}

impl From<&invite::Model> for RememberedInvite {
    fn from(invite: &invite::Model) -> Self {
        Self {
            code: invite.code.clone(),
            name: invite.name.clone(),
        }
    }
}

impl RememberedInvite {
    pub async fn revalidate<C: ConnectionTrait>(&self, db: &C) -> Result<invite::Model> {
        validate(db, &self.code).await
    }
}

/// Input for the administrator "create invite" action
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub name: String,
    pub code: Option<String>,
    pub max_uses: i32,
    pub discord_id: Option<String>,
}

/// Codes are compared trimmed and upper-cased
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn has_remaining_uses(invite: &invite::Model) -> bool {
    invite.has_remaining_uses()
}

/// Public link that pre-fills the code on the landing page
pub fn share_url(code: &str) -> String {
    format!(
        "{}/?invite={}",
        CONFIG.server.public_url,
        urlencoding::encode(code)
    )
}

/// Case-insensitive, whitespace-trimmed exact match on the code
pub async fn lookup<C: ConnectionTrait>(db: &C, code: &str) -> Result<Option<invite::Model>> {
    let normalized = normalize_code(code);
    if normalized.is_empty() {
        return Ok(None);
    }

    let found = Invite::find()
        .filter(invite::Column::Code.eq(normalized))
        .one(db)
        .await?;

    Ok(found)
}

/// Lookup plus remaining-uses check.
///
/// Fails with [`AppError::InvalidInviteCode`] or [`AppError::ExhaustedInviteCode`],
/// which callers can tell apart to show different messages.
pub async fn validate<C: ConnectionTrait>(db: &C, code: &str) -> Result<invite::Model> {
    let invite = lookup(db, code)
        .await?
        .ok_or(AppError::InvalidInviteCode)?;

    if !has_remaining_uses(&invite) {
        return Err(AppError::ExhaustedInviteCode);
    }

    Ok(invite)
}

/// Take one use of the invite.
///
/// The increment only applies while `used_count < max_uses`; losing that race
/// surfaces as [`AppError::ExhaustedInviteCode`]. Run it inside the same
/// transaction that creates the attendance row.
pub async fn consume<C: ConnectionTrait>(db: &C, invite: &invite::Model) -> Result<invite::Model> {
    let result = Invite::update_many()
        .col_expr(
            invite::Column::UsedCount,
            Expr::col(invite::Column::UsedCount).add(1),
        )
        .col_expr(invite::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(invite::Column::Code.eq(invite.code.clone()))
        .filter(Expr::col(invite::Column::UsedCount).lt(Expr::col(invite::Column::MaxUses)))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::info!("Invite {} has no uses left", invite.code);
        return Err(AppError::ExhaustedInviteCode);
    }

    let updated = Invite::find_by_id(invite.id)
        .one(db)
        .await?
        .ok_or(AppError::InvalidInviteCode)?;

    tracing::info!(
        "Invite {} consumed ({}/{})",
        updated.code,
        updated.used_count,
        updated.max_uses
    );

    Ok(updated)
}

/// Code generated from the invitee name: upper-cased name without whitespace
/// plus a short random suffix.
pub fn generate_code(name: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..GENERATED_SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.random_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();

    let base: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    format!("{}{}", base, suffix)
}

pub async fn create<C: ConnectionTrait>(db: &C, new_invite: NewInvite) -> Result<invite::Model> {
    let name = new_invite.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if new_invite.max_uses < 1 {
        return Err(AppError::BadRequest(
            "Number of uses must be at least 1".to_string(),
        ));
    }

    let discord_id = match new_invite.discord_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Some(parse_discord_id(id)?),
        _ => None,
    };

    let code = match new_invite.code.as_deref().map(normalize_code) {
        Some(code) if !code.is_empty() => code,
        _ => generate_code(&name),
    };

    if lookup(db, &code).await?.is_some() {
        return Err(duplicate_code());
    }

    let now = Utc::now();
    let model = invite::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        name: Set(name),
        max_uses: Set(new_invite.max_uses),
        used_count: Set(0),
        discord_id: Set(discord_id),
        invite_sent_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let created = model.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            duplicate_code()
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(
        "Invite {} created for {} with {} uses",
        created.code,
        created.name,
        created.max_uses
    );

    Ok(created)
}

/// All invites, newest first
pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<invite::Model>> {
    let invites = Invite::find()
        .order_by_desc(invite::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(invites)
}

/// Discord user ids are numeric snowflakes; handles cannot be messaged
pub fn parse_discord_id(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Discord ID must be numeric. Enable Developer Mode in Discord, right-click the user and select \"Copy User ID\".".to_string(),
        ));
    }
    Ok(id.to_string())
}

/// Claim the one-time send of an invite. Only the first caller gets the row back.
pub async fn mark_sent<C: ConnectionTrait>(db: &C, invite_id: Uuid) -> Result<Option<invite::Model>> {
    let now = Utc::now();
    let result = Invite::update_many()
        .col_expr(invite::Column::InviteSentAt, Expr::value(now))
        .col_expr(invite::Column::UpdatedAt, Expr::value(now))
        .filter(invite::Column::Id.eq(invite_id))
        .filter(invite::Column::InviteSentAt.is_null())
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }
    Ok(Invite::find_by_id(invite_id).one(db).await?)
}

/// Release a claim whose send failed so it can be retried
pub async fn unmark_sent<C: ConnectionTrait>(db: &C, invite_id: Uuid) -> Result<()> {
    Invite::update_many()
        .col_expr(
            invite::Column::InviteSentAt,
            Expr::value(Option::<chrono::DateTime<Utc>>::None),
        )
        .filter(invite::Column::Id.eq(invite_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn get<C: ConnectionTrait>(db: &C, invite_id: Uuid) -> Result<invite::Model> {
    Invite::find_by_id(invite_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Invite not found".to_string()))
}

fn duplicate_code() -> AppError {
    AppError::Conflict("This invite code already exists. Try a different code.".to_string())
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
