//! Profiles mirror the identity provider's users

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::profile;
use crate::services::security::Claims;

/// Create or refresh the profile from token claims.
///
/// Identity attributes are overwritten on every sign-in; `role` is never
/// touched here.
pub async fn upsert_from_claims<C: ConnectionTrait>(
    db: &C,
    claims: &Claims,
) -> Result<profile::Model> {
    let user_id = claims.user_id()?;
    let now = Utc::now();
    let metadata = &claims.user_metadata;

    let row = profile::ActiveModel {
        id: Set(user_id),
        discord_username: Set(metadata.display_name().map(str::to_string)),
        discord_id: Set(metadata.provider_id.clone()),
        avatar_url: Set(metadata.avatar_url.clone()),
        email: Set(claims.email.clone()),
        role: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Profile::insert(row)
        .on_conflict(
            OnConflict::column(profile::Column::Id)
                .update_columns([
                    profile::Column::DiscordUsername,
                    profile::Column::DiscordId,
                    profile::Column::AvatarUrl,
                    profile::Column::Email,
                    profile::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    get(db, user_id).await
}

pub async fn find<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Option<profile::Model>> {
    let found = Profile::find_by_id(user_id).one(db).await?;
    Ok(found)
}

pub async fn get<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<profile::Model> {
    find(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}
