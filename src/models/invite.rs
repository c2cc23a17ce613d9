use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Stored upper-cased and trimmed
    #[sea_orm(unique)]
    pub code: String,
    /// Who the invite was made for
    pub name: String,
    pub max_uses: i32,
    pub used_count: i32,
    /// Numeric Discord user id the code is sent to
    pub discord_id: Option<String>,
    /// Set once the code has been sent; it is never sent twice
    pub invite_sent_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_remaining_uses(&self) -> bool {
        self.used_count < self.max_uses
    }

    pub fn remaining_uses(&self) -> i32 {
        (self.max_uses - self.used_count).max(0)
    }

    pub fn was_sent(&self) -> bool {
        self.invite_sent_at.is_some()
    }
}
