mod discord;
mod email;

pub use discord::DiscordProvider;
pub use email::EmailProvider;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::notifications::NotificationsConfig;
use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceStatus;
use crate::models::prelude::*;
use crate::models::{event, invite, profile};
use crate::services::{calendar, invites};

pub const APPROVAL_SUBJECT: &str = "We're delighted to have you joining us for ADOS!";
pub const INVITE_SUBJECT: &str = "You're invited to ADOS!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Email,
    Discord,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Email => "email",
            ChannelType::Discord => "discord",
        }
    }

    /// Where this channel reaches the applicant, if the profile has it
    pub fn destination(&self, profile: &profile::Model) -> Option<String> {
        let value = match self {
            ChannelType::Email => profile.email.as_deref(),
            ChannelType::Discord => profile.discord_id.as_deref(),
        };
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub recipient: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    pub success: bool,
    pub error: Option<String>,
}

impl SendResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait NotificationProvider: Send + Sync {
    fn channel_type(&self) -> ChannelType;
    async fn send(&self, message: &NotificationMessage) -> SendResult;
}

/// Outcome of one channel for one approval
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub channel: ChannelType,
    pub result: SendResult,
}

/// Sends approval confirmations through every configured channel
#[derive(Clone, Default)]
pub struct NotificationService {
    providers: Arc<Vec<Arc<dyn NotificationProvider>>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &NotificationsConfig) -> Self {
        let mut providers: Vec<Arc<dyn NotificationProvider>> = Vec::new();

        if let Some(smtp) = &config.smtp {
            match EmailProvider::from_config(smtp) {
                Ok(provider) => {
                    tracing::info!("Email notification provider initialized ({})", smtp.host);
                    providers.push(Arc::new(provider));
                }
                Err(e) => tracing::warn!("Email notifications disabled: {}", e),
            }
        }

        if let Some(token) = &config.discord_bot_token {
            tracing::info!("Discord notification provider initialized");
            providers.push(Arc::new(DiscordProvider::new(token.clone())));
        }

        if providers.is_empty() {
            tracing::info!("No notification channels configured");
        }

        Self {
            providers: Arc::new(providers),
        }
    }

    pub fn with_providers(providers: Vec<Arc<dyn NotificationProvider>>) -> Self {
        Self {
            providers: Arc::new(providers),
        }
    }

    pub fn channels(&self) -> Vec<ChannelType> {
        self.providers.iter().map(|p| p.channel_type()).collect()
    }

    /// Confirm an approval to the applicant.
    ///
    /// Channels without a destination on the profile are skipped. Per-channel
    /// failures are reported in the result, not raised.
    pub async fn notify_approved(
        &self,
        db: &DatabaseConnection,
        attendance_id: Uuid,
    ) -> Result<Vec<Delivery>> {
        let attendance = Attendance::find_by_id(attendance_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Attendance not found".to_string()))?;

        if attendance.status() != AttendanceStatus::Approved {
            tracing::debug!(
                "Attendance {} is {}, skipping approval notification",
                attendance_id,
                attendance.status
            );
            return Ok(Vec::new());
        }

        let profile = Profile::find_by_id(attendance.user_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
        let event = Event::find_by_id(attendance.event_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let body = approval_body(&profile, &event);

        let sends = self.providers.iter().filter_map(|provider| {
            let channel = provider.channel_type();
            let Some(recipient) = channel.destination(&profile) else {
                tracing::debug!("Profile {} has no {} destination", profile.id, channel);
                return None;
            };

            let message = NotificationMessage {
                recipient,
                title: APPROVAL_SUBJECT.to_string(),
                body: body.clone(),
            };
            Some(async move {
                let result = provider.send(&message).await;
                Delivery { channel, result }
            })
        });

        // Channels are independent of each other
        let deliveries = join_all(sends).await;

        for delivery in &deliveries {
            if delivery.result.success {
                tracing::info!(
                    "Approval for attendance {} sent via {}",
                    attendance_id,
                    delivery.channel
                );
            } else {
                tracing::warn!(
                    "Approval for attendance {} failed via {}: {}",
                    attendance_id,
                    delivery.channel,
                    delivery.result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Ok(deliveries)
    }

    /// Send an invite's code to its invitee by Discord DM, at most once.
    ///
    /// The send is claimed before delivery so two admins cannot both send it.
    /// A failed delivery releases the claim.
    pub async fn notify_invite(
        &self,
        db: &DatabaseConnection,
        invite_id: Uuid,
    ) -> Result<invite::Model> {
        let invite = invites::get(db, invite_id).await?;
        if let Some(sent_at) = invite.invite_sent_at {
            return Err(already_sent(sent_at));
        }
        let discord_id = invite
            .discord_id
            .as_deref()
            .ok_or_else(|| AppError::NotFound("Discord ID not set for this invite".to_string()))
            .and_then(invites::parse_discord_id)?;

        let provider = self
            .providers
            .iter()
            .find(|p| p.channel_type() == ChannelType::Discord)
            .ok_or_else(|| {
                AppError::ServiceUnavailable("Discord notifications are not configured".to_string())
            })?;

        // Another admin may have sent it since the read above
        let claimed = invites::mark_sent(db, invite.id)
            .await?
            .ok_or_else(|| AppError::Conflict("Invite notification already sent".to_string()))?;

        let message = NotificationMessage {
            recipient: discord_id.clone(),
            title: INVITE_SUBJECT.to_string(),
            body: invite_body(&invite),
        };
        let result = provider.send(&message).await;

        if !result.success {
            let error = result.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!("Invite {} failed via discord: {}", invite.code, error);
            invites::unmark_sent(db, invite.id).await?;
            return Err(AppError::Internal(format!(
                "Failed to send Discord invite: {}",
                error
            )));
        }

        tracing::info!("Invite {} sent to Discord ID {}", invite.code, discord_id);
        Ok(claimed)
    }

    /// Fire-and-forget [`notify_approved`](Self::notify_approved). Errors are logged only.
    pub fn dispatch_approval(
        &self,
        db: DatabaseConnection,
        attendance_id: Uuid,
    ) -> tokio::task::JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.notify_approved(&db, attendance_id).await {
                tracing::warn!(
                    "Approval notification for attendance {} failed: {}",
                    attendance_id,
                    e
                );
            }
        })
    }
}

fn approval_body(profile: &profile::Model, event: &event::Model) -> String {
    let greeting = profile.discord_username.as_deref().unwrap_or("there");
    let mut body = format!(
        "Hey {}!\n\nYou're in! We're delighted to have you joining us for {}.",
        greeting, event.name
    );

    if let Some(location) = &event.location {
        body.push_str(&format!("\n\nLocation: {}", location));
    }
    if let Some(date) = event.date {
        body.push_str(&format!("\nDate: {}", date.format("%B %-d, %Y")));
    }
    if event.slug == calendar::ADOS_2025_SLUG {
        body.push_str(&format!(
            "\n\nAdd it to your calendar: {}{}",
            CONFIG.server.public_url,
            calendar::ADOS_2025_PATH
        ));
    }

    body.push_str("\n\nMore details soon. See you there!");
    body
}

fn already_sent(sent_at: chrono::DateTime<chrono::Utc>) -> AppError {
    AppError::Conflict(format!(
        "Invite notification already sent at {}",
        sent_at.to_rfc3339()
    ))
}

fn invite_body(invite: &invite::Model) -> String {
    format!(
        "Hey friend!\n\n**{}** has invited you to ADOS!\n\nYour invite code: **{}**\n\n\
         To RSVP, sign in and apply with your code: {}\n\nSee you there!",
        invite.name,
        invite.code,
        invites::share_url(&invite.code)
    )
}
