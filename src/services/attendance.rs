//! Attendance workflow
//!
//! Creates and updates a user's application to an event together with its
//! answers, applying and consuming an invite code when one is presented.
//! Every write path runs in one transaction so a failure leaves neither a
//! half-written answer set nor a consumed invite behind.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceStatus;
use crate::models::prelude::*;
use crate::models::{answer, attendance, event, invite, profile};
use crate::services::invites::{self, is_unique_violation, InviteRejection};
use crate::services::questionnaire::SubmissionEntry;

/// What happened to the invite code that came with a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InviteOutcome {
    NotPresented,
    /// The code was consumed and the attendance was approved
    Applied { code: String, name: String },
    /// The code was refused; the application was still recorded as pending
    Rejected { code: String, reason: InviteRejection },
    /// An attendance already existed, so the code was neither checked nor consumed
    Unused { code: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub attendance: attendance::Model,
    /// False when an existing attendance had its answers replaced
    pub created: bool,
    pub invite: InviteOutcome,
    pub answers_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome {
    pub attendance: attendance::Model,
    pub previous: AttendanceStatus,
    /// False when the requested status was already the current one
    pub changed: bool,
}

pub async fn find_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<Option<attendance::Model>> {
    let found = Attendance::find()
        .filter(attendance::Column::UserId.eq(user_id))
        .filter(attendance::Column::EventId.eq(event_id))
        .one(db)
        .await?;
    Ok(found)
}

pub async fn get<C: ConnectionTrait>(db: &C, attendance_id: Uuid) -> Result<attendance::Model> {
    Attendance::find_by_id(attendance_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance not found".to_string()))
}

pub async fn answers_for<C: ConnectionTrait>(
    db: &C,
    attendance_id: Uuid,
) -> Result<Vec<answer::Model>> {
    let answers = Answer::find()
        .filter(answer::Column::AttendanceId.eq(attendance_id))
        .all(db)
        .await?;
    Ok(answers)
}

/// A user's attendances across events, most recent first
pub async fn list_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<(attendance::Model, Option<event::Model>)>> {
    let rows = Attendance::find()
        .filter(attendance::Column::UserId.eq(user_id))
        .order_by_desc(attendance::Column::AppliedAt)
        .find_also_related(Event)
        .all(db)
        .await?;
    Ok(rows)
}

/// Review queue for one event, optionally narrowed to one status
pub async fn list_for_event<C: ConnectionTrait>(
    db: &C,
    event_id: Uuid,
    status: Option<AttendanceStatus>,
) -> Result<Vec<(attendance::Model, Option<profile::Model>)>> {
    let mut query = Attendance::find().filter(attendance::Column::EventId.eq(event_id));
    if let Some(status) = status {
        query = query.filter(attendance::Column::Status.eq(status.as_str()));
    }

    let rows = query
        .order_by_asc(attendance::Column::AppliedAt)
        .find_also_related(Profile)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn count_for_event<C: ConnectionTrait>(
    db: &C,
    event_id: Uuid,
    status: Option<AttendanceStatus>,
) -> Result<u64> {
    let mut query = Attendance::find().filter(attendance::Column::EventId.eq(event_id));
    if let Some(status) = status {
        query = query.filter(attendance::Column::Status.eq(status.as_str()));
    }
    Ok(query.count(db).await?)
}

/// How a presented invite bears on a first submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteUse {
    /// A refused code still records the application as pending
    Optional,
    /// The answers were collected on the strength of the invite, so the
    /// submission fails unless the invite applies
    Required,
}

/// Where the existing-attendance check comes from
#[derive(Debug, Clone, Copy)]
enum Lookup {
    InTransaction,
    /// A read taken before a concurrent first submission committed
    #[cfg(test)]
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct Attempt<'a> {
    user_id: Uuid,
    event_id: Uuid,
    answers: &'a [SubmissionEntry],
    invite_code: Option<&'a str>,
    invite_use: InviteUse,
}

/// Record a submission.
///
/// A first submission creates the attendance: approved when the presented
/// invite validates and is consumed, pending otherwise. A repeat submission
/// replaces the answer set and leaves status and invite untouched.
pub async fn submit(
    db: &DatabaseConnection,
    user_id: Uuid,
    event_id: Uuid,
    answers: &[SubmissionEntry],
    invite_code: Option<&str>,
) -> Result<SubmissionOutcome> {
    submit_with(db, user_id, event_id, answers, invite_code, InviteUse::Optional).await
}

/// Like [`submit`], but a presented invite that no longer applies is a
/// conflict instead of a pending application.
pub async fn submit_with(
    db: &DatabaseConnection,
    user_id: Uuid,
    event_id: Uuid,
    answers: &[SubmissionEntry],
    invite_code: Option<&str>,
    invite_use: InviteUse,
) -> Result<SubmissionOutcome> {
    let attempt = Attempt {
        user_id,
        event_id,
        answers,
        invite_code,
        invite_use,
    };
    let first = submit_once(db, attempt, Lookup::InTransaction).await;
    retry_as_update(db, attempt, first).await
}

async fn retry_as_update(
    db: &DatabaseConnection,
    attempt: Attempt<'_>,
    first: Result<SubmissionOutcome>,
) -> Result<SubmissionOutcome> {
    match first {
        Err(AppError::DuplicateAttendance) => {
            // A concurrent submission created the row first; ours becomes an update
            tracing::info!(
                "Concurrent first submission for user {} on event {}, retrying as update",
                attempt.user_id,
                attempt.event_id
            );
            submit_once(db, attempt, Lookup::InTransaction).await
        }
        other => other,
    }
}

fn invite_no_longer_applies(code: &str) -> AppError {
    AppError::Conflict(format!(
        "Invite code {} can no longer be applied, answer every question to apply without it",
        invites::normalize_code(code)
    ))
}

async fn submit_once(
    db: &DatabaseConnection,
    attempt: Attempt<'_>,
    lookup: Lookup,
) -> Result<SubmissionOutcome> {
    let Attempt {
        user_id,
        event_id,
        answers,
        invite_code,
        invite_use,
    } = attempt;
    let presented = invite_code
        .map(str::trim)
        .filter(|code| !code.is_empty());

    let txn = db.begin().await?;

    let existing = match lookup {
        Lookup::InTransaction => find_for_user(&txn, user_id, event_id).await?,
        #[cfg(test)]
        Lookup::Stale => None,
    };

    let outcome = match existing {
        Some(existing) => {
            if let (InviteUse::Required, None, Some(code)) =
                (invite_use, existing.invite_code.as_ref(), presented)
            {
                return Err(invite_no_longer_applies(code));
            }
            let answers_written = replace_answers(&txn, existing.id, answers).await?;
            SubmissionOutcome {
                attendance: existing,
                created: false,
                invite: match presented {
                    Some(code) => InviteOutcome::Unused {
                        code: invites::normalize_code(code),
                    },
                    None => InviteOutcome::NotPresented,
                },
                answers_written,
            }
        }
        None => {
            let (applied, invite_outcome) = match presented {
                Some(code) => apply_invite(&txn, code).await?,
                None => (None, InviteOutcome::NotPresented),
            };
            if let (InviteUse::Required, InviteOutcome::Rejected { code, .. }) =
                (invite_use, &invite_outcome)
            {
                return Err(invite_no_longer_applies(code));
            }
            let created = insert_attendance(&txn, user_id, event_id, applied.as_ref()).await?;
            let answers_written = replace_answers(&txn, created.id, answers).await?;
            SubmissionOutcome {
                attendance: created,
                created: true,
                invite: invite_outcome,
                answers_written,
            }
        }
    };

    txn.commit().await?;

    tracing::info!(
        "Submission for user {} on event {}: created={} status={} answers={}",
        user_id,
        event_id,
        outcome.created,
        outcome.attendance.status,
        outcome.answers_written
    );

    Ok(outcome)
}

/// Validate and consume the code; rejections are reported, not raised.
async fn apply_invite<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<(Option<invite::Model>, InviteOutcome)> {
    let consumed = match invites::validate(db, code).await {
        Ok(valid) => invites::consume(db, &valid).await,
        Err(e) => Err(e),
    };

    match consumed {
        Ok(invite) => {
            let outcome = InviteOutcome::Applied {
                code: invite.code.clone(),
                name: invite.name.clone(),
            };
            Ok((Some(invite), outcome))
        }
        Err(e) => match InviteRejection::from_error(&e) {
            Some(reason) => {
                tracing::info!("Invite {} rejected at submission: {}", code, reason);
                Ok((
                    None,
                    InviteOutcome::Rejected {
                        code: invites::normalize_code(code),
                        reason,
                    },
                ))
            }
            None => Err(e),
        },
    }
}

/// Shortcut for invitees: approve the user from an invite alone.
///
/// Unlike [`submit`], a refused invite is an error. An existing attendance is
/// returned as-is and the invite is left untouched.
pub async fn redeem(
    db: &DatabaseConnection,
    user_id: Uuid,
    event_id: Uuid,
    invite_code: &str,
) -> Result<SubmissionOutcome> {
    let first = redeem_once(db, user_id, event_id, invite_code, Lookup::InTransaction).await;
    recover_redeem(db, user_id, event_id, invite_code, first).await
}

/// A lost race rolled back our consume; report the winner's row instead
async fn recover_redeem(
    db: &DatabaseConnection,
    user_id: Uuid,
    event_id: Uuid,
    invite_code: &str,
    first: Result<SubmissionOutcome>,
) -> Result<SubmissionOutcome> {
    match first {
        Err(AppError::DuplicateAttendance) => {
            let existing = find_for_user(db, user_id, event_id)
                .await?
                .ok_or(AppError::DuplicateAttendance)?;
            tracing::info!(
                "Concurrent redeem for user {} on event {}, keeping attendance {}",
                user_id,
                event_id,
                existing.id
            );
            Ok(SubmissionOutcome {
                attendance: existing,
                created: false,
                invite: InviteOutcome::Unused {
                    code: invites::normalize_code(invite_code),
                },
                answers_written: 0,
            })
        }
        other => other,
    }
}

async fn redeem_once(
    db: &DatabaseConnection,
    user_id: Uuid,
    event_id: Uuid,
    invite_code: &str,
    lookup: Lookup,
) -> Result<SubmissionOutcome> {
    let txn = db.begin().await?;

    let existing = match lookup {
        Lookup::InTransaction => find_for_user(&txn, user_id, event_id).await?,
        #[cfg(test)]
        Lookup::Stale => None,
    };
    if let Some(existing) = existing {
        txn.commit().await?;
        return Ok(SubmissionOutcome {
            attendance: existing,
            created: false,
            invite: InviteOutcome::Unused {
                code: invites::normalize_code(invite_code),
            },
            answers_written: 0,
        });
    }

    let valid = invites::validate(&txn, invite_code).await?;
    let consumed = invites::consume(&txn, &valid).await?;
    let created = insert_attendance(&txn, user_id, event_id, Some(&consumed)).await?;

    txn.commit().await?;

    tracing::info!(
        "User {} approved for event {} by invite {}",
        user_id,
        event_id,
        consumed.code
    );

    Ok(SubmissionOutcome {
        attendance: created,
        created: true,
        invite: InviteOutcome::Applied {
            code: consumed.code,
            name: consumed.name,
        },
        answers_written: 0,
    })
}

/// Administrator status change.
///
/// Requesting the current status is a no-op. The update is conditional on the
/// status read here so two reviewers cannot both win.
pub async fn transition<C: ConnectionTrait>(
    db: &C,
    attendance_id: Uuid,
    to: AttendanceStatus,
    reviewer_id: Uuid,
    notes: Option<String>,
) -> Result<TransitionOutcome> {
    let current = get(db, attendance_id).await?;
    let from = current.status();

    if from == to {
        return Ok(TransitionOutcome {
            attendance: current,
            previous: from,
            changed: false,
        });
    }

    if !from.can_transition_to(to) {
        return Err(AppError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let mut update = Attendance::update_many()
        .col_expr(attendance::Column::Status, Expr::value(to.as_str()))
        .col_expr(attendance::Column::ReviewedAt, Expr::value(Utc::now()))
        .col_expr(attendance::Column::ReviewedBy, Expr::value(reviewer_id));
    if let Some(notes) = notes {
        update = update.col_expr(attendance::Column::Notes, Expr::value(notes));
    }

    let result = update
        .filter(attendance::Column::Id.eq(attendance_id))
        .filter(attendance::Column::Status.eq(current.status.clone()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::Conflict(
            "Attendance was updated by someone else, reload and try again".to_string(),
        ));
    }

    let updated = get(db, attendance_id).await?;

    tracing::info!(
        "Attendance {} moved from {} to {} by {}",
        attendance_id,
        from,
        to,
        reviewer_id
    );

    Ok(TransitionOutcome {
        attendance: updated,
        previous: from,
        changed: true,
    })
}

async fn insert_attendance<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    event_id: Uuid,
    invite: Option<&invite::Model>,
) -> Result<attendance::Model> {
    let status = if invite.is_some() {
        AttendanceStatus::Approved
    } else {
        AttendanceStatus::Pending
    };

    let model = attendance::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        event_id: Set(event_id),
        status: Set(status.as_str().to_string()),
        applied_at: Set(Utc::now()),
        reviewed_at: Set(None),
        reviewed_by: Set(None),
        notes: Set(None),
        invite_code: Set(invite.map(|i| i.code.clone())),
    };

    model.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            AppError::DuplicateAttendance
        } else {
            AppError::Database(e)
        }
    })
}

/// Replace the full answer set of an attendance.
///
/// Later entries for the same question win but keep the first entry's position.
async fn replace_answers<C: ConnectionTrait>(
    db: &C,
    attendance_id: Uuid,
    answers: &[SubmissionEntry],
) -> Result<usize> {
    Answer::delete_many()
        .filter(answer::Column::AttendanceId.eq(attendance_id))
        .exec(db)
        .await?;

    let mut deduped: Vec<&SubmissionEntry> = Vec::with_capacity(answers.len());
    for entry in answers {
        match deduped.iter_mut().find(|e| e.question_id == entry.question_id) {
            Some(slot) => *slot = entry,
            None => deduped.push(entry),
        }
    }

    if deduped.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let rows: Vec<answer::ActiveModel> = deduped
        .iter()
        .map(|entry| answer::ActiveModel {
            id: Set(Uuid::new_v4()),
            attendance_id: Set(attendance_id),
            question_id: Set(entry.question_id),
            answer_text: Set(entry.answer_text.clone()),
            created_at: Set(now),
        })
        .collect();
    let written = rows.len();

    Answer::insert_many(rows).exec(db).await?;

    Ok(written)
}
