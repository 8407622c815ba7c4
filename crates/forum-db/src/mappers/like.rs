//! Like entity <-> model mapper

use forum_core::{Actor, DomainError, LikeChange, LikeChangeKind, LikeRecord, PostId};

use crate::models::{LikeModel, LikeNotification};

/// Convert a stored row back into a LikeRecord
impl TryFrom<LikeModel> for LikeRecord {
    type Error = DomainError;

    fn try_from(model: LikeModel) -> Result<Self, Self::Error> {
        let actor = Actor::from_parts(model.user_id, model.guest_session_id)?;
        if actor.is_verified() != model.is_verified {
            return Err(DomainError::Internal(format!(
                "is_verified mismatch for like on {}",
                model.post_id
            )));
        }

        Ok(LikeRecord {
            post_id: PostId::parse(model.post_id)?,
            actor,
            created_at: model.created_at,
        })
    }
}

/// Column values for inserting a LikeRecord
pub struct LikeInsert<'a> {
    pub post_id: &'a str,
    pub user_id: Option<&'a str>,
    pub guest_session_id: Option<&'a str>,
    pub is_verified: bool,
}

impl<'a> LikeInsert<'a> {
    pub fn new(record: &'a LikeRecord) -> Self {
        Self {
            post_id: record.post_id.as_str(),
            user_id: record.actor.user_id(),
            guest_session_id: record.actor.guest_session_id(),
            is_verified: record.is_verified(),
        }
    }
}

impl LikeNotification {
    /// Map the trigger payload to a change, or `None` for payloads we do not understand
    pub fn into_change(self) -> Option<LikeChange> {
        let kind = match self.op.as_str() {
            "INSERT" => LikeChangeKind::Inserted,
            "DELETE" => LikeChangeKind::Deleted,
            // Likes are never updated in place; treat it as a reason to reload
            "UPDATE" => LikeChangeKind::Resync,
            _ => return None,
        };
        let post_id = PostId::parse(self.post_id).ok()?;
        Some(LikeChange::new(post_id, kind))
    }
}
