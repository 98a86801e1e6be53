//! Capability checks.
//!
//! `authorize` is the single place role and ownership rules live. Handlers
//! build an [`Action`] describing the resource facts they already loaded and
//! pass the request's [`Actor`] (or `None` for anonymous callers).

use thiserror::Error;
use uuid::Uuid;

use crate::models::user::UserRole;

/// The authenticated caller for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    fn is(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Operations subject to a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewPoll { owner: Uuid, is_public: bool },
    EditPoll { owner: Uuid },
    DeletePoll { owner: Uuid },
    SharePoll { owner: Uuid },
    ViewShareStats { owner: Uuid },
    DeleteShare { creator: Uuid },
    CommentOnPoll { owner: Uuid, is_public: bool },
    EditComment { author: Uuid },
    DeleteComment { author: Uuid },
    ModerateComments,
    ReportComment,
    ReactToComment,
    ViewAdminStats,
    ManageUsers,
    ChangeRole { target: Uuid },
}

/// Why an action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    /// No authenticated caller and the action needs one.
    #[error("{0}")]
    Unauthenticated(&'static str),
    /// Caller is known but lacks the capability.
    #[error("{0}")]
    Forbidden(&'static str),
    /// Caller must not learn the resource exists.
    #[error("{0}")]
    Hidden(&'static str),
    /// The request itself is not allowed (e.g. acting on oneself).
    #[error("{0}")]
    Invalid(&'static str),
}

const LOGIN_REQUIRED: &str = "Authentication required";

fn require_actor(actor: Option<&Actor>) -> Result<&Actor, AccessDenied> {
    actor.ok_or(AccessDenied::Unauthenticated(LOGIN_REQUIRED))
}

fn owner_only(
    actor: Option<&Actor>,
    owner: Uuid,
    message: &'static str,
) -> Result<(), AccessDenied> {
    let actor = require_actor(actor)?;
    if actor.is(owner) {
        Ok(())
    } else {
        Err(AccessDenied::Forbidden(message))
    }
}

fn at_least(
    actor: Option<&Actor>,
    role: UserRole,
    message: &'static str,
) -> Result<(), AccessDenied> {
    let actor = require_actor(actor)?;
    if actor.role.has_at_least(role) {
        Ok(())
    } else {
        Err(AccessDenied::Forbidden(message))
    }
}

/// Decides whether `actor` may perform `action`.
pub fn authorize(actor: Option<&Actor>, action: Action) -> Result<(), AccessDenied> {
    match action {
        Action::ViewPoll { owner, is_public } => {
            if is_public {
                return Ok(());
            }
            match actor {
                Some(a) if a.is(owner) || a.role.is_moderator() => Ok(()),
                _ => Err(AccessDenied::Hidden("Poll not found")),
            }
        }
        Action::EditPoll { owner } => owner_only(actor, owner, "You can only edit your own polls"),
        Action::DeletePoll { owner } => {
            owner_only(actor, owner, "Unauthorized to delete this poll")
        }
        Action::SharePoll { owner } => owner_only(actor, owner, "Unauthorized to share this poll"),
        Action::ViewShareStats { owner } => {
            owner_only(actor, owner, "Unauthorized to view share statistics")
        }
        Action::DeleteShare { creator } => {
            owner_only(actor, creator, "You can only delete share codes you created")
        }
        Action::CommentOnPoll { owner, is_public } => {
            let actor = require_actor(actor)?;
            if is_public || actor.is(owner) {
                Ok(())
            } else {
                Err(AccessDenied::Forbidden("You cannot comment on this poll"))
            }
        }
        Action::EditComment { author } => {
            owner_only(actor, author, "You can only edit your own comments")
        }
        Action::DeleteComment { author } => {
            let actor = require_actor(actor)?;
            if actor.is(author) || actor.role.is_moderator() {
                Ok(())
            } else {
                Err(AccessDenied::Forbidden(
                    "You can only delete your own comments",
                ))
            }
        }
        Action::ModerateComments => at_least(
            actor,
            UserRole::Moderator,
            "Moderator access required",
        ),
        Action::ReportComment | Action::ReactToComment => require_actor(actor).map(|_| ()),
        Action::ViewAdminStats => at_least(
            actor,
            UserRole::Moderator,
            "Moderator access required",
        ),
        Action::ManageUsers => at_least(actor, UserRole::Admin, "Admin access required"),
        Action::ChangeRole { target } => {
            at_least(actor, UserRole::Admin, "Admin access required")?;
            match actor {
                Some(a) if a.is(target) => {
                    Err(AccessDenied::Invalid("Cannot change your own role"))
                }
                _ => Ok(()),
            }
        }
    }
}

/// Convenience for call sites that only need a yes/no.
pub fn can(actor: Option<&Actor>, action: Action) -> bool {
    authorize(actor, action).is_ok()
}
