use crate::{directives::Notice, types::UserId};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    IO(#[from] std::io::Error),

    #[error("Json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Strangers: Cannot search, already in a chat")]
    AlreadyPaired,

    #[error("Strangers: Cannot search, already in the waiting queue")]
    AlreadyQueued,

    #[error("Strangers: Not in a chat or queue")]
    NotInSessionOrQueue,

    #[error("Strangers: Not in a chat")]
    NotInSession,

    #[error("Strangers: User is blocked")]
    UserBlocked,

    #[error("Strangers: Link unavailable for {0} more seconds")]
    LinkCooldownActive(u64),

    #[error("Strangers: User has no publishable identity")]
    NoPublishableIdentity,

    #[error("Strangers: Cannot deliver to {0}")]
    DeliveryFailure(UserId),

    #[error("Strangers: Invalid user id")]
    InvalidAdminTarget,

    #[error("Strangers: Unauthorized access")]
    Unauthorized,
}

impl Error {
    /// The notice a requester receives when its action was rejected.
    pub fn notice(&self) -> Notice {
        match self {
            Error::IO(_) | Error::Json(_) => Notice::Failure,
            Error::AlreadyPaired => Notice::AlreadyPaired,
            Error::AlreadyQueued => Notice::AlreadyQueued,
            Error::NotInSessionOrQueue => Notice::NotInChatOrQueue,
            Error::NotInSession => Notice::NotInChat,
            Error::UserBlocked => Notice::Blocked,
            Error::LinkCooldownActive(_) => Notice::LinkCooldown,
            Error::NoPublishableIdentity => Notice::NoUsername,
            Error::DeliveryFailure(_) => Notice::PartnerUnreachable,
            Error::InvalidAdminTarget => Notice::InvalidTarget,
            Error::Unauthorized => Notice::Unauthorized,
        }
    }
}
