use crate::{
    errors::Error,
    session::{Stats, UserStatus},
    types::{Content, UserId},
};

use serde::{Deserialize, Serialize};

use strum::{AsRefStr, Display, EnumString};

/// Kind of outbound message, rendered by the transport.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Notice {
    Searching,
    PartnerFound,
    AlreadyQueued,
    AlreadyPaired,
    Stopped,
    PartnerLeft,
    FeedbackRequest,
    FeedbackThanks,
    LeftQueue,
    NotInChatOrQueue,
    NotInChat,

    Blocked,
    BlockedForBehavior,
    ContentWarning,
    PartnerDisconnected,
    SessionExpired,

    LinkCooldown,
    NoUsername,
    ProfileLink,
    LinkSent,

    ReportFiled,
    Reported,

    Relay,
    PartnerUnreachable,

    YourId,
    Failure,

    Unauthorized,
    InvalidTarget,
    AdminPanel,
    PromptBroadcast,
    PromptBlock,
    PromptUnblock,
    Cancelled,
    UserBlocked,
    UserUnblocked,
    NotBlocked,
    Stats,
    Reports,
    BlockedList,
    UserStatus,
    Broadcast,
    BroadcastComplete,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    None,
    Text(String),
    Forward { from: UserId, content: Content },
    Seconds(u64),
    User(UserId),
    Stats(Stats),
    Reports(Vec<(UserId, String)>),
    Users(Vec<UserId>),
    Tally { success: usize, failure: usize },
    Status(UserStatus),
}

impl Default for Payload {
    fn default() -> Self {
        Self::None
    }
}

/// One message the transport should deliver.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Directive {
    pub recipient: UserId,
    pub notice: Notice,

    #[serde(default)]
    pub payload: Payload,
}

impl Directive {
    pub fn new(recipient: UserId, notice: Notice, payload: Payload) -> Self {
        Self {
            recipient,
            notice,
            payload,
        }
    }

    pub fn notice(recipient: UserId, notice: Notice) -> Self {
        Self::new(recipient, notice, Payload::None)
    }

    /// Tell the requester why nothing happened.
    pub fn rejection(recipient: UserId, error: &Error) -> Self {
        let payload = match error {
            Error::LinkCooldownActive(seconds) => Payload::Seconds(*seconds),
            Error::DeliveryFailure(user) => Payload::User(*user),
            _ => Payload::None,
        };

        Self::new(recipient, error.notice(), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_names() {
        assert_eq!(Notice::PartnerFound.to_string(), "partner_found");
        assert_eq!("session_expired".parse::<Notice>().unwrap(), Notice::SessionExpired);
    }

    #[test]
    fn cooldown_rejection_carries_seconds() {
        let directive = Directive::rejection(UserId(1), &Error::LinkCooldownActive(12));

        assert_eq!(directive.notice, Notice::LinkCooldown);
        assert_eq!(directive.payload, Payload::Seconds(12));
    }

    #[test]
    fn json_shape() {
        let directive = Directive::new(UserId(7), Notice::YourId, Payload::User(UserId(7)));

        let json = serde_json::to_value(&directive).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "recipient": 7,
                "notice": "your_id",
                "payload": { "type": "user", "value": 7 }
            })
        );
    }
}
