use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

/// Stable identifier of a user, as handed out by the transport.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().parse::<i64>()?;

        Ok(Self(id))
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Reference to an inbound message.
///
/// The engine never inspects media, it only keeps enough to let the
/// transport copy the original message to the partner.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub message_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Content {
    pub fn text(message_id: i64, text: impl Into<String>) -> Self {
        Self {
            message_id,
            text: Some(text.into()),
            caption: None,
        }
    }

    /// Text and caption, the parts a dictionary can look at.
    pub fn readable(&self) -> impl Iterator<Item = &str> {
        self.text.iter().chain(self.caption.iter()).map(String::as_str)
    }
}
