//! Pairs anonymous users for one-on-one chats and tracks each session until
//! one side ends it.
//!
//! The engine never talks to a transport. Every operation returns the
//! [`Directive`]s the transport should deliver.

pub mod activity;
pub mod admin;
pub mod config;
pub mod dictionary;
pub mod directives;
pub mod dispatch;
pub mod errors;
pub mod moderation;
pub mod persistence;
pub mod reaper;
pub mod reports;
pub mod session;
pub mod types;

pub use admin::{AdminCommand, AdminConsole, AdminSession};
pub use config::EngineConfig;
pub use directives::{Directive, Notice, Payload};
pub use dispatch::{Action, Dispatcher};
pub use errors::Error;
pub use session::{SessionEngine, Stats, UserState, UserStatus};
pub use types::{Content, Timestamp, UserId};
