pub mod daemon;
pub mod moderation;
