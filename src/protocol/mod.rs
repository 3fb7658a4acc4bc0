//! Wire protocol: message shapes, input validation, and lobby id generation.

pub mod lobby_codes;
pub mod messages;
pub mod validation;

pub use messages::{ClientEvent, Outbound, Recipient, ServerEvent};
