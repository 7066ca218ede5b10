//! Notification messages and the sections that list them.

mod message;
mod section;

pub use message::{BodyState, Message, MessageSignal};
pub use section::{MessageListSection, MessageSnapshot, MovePhase, SectionSignal, SectionSnapshot};
