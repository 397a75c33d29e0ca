//! Serial command protocol.
//!
//! One command per line, selected by its first non-blank character; one reply
//! line per accepted command.

mod banner;
mod command;
mod engine;
mod reply;

pub use banner::Banner;
pub use command::{Command, UppercaseX};
pub use engine::ProtocolEngine;
pub use reply::{AxisAction, Reply};
