//! Reply rendering: display toggles, localized strings and the formatter.

mod formatter;
mod messages;
mod options;

pub use formatter::ReplyFormatter;
pub use messages::Messages;
pub use options::{DisplayOptions, Section};
