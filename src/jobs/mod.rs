//! Background lookup jobs triggered by new forum content.

mod lookup;
mod queue;

pub use lookup::{LookupOutcome, LookupService};
pub use queue::{LookupEvent, LookupQueue, MAX_ATTEMPTS};
