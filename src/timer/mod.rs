mod poller;
mod deadline;

pub use poller::{Poller, ProbeOutcome};
pub use deadline::{Countdown, DeadlineTimer};
