mod request;
mod messages;
mod topic;
pub mod constants;

pub use request::*;
pub use messages::*;
pub use topic::*;
pub use constants::*;
