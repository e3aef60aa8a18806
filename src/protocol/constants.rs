use std::time::Duration;

// Service endpoints, relative to the service base URL
pub const PATH_REGISTER: &str = "api/registermatching";
pub const PATH_UNREGISTER: &str = "api/unregistermatching";
pub const PATH_POLL_MATCH: &str = "api/getmatchroom";
pub const PATH_CONFIRM: &str = "api/confirmmatching";
pub const PATH_CANCEL_CONFIRM: &str = "api/cancelconfirm";
pub const PATH_POLL_COMPLETION: &str = "api/getmatchcompleted";
pub const PATH_POPULAR_TOPICS: &str = "api/populartopics";
pub const PATH_SEARCH_TOPICS: &str = "api/searchtopics";
pub const PATH_CREATE_TOPIC: &str = "api/createtopic";

// Anti-forgery header carried on every POST
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";

// Topic name limits
pub const MAX_TOPIC_LEN: usize = 255;
pub const TOPIC_DISPLAY_LEN: usize = 30;

// Protocol timing
pub const MATCH_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const COMPLETION_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const CONFIRM_WINDOW: Duration = Duration::from_millis(10000);
pub const COUNTDOWN_TICK: Duration = Duration::from_millis(100);
pub const COUNTDOWN_DECAY: f64 = 1.1;          // Bar empties slightly before the window closes
