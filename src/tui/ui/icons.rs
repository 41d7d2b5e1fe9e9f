//! Glyphs used throughout the UI.

// Priority icons (signal bar style)
pub const PRIORITY_NONE: &str = "╌╌╌";
pub const PRIORITY_URGENT: &str = "⚠!"; // drawn on a red background
pub const PRIORITY_HIGH: &str = "▮▮▮";
pub const PRIORITY_MEDIUM: &str = "▮▮╌";
pub const PRIORITY_LOW: &str = "▮╌╌";

// Workflow state types - fractional circles like the Linear app
pub const STATUS_TRIAGE: &str = "◇";
pub const STATUS_BACKLOG: &str = "○";
pub const STATUS_UNSTARTED: &str = "◔";
pub const STATUS_STARTED: &str = "◑";
pub const STATUS_COMPLETED: &str = "●";
pub const STATUS_CANCELED: &str = "⊘";
pub const STATUS_UNKNOWN: &str = "◌";

// Selection markers
pub const CURSOR: &str = "▶";
pub const SELECT_LEFT: &str = "◄";
pub const SELECT_RIGHT: &str = "►";

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
