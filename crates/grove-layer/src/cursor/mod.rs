//! Group cursor and its scan strategies.

mod group_cursor;
mod scan;
mod stats;

pub use group_cursor::{CursorState, GroupCursor};
pub use stats::ScanStats;
