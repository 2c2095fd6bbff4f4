//! TUI widgets
//!
//! - `ScrollList` - list driven by a [`ListCursor`](crate::tui::ListCursor)
//! - `DiffView` - diff text with added/removed/hunk highlighting

mod diff_view;
mod scroll_list;

pub use diff_view::*;
pub use scroll_list::*;
