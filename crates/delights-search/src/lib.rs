//! Debounced search state for a single results screen.
//!
//! [`QueryController`] owns the query/pagination state, coalesces rapid
//! query edits into one fetch, and applies only the newest completion.
//! [`PageControls`] derives what a pagination bar should offer.

pub mod controller;
pub mod pagination;

pub use controller::{ControllerEvent, ControllerSettings, FetchStatus, QueryController};
pub use pagination::PageControls;
