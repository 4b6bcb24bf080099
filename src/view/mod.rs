//! Everything between installed datasets and what the user sees.
//!
//! - [`sort`]: column comparator and stable sorts
//! - [`filter`]: free-text search term
//! - [`window`]: growing visible prefix
//! - [`coordinator`]: the event-driven state machine tying them together
//! - [`session`]: async driver running coordinator effects against a backend

pub mod coordinator;
pub mod filter;
pub mod session;
pub mod sort;
pub mod window;

pub use coordinator::{
    Coordinator, CoordinatorSettings, Effect, Page, SortRequest, Stats, Status, ViewEvent,
    ViewState,
};
pub use session::Session;
pub use sort::{SortDirection, SortSpec};
pub use window::WindowConfig;
