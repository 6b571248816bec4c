//! Debounced focused-row reactions.
//!
//! A [`GridDebouncer`] turns a burst of focus changes (keyboard navigation,
//! mouse wheel scrolling through rows) into a single reaction once the
//! focus settles, typically loading details for the selected record.

mod config;
mod debouncer;

pub use config::DebounceConfig;
pub use debouncer::{GridDebouncer, GridDebouncerBuilder, ReactionOutcome};
