//! Application orchestration: state, the browse runtime, event plumbing and
//! input handling.

pub mod browse;
pub mod event;
pub mod handler;
pub mod picker;
pub mod state;
