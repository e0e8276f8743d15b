//! Core logic – the selected path value and directory scanning.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod fs;
pub mod path;
pub mod tree;
