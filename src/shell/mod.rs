//! Shell integration helpers.
//!
//! The binary communicates with the calling shell through **stdout**.
//! All TUI rendering goes to the alternate screen (stderr-backed), so stdout
//! is reserved for the result: the selected working directory that the
//! shell wrapper will `cd` into.

pub mod integration;
