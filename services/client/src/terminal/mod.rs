//! services/client/src/terminal/mod.rs
//!
//! The interactive terminal front end: line protocol, rendering and the
//! session control loop.

pub mod handler;
pub mod protocol;
pub mod render;

pub use handler::{run, Flow, TerminalSession};
