//! Test backends for the tickstore service.
//!
//! - [`InMemoryBackend`] stores points and evaluates latest and chart queries itself.
//! - [`ScriptedBackend`] answers from behaviors set through a [`ScriptController`],
//!   and records every call it receives.
#![warn(missing_docs)]

mod memory;
mod scripted;

pub use memory::InMemoryBackend;
pub use scripted::{MockBehavior, QueryShape, ScriptController, ScriptedBackend};
