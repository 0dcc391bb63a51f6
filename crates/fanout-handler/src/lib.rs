//! Fanout Handler
//!
//! Entry point of one invocation: normalize the incoming event, route it
//! against the output rules and copy the object to every destination.

pub mod handler;
pub mod orchestrator;

pub use handler::{handle, handle_request, route_event, Outcome};
pub use orchestrator::{process, TransferReport, UploadOutcome};
