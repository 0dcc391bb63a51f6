//! Core types for Fanout

mod event;
mod provider;
mod rule;

pub use event::*;
pub use provider::*;
pub use rule::*;
