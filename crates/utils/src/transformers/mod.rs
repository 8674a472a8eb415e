//! Built-in email transformations applied before re-sending.
//!
//! Currently provides the [`EnvelopeRewriter`], which rewrites the sender
//! of a message so it can be re-sent from a verified identity.

pub mod envelope;

pub use envelope::*;
