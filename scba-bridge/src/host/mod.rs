//! Host runtime adapters.

mod stdio;

pub use stdio::{AckOutcome, StdioHost};
