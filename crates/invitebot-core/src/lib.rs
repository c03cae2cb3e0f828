//! Low-level helpers shared across invitebot crates.
//!
//! Provides the atomic file-write primitive used by the link store and the
//! clock helper used to stamp persisted state.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use time_utils::current_unix_timestamp_ms;
