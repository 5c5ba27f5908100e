//! Transcript storage for the Confab chat relay.
//!
//! A transcript store is a durable append-only message log keyed by
//! session id. It owns two things the rest of the relay must never take
//! over: minting session identity and assigning per-session sequence
//! numbers on append. Everything else (context building, fan-out,
//! generation) consumes the store through the [`TranscriptStore`] trait.

/// In-process store for tests and demo runs.
pub mod memory;
/// Session metadata.
pub mod session;
/// The store contract and the file-backed implementation.
pub mod transcript;

pub use memory::MemoryTranscriptStore;
pub use session::SessionRecord;
pub use transcript::{FileTranscriptStore, TranscriptStore};
