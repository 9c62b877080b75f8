//! Download task execution: per-file fetch, join and decode.
//!
//! Split into focused submodules:
//! - [`context`] - Article source trait seam and per-file shared state
//! - [`orchestration`] - Top-level lifecycle for one file
//! - [`batching`] - Segment partitioning and worker spawning
//! - [`batch_processor`] - Per-worker session, fetch loop and scratch writes
//! - [`finalization`] - Decode and scratch purge

mod batch_processor;
mod batching;
mod context;
mod finalization;
mod orchestration;


pub use context::{ArticleSession, ArticleSource, NntpArticleSource};
pub(crate) use orchestration::{FileTaskParams, run_file_task};
