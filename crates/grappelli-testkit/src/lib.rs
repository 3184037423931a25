//! # Grappelli testkit
//!
//! Test infrastructure for the Grappelli document-database client: an
//! in-memory [`MemoryBackend`] implementing the abstract backend operations,
//! and fixture document types implementing the document capability set.

pub mod fixtures;
pub mod memory;

pub use fixtures::{Author, Book, DocState, Scrapbook, attrs};
pub use memory::MemoryBackend;
