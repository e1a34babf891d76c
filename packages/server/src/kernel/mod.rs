//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{GeminiAdapter, SheetsAdapter, ServerDeps};
pub use test_dependencies::{MemoryStore, MockAI, TestDependencies};
pub use traits::*;
