//! Workspace root for the Aethero runtime.
//!
//! Re-exports the [`aethero`] facade so the workspace-level integration
//! tests and benchmarks can reach every component through one path.

pub use aethero::*;
