//! Git command layer
//!
//! Drives the `git` CLI and interprets its text output:
//! - `GitExecutor` - Async process runner with index.lock retry
//! - `parser` - Pure parsers from git's text formats into typed records
//! - `GitOps` - Operations combining executor calls and parsers
//! - `RebasePlan` - Interactive rebase plans and the apply hook
//! - `hooks` - Install/remove lifecycle of managed hook scripts

mod executor;
pub mod hooks;
mod ops;
pub mod parser;
mod rebase;
mod suggest;
mod types;

pub use executor::*;
pub use hooks::{HookKind, HookStatus};
pub use ops::*;
pub use rebase::*;
pub use suggest::*;
pub use types::*;
