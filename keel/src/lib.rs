//! Resource status classification and delivery artifact registry.
//!
//! The crate keeps a strict separation between decision logic and storage:
//!
//! - **[`core`]**: Pure, deterministic logic (status rules, veto resolution,
//!   version ordering). No I/O, fully testable in isolation.
//! - **[`io`]**: Collaborator traits and their in-memory and file-backed
//!   adapters (event history, pause flags, set storage, cloud lookup).
//!
//! [`status`] and [`artifacts`] combine the two into the public operations used
//! by the CLI.

pub mod artifacts;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
