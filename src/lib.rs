//! Launch pipeline for an externally installed particle-propagation engine.
//!
//! The engine is natively implemented and lives inside a provisioned conda
//! environment; this crate configures and starts it but never reimplements
//! it. Work happens in three strictly ordered stages:
//!
//! - **[`bootstrap`]**: make the engine's native libraries and package
//!   discoverable. Produces the [`bootstrap::EnvironmentState`] that every
//!   later stage requires, so nothing engine-backed can run first.
//! - **[`assemble`]**: build the run configuration by layering run
//!   parameters and discovered install paths over the engine's defaults.
//! - **[`launch`]**: start the engine with the finished configuration and
//!   map failures onto stable exit codes.
//!
//! The module split follows the same rule as the stages:
//!
//! - **[`core`]**: pure, deterministic logic (path derivation, configuration
//!   composition). No I/O, fully testable in isolation.
//! - **[`io`]**: side-effecting operations (process environment, shared
//!   libraries, the engine process). Isolated behind seams to enable
//!   scripted fakes in tests.

pub mod assemble;
pub mod bootstrap;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod launch;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
