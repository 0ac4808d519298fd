//! Side-effecting operations behind seams: process environment, shared
//! libraries, and the engine process.

pub mod engine;
pub mod env;
pub mod preload;
