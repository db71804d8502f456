//! Experimental features and work in progress.
//!
//! This module contains experimental implementations that are not yet
//! ready for production use. Features may be incomplete, untested, or
//! subject to significant API changes.

pub mod arm64;

// Future experimental features:
// - WASM backend
// - RISC-V support
// - Advanced optimizations
// - Alternative register allocators