//! Command implementations for pkgprep-cli

pub mod resolve;

pub use resolve::{ResolveRequest, run_resolve};
