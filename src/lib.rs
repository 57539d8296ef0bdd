//! slicebuild - assemble build scripts from versioned slices
//!
//! A slice is a small, versioned fragment of a build recipe. Slices name
//! the slices they depend on and the operating systems they support; a
//! request for a few layers is resolved into one dependency-ordered
//! shell script or Dockerfile.

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod layer;
pub mod slice;
pub mod ui;
pub mod version;

pub use error::{SliceError, SliceResult};
