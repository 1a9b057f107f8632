//! Command-line interface module
//!
//! Provides argument resolution for both surfaces and invocation dispatch.

pub mod args;
pub mod dispatch;
pub mod surface;

pub use args::{Resolution, resolve};
pub use dispatch::Dispatcher;
pub use surface::Surface;
