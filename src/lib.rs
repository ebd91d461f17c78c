pub mod cli;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod loaders;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod traits;

pub use error::{LoadError, ViewerError};
