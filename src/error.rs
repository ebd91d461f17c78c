//! Error types for loading and running the viewer.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn an asset file into a scene graph
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to import glTF file {path:?}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("glTF file {0:?} contains no scenes")]
    NoScene(PathBuf),

    #[error("mesh {mesh:?} primitive {primitive} has no positions")]
    MissingPositions { mesh: String, primitive: usize },

    #[error("load worker stopped before producing a result")]
    WorkerLost,
}

/// Errors that stop the viewer from reaching its render loop
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("scene load failed: {0}")]
    Load(#[from] LoadError),

    /// The scene has nothing to look through
    #[error("scene contains no cameras")]
    NoCameras,

    #[error("config error: {0}")]
    Config(String),
}
