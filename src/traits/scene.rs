use std::path::Path;

use crate::error::LoadError;
use crate::scene::SceneGraph;

/// Produces a scene graph from an asset on disk
pub trait SceneLoader: Send {
    /// Load and fully build the scene; world transforms must be up to date
    fn load(&self, path: &Path) -> Result<SceneGraph, LoadError>;

    /// Loader name for diagnostics
    fn name(&self) -> &str {
        "SceneLoader"
    }
}
