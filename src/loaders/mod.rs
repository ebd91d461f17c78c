pub mod gltf;

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::error::LoadError;
use crate::scene::SceneGraph;
use crate::traits::SceneLoader;

pub use self::gltf::{load_gltf_file, GltfLoader};

/// Loads `path` on a worker thread and hands the result to `deliver` exactly
/// once, including when the loader panics.
pub fn spawn_load<L, F>(loader: L, path: PathBuf, deliver: F) -> std::io::Result<JoinHandle<()>>
where
    L: SceneLoader + 'static,
    F: FnOnce(Result<SceneGraph, LoadError>) + Send + 'static,
{
    thread::Builder::new()
        .name("scene-loader".to_string())
        .spawn(move || {
            log::debug!("{} loader started for {:?}", loader.name(), path);
            let result = panic::catch_unwind(AssertUnwindSafe(|| loader.load(&path)))
                .unwrap_or(Err(LoadError::WorkerLost));
            deliver(result);
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::mpsc;

    struct EmptyLoader;

    impl SceneLoader for EmptyLoader {
        fn load(&self, _path: &Path) -> Result<SceneGraph, LoadError> {
            Ok(SceneGraph::new())
        }
    }

    struct PanickingLoader;

    impl SceneLoader for PanickingLoader {
        fn load(&self, _path: &Path) -> Result<SceneGraph, LoadError> {
            panic!("decoder exploded");
        }
    }

    #[test]
    fn test_spawn_load_delivers_result() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_load(EmptyLoader, PathBuf::from("any.gltf"), move |result| {
            tx.send(result.is_ok()).ok();
        })
        .unwrap();
        handle.join().unwrap();

        assert_eq!(rx.recv().unwrap(), true);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_spawn_load_reports_panic_as_error() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_load(PanickingLoader, PathBuf::from("any.gltf"), move |result| {
            tx.send(matches!(result, Err(LoadError::WorkerLost))).ok();
        })
        .unwrap();
        handle.join().unwrap();

        assert!(rx.recv().unwrap());
    }
}
