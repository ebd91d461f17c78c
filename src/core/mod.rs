pub mod camera_registry;
pub mod clock;
pub mod controller;
pub mod input_adapter;
pub mod orbit_controls;
pub mod raycaster;
pub mod selection;
pub mod triangle_intersection;
pub mod viewer;
pub mod viewport;

pub use camera_registry::{collect_cameras, CameraRegistry};
pub use clock::{Clock, FpsCounter};
pub use controller::{Button, Controller};
pub use input_adapter::{Click, WinitController};
pub use orbit_controls::{OrbitControls, Spherical};
pub use raycaster::{intersect_scene, Intersection, Raycaster};
pub use selection::{ClickOutcome, Selected, Selection};
pub use viewer::{Viewer, ViewerEvent, ViewerStatus};
pub use viewport::{sync_aspect, Viewport};
