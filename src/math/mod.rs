mod aabb;
mod color;
mod ray;

pub use aabb::AABB;
pub use color::{srgb_to_linear, Color};
pub use ray::{intersect_aabb, Ray};
