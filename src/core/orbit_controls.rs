//! Orbit camera: rotate around a target, dolly towards it, pan across the
//! view plane. Input accumulates between frames and `update` applies it.

use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};

use super::controller::{Button, Controller};
use super::viewport::Viewport;
use crate::config::OrbitConfig;
use crate::scene::{Camera, Projection};

/// Polar angle stays this far from either pole
const POLE_MARGIN: f32 = 0.02;
/// Dolly factor per wheel line at zoom speed 1
const DOLLY_STEP: f32 = 0.95;
/// Frame rate the damping factor is tuned for
const DAMPING_RATE: f32 = 60.0;
const CHANGE_EPSILON: f32 = 1e-6;

/// Offset from the target in spherical coordinates, Y up.
/// `theta` is measured around Y from +Z, `phi` down from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    spherical: Spherical,
    settings: OrbitConfig,
    // Pending input, consumed by update
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    /// Controls for a camera at `position` looking at `target`
    pub fn from_pose(position: Vec3, target: Vec3, settings: OrbitConfig) -> Self {
        let mut controls = Self {
            target,
            spherical: Spherical::from_offset(position - target),
            settings,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        };
        controls.clamp();
        controls
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.spherical.to_offset()
    }

    /// Camera-to-world transform looking at the target with +Y up
    pub fn view_transform(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y).inverse()
    }

    /// Drag of `delta` pixels on a surface `height` pixels tall
    pub fn rotate(&mut self, delta: Vec2, height: f32) {
        let per_pixel = 2.0 * PI * self.settings.rotate_speed / height.max(1.0);
        self.delta_theta -= delta.x * per_pixel;
        self.delta_phi -= delta.y * per_pixel;
    }

    /// Positive `lines` moves towards the target
    pub fn dolly(&mut self, lines: f32) {
        self.scale *= DOLLY_STEP.powf(self.settings.zoom_speed * lines);
    }

    /// Slide the target so the scene follows a drag of `delta` pixels
    pub fn pan(&mut self, delta: Vec2, viewport: Viewport, camera: &Camera) {
        let height = viewport.height.max(1) as f32;
        let width = viewport.width.max(1) as f32;

        let (dx, dy) = match *camera.projection() {
            Projection::Perspective { fov_y, .. } => {
                // Visible half-height at the target plane
                let extent = self.spherical.radius * (fov_y / 2.0).tan();
                (2.0 * delta.x * extent / height, 2.0 * delta.y * extent / height)
            }
            Projection::Orthographic { xmag, ymag, .. } => {
                (2.0 * delta.x * xmag / width, 2.0 * delta.y * ymag / height)
            }
        };

        let view = self.view_transform();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();
        self.pan_offset += (up * dy - right * dx) * self.settings.pan_speed;
    }

    /// Feed one frame of controller input. Left drag rotates, right drag or
    /// shift with left drag pans, the wheel dollies.
    pub fn handle_input(&mut self, input: &dyn Controller, viewport: Viewport, camera: &Camera) {
        let drag = input.pointer_delta();
        if drag != Vec2::ZERO {
            let panning = input.is_down(Button::MouseRight)
                || (input.is_down(Button::MouseLeft) && input.is_down(Button::Shift));
            if panning {
                self.pan(drag, viewport, camera);
            } else if input.is_down(Button::MouseLeft) {
                self.rotate(drag, viewport.height as f32);
            }
        }

        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            self.dolly(scroll);
        }
    }

    /// Apply pending input for a frame that took `delta` seconds. With damping
    /// only part of the input lands each frame, the rest decays over the
    /// next ones. Returns whether the camera moved.
    pub fn update(&mut self, delta: f32) -> bool {
        let before = (self.position(), self.target);

        let factor = match self.settings.damping_factor {
            Some(d) => {
                let d = d.clamp(0.0, 1.0);
                1.0 - (1.0 - d).powf(delta.max(0.0) * DAMPING_RATE)
            }
            None => 1.0,
        };

        self.spherical.theta += self.delta_theta * factor;
        self.spherical.phi += self.delta_phi * factor;
        self.spherical.radius *= self.scale;
        self.target += self.pan_offset * factor;
        self.clamp();

        if factor < 1.0 {
            self.delta_theta *= 1.0 - factor;
            self.delta_phi *= 1.0 - factor;
            self.pan_offset *= 1.0 - factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let (position, target) = before;
        self.position().distance_squared(position) > CHANGE_EPSILON
            || self.target.distance_squared(target) > CHANGE_EPSILON
    }

    fn clamp(&mut self) {
        self.spherical.phi = self.spherical.phi.clamp(POLE_MARGIN, PI - POLE_MARGIN);
        let max = self.settings.max_distance.unwrap_or(f32::INFINITY);
        let min = self.settings.min_distance.min(max);
        self.spherical.radius = self.spherical.radius.clamp(min, max);
    }
}
