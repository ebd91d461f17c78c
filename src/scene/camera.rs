use glam::Mat4;

/// Projection settings taken from the scene file.
#[derive(Clone, Debug, PartialEq)]
pub enum Projection {
    /// `far: None` is an infinite far plane
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: Option<f32>,
    },
    /// Half-extents of the view volume
    Orthographic {
        xmag: f32,
        ymag: f32,
        near: f32,
        far: f32,
    },
}

/// A camera attached to a scene node. Its pose is the node's world transform.
#[derive(Clone, Debug)]
pub struct Camera {
    projection: Projection,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: Option<f32>) -> Self {
        Self::new(Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(xmag: f32, ymag: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic {
            xmag,
            ymag,
            near,
            far,
        })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    /// Aspect ratio used by the projection. Orthographic cameras report xmag/ymag.
    pub fn aspect(&self) -> f32 {
        match self.projection {
            Projection::Perspective { aspect, .. } => aspect,
            Projection::Orthographic { xmag, ymag, .. } => xmag / ymag,
        }
    }

    /// Stores the new aspect ratio. Call [`Camera::update_projection_matrix`]
    /// afterwards, the cached matrix is not touched here.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        match &mut self.projection {
            Projection::Perspective { aspect, .. } => *aspect = new_aspect,
            // Keep the vertical extent, widen or narrow horizontally
            Projection::Orthographic { xmag, ymag, .. } => *xmag = *ymag * new_aspect,
        }
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far: Some(far),
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far: None,
            } => Mat4::perspective_infinite_rh(fov_y, aspect, near),
            Projection::Orthographic {
                xmag,
                ymag,
                near,
                far,
            } => Mat4::orthographic_rh(-xmag, xmag, -ymag, ymag, near, far),
        };
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(50.0_f32.to_radians(), 1.0, 0.1, Some(2000.0))
    }
}
