use crate::math::Color;

/// Surface appearance of a mesh, owned by value by each mesh node
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
}

impl Material {
    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Whether the renderer has to blend this material
    pub fn is_blended(&self) -> bool {
        self.transparent && self.opacity < 1.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
        }
    }
}
