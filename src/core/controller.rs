use glam::Vec2;

/// Input button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MouseLeft,
    MouseRight,
    Shift,
}

/// Controller - button and pointer state for the current frame
pub trait Controller {
    /// Check if button is currently down
    fn is_down(&self, button: Button) -> bool;

    /// Pointer movement accumulated since the last reset
    fn pointer_delta(&self) -> Vec2;

    /// Wheel movement accumulated since the last reset, in lines; positive scrolls up
    fn scroll_delta(&self) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_button_equality() {
        assert_eq!(Button::MouseLeft, Button::MouseLeft);
        assert_ne!(Button::MouseLeft, Button::MouseRight);
    }

    #[test]
    fn test_button_debug() {
        assert_eq!(format!("{:?}", Button::MouseLeft), "MouseLeft");
    }

    #[test]
    fn test_all_button_variants_unique() {
        let all_buttons = [Button::MouseLeft, Button::MouseRight, Button::Shift];
        let set: HashSet<_> = all_buttons.iter().collect();
        assert_eq!(set.len(), 3);
    }

    // Test mock controller implementation
    struct MockController {
        pressed: Vec<Button>,
        delta: Vec2,
    }

    impl Controller for MockController {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn pointer_delta(&self) -> Vec2 {
            self.delta
        }

        fn scroll_delta(&self) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_controller_is_down() {
        let controller = MockController {
            pressed: vec![Button::MouseLeft],
            delta: Vec2::new(3.0, 4.0),
        };

        assert!(controller.is_down(Button::MouseLeft));
        assert!(!controller.is_down(Button::MouseRight));
        assert_eq!(controller.pointer_delta().length(), 5.0);
    }
}
