/// Height of the fixed page header (5rem at 16px).
pub const HEADER_HEIGHT: u32 = 80;

/// Area available to the capture view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport for a window of the given size, minus the header.
    pub fn from_window(width: u32, height: u32) -> Self {
        Self {
            width,
            height: height.saturating_sub(HEADER_HEIGHT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_excluded() {
        assert_eq!(
            Viewport::from_window(1280, 800),
            Viewport {
                width: 1280,
                height: 720
            }
        );
        assert_eq!(Viewport::from_window(100, 50).height, 0);
    }
}
