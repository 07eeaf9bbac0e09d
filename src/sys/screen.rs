use serde::{Deserialize, Serialize};

use super::geometry::Size;

/// Display metrics as reported by the platform.
///
/// The reactor receives a fresh copy on every size or orientation change and
/// never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenMetrics {
    pub width: i32,
    pub height: i32,
    /// Pixels per density-independent pixel.
    pub density: f32,
    pub status_bar_height: i32,
}

impl Default for ScreenMetrics {
    fn default() -> Self {
        ScreenMetrics {
            width: 0,
            height: 0,
            density: 1.0,
            status_bar_height: 0,
        }
    }
}

impl ScreenMetrics {
    pub fn new(width: i32, height: i32, density: f32, status_bar_height: i32) -> Self {
        ScreenMetrics {
            width,
            height,
            density,
            status_bar_height,
        }
    }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    pub fn dp_to_px(&self, dp: f32) -> f32 { dp * self.density }

    pub fn same_size_as(&self, other: &ScreenMetrics) -> bool {
        self.width == other.width && self.height == other.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_density_independent_units() {
        let metrics = ScreenMetrics::new(1080, 1920, 2.625, 63);
        assert_eq!(metrics.dp_to_px(8.0), 21.0);
        assert_eq!(metrics.size(), Size::new(1080, 1920));
    }

    #[test]
    fn rotation_changes_size() {
        let portrait = ScreenMetrics::new(1080, 1920, 3.0, 72);
        let landscape = ScreenMetrics::new(1920, 1080, 3.0, 72);
        assert!(!portrait.same_size_as(&landscape));
        assert!(portrait.same_size_as(&ScreenMetrics { status_bar_height: 0, ..portrait }));
    }
}
