//! Draw contract between the simulation and whatever owns the display
//!
//! The simulation only emits outlines and points in world coordinates. A display
//! backend implements `RenderSink`; `FrameStats` is the headless one.

use glam::Vec2;

/// 8-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    /// Shell tint
    pub const SHELL: Rgb = Rgb(0x10, 0x10, 0x00);
}

pub trait RenderSink {
    /// Closed outline through `vertices`
    fn draw_polygon(&mut self, vertices: &[Vec2]);

    fn draw_point(&mut self, position: Vec2, radius: f32, color: Rgb);
}

/// Counts draw calls; used by the headless binary and tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub polygons: usize,
    pub points: usize,
    pub vertices: usize,
    /// Every polygon outline drawn this frame, in call order
    pub outlines: Vec<Vec<Vec2>>,
    /// Every point drawn this frame, in call order
    pub dots: Vec<(Vec2, f32, Rgb)>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn draw_calls(&self) -> usize {
        self.polygons + self.points
    }
}

impl RenderSink for FrameStats {
    fn draw_polygon(&mut self, vertices: &[Vec2]) {
        self.polygons += 1;
        self.vertices += vertices.len();
        self.outlines.push(vertices.to_vec());
    }

    fn draw_point(&mut self, position: Vec2, radius: f32, color: Rgb) {
        self.points += 1;
        self.dots.push((position, radius, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_stats_counts_calls() {
        let mut stats = FrameStats::new();
        stats.draw_polygon(&[Vec2::ZERO, Vec2::X, Vec2::Y]);
        stats.draw_point(Vec2::ONE, 1.0, Rgb::WHITE);
        assert_eq!(stats.polygons, 1);
        assert_eq!(stats.points, 1);
        assert_eq!(stats.vertices, 3);
        assert_eq!(stats.draw_calls(), 2);

        stats.clear();
        assert_eq!(stats.draw_calls(), 0);
        assert!(stats.outlines.is_empty());
    }
}
