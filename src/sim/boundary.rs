//! Toroidal world edge
//!
//! Entities that leave the rectangle are moved back in. Polygon entities straddling
//! an edge also get a ghost: a second position on the far side where they are drawn
//! and collision-tested for one tick.

use glam::Vec2;

use super::entity::{Body, Entity};
use super::geometry::{Ray, separation};
use super::vector::Vec2Ext;

#[derive(Debug, Clone, PartialEq)]
pub struct WorldBoundary {
    dimension: Vec2,
    edges: [Ray; 4],
}

impl WorldBoundary {
    pub fn new(width: f32, height: f32) -> Self {
        let dimension = Vec2::new(width, height);
        let edges = [
            Ray::new(Vec2::ZERO, Vec2::new(width, 0.0)),
            Ray::new(Vec2::new(width, 0.0), dimension),
            Ray::new(dimension, Vec2::new(0.0, height)),
            Ray::new(Vec2::new(0.0, height), Vec2::ZERO),
        ];
        Self { dimension, edges }
    }

    pub fn dimension(&self) -> Vec2 {
        self.dimension
    }

    pub fn center(&self) -> Vec2 {
        self.dimension * 0.5
    }

    /// Edge `i` of four, counter-clockwise from the origin
    pub fn edge(&self, i: usize) -> Option<&Ray> {
        self.edges.get(i)
    }

    /// Inclusive rectangle membership
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.dimension.x && point.y >= 0.0 && point.y <= self.dimension.y
    }

    /// Does the entity's bounding circle reach across edge `i`?
    pub fn overlap_edge(&self, entity: &Entity, i: usize) -> bool {
        match self.edges.get(i) {
            Some(edge) => {
                let d = separation(edge, entity.position);
                d * d < entity.radius_sqrd()
            }
            None => false,
        }
    }

    /// Bring an escaped entity back inside, then report where its ghost sits.
    ///
    /// Leaving through a side mirrors the other coordinate and flips the matching
    /// velocity component, so the field behaves like a twisted torus. Point bodies never
    /// get ghosts; polygons get at most one, for the first edge they overlap.
    pub fn remap(&self, entity: &mut Entity) -> Option<Vec2> {
        let Vec2 { x: w, y: h } = self.dimension;

        if entity.position.x < 0.0 {
            let y = entity.position.y;
            entity.translate(Vec2::new(w, h - y * 2.0));
            entity.velocity.invert_y();
        } else if entity.position.x > w {
            let y = entity.position.y;
            entity.translate(Vec2::new(-w, h - y * 2.0));
            entity.velocity.invert_y();
        }

        if entity.position.y < 0.0 {
            let x = entity.position.x;
            entity.translate(Vec2::new(w - x * 2.0, h));
            entity.velocity.invert_x();
        } else if entity.position.y > h {
            let x = entity.position.x;
            entity.translate(Vec2::new(w - x * 2.0, -h));
            entity.velocity.invert_x();
        }

        if let Body::Point { .. } = entity.body {
            return None;
        }

        let Vec2 { x, y } = entity.position;
        (0..4)
            .find(|&i| self.overlap_edge(entity, i))
            .map(|i| match i {
                0 => Vec2::new(w - x, y + h),
                1 => Vec2::new(x - w, h - y),
                2 => Vec2::new(w - x, y - h),
                _ => Vec2::new(x + w, h - y),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::clip::ClipPolygon;
    use crate::sim::entity::{Behavior, ShellState};

    fn body(position: Vec2, velocity: Vec2, radius: f32) -> Entity {
        Entity::new(
            position,
            velocity,
            Body::Polygon(ClipPolygon::regular(radius, 12)),
            Behavior::Shell(ShellState {
                range: f32::MAX,
                travel: 0.0,
            }),
            0.0,
        )
    }

    #[test]
    fn test_contains_is_inclusive() {
        let b = WorldBoundary::new(512.0, 512.0);
        assert!(b.contains(Vec2::ZERO));
        assert!(b.contains(Vec2::new(512.0, 512.0)));
        assert!(!b.contains(Vec2::new(-0.1, 5.0)));
        assert!(!b.contains(Vec2::new(5.0, 512.1)));
    }

    #[test]
    fn test_left_exit_mirrors_y_and_flips_vy() {
        let b = WorldBoundary::new(512.0, 512.0);
        let mut e = body(Vec2::new(-1.0, 100.0), Vec2::new(-3.0, 4.0), 5.0);
        b.remap(&mut e);
        assert_eq!(e.position, Vec2::new(511.0, 412.0));
        assert_eq!(e.velocity, Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_right_exit() {
        let b = WorldBoundary::new(512.0, 512.0);
        let mut e = body(Vec2::new(513.0, 200.0), Vec2::new(3.0, 4.0), 5.0);
        b.remap(&mut e);
        assert_eq!(e.position, Vec2::new(1.0, 312.0));
        assert_eq!(e.velocity, Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_bottom_and_top_exits_mirror_x_and_flip_vx() {
        let b = WorldBoundary::new(512.0, 512.0);
        let mut e = body(Vec2::new(100.0, -2.0), Vec2::new(3.0, -4.0), 5.0);
        b.remap(&mut e);
        assert_eq!(e.position, Vec2::new(412.0, 510.0));
        assert_eq!(e.velocity, Vec2::new(-3.0, -4.0));

        let mut e = body(Vec2::new(100.0, 515.0), Vec2::new(3.0, 4.0), 5.0);
        b.remap(&mut e);
        assert_eq!(e.position, Vec2::new(412.0, 3.0));
        assert_eq!(e.velocity, Vec2::new(-3.0, 4.0));
    }

    #[test]
    fn test_interior_polygon_has_no_ghost() {
        let b = WorldBoundary::new(512.0, 512.0);
        let mut e = body(Vec2::new(256.0, 256.0), Vec2::ZERO, 5.0);
        assert_eq!(b.remap(&mut e), None);
        assert_eq!(e.position, Vec2::new(256.0, 256.0));
    }

    #[test]
    fn test_ghost_positions_per_edge() {
        let b = WorldBoundary::new(512.0, 512.0);

        let mut e = body(Vec2::new(100.0, 3.0), Vec2::ZERO, 5.0);
        assert_eq!(b.remap(&mut e), Some(Vec2::new(412.0, 515.0)));

        let mut e = body(Vec2::new(510.0, 100.0), Vec2::ZERO, 5.0);
        assert_eq!(b.remap(&mut e), Some(Vec2::new(-2.0, 412.0)));

        let mut e = body(Vec2::new(100.0, 509.0), Vec2::ZERO, 5.0);
        assert_eq!(b.remap(&mut e), Some(Vec2::new(412.0, -3.0)));

        let mut e = body(Vec2::new(2.0, 100.0), Vec2::ZERO, 5.0);
        assert_eq!(b.remap(&mut e), Some(Vec2::new(514.0, 412.0)));
    }

    #[test]
    fn test_corner_reports_first_edge_only() {
        let b = WorldBoundary::new(512.0, 512.0);
        // Near both e0 and e3; e0 wins
        let mut e = body(Vec2::new(2.0, 2.0), Vec2::ZERO, 5.0);
        assert_eq!(b.remap(&mut e), Some(Vec2::new(510.0, 514.0)));
    }

    #[test]
    fn test_point_bodies_wrap_without_ghost() {
        let settings = Settings::default();
        let b = WorldBoundary::new(512.0, 512.0);
        let mut shell = Entity::shell(Vec2::new(-1.0, 2.0), Vec2::new(-1.0, 1.0), &settings, 0.0);
        assert_eq!(b.remap(&mut shell), None);
        assert_eq!(shell.position, Vec2::new(511.0, 510.0));
        assert_eq!(shell.velocity, Vec2::new(-1.0, -1.0));
    }
}
