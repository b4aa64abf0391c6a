//! Clip polygons: the collision footprint of shaped entities
//!
//! A clip keeps its vertices twice. `backup` is the rest pose, centred on the vertex
//! mean; the working copy is rotated and translated into world pose for a test or a
//! draw and must be `reset()` afterwards, otherwise the next transform compounds on top
//! of the last one.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use super::geometry::{Collision, Ray, ray_collide};
use super::vector::Vec2Ext;
use crate::consts::POINT_RAY_LENGTH;
use crate::polar_to_cartesian;

#[derive(Debug, Clone, PartialEq)]
pub struct ClipPolygon {
    backup: Vec<Vec2>,
    vertex: Vec<Vec2>,
    center: Vec2,
    radius_sqrd: f32,
}

impl ClipPolygon {
    /// Build a clip from vertices in any frame; they are recentred on their mean.
    ///
    /// An empty list is allowed and simply never collides.
    pub fn new(vertices: Vec<Vec2>) -> Self {
        let mut backup = vertices;

        if !backup.is_empty() {
            let mean = backup.iter().copied().sum::<Vec2>() / backup.len() as f32;
            for v in &mut backup {
                *v -= mean;
            }
        }

        let radius_sqrd = backup
            .iter()
            .map(|v| v.length_squared())
            .fold(0.0_f32, f32::max);

        Self {
            vertex: backup.clone(),
            backup,
            center: Vec2::ZERO,
            radius_sqrd,
        }
    }

    /// Replace the rest pose; recomputes the centroid and bounding radius
    pub fn set_vertices(&mut self, vertices: Vec<Vec2>) {
        *self = Self::new(vertices);
    }

    pub fn len(&self) -> usize {
        self.vertex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex.is_empty()
    }

    /// Working vertices (world pose between a transform and a reset)
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertex
    }

    /// Rest-pose vertices
    pub fn rest_pose(&self) -> &[Vec2] {
        &self.backup
    }

    /// Current centroid offset (zero at rest)
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Squared distance from the centroid to the farthest vertex
    pub fn radius_sqrd(&self) -> f32 {
        self.radius_sqrd
    }

    /// The i-th edge; the last edge closes the loop back to vertex 0
    pub fn line(&self, i: usize) -> Option<Ray> {
        let n = self.vertex.len();
        if i >= n {
            return None;
        }
        let next = if i + 1 >= n { 0 } else { i + 1 };
        Some(Ray::new(self.vertex[i], self.vertex[next]))
    }

    /// All edges in order
    pub fn edges(&self) -> impl Iterator<Item = Ray> + '_ {
        (0..self.vertex.len()).filter_map(move |i| self.line(i))
    }

    /// Revert to the rest pose
    pub fn reset(&mut self) {
        self.vertex.clone_from(&self.backup);
        self.center = Vec2::ZERO;
    }

    /// Rotate the working vertices about the current centroid
    pub fn rotate(&mut self, angle: f32) {
        let pivot = self.center;
        for v in &mut self.vertex {
            *v = v.rotated_about(angle, pivot);
        }
    }

    /// Shift the working vertices and the centroid
    pub fn translate(&mut self, offset: Vec2) {
        for v in &mut self.vertex {
            *v += offset;
        }
        self.center += offset;
    }

    /// Rotate then translate: rest pose to world pose
    pub fn transform(&mut self, angle: f32, position: Vec2) {
        self.rotate(angle);
        self.translate(position);
    }

    /// Edge-against-edge test; returns the first intersection found
    pub fn collide(&self, other: &ClipPolygon) -> Collision {
        for a in self.edges() {
            for b in other.edges() {
                let c = ray_collide(&a, &b);
                if c.hit {
                    return c;
                }
            }
        }
        Collision::miss()
    }

    /// Jordan-curve parity test. A hit is located at the point itself.
    ///
    /// Points lying exactly on an edge or level with a vertex have no defined answer.
    pub fn collide_point(&self, point: Vec2) -> Collision {
        let probe = Ray::new(point, point + Vec2::new(POINT_RAY_LENGTH, 0.0));
        let crossings = self
            .edges()
            .filter(|edge| ray_collide(&probe, edge).hit)
            .count();

        if crossings % 2 == 1 {
            Collision::at(point)
        } else {
            Collision::miss()
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.collide_point(point).hit
    }

    /// Equilateral triangle with its apex `size` above the centre
    pub fn triangle(size: f32) -> Self {
        let apex = Vec2::new(0.0, size);
        let step = PI / 1.5;
        Self::new(vec![apex, apex.rotated(step), apex.rotated(2.0 * step)])
    }

    /// The player's dart-shaped hull
    pub fn ship(size: f32) -> Self {
        let nose = Vec2::new(0.0, size);
        let left = nose.rotated(PI * 0.8);
        let right = left.rotated(PI * 0.4);
        Self::new(vec![nose, left, right])
    }

    /// Lumpy, roughly circular asteroid outline with `sides - 1` vertices
    pub fn rock<R: Rng + ?Sized>(radius: f32, sides: usize, rng: &mut R) -> Self {
        let step = (2.0 * PI) / sides.max(1) as f32;
        let vertices = (1..sides)
            .map(|i| {
                let angle = step * rng.random::<f32>() + step * i as f32;
                let r = rng.random::<f32>() * 0.3 * radius + 0.7 * radius;
                polar_to_cartesian(angle, r)
            })
            .collect();
        Self::new(vertices)
    }

    /// Gun turret: a short barrel on an octagonal body
    pub fn turret() -> Self {
        let step = 0.25 * PI;
        let radius = 15.0;
        let barrel = 5.0;

        let mut vertices = Vec::with_capacity(10);

        let mut point = polar_to_cartesian(0.5 * step, radius);
        vertices.push(point);
        point.y += barrel;
        vertices.push(point);

        point = polar_to_cartesian(7.5 * step, radius);
        point.y += barrel;
        vertices.push(point);
        point.y -= barrel;
        vertices.push(point);

        for _ in 0..6 {
            point = point.rotated(step);
            vertices.push(point);
        }

        Self::new(vertices)
    }

    /// Regular polygon approximating a circle
    pub fn regular(radius: f32, sides: usize) -> Self {
        let step = (2.0 * PI) / sides.max(1) as f32;
        let vertices = (0..sides)
            .map(|i| polar_to_cartesian(step * i as f32, radius))
            .collect();
        Self::new(vertices)
    }
}
