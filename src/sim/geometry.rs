//! Line segments and segment intersection
//!
//! A `Ray` is a finite segment from `begin` to `end`. Intersection treats segment A as
//! an infinite line through its normal, solves for where B crosses it, then checks the
//! crossing lies inside both segments.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Whether a collision occurred
    pub hit: bool,
    /// Where it occurred (meaningless on a miss)
    pub point: Vec2,
}

impl Collision {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
        }
    }

    pub fn at(point: Vec2) -> Self {
        Self { hit: true, point }
    }
}

impl Default for Collision {
    fn default() -> Self {
        Self::miss()
    }
}

/// A segment with a beginning and an end
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ray {
    pub begin: Vec2,
    pub end: Vec2,
}

impl Ray {
    pub fn new(begin: Vec2, end: Vec2) -> Self {
        Self { begin, end }
    }

    /// `end - begin`
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.begin
    }

    /// Unit normal to the segment (left-hand perpendicular), zero if degenerate
    #[inline]
    pub fn normal(&self) -> Vec2 {
        self.direction().perp().normalize_or_zero()
    }
}

/// Intersect two segments.
///
/// Parallel segments never intersect, even when collinear and overlapping. The final
/// bound check on A uses its x extent, so a vertical A never reports a hit.
pub fn ray_collide(a: &Ray, b: &Ray) -> Collision {
    let n = a.normal();
    let denominator = n.dot(b.direction());

    if denominator == 0.0 {
        return Collision::miss();
    }

    // Position of the crossing as a fraction of B's length
    let t = (n.dot(a.begin) - n.dot(b.begin)) / denominator;
    if !(0.0..=1.0).contains(&t) {
        return Collision::miss();
    }

    let location = b.begin + b.direction() * t;

    let extent = a.direction().x;
    if extent == 0.0 {
        return Collision::miss();
    }

    let s = (location.x - a.begin.x) / extent;
    if !(0.0..=1.0).contains(&s) {
        return Collision::miss();
    }

    Collision::at(location)
}

/// Signed perpendicular distance from `point` to the infinite line through `ray`.
///
/// Zero for a degenerate ray.
pub fn separation(ray: &Ray, point: Vec2) -> f32 {
    let n = ray.normal();
    n.dot(point) - n.dot(ray.begin)
}
