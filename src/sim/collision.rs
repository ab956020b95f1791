//! Static obstacle field
//!
//! Obstacles are axis-aligned rectangles; every moving entity is a circle.
//! Collision uses the closest point on the rectangle to the circle center.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangular obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Obstacle {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Obstacle of the given size centered on `center`
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    /// Point on (or inside) the rectangle closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.x, self.x + self.w),
            p.y.clamp(self.y, self.y + self.h),
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Result of a circle vs rectangle test
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest rectangle point to the circle center
    pub point: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
        }
    }
}

/// Check collision between a circle and an obstacle.
///
/// Hit iff the distance from the center to the nearest rectangle point is
/// strictly less than the radius.
pub fn circle_rect_collision(center: Vec2, radius: f32, rect: &Obstacle) -> CollisionResult {
    let point = rect.closest_point(center);
    let dist_sq = (center - point).length_squared();
    if dist_sq < radius * radius {
        CollisionResult { hit: true, point }
    } else {
        CollisionResult::miss()
    }
}

/// Playfield: current bounds plus the obstacle layout.
///
/// Bounds are mutable at any time (viewport resize); callers must read them
/// through this struct every tick rather than caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub obstacles: Vec<Obstacle>,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            obstacles: Vec::new(),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Contact point on the first obstacle the circle overlaps, in layout order
    pub fn first_contact(&self, center: Vec2, radius: f32) -> Option<Vec2> {
        self.obstacles
            .iter()
            .map(|obs| circle_rect_collision(center, radius, obs))
            .find(|result| result.hit)
            .map(|result| result.point)
    }

    pub fn collides(&self, center: Vec2, radius: f32) -> bool {
        self.first_contact(center, radius).is_some()
    }

    /// Axis-separated move: try X, then Y, each rejected independently when
    /// it would end inside an obstacle. Lets entities slide along walls.
    pub fn slide(&self, pos: Vec2, delta: Vec2, radius: f32) -> Vec2 {
        let mut out = pos;
        let try_x = Vec2::new(out.x + delta.x, out.y);
        if !self.collides(try_x, radius) {
            out = try_x;
        }
        let try_y = Vec2::new(out.x, out.y + delta.y);
        if !self.collides(try_y, radius) {
            out = try_y;
        }
        out
    }

    /// Clamp a point so that a circle with `inset` stays inside the bounds
    pub fn clamp_inside(&self, pos: Vec2, inset: f32) -> Vec2 {
        Vec2::new(
            pos.x.min(self.width - inset).max(inset),
            pos.y.min(self.height - inset).max(inset),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_at_corner_collides() {
        let rect = Obstacle::new(100.0, 100.0, 50.0, 50.0);
        // Center exactly on the corner: distance 0 < r
        assert!(circle_rect_collision(Vec2::new(100.0, 100.0), 5.0, &rect).hit);
    }

    #[test]
    fn test_circle_near_corner_uses_strict_distance() {
        let rect = Obstacle::new(100.0, 100.0, 50.0, 50.0);
        // Diagonal distance to corner (100,100) is exactly 5
        let center = Vec2::new(97.0, 96.0);
        assert!(!circle_rect_collision(center, 5.0, &rect).hit);
        assert!(circle_rect_collision(center, 5.01, &rect).hit);
    }

    #[test]
    fn test_circle_inside_rect() {
        let rect = Obstacle::new(0.0, 0.0, 100.0, 100.0);
        let result = circle_rect_collision(Vec2::new(50.0, 50.0), 6.0, &rect);
        assert!(result.hit);
        assert_eq!(result.point, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_empty_arena_never_collides() {
        let arena = Arena::new(800.0, 600.0);
        assert!(!arena.collides(Vec2::new(10.0, 10.0), 100.0));
    }

    #[test]
    fn test_first_contact_in_layout_order() {
        let mut arena = Arena::new(800.0, 600.0);
        arena.obstacles.push(Obstacle::new(100.0, 0.0, 20.0, 100.0));
        arena.obstacles.push(Obstacle::new(80.0, 40.0, 20.0, 20.0));
        // Overlaps both; the first obstacle's near edge wins
        assert_eq!(
            arena.first_contact(Vec2::new(95.0, 50.0), 10.0),
            Some(Vec2::new(100.0, 50.0))
        );
        assert_eq!(arena.first_contact(Vec2::new(300.0, 300.0), 10.0), None);
    }

    #[test]
    fn test_slide_along_wall() {
        let mut arena = Arena::new(800.0, 600.0);
        // Wall directly to the right of the entity
        arena.obstacles.push(Obstacle::new(120.0, 0.0, 20.0, 600.0));
        let pos = Vec2::new(100.0, 300.0);
        let moved = arena.slide(pos, Vec2::new(15.0, 10.0), 12.0);
        // X blocked, Y still applied
        assert_eq!(moved.x, 100.0);
        assert_eq!(moved.y, 310.0);
    }

    #[test]
    fn test_clamp_inside_uses_current_bounds() {
        let mut arena = Arena::new(800.0, 600.0);
        let p = Vec2::new(790.0, 590.0);
        assert_eq!(arena.clamp_inside(p, 20.0), Vec2::new(780.0, 580.0));
        arena.width = 400.0;
        arena.height = 300.0;
        assert_eq!(arena.clamp_inside(p, 20.0), Vec2::new(380.0, 280.0));
    }
}
