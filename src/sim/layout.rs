//! Obstacle layouts
//!
//! Every layout is symmetric around the arena center and scales with the
//! shorter arena side.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Obstacle, circle_rect_collision};
use crate::consts::OBSTACLE_CLEAR_RADIUS;
use crate::tuning::ObstacleTuning;

const BAR_THICKNESS: f32 = 24.0;
const GRID_BLOCK: f32 = 40.0;
const RING_BLOCK: f32 = 36.0;
const RING_BLOCKS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Four bars around the center, one per side
    Cross,
    /// A square near each corner
    Corners,
    /// 3×3 grid of blocks
    Grid,
    /// Blocks on a circle around the center
    Ring,
}

impl Layout {
    pub const ALL: [Layout; 4] = [Layout::Cross, Layout::Corners, Layout::Grid, Layout::Ring];

    /// Raw obstacles for an arena of the given size, before clear-zone filtering
    pub fn obstacles(self, width: f32, height: f32) -> Vec<Obstacle> {
        let center = Vec2::new(width / 2.0, height / 2.0);
        let side = width.min(height);

        match self {
            Layout::Cross => {
                let offset = side * 0.35;
                let length = side * 0.2;
                vec![
                    Obstacle::centered(center - Vec2::X * offset, BAR_THICKNESS, length),
                    Obstacle::centered(center + Vec2::X * offset, BAR_THICKNESS, length),
                    Obstacle::centered(center - Vec2::Y * offset, length, BAR_THICKNESS),
                    Obstacle::centered(center + Vec2::Y * offset, length, BAR_THICKNESS),
                ]
            }
            Layout::Corners => {
                let size = side * 0.12;
                [(0.2, 0.2), (0.8, 0.2), (0.2, 0.8), (0.8, 0.8)]
                    .into_iter()
                    .map(|(fx, fy)| Obstacle::centered(Vec2::new(width * fx, height * fy), size, size))
                    .collect()
            }
            Layout::Grid => {
                let fractions = [0.25, 0.5, 0.75];
                fractions
                    .iter()
                    .flat_map(|&fy| {
                        fractions.iter().map(move |&fx| {
                            Obstacle::centered(Vec2::new(width * fx, height * fy), GRID_BLOCK, GRID_BLOCK)
                        })
                    })
                    .collect()
            }
            Layout::Ring => {
                let radius = side * 0.32;
                (0..RING_BLOCKS)
                    .map(|i| {
                        let angle = i as f32 / RING_BLOCKS as f32 * std::f32::consts::TAU;
                        let at = center + crate::from_angle(angle) * radius;
                        Obstacle::centered(at, RING_BLOCK, RING_BLOCK)
                    })
                    .collect()
            }
        }
    }
}

/// Roll the obstacle layout for a wave.
///
/// Obstacles that overlap the clear zone around any of `keep_clear` are
/// dropped so nobody starts stuck inside one.
pub fn generate<R: Rng>(
    wave: u32,
    tuning: &ObstacleTuning,
    width: f32,
    height: f32,
    keep_clear: &[Vec2],
    rng: &mut R,
) -> (Option<Layout>, Vec<Obstacle>) {
    if wave < tuning.first_wave || !rng.random_bool(tuning.chance.clamp(0.0, 1.0)) {
        return (None, Vec::new());
    }

    let layout = Layout::ALL[rng.random_range(0..Layout::ALL.len())];
    let obstacles = layout
        .obstacles(width, height)
        .into_iter()
        .filter(|obs| {
            keep_clear
                .iter()
                .all(|&p| !circle_rect_collision(p, OBSTACLE_CLEAR_RADIUS, obs).hit)
        })
        .collect();
    (Some(layout), obstacles)
}
