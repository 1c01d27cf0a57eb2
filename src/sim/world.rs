//! Procedural street generation
//!
//! The road is cut into fixed-height blocks. A block's id comes from the
//! accumulated scroll distance, and everything about a block (intersection or
//! street, building colors and trims, obstacle roll) is a pure function of
//! that id. Only the blinking traffic lights read wall-clock time.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Chance that a street block spawns a trash can
pub const OBSTACLE_CHANCE: f32 = 0.4;
pub const OBSTACLE_SIZE: f32 = 30.0;
pub const OBSTACLE_HP: i32 = 30;
pub const OBSTACLE_SPAWN_Y: f32 = -60.0;

/// Max roof inset from the top of a building
pub const ROOF_HEIGHT_TRIM: f32 = 25.0;
/// Max roof inset from the road side
pub const ROOF_WIDTH_TRIM: f32 = 10.0;

pub const ROOF_COLORS: [u32; 8] = [
    0x57534e, // Stone
    0x44403c, // Dark stone
    0x7f1d1d, // Muted red
    0x1e3a8a, // Muted blue
    0x3f6212, // Muted green
    0x713f12, // Muted brown
    0x581c87, // Muted purple
    0x374151, // Slate
];

pub const WALL_COLORS: [u32; 4] = [0x57534e, 0x404040, 0x52525b, 0x4b5563];

const LEFT_SEED_MULT: u64 = 111;
const RIGHT_SEED_MULT: u64 = 222;
const RIGHT_SEED_OFFSET: u64 = 55;
const OBSTACLE_SALT: u64 = 0x0b57_ac1e;

/// SplitMix64 finalizer
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

fn block_rng(key: u64) -> Pcg32 {
    Pcg32::seed_from_u64(splitmix64(key))
}

/// Which side of the road
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// Visual parameters of one building
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub wall_color: u32,
    pub roof_color: u32,
    pub height_trim: f32,
    pub width_trim: f32,
    pub vent: bool,
}

impl Building {
    fn generate(key: u64) -> Self {
        let mut rng = block_rng(key);
        let r: f32 = rng.random();
        let r2: f32 = rng.random();
        Self {
            wall_color: WALL_COLORS[pick(r, WALL_COLORS.len())],
            roof_color: ROOF_COLORS[pick(r, ROOF_COLORS.len())],
            height_trim: r * ROOF_HEIGHT_TRIM,
            width_trim: r2 * ROOF_WIDTH_TRIM,
            vent: r > 0.5,
        }
    }
}

#[inline]
fn pick(r: f32, len: usize) -> usize {
    ((r * len as f32) as usize).min(len - 1)
}

/// Layout of one scenery block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BlockLayout {
    /// Crosswalks and corner geometry, nothing spawns
    Intersection,
    Street { left: Building, right: Building },
}

pub fn is_intersection(block_id: i64) -> bool {
    block_id.rem_euclid(INTERSECTION_FREQUENCY) == 0
}

/// Generate a block's scenery. Same id, same result.
pub fn block_layout(block_id: i64) -> BlockLayout {
    if is_intersection(block_id) {
        return BlockLayout::Intersection;
    }
    let id = block_id as u64;
    BlockLayout::Street {
        left: Building::generate(id.wrapping_mul(LEFT_SEED_MULT)),
        right: Building::generate(id.wrapping_mul(RIGHT_SEED_MULT).wrapping_add(RIGHT_SEED_OFFSET)),
    }
}

/// Obstacle decision for a newly entered block. Intersections never spawn.
pub fn obstacle_for_block(block_id: i64, seed: u64) -> Option<Side> {
    if is_intersection(block_id) {
        return None;
    }
    let mut rng = block_rng((block_id as u64) ^ splitmix64(seed ^ OBSTACLE_SALT));
    if rng.random::<f32>() >= OBSTACLE_CHANCE {
        return None;
    }
    Some(if rng.random_bool(0.5) { Side::Left } else { Side::Right })
}

/// Obstacle top-left x for a lane
pub fn obstacle_x(side: Side) -> f32 {
    match side {
        Side::Left => HOUSE_DEPTH + 5.0,
        Side::Right => GAME_WIDTH - HOUSE_DEPTH - 35.0,
    }
}

/// Traffic light color; blinks once per second of real time (cosmetic only)
pub fn traffic_light_color(elapsed_ms: f64) -> u32 {
    if (elapsed_ms / 1000.0).floor() as i64 % 2 == 0 {
        0xef4444
    } else {
        0x22c55e
    }
}

/// A block row currently on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRow {
    pub draw_y: f32,
    pub block_id: i64,
}

/// Scroll accumulator plus the spawn watermark
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldScroll {
    pub offset: f32,
    /// Highest block id whose spawn roll has run
    pub last_processed_block: i64,
}

impl Default for WorldScroll {
    fn default() -> Self {
        Self {
            offset: 0.0,
            last_processed_block: -1,
        }
    }
}

impl WorldScroll {
    /// Whole blocks scrolled past
    pub fn blocks_scrolled(&self) -> i64 {
        (self.offset / HOUSE_UNIT_HEIGHT).floor() as i64
    }

    /// Id of the topmost (newest) row, just above the screen edge
    pub fn newest_block(&self) -> i64 {
        self.blocks_scrolled() + 2
    }

    /// Rows covering the screen, top to bottom
    pub fn visible_rows(&self) -> Vec<BlockRow> {
        let rows = (GAME_HEIGHT / HOUSE_UNIT_HEIGHT) as i64;
        let offset_y = self.offset.rem_euclid(HOUSE_UNIT_HEIGHT);
        let scrolled = self.blocks_scrolled();
        (-1..=rows)
            .map(|i| BlockRow {
                draw_y: i as f32 * HOUSE_UNIT_HEIGHT + offset_y - HOUSE_UNIT_HEIGHT,
                block_id: scrolled - i + 1,
            })
            .collect()
    }

    /// Advance the scroll. Returns the newly entered block id, at most once per id.
    pub fn advance(&mut self, delta: f32) -> Option<i64> {
        self.offset += delta;
        let newest = self.newest_block();
        if newest > self.last_processed_block {
            self.last_processed_block = newest;
            Some(newest)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_pure_function_of_block_id() {
        for id in [1_i64, 2, 7, 13, 500, 99_999] {
            assert_eq!(block_layout(id), block_layout(id));
        }
        assert_ne!(block_layout(1), block_layout(2));
    }

    #[test]
    fn test_intersection_frequency() {
        let intersections: Vec<i64> = (0..30).filter(|&id| is_intersection(id)).collect();
        assert_eq!(intersections, vec![0, 6, 12, 18, 24]);
        assert_eq!(block_layout(12), BlockLayout::Intersection);
        assert_eq!(obstacle_for_block(12, 1), None);
    }

    #[test]
    fn test_building_values_in_range() {
        for id in 1..500 {
            if let BlockLayout::Street { left, right } = block_layout(id) {
                for b in [left, right] {
                    assert!(WALL_COLORS.contains(&b.wall_color));
                    assert!(ROOF_COLORS.contains(&b.roof_color));
                    assert!((0.0..ROOF_HEIGHT_TRIM).contains(&b.height_trim));
                    assert!((0.0..ROOF_WIDTH_TRIM).contains(&b.width_trim));
                }
            }
        }
    }

    #[test]
    fn test_obstacle_roll_deterministic_and_rate() {
        let streets: Vec<i64> = (1..6000).filter(|&id| !is_intersection(id)).collect();
        let spawned = streets
            .iter()
            .filter(|&&id| obstacle_for_block(id, 77).is_some())
            .count();
        let rate = spawned as f32 / streets.len() as f32;
        assert!((0.35..0.45).contains(&rate), "rate {rate}");

        for &id in &streets[..100] {
            assert_eq!(obstacle_for_block(id, 77), obstacle_for_block(id, 77));
        }
    }

    #[test]
    fn test_advance_processes_each_block_once() {
        let mut world = WorldScroll::default();
        let mut seen = Vec::new();
        for _ in 0..1000 {
            if let Some(id) = world.advance(2.0) {
                seen.push(id);
            }
        }
        // 2000px scrolled: rows 2..=16 entered once each, in order
        assert_eq!(seen, (2..=16).collect::<Vec<_>>());
        assert_eq!(world.last_processed_block, 16);

        // Frozen scroll never re-enters a block
        assert_eq!(world.advance(0.0), None);
    }

    #[test]
    fn test_visible_rows_cover_screen() {
        let world = WorldScroll {
            offset: 300.0,
            last_processed_block: -1,
        };
        let rows = world.visible_rows();
        assert_eq!(rows.first().map(|r| r.block_id), Some(world.newest_block()));
        assert!(rows.first().map(|r| r.draw_y).unwrap_or(0.0) < 0.0);
        assert!(rows.last().map(|r| r.draw_y + HOUSE_UNIT_HEIGHT).unwrap_or(0.0) >= GAME_HEIGHT);
        for pair in rows.windows(2) {
            assert_eq!(pair[0].block_id, pair[1].block_id + 1);
            assert_eq!(pair[1].draw_y - pair[0].draw_y, HOUSE_UNIT_HEIGHT);
        }
    }

    #[test]
    fn test_traffic_light_blinks() {
        assert_eq!(traffic_light_color(500.0), 0xef4444);
        assert_eq!(traffic_light_color(1500.0), 0x22c55e);
    }
}
