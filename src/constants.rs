use crate::types::FruitType;

pub const COIN_SCORE: u32 = 10;
pub const POWER_PILL_SCORE: u32 = 50;
pub const GHOST_BASE_SCORE: u32 = 200;

pub const STARTING_LIVES: u32 = 3;
pub const BONUS_LIFE_SCORE: u32 = 10_000;

pub const SCATTER_MS: u64 = 7_000;
pub const CHASE_MS: u64 = 20_000;
pub const FRIGHTENED_MS: u64 = 6_000;
pub const FLASH_MS: u64 = 2_000;
pub const DYING_MS: u64 = 4_000;
pub const RESPAWNING_MS: u64 = 3_000;
pub const DEAD_MS: u64 = 4_000;
pub const CHANGING_LEVEL_MS: u64 = 4_000;
pub const FRUIT_VISIBLE_MS: u64 = 10_000;
pub const GHOST_SCORE_MS: u64 = 1_000;

// One cell per 100 ms at 100 % speed, kept in microseconds.
pub const FULL_SPEED_STEP_US: u64 = 100_000;

pub const RUNNING_HOME_SPEED: u32 = 150;
pub const DISTANCE_GATE_RADIUS: f64 = 8.0;

pub fn get_actor_speed(level: u32) -> (u32, u32) {
    if level <= 1 {
        return (80, 90);
    }
    if level <= 4 {
        return (90, 95);
    }
    (100, 100)
}

pub fn get_pursuer_speed(level: u32) -> (u32, u32) {
    if level <= 1 {
        return (75, 50);
    }
    if level <= 4 {
        return (85, 55);
    }
    (95, 60)
}

// Two cruise bands per level: (items remaining at or below, speed %).
pub fn get_cruise_bands(level: u32) -> [(usize, u32); 2] {
    if level <= 1 {
        return [(20, 80), (10, 85)];
    }
    if level <= 2 {
        return [(30, 90), (15, 95)];
    }
    if level <= 4 {
        return [(40, 90), (20, 95)];
    }
    if level <= 5 {
        return [(40, 100), (20, 105)];
    }
    if level <= 8 {
        return [(50, 100), (25, 105)];
    }
    if level <= 11 {
        return [(60, 100), (30, 105)];
    }
    if level <= 14 {
        return [(80, 100), (40, 105)];
    }
    if level <= 18 {
        return [(100, 100), (50, 105)];
    }
    [(120, 100), (60, 105)]
}

pub fn get_fruit(level: u32) -> (FruitType, u32) {
    match level {
        0 | 1 => (FruitType::Cherry, 100),
        2 => (FruitType::Strawberry, 300),
        3 | 4 => (FruitType::Orange, 500),
        5 | 6 => (FruitType::Apple, 700),
        7 | 8 => (FruitType::Melon, 1_000),
        9 | 10 => (FruitType::Galaxian, 2_000),
        11 | 12 => (FruitType::Bell, 3_000),
        _ => (FruitType::Key, 5_000),
    }
}
