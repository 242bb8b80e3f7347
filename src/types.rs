use std::collections::BTreeMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    // Canonical order, also used to break exact distance ties.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction, steps: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }

    pub fn distance_squared(self, other: Coordinate) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Coordinate) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

impl Add<Direction> for Coordinate {
    type Output = Coordinate;

    fn add(self, dir: Direction) -> Coordinate {
        self.offset(dir, 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorStatus {
    Alive,
    Dying,
    Respawning,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerStatus {
    Alive,
    Edible,
    Flash,
    RunningHome,
    Score,
}

impl PursuerStatus {
    pub fn is_edible(self) -> bool {
        matches!(self, Self::Edible | Self::Flash)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FruitType {
    Cherry,
    Strawberry,
    Orange,
    Apple,
    Melon,
    Galaxian,
    Bell,
    Key,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Initial,
    AttractMode,
    Alive,
    Dying,
    Respawning,
    Dead,
    ChangingLevel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActorView {
    pub location: Coordinate,
    pub direction: Direction,
    pub status: ActorStatus,
    pub lives: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PursuerView {
    pub name: String,
    pub location: Coordinate,
    pub direction: Direction,
    pub status: PursuerStatus,
    pub edible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FruitView {
    pub location: Coordinate,
    #[serde(rename = "type")]
    pub fruit_type: FruitType,
    pub value: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub lives: u32,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub level: u32,
    pub actor: ActorView,
    pub pursuers: BTreeMap<String, PursuerView>,
    pub coins: Vec<Coordinate>,
    #[serde(rename = "powerPills")]
    pub power_pills: Vec<Coordinate>,
    pub fruit: Option<FruitView>,
}
