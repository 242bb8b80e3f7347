use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    BONUS_LIFE_SCORE, CHANGING_LEVEL_MS, CHASE_MS, DEAD_MS, DISTANCE_GATE_RADIUS, DYING_MS,
    FLASH_MS, FRIGHTENED_MS, FRUIT_VISIBLE_MS, GHOST_SCORE_MS, RESPAWNING_MS, SCATTER_MS,
    STARTING_LIVES,
};
use crate::strategy::Strategy;
use crate::types::{Coordinate, Direction};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board row {row} has {actual} tiles, expected {expected}")]
    RaggedBoard {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile '{tile}' at ({},{})", at.x, at.y)]
    UnknownTile { at: Coordinate, tile: char },
    #[error("missing required placement: {0}")]
    MissingPlacement(&'static str),
    #[error("expected 0 or 2 portal cells, found {0}")]
    PortalCount(usize),
    #[error("{what} at ({},{}) is outside the board", at.x, at.y)]
    OutOfBounds { what: String, at: Coordinate },
    #[error("{what} at ({},{}) is not on an open cell", at.x, at.y)]
    BlockedPlacement { what: String, at: Coordinate },
    #[error("pursuer '{0}' is defined twice")]
    DuplicatePursuer(String),
    #[error("pursuer '{0}' is not in the roster")]
    UnknownPursuer(String),
    #[error("ghost house has no door with an open exit")]
    MissingDoor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub walls: BTreeSet<Coordinate>,
    pub doors: BTreeSet<Coordinate>,
    pub ghost_house: BTreeSet<Coordinate>,
    pub tunnels: BTreeSet<Coordinate>,
    pub portals: Vec<Coordinate>,
}

impl Board {
    /// Builds a board from structural tiles: `#` wall, `-` door,
    /// `H` ghost house, `T` tunnel floor, `.` or space for floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, SettingsError> {
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        let mut board = Board {
            width: width as i32,
            height: rows.len() as i32,
            walls: BTreeSet::new(),
            doors: BTreeSet::new(),
            ghost_house: BTreeSet::new(),
            tunnels: BTreeSet::new(),
            portals: Vec::new(),
        };
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != width {
                return Err(SettingsError::RaggedBoard {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, tile) in row.chars().enumerate() {
                let at = Coordinate::new(x as i32, y as i32);
                match tile {
                    '#' => {
                        board.walls.insert(at);
                    }
                    '-' => {
                        board.doors.insert(at);
                    }
                    'H' => {
                        board.ghost_house.insert(at);
                    }
                    'T' => {
                        board.tunnels.insert(at);
                    }
                    '.' | ' ' => {}
                    _ => return Err(SettingsError::UnknownTile { at, tile }),
                }
            }
        }
        Ok(board)
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height
    }

    pub fn is_wall(&self, at: Coordinate) -> bool {
        !self.contains(at) || self.walls.contains(&at)
    }

    pub fn is_door(&self, at: Coordinate) -> bool {
        self.doors.contains(&at)
    }

    pub fn is_in_house(&self, at: Coordinate) -> bool {
        self.ghost_house.contains(&at)
    }

    pub fn is_tunnel(&self, at: Coordinate) -> bool {
        self.tunnels.contains(&at)
    }

    pub fn blocks_actor(&self, at: Coordinate) -> bool {
        self.is_wall(at) || self.is_door(at) || self.is_in_house(at)
    }

    pub fn blocks_pursuer(&self, at: Coordinate, through_doors: bool) -> bool {
        self.is_wall(at) || (!through_doors && self.is_door(at))
    }

    pub fn portal_exit(&self, at: Coordinate, dir: Direction) -> Option<Coordinate> {
        let [a, b] = self.portals.as_slice() else {
            return None;
        };
        if at == *a {
            return Some(*b + dir);
        }
        if at == *b {
            return Some(*a + dir);
        }
        None
    }

    pub fn door(&self) -> Option<Coordinate> {
        self.doors.iter().next().copied()
    }

    pub fn door_exit(&self) -> Option<Coordinate> {
        let door = self.door()?;
        Direction::ALL
            .into_iter()
            .map(|dir| door + dir)
            .find(|cell| !self.is_wall(*cell) && !self.is_door(*cell) && !self.is_in_house(*cell))
    }

    pub fn open_cells(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let at = Coordinate::new(x, y);
                if !self.blocks_actor(at) && !self.is_tunnel(at) {
                    out.push(at);
                }
            }
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tunables {
    pub scatter_ms: u64,
    pub chase_ms: u64,
    pub frightened_ms: u64,
    pub flash_ms: u64,
    pub dying_ms: u64,
    pub respawning_ms: u64,
    pub dead_ms: u64,
    pub changing_level_ms: u64,
    pub fruit_ms: u64,
    pub ghost_score_ms: u64,
    pub starting_lives: u32,
    pub bonus_life_score: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            scatter_ms: SCATTER_MS,
            chase_ms: CHASE_MS,
            frightened_ms: FRIGHTENED_MS,
            flash_ms: FLASH_MS,
            dying_ms: DYING_MS,
            respawning_ms: RESPAWNING_MS,
            dead_ms: DEAD_MS,
            changing_level_ms: CHANGING_LEVEL_MS,
            fruit_ms: FRUIT_VISIBLE_MS,
            ghost_score_ms: GHOST_SCORE_MS,
            starting_lives: STARTING_LIVES,
            bonus_life_score: BONUS_LIFE_SCORE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PursuerSettings {
    pub name: String,
    pub start: Coordinate,
    pub direction: Direction,
    pub home: Coordinate,
    #[serde(default)]
    pub exit_threshold: usize,
    pub chase: Strategy,
    pub scatter: Strategy,
    #[serde(default = "default_frightened")]
    pub frightened: Strategy,
}

fn default_frightened() -> Strategy {
    Strategy::Random
}

// Placements are optional so a missing one is a configuration error, not
// a parse error.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    pub rows: Vec<String>,
    #[serde(default)]
    pub portals: Vec<Coordinate>,
    #[serde(default)]
    pub coins: Option<Vec<Coordinate>>,
    #[serde(default)]
    pub power_pills: Vec<Coordinate>,
    #[serde(default)]
    pub pursuers: Vec<PursuerSettings>,
    #[serde(default)]
    pub actor_start: Option<Coordinate>,
    #[serde(default)]
    pub actor_direction: Option<Direction>,
    #[serde(default)]
    pub fruit: Option<Coordinate>,
    #[serde(default)]
    pub fruit_reveal_at: Vec<usize>,
    #[serde(default)]
    pub cruise_pursuer: Option<String>,
    #[serde(default)]
    pub tunables: Tunables,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub board: Board,
    pub coins: BTreeSet<Coordinate>,
    pub power_pills: BTreeSet<Coordinate>,
    pub pursuers: Vec<PursuerSettings>,
    pub actor_start: Coordinate,
    pub actor_direction: Direction,
    pub fruit: Coordinate,
    pub fruit_reveal_at: Vec<usize>,
    pub cruise_pursuer: Option<String>,
    pub tunables: Tunables,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = serde_json::from_str(text)?;
        Self::try_from(file)
    }

    pub fn initial_item_count(&self) -> usize {
        self.coins.len() + self.power_pills.len()
    }

    pub fn demo() -> Result<Self, SettingsError> {
        let rows = [
            "#####################",
            "#.........#.........#",
            "#.##.####.#.####.##.#",
            "#...................#",
            "#.##.#.###-###.#.##.#",
            "#....#.#HHHHH#.#....#",
            "TTTT.#.#HHHHH#.#.TTTT",
            "#....#.#######.#....#",
            "#.##.#.........#.##.#",
            "#.##.#.#######.#.##.#",
            "#.........#.........#",
            "#.##.####.#.####.##.#",
            "#...................#",
            "#####################",
        ];
        let pursuer = |name: &str,
                       start: (i32, i32),
                       direction: Direction,
                       home: (i32, i32),
                       exit_threshold: usize,
                       chase: Strategy,
                       scatter: (i32, i32)| PursuerSettings {
            name: name.to_string(),
            start: Coordinate::new(start.0, start.1),
            direction,
            home: Coordinate::new(home.0, home.1),
            exit_threshold,
            chase,
            scatter: Strategy::ScatterTo {
                target: Coordinate::new(scatter.0, scatter.1),
            },
            frightened: Strategy::Random,
        };

        Self::try_from(SettingsFile {
            rows: rows.iter().map(|row| row.to_string()).collect(),
            portals: vec![Coordinate::new(0, 6), Coordinate::new(20, 6)],
            coins: None,
            power_pills: vec![
                Coordinate::new(1, 1),
                Coordinate::new(19, 1),
                Coordinate::new(1, 12),
                Coordinate::new(19, 12),
            ],
            pursuers: vec![
                pursuer(
                    "Blinky",
                    (10, 3),
                    Direction::Left,
                    (10, 6),
                    0,
                    Strategy::DirectToActor,
                    (18, -2),
                ),
                pursuer(
                    "Pinky",
                    (10, 6),
                    Direction::Up,
                    (10, 6),
                    0,
                    Strategy::Predictive { steps: 4 },
                    (2, -2),
                ),
                pursuer(
                    "Inky",
                    (9, 6),
                    Direction::Up,
                    (9, 6),
                    30,
                    Strategy::Intercept {
                        partner: "Blinky".to_string(),
                        steps: 2,
                    },
                    (20, 14),
                ),
                pursuer(
                    "Clyde",
                    (11, 6),
                    Direction::Up,
                    (11, 6),
                    60,
                    Strategy::DistanceGated {
                        radius: DISTANCE_GATE_RADIUS,
                        fallback: Coordinate::new(0, 14),
                    },
                    (0, 14),
                ),
            ],
            actor_start: Some(Coordinate::new(10, 8)),
            actor_direction: Some(Direction::Left),
            fruit: Some(Coordinate::new(10, 8)),
            fruit_reveal_at: vec![50, 100],
            cruise_pursuer: Some("Blinky".to_string()),
            tunables: Tunables::default(),
        })
    }
}

impl TryFrom<SettingsFile> for Settings {
    type Error = SettingsError;

    fn try_from(file: SettingsFile) -> Result<Self, Self::Error> {
        let mut board = Board::from_rows(&file.rows)?;

        if !file.portals.is_empty() && file.portals.len() != 2 {
            return Err(SettingsError::PortalCount(file.portals.len()));
        }
        for portal in &file.portals {
            check_open(&board, "portal", *portal)?;
        }
        board.portals = file.portals.clone();
        check_portal_exits(&board)?;

        let actor_start = file
            .actor_start
            .ok_or(SettingsError::MissingPlacement("actor start"))?;
        check_open(&board, "actor start", actor_start)?;
        let fruit = file.fruit.ok_or(SettingsError::MissingPlacement("fruit"))?;
        check_open(&board, "fruit", fruit)?;

        let mut power_pills = BTreeSet::new();
        for pill in &file.power_pills {
            check_open(&board, "power pill", *pill)?;
            power_pills.insert(*pill);
        }

        let coins: BTreeSet<Coordinate> = match &file.coins {
            Some(coins) => {
                for coin in coins {
                    check_open(&board, "coin", *coin)?;
                }
                coins.iter().copied().collect()
            }
            None => board
                .open_cells()
                .into_iter()
                .filter(|cell| *cell != actor_start && !power_pills.contains(cell))
                .collect(),
        };

        let mut names = HashSet::new();
        for pursuer in &file.pursuers {
            if !names.insert(pursuer.name.as_str()) {
                return Err(SettingsError::DuplicatePursuer(pursuer.name.clone()));
            }
        }
        for pursuer in &file.pursuers {
            check_inside(&board, &format!("pursuer '{}' start", pursuer.name), pursuer.start)?;
            check_inside(&board, &format!("pursuer '{}' home", pursuer.name), pursuer.home)?;
            for strategy in [&pursuer.chase, &pursuer.scatter, &pursuer.frightened] {
                if let Strategy::Intercept { partner, .. } = strategy {
                    if !names.contains(partner.as_str()) {
                        return Err(SettingsError::UnknownPursuer(partner.clone()));
                    }
                }
            }
        }
        if let Some(cruise) = &file.cruise_pursuer {
            if !names.contains(cruise.as_str()) {
                return Err(SettingsError::UnknownPursuer(cruise.clone()));
            }
        }
        if !board.ghost_house.is_empty() && board.door_exit().is_none() {
            return Err(SettingsError::MissingDoor);
        }

        Ok(Settings {
            board,
            coins,
            power_pills,
            pursuers: file.pursuers,
            actor_start,
            actor_direction: file.actor_direction.unwrap_or(Direction::Left),
            fruit,
            fruit_reveal_at: file.fruit_reveal_at,
            cruise_pursuer: file.cruise_pursuer,
            tunables: file.tunables,
        })
    }
}

fn check_portal_exits(board: &Board) -> Result<(), SettingsError> {
    let [a, b] = board.portals.as_slice() else {
        return Ok(());
    };
    for (entry, exit) in [(*a, *b), (*b, *a)] {
        for dir in Direction::ALL {
            if board.is_wall(entry + dir.opposite()) {
                continue;
            }
            let landing = exit + dir;
            if board.blocks_actor(landing) {
                return Err(SettingsError::BlockedPlacement {
                    what: "portal exit".to_string(),
                    at: landing,
                });
            }
        }
    }
    Ok(())
}

fn check_inside(board: &Board, what: &str, at: Coordinate) -> Result<(), SettingsError> {
    if !board.contains(at) {
        return Err(SettingsError::OutOfBounds {
            what: what.to_string(),
            at,
        });
    }
    if board.is_wall(at) {
        return Err(SettingsError::BlockedPlacement {
            what: what.to_string(),
            at,
        });
    }
    Ok(())
}

fn check_open(board: &Board, what: &str, at: Coordinate) -> Result<(), SettingsError> {
    check_inside(board, what, at)?;
    if board.blocks_actor(at) {
        return Err(SettingsError::BlockedPlacement {
            what: what.to_string(),
            at,
        });
    }
    Ok(())
}
