use serde::{Deserialize, Serialize};

use crate::rng::Rng;
use crate::settings::Board;
use crate::types::{Coordinate, Direction};
use crate::world::{Pursuer, WorldState};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    DirectToActor,
    Predictive {
        steps: i32,
    },
    Intercept {
        partner: String,
        steps: i32,
    },
    DistanceGated {
        radius: f64,
        fallback: Coordinate,
    },
    ScatterTo {
        target: Coordinate,
    },
    Random,
    Homeward,
}

impl Strategy {
    pub fn crosses_doors(&self) -> bool {
        matches!(self, Self::Homeward)
    }

    pub fn target(&self, pursuer: &Pursuer, board: &Board, world: &WorldState) -> Option<Coordinate> {
        let actor = world.actor;
        match self {
            Self::DirectToActor => Some(actor.location),
            Self::Predictive { steps } => Some(actor.location.offset(actor.direction, *steps)),
            Self::Intercept { partner, steps } => {
                let projected = actor.location.offset(actor.direction, *steps);
                let Some(partner) = world.pursuers.get(partner) else {
                    return Some(projected);
                };
                Some(Coordinate::new(
                    2 * projected.x - partner.location.x,
                    2 * projected.y - partner.location.y,
                ))
            }
            Self::DistanceGated { radius, fallback } => {
                if pursuer.location.distance(actor.location) > *radius {
                    Some(actor.location)
                } else {
                    Some(*fallback)
                }
            }
            Self::ScatterTo { target } => Some(*target),
            Self::Random => None,
            Self::Homeward => {
                let inside = board.is_in_house(pursuer.location) || board.is_door(pursuer.location);
                match board.door() {
                    Some(door) if !inside => Some(door),
                    _ => Some(pursuer.home),
                }
            }
        }
    }

    pub fn next_direction(
        &self,
        pursuer: &Pursuer,
        board: &Board,
        world: &WorldState,
        rng: &mut Rng,
    ) -> Option<Direction> {
        let through_doors = self.crosses_doors();
        match self.target(pursuer, board, world) {
            Some(target) => toward(
                board,
                pursuer.location,
                pursuer.direction,
                target,
                through_doors,
            ),
            None => {
                let options = candidates(board, pursuer.location, pursuer.direction, through_doors);
                rng.pick_direction(&options)
            }
        }
    }
}

pub fn candidates(
    board: &Board,
    at: Coordinate,
    facing: Direction,
    through_doors: bool,
) -> Vec<Direction> {
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|dir| !board.blocks_pursuer(at + *dir, through_doors))
        .collect();
    if open.len() <= 1 {
        return open;
    }
    open.into_iter()
        .filter(|dir| *dir != facing.opposite())
        .collect()
}

/// Shared selection: the candidate whose landing cell is closest to
/// `target`. Exact ties go to the earliest direction in canonical order.
pub fn toward(
    board: &Board,
    at: Coordinate,
    facing: Direction,
    target: Coordinate,
    through_doors: bool,
) -> Option<Direction> {
    let options = candidates(board, at, facing, through_doors);
    if options.len() == 1 {
        return options.first().copied();
    }
    options
        .into_iter()
        .min_by_key(|dir| (at + *dir).distance_squared(target))
}
