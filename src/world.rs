use std::collections::{BTreeMap, BTreeSet};

use crate::constants::get_fruit;
use crate::engine::machine::MachineState;
use crate::settings::{PursuerSettings, Settings};
use crate::strategy::Strategy;
use crate::types::{
    ActorStatus, ActorView, Coordinate, Direction, FruitType, PursuerStatus, PursuerView,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub location: Coordinate,
    pub direction: Direction,
    pub status: ActorStatus,
}

impl Actor {
    pub fn new(location: Coordinate, direction: Direction) -> Self {
        Self {
            location,
            direction,
            status: ActorStatus::Alive,
        }
    }

    pub fn moved_to(self, location: Coordinate, direction: Direction) -> Self {
        if self.status != ActorStatus::Alive {
            return self;
        }
        Self {
            location,
            direction,
            ..self
        }
    }

    pub fn with_status(self, status: ActorStatus) -> Self {
        Self { status, ..self }
    }

    pub fn view(&self, lives: u32) -> ActorView {
        ActorView {
            location: self.location,
            direction: self.direction,
            status: self.status,
            lives,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pursuer {
    pub name: String,
    pub location: Coordinate,
    pub direction: Direction,
    pub start: Coordinate,
    pub start_direction: Direction,
    pub home: Coordinate,
    pub status: PursuerStatus,
    pub chase: Strategy,
    pub scatter: Strategy,
    pub frightened: Strategy,
    pub current: Strategy,
    pub exit_threshold: usize,
    pub score_until: Option<u64>,
}

impl Pursuer {
    pub fn from_settings(settings: &PursuerSettings) -> Self {
        Self {
            name: settings.name.clone(),
            location: settings.start,
            direction: settings.direction,
            start: settings.start,
            start_direction: settings.direction,
            home: settings.home,
            status: PursuerStatus::Alive,
            chase: settings.chase.clone(),
            scatter: settings.scatter.clone(),
            frightened: settings.frightened.clone(),
            current: settings.chase.clone(),
            exit_threshold: settings.exit_threshold,
            score_until: None,
        }
    }

    pub fn is_edible(&self) -> bool {
        self.status.is_edible()
    }

    pub fn follows_phase(&self) -> bool {
        matches!(
            self.status,
            PursuerStatus::Alive | PursuerStatus::Edible | PursuerStatus::Flash
        )
    }

    pub fn moved_to(self, location: Coordinate, direction: Direction) -> Self {
        Self {
            location,
            direction,
            ..self
        }
    }

    pub fn scatter(self) -> Self {
        if !self.follows_phase() {
            return self;
        }
        let current = self.scatter.clone();
        Self {
            status: PursuerStatus::Alive,
            current,
            ..self
        }
    }

    pub fn chase(self) -> Self {
        if !self.follows_phase() {
            return self;
        }
        let current = self.chase.clone();
        Self {
            status: PursuerStatus::Alive,
            current,
            ..self
        }
    }

    pub fn frightened(self) -> Self {
        if !self.follows_phase() {
            return self;
        }
        let current = self.frightened.clone();
        let direction = self.direction.opposite();
        Self {
            status: PursuerStatus::Edible,
            direction,
            current,
            ..self
        }
    }

    pub fn flash(self) -> Self {
        if self.status != PursuerStatus::Edible {
            return self;
        }
        Self {
            status: PursuerStatus::Flash,
            ..self
        }
    }

    pub fn eaten(self, score_until: u64) -> Self {
        Self {
            status: PursuerStatus::Score,
            current: Strategy::Homeward,
            score_until: Some(score_until),
            ..self
        }
    }

    pub fn run_home(self) -> Self {
        Self {
            status: PursuerStatus::RunningHome,
            current: Strategy::Homeward,
            score_until: None,
            ..self
        }
    }

    pub fn revive(self, current: Strategy) -> Self {
        Self {
            status: PursuerStatus::Alive,
            current,
            score_until: None,
            ..self
        }
    }

    pub fn reset(self) -> Self {
        let current = self.chase.clone();
        Self {
            location: self.start,
            direction: self.start_direction,
            status: PursuerStatus::Alive,
            current,
            score_until: None,
            ..self
        }
    }

    pub fn view(&self) -> PursuerView {
        PursuerView {
            name: self.name.clone(),
            location: self.location,
            direction: self.direction,
            status: self.status,
            edible: self.is_edible(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WorldState {
    pub state: MachineState,
    pub lives: u32,
    pub score: u32,
    pub level: u32,
    pub countdown: Option<u64>,
    pub coins: BTreeSet<Coordinate>,
    pub power_pills: BTreeSet<Coordinate>,
    pub pursuers: BTreeMap<String, Pursuer>,
    pub actor: Actor,
    pub desired_direction: Direction,
    pub pursuers_visible: bool,
    pub fruit_visible_until: Option<u64>,
    pub fruit_type: FruitType,
}

impl WorldState {
    pub fn new(settings: &Settings) -> Self {
        let mut world = Self {
            state: MachineState::Initial,
            lives: settings.tunables.starting_lives,
            score: 0,
            level: 1,
            countdown: None,
            coins: BTreeSet::new(),
            power_pills: BTreeSet::new(),
            pursuers: BTreeMap::new(),
            actor: Actor::new(settings.actor_start, settings.actor_direction),
            desired_direction: settings.actor_direction,
            pursuers_visible: true,
            fruit_visible_until: None,
            fruit_type: FruitType::Cherry,
        };
        world.reset_level(settings);
        world
    }

    pub fn reset_level(&mut self, settings: &Settings) {
        self.coins = settings.coins.clone();
        self.power_pills = settings.power_pills.clone();
        self.fruit_visible_until = None;
        self.fruit_type = get_fruit(self.level).0;
        self.reset_positions(settings);
    }

    pub fn reset_positions(&mut self, settings: &Settings) {
        self.pursuers = settings
            .pursuers
            .iter()
            .map(|entry| (entry.name.clone(), Pursuer::from_settings(entry)))
            .collect();
        self.actor = Actor::new(settings.actor_start, settings.actor_direction);
        self.desired_direction = settings.actor_direction;
        self.pursuers_visible = true;
    }

    pub fn items_remaining(&self) -> usize {
        self.coins.len() + self.power_pills.len()
    }

    pub fn items_eaten(&self, settings: &Settings) -> usize {
        settings
            .initial_item_count()
            .saturating_sub(self.items_remaining())
    }

    pub fn coins_eaten(&self, settings: &Settings) -> usize {
        settings.coins.len().saturating_sub(self.coins.len())
    }

    pub fn items_exhausted(&self) -> bool {
        self.coins.is_empty() && self.power_pills.is_empty()
    }

    pub fn fruit_visible(&self, now: u64) -> bool {
        matches!(self.fruit_visible_until, Some(until) if now < until)
    }

    pub fn update_pursuer<F>(&mut self, name: &str, change: F)
    where
        F: FnOnce(Pursuer) -> Pursuer,
    {
        if let Some(current) = self.pursuers.remove(name) {
            let next = change(current);
            self.pursuers.insert(next.name.clone(), next);
        }
    }

    pub fn update_all_pursuers<F>(&mut self, mut change: F)
    where
        F: FnMut(Pursuer) -> Pursuer,
    {
        let current = std::mem::take(&mut self.pursuers);
        self.pursuers = current
            .into_values()
            .map(|pursuer| {
                let next = change(pursuer);
                (next.name.clone(), next)
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> Settings {
        Settings::demo().expect("demo settings are valid")
    }

    #[test]
    fn actor_only_moves_while_alive() {
        let actor = Actor::new(Coordinate::new(1, 1), Direction::Left);
        let moved = actor.moved_to(Coordinate::new(2, 1), Direction::Right);
        assert_eq!(moved.location, Coordinate::new(2, 1));

        let dying = actor.with_status(ActorStatus::Dying);
        let stuck = dying.moved_to(Coordinate::new(2, 1), Direction::Right);
        assert_eq!(stuck.location, Coordinate::new(1, 1));
        assert_eq!(stuck.direction, Direction::Left);
    }

    #[test]
    fn frightened_reverses_and_turns_edible() {
        let settings = demo();
        let pursuer = Pursuer::from_settings(&settings.pursuers[0]);
        assert_eq!(pursuer.direction, Direction::Left);
        let scared = pursuer.frightened();
        assert_eq!(scared.status, PursuerStatus::Edible);
        assert_eq!(scared.direction, Direction::Right);
        assert_eq!(scared.current, Strategy::Random);
        assert!(scared.is_edible());

        let flashing = scared.flash();
        assert_eq!(flashing.status, PursuerStatus::Flash);
        assert!(flashing.is_edible());
    }

    #[test]
    fn eaten_pursuer_ignores_phase_changes() {
        let settings = demo();
        let pursuer = Pursuer::from_settings(&settings.pursuers[0])
            .frightened()
            .eaten(1_000);
        assert_eq!(pursuer.status, PursuerStatus::Score);
        assert_eq!(pursuer.current, Strategy::Homeward);

        let unchanged = pursuer.clone().scatter().chase().frightened();
        assert_eq!(unchanged, pursuer);

        let home = pursuer.run_home();
        assert_eq!(home.status, PursuerStatus::RunningHome);
        assert_eq!(home.score_until, None);
        let revived = home.revive(Strategy::DirectToActor);
        assert_eq!(revived.status, PursuerStatus::Alive);
    }

    #[test]
    fn reset_level_refills_items_and_keeps_score() {
        let settings = demo();
        let mut world = WorldState::new(&settings);
        world.score = 1_230;
        world.level = 3;
        world.coins.clear();
        world.power_pills.clear();
        world.pursuers_visible = false;
        assert!(world.items_exhausted());

        world.reset_level(&settings);
        assert_eq!(world.score, 1_230);
        assert_eq!(world.coins, settings.coins);
        assert_eq!(world.power_pills, settings.power_pills);
        assert_eq!(world.fruit_type, FruitType::Orange);
        assert!(world.pursuers_visible);
        assert_eq!(world.items_eaten(&settings), 0);
    }

    #[test]
    fn items_eaten_counts_both_collections() {
        let settings = demo();
        let mut world = WorldState::new(&settings);
        let coin = *world.coins.iter().next().expect("coins exist");
        let pill = *world.power_pills.iter().next().expect("pills exist");
        world.coins.remove(&coin);
        world.power_pills.remove(&pill);
        assert_eq!(world.items_eaten(&settings), 2);
        assert_eq!(world.coins_eaten(&settings), 1);
    }

    #[test]
    fn update_pursuer_replaces_value() {
        let settings = demo();
        let mut world = WorldState::new(&settings);
        world.update_pursuer("Pinky", |pursuer| pursuer.frightened());
        assert_eq!(world.pursuers["Pinky"].status, PursuerStatus::Edible);
        assert_eq!(world.pursuers["Blinky"].status, PursuerStatus::Alive);

        world.update_all_pursuers(Pursuer::flash);
        assert_eq!(world.pursuers["Pinky"].status, PursuerStatus::Flash);
        assert_eq!(world.pursuers["Blinky"].status, PursuerStatus::Alive);
    }
}
