use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::constants::{get_fruit, COIN_SCORE, GHOST_BASE_SCORE, POWER_PILL_SCORE};
use crate::high_score::HighScoreStore;
use crate::move_clock::MoveClock;
use crate::notify::{Notification, NotificationBus};
use crate::rng::Rng;
use crate::settings::Settings;
use crate::strategy::toward;
use crate::types::{
    ActorStatus, ActorView, Coordinate, Direction, FruitView, GameSnapshot, GameStatus,
    PursuerStatus, PursuerView,
};
use crate::world::{Pursuer, WorldState};

mod actions;
pub mod machine;
pub mod scoring;

use self::machine::{Effect, GameEvent, MachineState};

#[derive(Clone, Debug)]
pub struct GameOptions {
    pub seed: u32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self { seed: 1 }
    }
}

#[derive(Debug)]
pub struct Game {
    settings: Settings,
    world: WorldState,
    clock: MoveClock,
    bus: NotificationBus,
    store: Box<dyn HighScoreStore>,
    rng: Rng,
    seed: u32,
    high_score: u32,
    stored_high_score: u32,
    now_ms: u64,
    last_tick_ms: Option<u64>,
}

impl Game {
    pub fn new(settings: Settings, store: Box<dyn HighScoreStore>, options: GameOptions) -> Self {
        let stored_high_score = store.get();
        let world = WorldState::new(&settings);
        let clock = MoveClock::new(settings.cruise_pursuer.clone());
        Self {
            settings,
            world,
            clock,
            bus: NotificationBus::new(),
            store,
            rng: Rng::new(options.seed),
            seed: options.seed,
            high_score: stored_high_score,
            stored_high_score,
            now_ms: 0,
            last_tick_ms: None,
        }
    }

    pub fn start_game(&mut self) {
        self.dispatch(GameEvent::StartGame);
    }

    pub fn press_start(&mut self) {
        self.dispatch(GameEvent::PressStart);
    }

    pub fn change_direction(&mut self, direction: Direction) {
        self.world.desired_direction = direction;
    }

    pub fn subscribe<F>(&mut self, kind: Notification, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.bus.subscribe(kind, callback);
    }

    pub fn tick(&mut self, now_ms: u64) {
        self.bus.publish(Notification::PreTick);

        let delta = self
            .last_tick_ms
            .map(|previous| now_ms.saturating_sub(previous))
            .unwrap_or(0);
        self.last_tick_ms = Some(now_ms);
        self.now_ms = self.now_ms.max(now_ms);
        self.clock.update_time(delta);

        if let Some(deadline) = self.world.countdown {
            if self.now_ms >= deadline {
                self.world.countdown = None;
                self.dispatch(GameEvent::TimerExpired);
            }
        }

        if self.world.state.is_playing() {
            self.dispatch(GameEvent::Tick);
        }
    }

    pub fn status(&self) -> GameStatus {
        self.world.state.external()
    }

    pub fn lives(&self) -> u32 {
        self.world.lives
    }

    pub fn score(&self) -> u32 {
        self.world.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn level(&self) -> u32 {
        self.world.level
    }

    pub fn actor(&self) -> ActorView {
        self.world.actor.view(self.world.lives)
    }

    pub fn pursuers(&self) -> BTreeMap<String, PursuerView> {
        if !self.world.pursuers_visible {
            return BTreeMap::new();
        }
        self.world
            .pursuers
            .iter()
            .map(|(name, pursuer)| (name.clone(), pursuer.view()))
            .collect()
    }

    pub fn coins(&self) -> Vec<Coordinate> {
        self.world.coins.iter().copied().collect()
    }

    pub fn power_pills(&self) -> Vec<Coordinate> {
        self.world.power_pills.iter().copied().collect()
    }

    pub fn fruit(&self) -> Option<FruitView> {
        if !self.world.fruit_visible(self.now_ms) {
            return None;
        }
        let (fruit_type, value) = get_fruit(self.world.level);
        Some(FruitView {
            location: self.settings.fruit,
            fruit_type,
            value,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            status: self.status(),
            lives: self.lives(),
            score: self.score(),
            high_score: self.high_score(),
            level: self.level(),
            actor: self.actor(),
            pursuers: self.pursuers(),
            coins: self.coins(),
            power_pills: self.power_pills(),
            fruit: self.fruit(),
        }
    }
}
