use crate::notify::Notification;
use crate::types::{Coordinate, GameStatus, PursuerStatus};
use crate::world::WorldState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineState {
    Initial,
    AttractMode,
    Scatter,
    Chase,
    Frightened,
    Dying,
    Respawning,
    Dead,
    ChangingLevel,
}

impl MachineState {
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Scatter | Self::Chase | Self::Frightened)
    }

    pub fn external(self) -> GameStatus {
        match self {
            Self::Initial => GameStatus::Initial,
            Self::AttractMode => GameStatus::AttractMode,
            Self::Scatter | Self::Chase | Self::Frightened => GameStatus::Alive,
            Self::Dying => GameStatus::Dying,
            Self::Respawning => GameStatus::Respawning,
            Self::Dead => GameStatus::Dead,
            Self::ChangingLevel => GameStatus::ChangingLevel,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    StartGame,
    PressStart,
    Tick,
    TimerExpired,
    GhostCollision(String),
    CoinCollision(Coordinate),
    PowerPillCollision(Coordinate),
    FruitCollision,
    ItemsExhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ResetGame,
    AdvanceLevel,
    ResetPositions,
    RevealPursuers,
    UpdateFlash,
    AdvanceWorld,
    EatCoin(Coordinate),
    EatPowerPill(Coordinate),
    EatFruit,
    EatGhost(String),
    LoseLife,
    Notify(Notification),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub next: Option<MachineState>,
}

impl Transition {
    pub fn ignore() -> Self {
        Self::default()
    }

    fn stay(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            next: None,
        }
    }

    fn enter(next: MachineState) -> Self {
        Self {
            effects: Vec::new(),
            next: Some(next),
        }
    }

    fn then(effects: Vec<Effect>, next: MachineState) -> Self {
        Self {
            effects,
            next: Some(next),
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.effects.is_empty() && self.next.is_none()
    }
}

pub fn transition(state: MachineState, event: &GameEvent, world: &WorldState) -> Transition {
    use MachineState as S;

    match (state, event) {
        (S::Initial, GameEvent::StartGame) => Transition::enter(S::AttractMode),
        (S::AttractMode, GameEvent::PressStart) => Transition::then(
            vec![
                Effect::ResetGame,
                Effect::Notify(Notification::GameBeginning),
            ],
            S::Scatter,
        ),

        (S::Scatter, GameEvent::TimerExpired) => Transition::enter(S::Chase),
        (S::Chase, GameEvent::TimerExpired) => Transition::enter(S::Scatter),
        (S::Frightened, GameEvent::TimerExpired) => Transition::enter(S::Scatter),
        (playing, event) if playing.is_playing() => in_play(event, world),

        (S::Dying, GameEvent::TimerExpired) => {
            if world.lives > 0 {
                Transition::enter(S::Respawning)
            } else {
                Transition::enter(S::Dead)
            }
        }
        (S::Respawning, GameEvent::TimerExpired) => Transition::then(
            vec![Effect::ResetPositions, Effect::RevealPursuers],
            S::Chase,
        ),
        (S::Dead, GameEvent::TimerExpired) => Transition::enter(S::AttractMode),
        (S::ChangingLevel, GameEvent::TimerExpired) => {
            Transition::then(vec![Effect::AdvanceLevel], S::Chase)
        }

        _ => Transition::ignore(),
    }
}

fn in_play(event: &GameEvent, world: &WorldState) -> Transition {
    match event {
        GameEvent::Tick => Transition::stay(vec![Effect::UpdateFlash, Effect::AdvanceWorld]),
        GameEvent::CoinCollision(at) => Transition::stay(vec![Effect::EatCoin(*at)]),
        GameEvent::PowerPillCollision(at) => {
            Transition::then(vec![Effect::EatPowerPill(*at)], MachineState::Frightened)
        }
        GameEvent::FruitCollision => Transition::stay(vec![Effect::EatFruit]),
        GameEvent::GhostCollision(name) => {
            let Some(pursuer) = world.pursuers.get(name) else {
                return Transition::ignore();
            };
            if pursuer.is_edible() {
                return Transition::stay(vec![Effect::EatGhost(name.clone())]);
            }
            if pursuer.status == PursuerStatus::Alive {
                return Transition::then(vec![Effect::LoseLife], MachineState::Dying);
            }
            Transition::ignore()
        }
        GameEvent::ItemsExhausted => Transition::enter(MachineState::ChangingLevel),
        GameEvent::StartGame | GameEvent::PressStart | GameEvent::TimerExpired => {
            Transition::ignore()
        }
    }
}
