use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::engine::Game;
use crate::types::{Direction, GameSnapshot};

const COMMAND_QUEUE: usize = 64;

#[derive(Debug)]
enum Command {
    StartGame,
    PressStart,
    ChangeDirection(Direction),
    Snapshot(oneshot::Sender<GameSnapshot>),
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("game session is closed")]
pub struct SessionClosed;

pub struct Session;

impl Session {
    pub fn spawn(game: Game, tick: Duration) -> SessionHandle {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let task = tokio::spawn(run(game, tick, rx));
        SessionHandle { tx, task }
    }
}

pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    task: JoinHandle<Game>,
}

impl SessionHandle {
    pub async fn start_game(&self) -> Result<(), SessionClosed> {
        self.send(Command::StartGame).await
    }

    pub async fn press_start(&self) -> Result<(), SessionClosed> {
        self.send(Command::PressStart).await
    }

    pub async fn change_direction(&self, direction: Direction) -> Result<(), SessionClosed> {
        self.send(Command::ChangeDirection(direction)).await
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, SessionClosed> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        response.await.map_err(|_| SessionClosed)
    }

    pub async fn shutdown(self) -> Result<Game, SessionClosed> {
        self.send(Command::Shutdown).await?;
        self.task.await.map_err(|_| SessionClosed)
    }

    async fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.tx.send(command).await.map_err(|_| SessionClosed)
    }
}

async fn run(mut game: Game, tick: Duration, mut rx: mpsc::Receiver<Command>) -> Game {
    let started = Instant::now();
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            at = interval.tick() => {
                let now_ms = at.duration_since(started).as_millis() as u64;
                game.tick(now_ms);
            }
            command = rx.recv() => {
                let Some(command) = command else {
                    debug!("session handle dropped");
                    break;
                };
                match command {
                    Command::StartGame => game.start_game(),
                    Command::PressStart => game.press_start(),
                    Command::ChangeDirection(direction) => game.change_direction(direction),
                    Command::Snapshot(reply) => {
                        if reply.send(game.snapshot()).is_err() {
                            warn!("snapshot requester went away");
                        }
                    }
                    Command::Shutdown => break,
                }
            }
        }
    }
    game
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameOptions;
    use crate::high_score::MemoryHighScore;
    use crate::settings::Settings;
    use crate::types::GameStatus;

    fn demo_game() -> Game {
        Game::new(
            Settings::demo().expect("demo settings are valid"),
            Box::new(MemoryHighScore::default()),
            GameOptions::default(),
        )
    }

    #[tokio::test]
    async fn commands_reach_the_game_in_order() {
        let handle = Session::spawn(demo_game(), Duration::from_millis(5));
        handle.start_game().await.expect("session open");
        let snapshot = handle.snapshot().await.expect("session open");
        assert_eq!(snapshot.status, GameStatus::AttractMode);

        handle.press_start().await.expect("session open");
        handle
            .change_direction(Direction::Right)
            .await
            .expect("session open");
        let snapshot = handle.snapshot().await.expect("session open");
        assert_eq!(snapshot.status, GameStatus::Alive);
        assert_eq!(snapshot.lives, 3);

        let game = handle.shutdown().await.expect("clean shutdown");
        assert_eq!(game.level(), 1);
    }

    #[tokio::test]
    async fn ticks_advance_the_world() {
        let handle = Session::spawn(demo_game(), Duration::from_millis(16));
        handle.start_game().await.expect("session open");
        handle.press_start().await.expect("session open");
        let before = handle.snapshot().await.expect("session open");

        tokio::time::sleep(Duration::from_millis(500)).await;
        let after = handle.snapshot().await.expect("session open");
        assert_ne!(before.actor.location, after.actor.location);

        handle.shutdown().await.expect("clean shutdown");
    }

    #[tokio::test]
    async fn closed_session_reports_error() {
        let handle = Session::spawn(demo_game(), Duration::from_millis(5));
        let tx = handle.tx.clone();
        handle.shutdown().await.expect("clean shutdown");
        assert!(tx.send(Command::StartGame).await.is_err());
        assert_eq!(SessionClosed.to_string(), "game session is closed");
    }
}
