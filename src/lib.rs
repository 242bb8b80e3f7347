pub mod constants;
pub mod engine;
pub mod high_score;
pub mod move_clock;
pub mod notify;
pub mod rng;
pub mod session;
pub mod settings;
pub mod strategy;
pub mod types;
pub mod world;
