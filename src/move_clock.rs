use std::collections::HashMap;

use crate::constants::{
    get_actor_speed, get_cruise_bands, get_pursuer_speed, FULL_SPEED_STEP_US, RUNNING_HOME_SPEED,
};
use crate::types::PursuerStatus;

/// Per-entity rate limiter. A successful check moves the stamp forward by
/// exactly one interval, so step counts never depend on polling frequency.
#[derive(Clone, Debug, Default)]
pub struct MoveClock {
    now_us: u64,
    cruise_pursuer: Option<String>,
    actor_last: Option<u64>,
    pursuer_last: HashMap<String, u64>,
}

impl MoveClock {
    pub fn new(cruise_pursuer: Option<String>) -> Self {
        Self {
            cruise_pursuer,
            ..Self::default()
        }
    }

    pub fn update_time(&mut self, delta_ms: u64) {
        self.now_us = self.now_us.saturating_add(delta_ms.saturating_mul(1_000));
    }

    pub fn reset(&mut self) {
        self.actor_last = None;
        self.pursuer_last.clear();
    }

    pub fn forget(&mut self, name: &str) {
        self.pursuer_last.remove(name);
    }

    pub fn should_actor_move(&mut self, level: u32, frightened: bool) -> bool {
        let (normal, fast) = get_actor_speed(level);
        let percent = if frightened { fast } else { normal };
        let interval = interval_us(percent, false);
        gate(&mut self.actor_last, self.now_us, interval)
    }

    pub fn should_pursuer_move(
        &mut self,
        level: u32,
        items_remaining: usize,
        name: &str,
        status: PursuerStatus,
        in_tunnel: bool,
    ) -> bool {
        let Some(percent) = self.pursuer_percent(level, items_remaining, name, status) else {
            return false;
        };
        let interval = interval_us(percent, in_tunnel);
        let mut last = self.pursuer_last.get(name).copied();
        let moved = gate(&mut last, self.now_us, interval);
        if let Some(stamp) = last {
            self.pursuer_last.insert(name.to_string(), stamp);
        }
        moved
    }

    pub fn pursuer_percent(
        &self,
        level: u32,
        items_remaining: usize,
        name: &str,
        status: PursuerStatus,
    ) -> Option<u32> {
        let (alive, edible) = get_pursuer_speed(level);
        match status {
            PursuerStatus::Score => None,
            PursuerStatus::RunningHome => Some(RUNNING_HOME_SPEED),
            PursuerStatus::Edible | PursuerStatus::Flash => Some(edible),
            PursuerStatus::Alive => {
                if self.cruise_pursuer.as_deref() != Some(name) {
                    return Some(alive);
                }
                let [(first_items, first_speed), (second_items, second_speed)] =
                    get_cruise_bands(level);
                if items_remaining <= second_items {
                    return Some(second_speed);
                }
                if items_remaining <= first_items {
                    return Some(first_speed);
                }
                Some(alive)
            }
        }
    }
}

pub fn interval_us(percent: u32, in_tunnel: bool) -> u64 {
    let divisor = if in_tunnel { 2 } else { 1 };
    FULL_SPEED_STEP_US * 100 * divisor / u64::from(percent.max(1))
}

fn gate(last: &mut Option<u64>, now: u64, interval: u64) -> bool {
    match *last {
        None => {
            *last = Some(now);
            true
        }
        Some(stamp) if now.saturating_sub(stamp) >= interval => {
            *last = Some(stamp + interval);
            true
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_actor_moves(clock: &mut MoveClock, total_ms: u64, slice_ms: u64) -> u64 {
        let mut moves = 0;
        let mut elapsed = 0;
        while elapsed < total_ms {
            clock.update_time(slice_ms);
            elapsed += slice_ms;
            if clock.should_actor_move(1, false) {
                moves += 1;
            }
        }
        moves
    }

    #[test]
    fn first_check_always_moves() {
        let mut clock = MoveClock::new(None);
        assert!(clock.should_actor_move(1, false));
        assert!(clock.should_pursuer_move(1, 100, "Pinky", PursuerStatus::Alive, false));
    }

    #[test]
    fn polling_without_time_never_starts_a_new_interval() {
        let mut clock = MoveClock::new(None);
        assert!(clock.should_actor_move(1, false));
        for _ in 0..1_000 {
            assert!(!clock.should_actor_move(1, false));
        }
    }

    #[test]
    fn step_count_depends_only_on_elapsed_time() {
        // 80 % at level 1 is one step per 125 ms.
        assert_eq!(interval_us(80, false), 125_000);

        let mut fine = MoveClock::new(None);
        assert!(fine.should_actor_move(1, false));
        assert_eq!(count_actor_moves(&mut fine, 10_500, 1), 10_500 / 125);

        let mut coarse = MoveClock::new(None);
        assert!(coarse.should_actor_move(1, false));
        assert_eq!(count_actor_moves(&mut coarse, 10_500, 7), 10_500 / 125);
    }

    #[test]
    fn irregular_ticks_keep_long_run_periodicity() {
        let mut clock = MoveClock::new(None);
        assert!(clock.should_actor_move(1, false));
        let slices = [16, 17, 16, 33, 1, 50];
        let mut elapsed = 0;
        let mut moves = 0;
        for idx in 0..600 {
            let slice = slices[idx % slices.len()];
            clock.update_time(slice);
            elapsed += slice;
            if clock.should_actor_move(1, false) {
                moves += 1;
            }
        }
        assert_eq!(moves, elapsed / 125);
    }

    #[test]
    fn tunnel_halves_speed() {
        assert_eq!(interval_us(50, true), 2 * interval_us(50, false));
        let mut clock = MoveClock::new(None);
        assert!(clock.should_pursuer_move(1, 100, "Inky", PursuerStatus::Edible, true));
        clock.update_time(200);
        assert!(!clock.should_pursuer_move(1, 100, "Inky", PursuerStatus::Edible, true));
        clock.update_time(200);
        assert!(clock.should_pursuer_move(1, 100, "Inky", PursuerStatus::Edible, true));
    }

    #[test]
    fn pursuer_speed_depends_on_status() {
        let clock = MoveClock::new(None);
        assert_eq!(clock.pursuer_percent(1, 100, "Inky", PursuerStatus::Alive), Some(75));
        assert_eq!(clock.pursuer_percent(1, 100, "Inky", PursuerStatus::Flash), Some(50));
        assert_eq!(clock.pursuer_percent(3, 100, "Inky", PursuerStatus::Edible), Some(55));
        assert_eq!(
            clock.pursuer_percent(9, 100, "Inky", PursuerStatus::RunningHome),
            Some(150)
        );
        assert_eq!(clock.pursuer_percent(1, 100, "Inky", PursuerStatus::Score), None);
    }

    #[test]
    fn cruise_pursuer_speeds_up_as_items_run_out() {
        let clock = MoveClock::new(Some("Blinky".to_string()));
        assert_eq!(clock.pursuer_percent(1, 21, "Blinky", PursuerStatus::Alive), Some(75));
        assert_eq!(clock.pursuer_percent(1, 20, "Blinky", PursuerStatus::Alive), Some(80));
        assert_eq!(clock.pursuer_percent(1, 11, "Blinky", PursuerStatus::Alive), Some(80));
        assert_eq!(clock.pursuer_percent(1, 10, "Blinky", PursuerStatus::Alive), Some(85));
        assert_eq!(clock.pursuer_percent(6, 25, "Blinky", PursuerStatus::Alive), Some(105));
        assert_eq!(clock.pursuer_percent(1, 5, "Pinky", PursuerStatus::Alive), Some(75));
        assert_eq!(clock.pursuer_percent(1, 5, "Blinky", PursuerStatus::Edible), Some(50));
    }

    #[test]
    fn score_status_never_moves_and_keeps_no_stamp() {
        let mut clock = MoveClock::new(None);
        assert!(!clock.should_pursuer_move(1, 100, "Clyde", PursuerStatus::Score, false));
        assert!(clock.should_pursuer_move(1, 100, "Clyde", PursuerStatus::Alive, false));
    }

    #[test]
    fn reset_and_forget_restart_entities() {
        let mut clock = MoveClock::new(None);
        assert!(clock.should_actor_move(1, false));
        assert!(clock.should_pursuer_move(1, 100, "Pinky", PursuerStatus::Alive, false));
        assert!(clock.should_pursuer_move(1, 100, "Inky", PursuerStatus::Alive, false));

        clock.forget("Pinky");
        assert!(clock.should_pursuer_move(1, 100, "Pinky", PursuerStatus::Alive, false));
        assert!(!clock.should_pursuer_move(1, 100, "Inky", PursuerStatus::Alive, false));

        clock.reset();
        assert!(clock.should_actor_move(1, false));
        assert!(clock.should_pursuer_move(1, 100, "Inky", PursuerStatus::Alive, false));
    }
}
