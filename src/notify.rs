use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Notification {
    CoinEaten,
    PowerPillEaten,
    FruitEaten,
    GameBeginning,
    PursuerEaten,
    PreTick,
    DyingStarted,
    RespawningStarted,
    ExtraLifeAwarded,
    Intermission,
}

impl Notification {
    pub const ALL: [Notification; 10] = [
        Notification::CoinEaten,
        Notification::PowerPillEaten,
        Notification::FruitEaten,
        Notification::GameBeginning,
        Notification::PursuerEaten,
        Notification::PreTick,
        Notification::DyingStarted,
        Notification::RespawningStarted,
        Notification::ExtraLifeAwarded,
        Notification::Intermission,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoinEaten => "coin_eaten",
            Self::PowerPillEaten => "power_pill_eaten",
            Self::FruitEaten => "fruit_eaten",
            Self::GameBeginning => "game_beginning",
            Self::PursuerEaten => "pursuer_eaten",
            Self::PreTick => "pre_tick",
            Self::DyingStarted => "dying_started",
            Self::RespawningStarted => "respawning_started",
            Self::ExtraLifeAwarded => "extra_life_awarded",
            Self::Intermission => "intermission",
        }
    }
}

type Callback = Box<dyn FnMut() + Send>;

#[derive(Default)]
pub struct NotificationBus {
    subscribers: HashMap<Notification, Vec<Callback>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: Notification, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    pub fn publish(&mut self, kind: Notification) {
        if let Some(callbacks) = self.subscribers.get_mut(&kind) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }
    }

}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(Notification, usize)> = self
            .subscribers
            .iter()
            .map(|(kind, callbacks)| (*kind, callbacks.len()))
            .collect();
        counts.sort();
        f.debug_struct("NotificationBus")
            .field("subscribers", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn callbacks_run_in_registration_order() {
        let mut bus = NotificationBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for idx in 0..3 {
            let log = Arc::clone(&log);
            bus.subscribe(Notification::CoinEaten, move || {
                log.lock().expect("log lock").push(idx);
            });
        }
        bus.publish(Notification::CoinEaten);
        assert_eq!(*log.lock().expect("log lock"), vec![0, 1, 2]);
    }

    #[test]
    fn publish_only_reaches_matching_kind() {
        let mut bus = NotificationBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        bus.subscribe(Notification::PursuerEaten, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(Notification::CoinEaten);
        bus.publish(Notification::Intermission);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        bus.publish(Notification::PursuerEaten);
        bus.publish(Notification::PursuerEaten);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn publishing_without_subscribers_is_a_no_op() {
        let mut bus = NotificationBus::new();
        bus.publish(Notification::PreTick);
        assert_eq!(format!("{bus:?}"), "NotificationBus { subscribers: [] }");
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = Notification::ALL.iter().map(|kind| kind.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Notification::ALL.len());
    }
}
