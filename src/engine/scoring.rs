use super::*;

pub fn ghost_chain_score(non_edible: usize) -> u32 {
    GHOST_BASE_SCORE << non_edible.min(16) as u32
}

pub fn crosses_threshold(before: u32, after: u32, threshold: u32) -> bool {
    before < threshold && after >= threshold
}

impl Game {
    pub(super) fn add_score(&mut self, points: u32) {
        let before = self.world.score;
        let after = before.saturating_add(points);
        self.world.score = after;
        self.high_score = self.high_score.max(after);

        if crosses_threshold(before, after, self.settings.tunables.bonus_life_score) {
            self.world.lives += 1;
            debug!(score = after, lives = self.world.lives, "extra life awarded");
            self.bus.publish(Notification::ExtraLifeAwarded);
        }
    }

    pub(super) fn pursuer_chain_value(&self) -> u32 {
        let non_edible = self
            .world
            .pursuers
            .values()
            .filter(|pursuer| !pursuer.is_edible())
            .count();
        ghost_chain_score(non_edible)
    }

    pub(super) fn maybe_reveal_fruit(&mut self) {
        let eaten = self.world.coins_eaten(&self.settings);
        if !self.settings.fruit_reveal_at.contains(&eaten) {
            return;
        }
        self.world.fruit_type = get_fruit(self.world.level).0;
        self.world.fruit_visible_until = Some(self.now_ms + self.settings.tunables.fruit_ms);
        debug!(coins_eaten = eaten, fruit = ?self.world.fruit_type, "fruit revealed");
    }

    pub(super) fn persist_high_score(&mut self) {
        if self.world.score <= self.stored_high_score {
            return;
        }
        self.store.set(self.world.score);
        self.stored_high_score = self.world.score;
        info!(high_score = self.world.score, "new high score");
    }
}
