use super::*;

impl Game {
    pub(super) fn dispatch(&mut self, event: GameEvent) {
        let transition = machine::transition(self.world.state, &event, &self.world);
        if transition.is_ignored() {
            return;
        }
        for effect in transition.effects {
            self.apply(effect);
        }
        if let Some(next) = transition.next {
            self.enter(next);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::ResetGame => {
                self.stored_high_score = self.store.get();
                self.high_score = self.high_score.max(self.stored_high_score);
                self.world.lives = self.settings.tunables.starting_lives;
                self.world.score = 0;
                self.world.level = 1;
                self.world.reset_level(&self.settings);
                self.clock.reset();
                info!(seed = self.seed, high_score = self.high_score, "game started");
            }
            Effect::AdvanceLevel => {
                self.world.level += 1;
                self.world.reset_level(&self.settings);
                self.clock.reset();
                info!(level = self.world.level, score = self.world.score, "level started");
            }
            Effect::ResetPositions => {
                self.world.reset_positions(&self.settings);
                self.clock.reset();
            }
            Effect::RevealPursuers => self.world.pursuers_visible = true,
            Effect::UpdateFlash => self.update_flash(),
            Effect::AdvanceWorld => self.advance_world(),
            Effect::EatCoin(at) => {
                if self.world.coins.remove(&at) {
                    self.add_score(COIN_SCORE);
                    self.bus.publish(Notification::CoinEaten);
                    self.maybe_reveal_fruit();
                }
            }
            Effect::EatPowerPill(at) => {
                if self.world.power_pills.remove(&at) {
                    self.add_score(POWER_PILL_SCORE);
                    self.bus.publish(Notification::PowerPillEaten);
                }
            }
            Effect::EatFruit => {
                self.world.fruit_visible_until = None;
                let (_, value) = get_fruit(self.world.level);
                self.add_score(value);
                self.bus.publish(Notification::FruitEaten);
            }
            Effect::EatGhost(name) => {
                let value = self.pursuer_chain_value();
                let until = self.now_ms + self.settings.tunables.ghost_score_ms;
                self.world.update_pursuer(&name, |pursuer| pursuer.eaten(until));
                self.clock.forget(&name);
                debug!(pursuer = %name, value, "pursuer eaten");
                self.add_score(value);
                self.bus.publish(Notification::PursuerEaten);
            }
            Effect::LoseLife => {
                self.world.lives = self.world.lives.saturating_sub(1);
                debug!(lives = self.world.lives, "life lost");
            }
            Effect::Notify(kind) => self.bus.publish(kind),
        }
    }

    pub(super) fn enter(&mut self, next: MachineState) {
        let previous = self.world.state;
        self.world.state = next;
        debug!(from = ?previous, to = ?next, "state transition");

        let tunables = &self.settings.tunables;
        let duration = match next {
            MachineState::Initial | MachineState::AttractMode => None,
            MachineState::Scatter => Some(tunables.scatter_ms),
            MachineState::Chase => Some(tunables.chase_ms),
            MachineState::Frightened => Some(tunables.frightened_ms),
            MachineState::Dying => Some(tunables.dying_ms),
            MachineState::Respawning => Some(tunables.respawning_ms),
            MachineState::Dead => Some(tunables.dead_ms),
            MachineState::ChangingLevel => Some(tunables.changing_level_ms),
        };
        self.world.countdown = duration.map(|ms| self.now_ms + ms);

        match next {
            MachineState::Initial | MachineState::AttractMode => {}
            MachineState::Scatter => self.world.update_all_pursuers(Pursuer::scatter),
            MachineState::Chase => self.world.update_all_pursuers(Pursuer::chase),
            MachineState::Frightened => self.world.update_all_pursuers(Pursuer::frightened),
            MachineState::Dying => {
                self.world.actor = self.world.actor.with_status(ActorStatus::Dying);
                self.world.pursuers_visible = false;
                self.bus.publish(Notification::DyingStarted);
            }
            MachineState::Respawning => {
                self.world.actor = self.world.actor.with_status(ActorStatus::Respawning);
                self.bus.publish(Notification::RespawningStarted);
            }
            MachineState::Dead => {
                self.world.actor = self.world.actor.with_status(ActorStatus::Dead);
                self.persist_high_score();
                info!(score = self.world.score, level = self.world.level, "game over");
            }
            MachineState::ChangingLevel => {
                info!(level = self.world.level, "level cleared");
                self.bus.publish(Notification::Intermission);
            }
        }
    }

    fn update_flash(&mut self) {
        if self.world.state != MachineState::Frightened {
            return;
        }
        let Some(deadline) = self.world.countdown else {
            return;
        };
        if self.now_ms + self.settings.tunables.flash_ms >= deadline {
            self.world.update_all_pursuers(Pursuer::flash);
        }
    }

    fn advance_world(&mut self) {
        let names: Vec<String> = self.world.pursuers.keys().cloned().collect();
        for name in names {
            self.advance_pursuer(&name);
            if !self.world.state.is_playing() {
                return;
            }
        }

        self.advance_actor();
        self.resolve_collisions();
    }

    fn advance_pursuer(&mut self, name: &str) {
        let Some(pursuer) = self.world.pursuers.get(name).cloned() else {
            return;
        };

        if pursuer.status == PursuerStatus::Score {
            if pursuer.score_until.is_some_and(|until| self.now_ms >= until) {
                self.world.update_pursuer(name, Pursuer::run_home);
            }
            return;
        }

        let board = &self.settings.board;
        let in_tunnel = board.is_tunnel(pursuer.location);
        if !self.clock.should_pursuer_move(
            self.world.level,
            self.world.items_remaining(),
            name,
            pursuer.status,
            in_tunnel,
        ) {
            return;
        }

        let in_pen = (board.is_in_house(pursuer.location) || board.is_door(pursuer.location))
            && pursuer.status != PursuerStatus::RunningHome;
        let direction = if in_pen {
            if self.world.items_eaten(&self.settings) < pursuer.exit_threshold {
                return;
            }
            board.door_exit().and_then(|exit| {
                toward(board, pursuer.location, pursuer.direction, exit, true)
            })
        } else {
            pursuer
                .current
                .next_direction(&pursuer, board, &self.world, &mut self.rng)
        };
        let Some(direction) = direction else {
            return;
        };

        let stepped = pursuer.location + direction;
        let landed = board.portal_exit(stepped, direction).unwrap_or(stepped);
        let mut moved = pursuer.moved_to(landed, direction);
        if moved.status == PursuerStatus::RunningHome && moved.location == moved.home {
            let strategy = if self.world.state == MachineState::Scatter {
                moved.scatter.clone()
            } else {
                moved.chase.clone()
            };
            moved = moved.revive(strategy);
        }
        self.world.pursuers.insert(name.to_string(), moved);

        if landed == self.world.actor.location && self.world.actor.status == ActorStatus::Alive {
            self.dispatch(GameEvent::GhostCollision(name.to_string()));
        }
    }

    fn advance_actor(&mut self) {
        let actor = self.world.actor;
        if actor.status != ActorStatus::Alive {
            return;
        }
        let frightened = self.world.state == MachineState::Frightened;
        if !self.clock.should_actor_move(self.world.level, frightened) {
            return;
        }

        let board = &self.settings.board;
        let direction = self.world.desired_direction;
        let stepped = actor.location + direction;
        if board.blocks_actor(stepped) {
            return;
        }
        let landed = board.portal_exit(stepped, direction).unwrap_or(stepped);
        self.world.actor = actor.moved_to(landed, direction);
    }

    fn resolve_collisions(&mut self) {
        if self.world.actor.status != ActorStatus::Alive {
            return;
        }
        let at = self.world.actor.location;

        let hits: Vec<String> = self
            .world
            .pursuers
            .values()
            .filter(|pursuer| pursuer.location == at)
            .map(|pursuer| pursuer.name.clone())
            .collect();
        for name in hits {
            self.dispatch(GameEvent::GhostCollision(name));
            if !self.world.state.is_playing() {
                return;
            }
        }

        if self.world.coins.contains(&at) {
            self.dispatch(GameEvent::CoinCollision(at));
            if self.check_exhausted() {
                return;
            }
        }

        if self.world.power_pills.contains(&at) {
            self.dispatch(GameEvent::PowerPillCollision(at));
            if self.check_exhausted() {
                return;
            }
        }

        if self.world.fruit_visible(self.now_ms) && at == self.settings.fruit {
            self.dispatch(GameEvent::FruitCollision);
        }
    }

    // True when play stopped.
    fn check_exhausted(&mut self) -> bool {
        if self.world.items_exhausted() {
            self.dispatch(GameEvent::ItemsExhausted);
        }
        !self.world.state.is_playing()
    }
}
