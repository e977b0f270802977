//! The sandbox game loop.
//!
//! Each timestep every living seat acts once in table order. A report or an
//! emergency button ends the task phase early and opens a meeting: a few
//! rounds of speech, then a vote. The human seat is asked through
//! [`HumanInput`]; every other seat picks uniformly among its options.

use std::time::Duration;

use async_trait::async_trait;
use impostor_core::{
    ActionOption, ActivityEntry, GameConfig, GameOutcome, GameView, HumanView, Phase,
    PlayerSummary, Simulation, SimulationContext, SimulationError, Team,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::action::Action;
use crate::map::Room;
use crate::seat::{COLORS, Role, Seat};

const BOT_LINES: &[&str] = &[
    "I was in {room} the whole time.",
    "I think {other} is acting sus.",
    "I didn't see anything.",
    "Let's skip unless someone has proof.",
    "{other} was near {room} earlier.",
    "I'm a crewmate, I was doing my tasks.",
];

/// One sandbox game. Built by [`SandboxFactory`](crate::SandboxFactory).
pub struct SandboxGame {
    config: GameConfig,
    delay: Duration,
    rng: StdRng,
    seats: Vec<Seat>,
    phase: Phase,
    timestep: u32,
    current: Option<usize>,
    log: Vec<ActivityEntry>,
    human_actions: Vec<ActionOption>,
    human_step: Option<String>,
}

impl SandboxGame {
    /// A game that has not dealt its seats yet. `config` must be validated.
    pub(crate) fn new(config: GameConfig, delay: Duration) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            config,
            delay,
            rng,
            seats: Vec::new(),
            phase: Phase::Task,
            timestep: 0,
            current: None,
            log: Vec::new(),
            human_actions: Vec::new(),
            human_step: None,
        }
    }

    fn deal(&mut self) {
        let preset = &self.config.preset;
        let n = preset.num_players;

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.rng);
        let impostors = &order[..preset.num_impostors];
        let human = self
            .config
            .include_human
            .then(|| self.rng.random_range(0..n));

        self.seats = (0..n)
            .map(|i| {
                let role = if impostors.contains(&i) {
                    Role::Impostor
                } else {
                    Role::Crewmate
                };
                let mut seat = Seat::new(i + 1, COLORS[i % COLORS.len()], role);
                seat.human = human == Some(i);
                seat.tasks_left = if role == Role::Crewmate {
                    preset.tasks_per_player
                } else {
                    0
                };
                seat.buttons_left = preset.max_num_buttons;
                seat.cooldown = preset.kill_cooldown;
                seat
            })
            .collect();
        debug!(players = n, human = ?human, "seats dealt");
    }

    fn view(&self) -> GameView {
        let human = self.seats.iter().position(|s| s.human);
        GameView {
            initialized: !self.seats.is_empty(),
            current_phase: Some(self.phase),
            timestep: self.timestep,
            max_timesteps: Some(self.config.preset.max_timesteps),
            current_player: self.current.map(|i| self.seats[i].name.clone()),
            players: self
                .seats
                .iter()
                .enumerate()
                .map(|(i, s)| PlayerSummary {
                    name: s.name.clone(),
                    location: s.room.name().to_owned(),
                    color: s.color.to_owned(),
                    is_alive: s.alive,
                    info: Some(self.situation(i, false)),
                })
                .collect(),
            activity_log: self.log.clone(),
            human: human.map(|i| HumanView {
                player_name: self.seats[i].name.clone(),
                available_actions: self.human_actions.clone(),
                current_step: self.human_step.clone(),
                player_info: Some(self.situation(i, true)),
            }),
        }
    }

    /// Situation text of seat `idx`. Role and counters only when `private`.
    fn situation(&self, idx: usize, private: bool) -> String {
        let seat = &self.seats[idx];
        let others_here: Vec<&str> = self
            .seats
            .iter()
            .enumerate()
            .filter(|&(j, s)| j != idx && s.alive && s.room == seat.room)
            .map(|(_, s)| s.name.as_str())
            .collect();
        let mut info = if private {
            format!(
                "You are {}, {} {}.",
                seat.name,
                if seat.role == Role::Impostor { "an" } else { "a" },
                seat.role,
            )
        } else {
            format!("{}.", seat.name)
        };
        info.push_str(&format!(
            " Timestep {} of {}. In {}.",
            self.timestep, self.config.preset.max_timesteps, seat.room
        ));
        if !seat.alive {
            info.push_str(" Dead.");
        }
        if others_here.is_empty() {
            info.push_str(" Nobody else is here.");
        } else {
            info.push_str(&format!(" Also here: {}.", others_here.join(", ")));
        }
        if private {
            match seat.role {
                Role::Crewmate => info.push_str(&format!(" Tasks left: {}.", seat.tasks_left)),
                Role::Impostor => info.push_str(&format!(" Kill cooldown: {}.", seat.cooldown)),
            }
        }
        info
    }

    fn publish(&self, ctx: &SimulationContext) {
        ctx.view.publish(self.view());
    }

    async fn pause(&self) {
        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn record(&mut self, idx: Option<usize>, round: Option<u32>, action: String) {
        self.log.push(ActivityEntry {
            timestep: self.timestep,
            round,
            phase: self.phase,
            player: idx.map(|i| self.seats[i].name.clone()),
            action: Some(action),
        });
    }

    /// Let seat `idx` pick one of `options`.
    async fn choose(
        &mut self,
        ctx: &SimulationContext,
        idx: usize,
        options: &[Action],
        step: String,
    ) -> Result<(Action, String), SimulationError> {
        self.current = Some(idx);
        let here = self.seats[idx].room;

        if self.seats[idx].human {
            let offered: Vec<ActionOption> = options
                .iter()
                .map(|a| a.option(&self.seats, here))
                .collect();
            self.human_actions.clone_from(&offered);
            self.human_step = Some(step);
            self.publish(ctx);

            let reply = ctx.human.request(offered).await?;
            let action = options.get(reply.action_index).copied().ok_or_else(|| {
                SimulationError::Engine(format!(
                    "human chose action {} of {}",
                    reply.action_index,
                    options.len()
                ))
            })?;
            return Ok((action, reply.message));
        }

        self.publish(ctx);
        self.pause().await;
        let action = options[self.rng.random_range(0..options.len())];
        let message = if action == Action::Speak {
            self.bot_line(idx)
        } else {
            String::new()
        };
        Ok((action, message))
    }

    fn bot_line(&mut self, idx: usize) -> String {
        let others: Vec<usize> = (0..self.seats.len())
            .filter(|&j| j != idx && self.seats[j].alive)
            .collect();
        let other = if others.is_empty() {
            "nobody".to_owned()
        } else {
            self.seats[others[self.rng.random_range(0..others.len())]]
                .name
                .clone()
        };
        let room = self.seats[idx].room.name();
        BOT_LINES[self.rng.random_range(0..BOT_LINES.len())]
            .replace("{other}", &other)
            .replace("{room}", room)
    }

    fn task_actions(&self, idx: usize) -> Vec<Action> {
        let seat = &self.seats[idx];
        let mut actions: Vec<Action> = seat.room.neighbors().into_iter().map(Action::Move).collect();

        if seat.role == Role::Crewmate && seat.tasks_left > 0 {
            actions.push(Action::CompleteTask);
        }
        for (j, other) in self.seats.iter().enumerate() {
            if j == idx || other.room != seat.room {
                continue;
            }
            if seat.role == Role::Impostor && seat.cooldown == 0 && other.is_live_crewmate() {
                actions.push(Action::Kill(j));
            }
            if !other.alive && !other.body_reported {
                actions.push(Action::Report(j));
            }
        }
        if seat.room == Room::SPAWN && seat.buttons_left > 0 {
            actions.push(Action::CallMeeting);
        }
        actions.push(Action::Wait);
        actions
    }

    fn apply_task_action(&mut self, idx: usize, action: Action) {
        let here = self.seats[idx].room;
        let rendered = action.render(&self.seats, here, "");
        match action {
            Action::Move(room) => self.seats[idx].room = room,
            Action::CompleteTask => {
                self.seats[idx].tasks_left = self.seats[idx].tasks_left.saturating_sub(1);
            }
            Action::Kill(target) => {
                self.seats[target].alive = false;
                self.seats[idx].cooldown = self.config.preset.kill_cooldown;
            }
            Action::CallMeeting => {
                self.seats[idx].buttons_left = self.seats[idx].buttons_left.saturating_sub(1);
            }
            Action::Report(_) | Action::Wait | Action::Speak | Action::Vote(_) | Action::SkipVote => {}
        }
        self.record(Some(idx), None, rendered);
    }

    fn living(&self) -> Vec<usize> {
        (0..self.seats.len()).filter(|&i| self.seats[i].alive).collect()
    }

    fn outcome(&self) -> Option<GameOutcome> {
        let impostors = self.seats.iter().filter(|s| s.is_live_impostor()).count();
        let crewmates = self.seats.iter().filter(|s| s.is_live_crewmate()).count();
        if impostors == 0 {
            return Some(GameOutcome {
                winner: Team::Crewmates,
                reason: "All impostors were ejected".into(),
            });
        }
        if impostors >= crewmates {
            return Some(GameOutcome {
                winner: Team::Impostors,
                reason: "Impostors outnumber crewmates".into(),
            });
        }
        let tasks_left: u32 = self
            .seats
            .iter()
            .filter(|s| s.is_live_crewmate())
            .map(|s| s.tasks_left)
            .sum();
        if tasks_left == 0 {
            return Some(GameOutcome {
                winner: Team::Crewmates,
                reason: "Crewmates completed all tasks".into(),
            });
        }
        None
    }

    /// Discussion rounds, then a vote.
    async fn meeting(&mut self, ctx: &SimulationContext) -> Result<(), SimulationError> {
        self.phase = Phase::Meeting;
        for seat in &mut self.seats {
            if seat.alive {
                seat.room = Room::SPAWN;
            } else {
                seat.body_reported = true;
            }
        }

        for round in 1..=self.config.preset.discussion_rounds {
            for idx in self.living() {
                let (_, message) = self
                    .choose(ctx, idx, &[Action::Speak], format!("Meeting: discussion round {round}"))
                    .await?;
                let here = self.seats[idx].room;
                let rendered = Action::Speak.render(&self.seats, here, message.trim());
                self.record(Some(idx), Some(round), rendered);
            }
        }

        let living = self.living();
        let mut tally = vec![0_u32; self.seats.len()];
        let mut skips = 0_u32;
        for &idx in &living {
            let mut options: Vec<Action> = living
                .iter()
                .filter(|&&j| j != idx)
                .map(|&j| Action::Vote(j))
                .collect();
            options.push(Action::SkipVote);
            let (vote, _) = self
                .choose(ctx, idx, &options, "Meeting: vote".to_owned())
                .await?;
            match vote {
                Action::Vote(target) => tally[target] += 1,
                _ => skips += 1,
            }
            let here = self.seats[idx].room;
            let rendered = vote.render(&self.seats, here, "");
            self.record(Some(idx), None, rendered);
        }

        let top = tally.iter().copied().max().unwrap_or(0);
        let leaders: Vec<usize> = (0..tally.len()).filter(|&i| tally[i] == top).collect();
        let result = if top > skips && leaders.len() == 1 {
            let ejected = leaders[0];
            self.seats[ejected].alive = false;
            self.seats[ejected].body_reported = true;
            format!(
                "{} was ejected ({})",
                self.seats[ejected].name, self.seats[ejected].role
            )
        } else {
            "No one was ejected".to_owned()
        };
        info!(timestep = self.timestep, %result, "meeting ended");
        self.record(None, None, result);
        self.phase = Phase::Task;
        Ok(())
    }

    async fn play(&mut self, ctx: &SimulationContext) -> Result<GameOutcome, SimulationError> {
        self.deal();
        self.publish(ctx);

        while self.timestep < self.config.preset.max_timesteps {
            let mut meeting = false;
            for idx in self.living() {
                if !self.seats[idx].alive {
                    continue;
                }
                let options = self.task_actions(idx);
                let (action, _) = self
                    .choose(ctx, idx, &options, "Task phase: choose an action".to_owned())
                    .await?;
                self.apply_task_action(idx, action);
                self.publish(ctx);
                if let Some(outcome) = self.outcome() {
                    return Ok(outcome);
                }
                if action.starts_meeting() {
                    meeting = true;
                    break;
                }
            }

            if meeting {
                self.meeting(ctx).await?;
                self.publish(ctx);
                if let Some(outcome) = self.outcome() {
                    return Ok(outcome);
                }
            }

            self.timestep += 1;
            for seat in &mut self.seats {
                seat.cooldown = seat.cooldown.saturating_sub(1);
            }
            self.publish(ctx);
        }

        Ok(GameOutcome {
            winner: Team::Crewmates,
            reason: "Time limit reached".into(),
        })
    }
}

#[async_trait]
impl Simulation for SandboxGame {
    async fn run(
        mut self: Box<Self>,
        ctx: SimulationContext,
    ) -> Result<GameOutcome, SimulationError> {
        let outcome = self.play(&ctx).await;
        self.current = None;
        self.publish(&ctx);
        outcome
    }
}
