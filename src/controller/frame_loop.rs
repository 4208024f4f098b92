use tracing::{debug, info};

use crate::config::RoundConfig;
use crate::controller::{
    CombatResolver, DeferredAction, GroundedCheck, InputEvent, InputSnapshot, InputState,
    KeyBindings, PlayerController, ShotReport, SimulationState, TaskHandle,
    VerticalSpeedHeuristic,
};
use crate::error::{ConfigError, ReloadRejected, ShotRejected};
use crate::model::{EnemyId, RoundEnded};
use crate::scene::ArenaLayout;
use crate::view::{RenderSnapshot, StatusMessage};

/// Stages of one tick, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStage {
    DeferredTasks,
    SampleInput,
    PlayerControl,
    PhysicsStep,
    CameraSync,
    Combat,
    EnemySync,
    RoundClock,
    Emit,
}

pub const FRAME_STAGE_ORDER: [FrameStage; 9] = [
    FrameStage::DeferredTasks,
    FrameStage::SampleInput,
    FrameStage::PlayerControl,
    FrameStage::PhysicsStep,
    FrameStage::CameraSync,
    FrameStage::Combat,
    FrameStage::EnemySync,
    FrameStage::RoundClock,
    FrameStage::Emit,
];

/// Something that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
    Jumped,
    ShotFired(ShotReport),
    ShotRejected(ShotRejected),
    EnemyDefeated(EnemyId),
    ReloadStarted,
    ReloadRejected(ReloadRejected),
    ReloadFinished,
    RoundEnded(RoundEnded),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub snapshot: RenderSnapshot,
    pub events: Vec<FrameEvent>,
}

/// Runs the per-tick pipeline over a [`SimulationState`].
pub struct FrameLoop<G = VerticalSpeedHeuristic> {
    state: SimulationState,
    controller: PlayerController<G>,
    combat: CombatResolver,
    input: InputState,
    bindings: KeyBindings,
    last_tick_order: Vec<FrameStage>,
}

impl FrameLoop {
    pub fn new(state: SimulationState) -> Self {
        Self {
            controller: PlayerController::from_config(&state.config),
            combat: CombatResolver::from_config(&state.config),
            state,
            input: InputState::new(),
            bindings: KeyBindings::default(),
            last_tick_order: Vec::with_capacity(FRAME_STAGE_ORDER.len()),
        }
    }

    /// Validate `config` and build a round on `layout`.
    pub fn from_layout(layout: &ArenaLayout, config: &RoundConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(layout.build_round(config)))
    }
}

impl<G: GroundedCheck> FrameLoop<G> {
    pub fn with_grounded_check<H: GroundedCheck>(self, grounded: H) -> FrameLoop<H> {
        FrameLoop {
            state: self.state,
            controller: self.controller.with_grounded_check(grounded),
            combat: self.combat,
            input: self.input,
            bindings: self.bindings,
            last_tick_order: self.last_tick_order,
        }
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn last_tick_order(&self) -> &[FrameStage] {
        &self.last_tick_order
    }

    /// Feed a device event; it takes effect on the next tick.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.input.process_event(event, &self.bindings);
    }

    /// Tick using the input gathered through [`FrameLoop::handle_event`].
    pub fn update(&mut self, wall_dt: f32) -> FrameOutput {
        let snapshot = self
            .input
            .snapshot(&self.bindings, self.state.config.look_sensitivity);
        self.advance(wall_dt, snapshot)
    }

    /// Tick with an explicit input snapshot.
    pub fn advance(&mut self, wall_dt: f32, input: InputSnapshot) -> FrameOutput {
        self.last_tick_order.clear();
        let mut events = Vec::new();
        let dt = if wall_dt.is_finite() {
            wall_dt.clamp(0.0, self.state.config.max_wall_delta)
        } else {
            0.0
        };

        self.last_tick_order.push(FrameStage::DeferredTasks);
        for action in self.state.scheduler.advance(f64::from(dt)) {
            if action == DeferredAction::FinishReload {
                events.push(FrameEvent::ReloadFinished);
            }
            self.state.apply_deferred(action);
        }

        self.last_tick_order.push(FrameStage::SampleInput);
        let input = if self.state.round.is_running() {
            input
        } else {
            input.look_only()
        };

        self.last_tick_order.push(FrameStage::PlayerControl);
        self.state.player.weapon.aiming = input.aim_held();
        let player_body = self.state.player.body();
        if let Some(body) = self.state.physics.body_mut(player_body) {
            let outcome = self.controller.update(&mut self.state.player, body, &input);
            if outcome.jumped {
                debug!(velocity_y = body.velocity.y, "player_jumped");
                events.push(FrameEvent::Jumped);
            }
        }

        self.last_tick_order.push(FrameStage::PhysicsStep);
        let fixed_dt = self.state.config.fixed_dt;
        self.state.physics.step(fixed_dt, dt);

        self.last_tick_order.push(FrameStage::CameraSync);
        self.state.sync_camera();

        self.last_tick_order.push(FrameStage::Combat);
        if input.shoot_pressed() {
            match self.attempt_shoot() {
                Ok(report) => {
                    events.push(FrameEvent::ShotFired(report));
                    if let Some(enemy) = report.defeated() {
                        events.push(FrameEvent::EnemyDefeated(enemy));
                    }
                }
                Err(rejected) => events.push(FrameEvent::ShotRejected(rejected)),
            }
        }
        if input.reload_pressed() {
            match self.reload() {
                Ok(_) => events.push(FrameEvent::ReloadStarted),
                Err(rejected) => events.push(FrameEvent::ReloadRejected(rejected)),
            }
        }

        self.last_tick_order.push(FrameStage::EnemySync);
        self.state.enemies.sync_transforms(&self.state.physics);

        self.last_tick_order.push(FrameStage::RoundClock);
        let score = self.state.player.score();
        if let Some(ended) = self.state.round.tick(dt, score) {
            self.end_round(ended);
            events.push(FrameEvent::RoundEnded(ended));
        }

        self.last_tick_order.push(FrameStage::Emit);
        FrameOutput {
            snapshot: RenderSnapshot::capture(&self.state),
            events,
        }
    }

    /// Shoot from the camera as of the last completed stage.
    pub fn attempt_shoot(&mut self) -> Result<ShotReport, ShotRejected> {
        let now = self.state.now();
        let result = self.combat.attempt_shoot(now, &mut self.state);
        if result == Err(ShotRejected::OutOfAmmo) {
            self.state.message = Some(StatusMessage::OutOfAmmo);
        }
        result
    }

    pub fn reload(&mut self) -> Result<TaskHandle, ReloadRejected> {
        let handle = self.combat.reload(&mut self.state)?;
        self.state.message = Some(StatusMessage::Reloading);
        Ok(handle)
    }

    fn end_round(&mut self, ended: RoundEnded) {
        let dropped = self.state.scheduler.cancel_all();
        self.state.pending_reload = None;
        self.state.player.weapon.abort_reload();
        self.state.camera.recoil_pitch = 0.0;
        self.state.message = Some(StatusMessage::TimeUp {
            score: ended.final_score,
        });
        info!(
            final_score = ended.final_score,
            cancelled_tasks = dropped,
            "round_ended"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoundPhase;

    const DT: f32 = 1.0 / 60.0;

    fn frame_loop() -> FrameLoop {
        FrameLoop::from_layout(&ArenaLayout::default(), &RoundConfig::default()).expect("valid")
    }

    #[test]
    fn stages_run_in_fixed_order() {
        let mut frame = frame_loop();
        frame.advance(DT, InputSnapshot::empty().with_shoot_pressed(true));
        assert_eq!(frame.last_tick_order(), FRAME_STAGE_ORDER.as_slice());
    }

    #[test]
    fn non_finite_delta_freezes_the_whole_tick() {
        let mut frame = frame_loop();
        let player = frame.state().player.body();
        let before = frame.state().physics.body(player).expect("body").position;
        let time_left = frame.state().round.time_left();

        frame.advance(f32::NAN, InputSnapshot::empty());
        frame.advance(f32::INFINITY, InputSnapshot::empty());

        let after = frame.state().physics.body(player).expect("body").position;
        assert_eq!(after, before);
        assert_eq!(frame.state().round.time_left(), time_left);
        assert_eq!(frame.state().now(), 0.0);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = RoundConfig {
            max_ammo: 0,
            ..RoundConfig::default()
        };
        assert!(matches!(
            FrameLoop::from_layout(&ArenaLayout::default(), &config),
            Err(ConfigError::EmptyMagazine)
        ));
    }

    #[test]
    fn out_of_ammo_shows_message_but_rate_limit_is_silent() {
        let mut frame = frame_loop();
        assert!(frame.attempt_shoot().is_ok());
        assert_eq!(frame.attempt_shoot(), Err(ShotRejected::FireRateLimited));
        assert_eq!(frame.state().message, None);

        frame.state_mut().player.weapon = crate::model::Weapon::new(0);
        assert_eq!(frame.attempt_shoot(), Err(ShotRejected::OutOfAmmo));
        assert_eq!(
            frame.state().hud_status().message_text(),
            "Out of ammo"
        );
    }

    #[test]
    fn reload_message_clears_when_done() {
        let mut frame = frame_loop();
        let output = frame.advance(DT, InputSnapshot::empty().with_reload_pressed(true));
        assert!(output.events.contains(&FrameEvent::ReloadStarted));
        assert_eq!(output.snapshot.hud.message_text(), "Reloading...");

        let mut finished = false;
        for _ in 0..80 {
            let output = frame.advance(DT, InputSnapshot::empty());
            finished |= output.events.contains(&FrameEvent::ReloadFinished);
        }
        assert!(finished);
        assert_eq!(frame.state().hud_status().message_text(), "");
    }

    #[test]
    fn round_end_cancels_pending_work() {
        let config = RoundConfig {
            round_duration: 0.5,
            ..RoundConfig::default()
        };
        let mut frame = FrameLoop::from_layout(&ArenaLayout::default(), &config).expect("valid");
        frame.advance(DT, InputSnapshot::empty().with_reload_pressed(true));
        frame.advance(DT, InputSnapshot::empty().with_shoot_pressed(true));
        assert!(frame.state().player.weapon.is_reloading());

        let mut ends = 0;
        for _ in 0..120 {
            let output = frame.advance(DT, InputSnapshot::empty());
            ends += output
                .events
                .iter()
                .filter(|e| matches!(e, FrameEvent::RoundEnded(_)))
                .count();
            assert!(!output.events.contains(&FrameEvent::ReloadFinished));
        }

        let state = frame.state();
        assert_eq!(ends, 1);
        assert_eq!(state.round.phase(), RoundPhase::Ended);
        assert!(state.scheduler.is_empty());
        assert!(!state.player.weapon.is_reloading());
        assert_eq!(state.camera.recoil_pitch, 0.0);
        assert_eq!(state.hud_status().message_text(), "Time Up! Score: 0");
    }

    #[test]
    fn after_round_end_only_look_is_honoured() {
        let config = RoundConfig {
            round_duration: 0.1,
            ..RoundConfig::default()
        };
        let mut frame = FrameLoop::from_layout(&ArenaLayout::default(), &config).expect("valid");
        for _ in 0..10 {
            frame.advance(DT, InputSnapshot::empty());
        }
        assert!(!frame.state().round.is_running());
        let yaw = frame.state().player.yaw;

        let output = frame.advance(
            DT,
            InputSnapshot::empty()
                .with_move(0.0, -1.0)
                .with_look(0.1, 0.0)
                .with_shoot_pressed(true)
                .with_jump_pressed(true)
                .with_reload_pressed(true),
        );

        assert!(output.events.is_empty());
        assert_eq!(frame.state().player.weapon.ammo(), 5);
        assert!((frame.state().player.yaw - (yaw + 0.1)).abs() < 1e-6);
        let body = frame
            .state()
            .physics
            .body(frame.state().player.body())
            .expect("body");
        assert!(body.velocity.x.abs() < 1e-3 && body.velocity.z.abs() < 1e-3);
    }

    #[test]
    fn events_drive_the_same_pipeline() {
        let mut frame = frame_loop();
        frame.handle_event(&InputEvent::KeyDown("w".into()));
        frame.update(DT);
        let body = frame
            .state()
            .physics
            .body(frame.state().player.body())
            .expect("body");
        // spawn yaw faces -Z, so forward runs towards the targets
        assert!(body.velocity.z < -4.9);
    }
}
