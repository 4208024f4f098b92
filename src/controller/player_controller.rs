use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

use crate::config::RoundConfig;
use crate::controller::InputSnapshot;
use crate::model::{Player, RigidBody, SpeedMode};

/// Decides whether the player may jump.
pub trait GroundedCheck {
    fn is_grounded(&self, body: &RigidBody) -> bool;

    /// True when the answer is guessed from motion instead of contacts.
    fn is_approximate(&self) -> bool {
        false
    }
}

/// Treats near-zero vertical speed as standing on something.
///
/// Also true at the apex of a jump, so a second jump is possible there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalSpeedHeuristic {
    pub threshold: f32,
}

impl Default for VerticalSpeedHeuristic {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

impl GroundedCheck for VerticalSpeedHeuristic {
    fn is_grounded(&self, body: &RigidBody) -> bool {
        body.velocity.y.abs() < self.threshold
    }

    fn is_approximate(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlOutcome {
    pub jumped: bool,
}

/// Turns an input snapshot into player orientation and body velocity.
#[derive(Debug, Clone)]
pub struct PlayerController<G = VerticalSpeedHeuristic> {
    pub base_speed: f32,
    pub sprint_speed: f32,
    pub jump_impulse: f32,
    pub damping: f32,
    pub move_threshold: f32,
    pub pitch_limit: f32,
    grounded: G,
}

impl PlayerController {
    pub fn from_config(config: &RoundConfig) -> Self {
        Self {
            base_speed: config.base_speed,
            sprint_speed: config.sprint_speed,
            jump_impulse: config.jump_impulse,
            damping: config.velocity_damping,
            move_threshold: config.move_threshold,
            pitch_limit: config.pitch_limit,
            grounded: VerticalSpeedHeuristic {
                threshold: config.grounded_threshold,
            },
        }
    }
}

impl<G: GroundedCheck> PlayerController<G> {
    pub fn with_grounded_check<H: GroundedCheck>(self, grounded: H) -> PlayerController<H> {
        PlayerController {
            base_speed: self.base_speed,
            sprint_speed: self.sprint_speed,
            jump_impulse: self.jump_impulse,
            damping: self.damping,
            move_threshold: self.move_threshold,
            pitch_limit: self.pitch_limit,
            grounded,
        }
    }

    pub fn grounded_check(&self) -> &G {
        &self.grounded
    }

    /// Accumulate look deltas. Yaw is unbounded, pitch is clamped.
    pub fn apply_look(&self, player: &mut Player, yaw_delta: f32, pitch_delta: f32) {
        player.yaw += yaw_delta;
        player.pitch = (player.pitch + pitch_delta).clamp(-self.pitch_limit, self.pitch_limit);
    }

    pub fn current_speed(&self, player: &Player) -> f32 {
        match player.speed_mode {
            SpeedMode::Walk => self.base_speed,
            SpeedMode::Sprint => self.sprint_speed,
        }
    }

    /// Horizontal direction for the given axes, not yet normalised.
    pub fn move_direction(yaw: f32, move_x: f32, move_y: f32) -> Vec3 {
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new((yaw + FRAC_PI_2).sin(), 0.0, (yaw + FRAC_PI_2).cos());
        forward * -move_y + right * move_x
    }

    /// Look, then movement, then jump.
    ///
    /// Movement overwrites horizontal velocity. With no movement it decays
    /// by `damping` instead. Vertical velocity is only touched by a jump.
    pub fn update(
        &self,
        player: &mut Player,
        body: &mut RigidBody,
        input: &InputSnapshot,
    ) -> ControlOutcome {
        self.apply_look(player, input.look_yaw(), input.look_pitch());

        player.speed_mode = if input.sprint_held() {
            SpeedMode::Sprint
        } else {
            SpeedMode::Walk
        };

        let wish = Self::move_direction(player.yaw, input.move_x(), input.move_y());
        if wish.length() > self.move_threshold {
            let velocity = wish.normalize() * self.current_speed(player);
            body.velocity.x = velocity.x;
            body.velocity.z = velocity.z;
        } else {
            body.velocity.x *= self.damping;
            body.velocity.z *= self.damping;
        }

        let mut outcome = ControlOutcome::default();
        if input.jump_pressed() && self.grounded.is_grounded(body) {
            body.velocity.y = self.jump_impulse;
            outcome.jumped = true;
        }
        outcome
    }
}
