use glam::Vec3;

use crate::config::RoundConfig;
use crate::controller::{PhysicsWorld, Scheduler, TaskHandle};
use crate::model::{Camera, EnemyRegistry, HitColliders, Player, RoundClock};
use crate::view::{HudStatus, StatusMessage};

/// Work deferred onto the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeferredAction {
    /// Undo a weapon kick of this many radians.
    RevertRecoil { kick: f32 },
    FinishReload,
}

/// Everything one round owns, passed explicitly to each stage.
pub struct SimulationState {
    pub config: RoundConfig,
    pub physics: PhysicsWorld,
    pub player: Player,
    pub camera: Camera,
    pub enemies: EnemyRegistry,
    pub colliders: HitColliders,
    pub round: RoundClock,
    pub scheduler: Scheduler<DeferredAction>,
    pub message: Option<StatusMessage>,
    pub pending_reload: Option<TaskHandle>,
}

impl SimulationState {
    /// Seconds since the round started.
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// Place the camera on the player body and match its look angles.
    pub fn sync_camera(&mut self) {
        if let Some(body) = self.physics.body(self.player.body()) {
            self.camera.eye = body.position + Vec3::Y * self.config.camera_height;
        }
        self.camera.yaw = self.player.yaw;
        self.camera.pitch = self.player.pitch;
        let fov = if self.player.weapon.aiming {
            self.config.aimed_fov_degrees
        } else {
            self.config.fov_degrees
        };
        self.camera.fov_y = fov.to_radians();
    }

    pub fn hud_status(&self) -> HudStatus {
        HudStatus {
            score: self.player.score(),
            seconds_left: self.round.seconds_left(),
            health: self.player.health().max(0.0).floor() as u32,
            ammo: self.player.weapon.ammo(),
            max_ammo: self.player.weapon.max_ammo(),
            reloading: self.player.weapon.is_reloading(),
            scoped: self.player.weapon.aiming,
            message: self.message,
        }
    }

    /// Run a deferred action that came due.
    pub(crate) fn apply_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::RevertRecoil { kick } => {
                self.camera.recoil_pitch -= kick;
                if self.camera.recoil_pitch.abs() < 1e-6 {
                    self.camera.recoil_pitch = 0.0;
                }
            }
            DeferredAction::FinishReload => {
                self.player.weapon.finish_reload();
                self.pending_reload = None;
                if self.message == Some(StatusMessage::Reloading) {
                    self.message = None;
                }
                tracing::info!(ammo = self.player.weapon.ammo(), "reload_finished");
            }
        }
    }
}
