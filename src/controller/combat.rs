use glam::Vec3;
use tracing::{debug, info};

use crate::config::RoundConfig;
use crate::controller::{DeferredAction, SimulationState, TaskHandle};
use crate::error::{ReloadRejected, ShotRejected};
use crate::model::{BodyId, ColliderKind, EnemyId, HitResult, RayQuery};

/// One accepted shoot action. Consumed within the tick that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotEvent {
    pub origin: Vec3,
    pub direction: Vec3,
    pub at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    Miss,
    /// Stopped by cover before reaching a target.
    Blocked { distance: f32 },
    Hit {
        enemy: EnemyId,
        result: HitResult,
        distance: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotReport {
    pub shot: ShotEvent,
    pub outcome: ShotOutcome,
    pub ammo_left: u32,
}

impl ShotReport {
    pub fn defeated(&self) -> Option<EnemyId> {
        match self.outcome {
            ShotOutcome::Hit {
                enemy,
                result: HitResult::Defeated,
                ..
            } => Some(enemy),
            _ => None,
        }
    }
}

/// Fire-rate gating, hit resolution and reloads.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    pub fire_cooldown: f64,
    pub damage: i32,
    pub min_range: f32,
    pub max_range: f32,
    pub recoil_kick: f32,
    pub recoil_duration: f64,
    pub reload_duration: f64,
    pub kill_score: u32,
    pub ragdoll_mass: f32,
    pub hit_impulse: f32,
    pub knockdown_spin: f32,
}

impl CombatResolver {
    pub fn from_config(config: &RoundConfig) -> Self {
        Self {
            fire_cooldown: f64::from(config.fire_cooldown),
            damage: config.damage_per_hit,
            min_range: config.min_range,
            max_range: config.max_range,
            recoil_kick: config.recoil_kick,
            recoil_duration: f64::from(config.recoil_duration),
            reload_duration: f64::from(config.reload_duration),
            kill_score: config.kill_score,
            ragdoll_mass: config.ragdoll_mass,
            hit_impulse: config.hit_impulse,
            knockdown_spin: config.knockdown_spin,
        }
    }

    /// Fire from the camera as it stands now.
    ///
    /// Checks run in order: round over, cooldown, ammo. A rejected shot
    /// changes nothing. An accepted one spends a round, kicks the camera,
    /// and resolves against the nearest hittable collider.
    pub fn attempt_shoot(
        &self,
        now: f64,
        state: &mut SimulationState,
    ) -> Result<ShotReport, ShotRejected> {
        if !state.round.is_running() {
            return Err(ShotRejected::RoundOver);
        }
        if !state.player.weapon.cooled_down(now, self.fire_cooldown) {
            debug!(now, "shot_rate_limited");
            return Err(ShotRejected::FireRateLimited);
        }
        if !state.player.weapon.consume_round(now) {
            debug!(now, "shot_out_of_ammo");
            return Err(ShotRejected::OutOfAmmo);
        }

        let shot = ShotEvent {
            origin: state.camera.eye,
            direction: state.camera.aim_direction(),
            at: now,
        };

        // the muzzle climbs, so the view dips
        let kick = -self.recoil_kick;
        state.camera.recoil_pitch += kick;
        state
            .scheduler
            .schedule_in(self.recoil_duration, DeferredAction::RevertRecoil { kick });

        let outcome = self.resolve(shot, state);
        let ammo_left = state.player.weapon.ammo();
        info!(
            at = now,
            ammo_left,
            outcome = ?outcome,
            "shot_fired"
        );
        Ok(ShotReport {
            shot,
            outcome,
            ammo_left,
        })
    }

    fn resolve(&self, shot: ShotEvent, state: &mut SimulationState) -> ShotOutcome {
        let nearest = state
            .colliders
            .view(&state.physics)
            .cast_ray(shot.origin, shot.direction, self.min_range, self.max_range)
            .into_iter()
            .next();

        let Some(hit) = nearest else {
            return ShotOutcome::Miss;
        };
        let enemy_id = match hit.kind {
            ColliderKind::Occluder => {
                return ShotOutcome::Blocked {
                    distance: hit.distance,
                }
            }
            ColliderKind::Target(id) => id,
        };
        let Some(enemy) = state.enemies.get_mut(enemy_id) else {
            return ShotOutcome::Miss;
        };

        let result = enemy.take_hit(self.damage);
        if result == HitResult::Defeated {
            let body = enemy.body();
            state.player.add_score(self.kill_score);
            state.physics.set_mass(body, self.ragdoll_mass);
            self.knock_down(state, body, shot.direction);
            info!(
                enemy = enemy_id.raw(),
                score = state.player.score(),
                "enemy_defeated"
            );
        }

        ShotOutcome::Hit {
            enemy: enemy_id,
            result,
            distance: hit.distance,
        }
    }

    /// Push a freshly ragdolled body along the shot and tip it over.
    fn knock_down(&self, state: &mut SimulationState, body: BodyId, direction: Vec3) {
        let Some(ragdoll) = state.physics.body_mut(body) else {
            return;
        };
        let centre = ragdoll.position;
        ragdoll.apply_impulse(direction * self.hit_impulse, centre);

        let across = Vec3::Y.cross(direction);
        if let Some(axis) = across.try_normalize() {
            ragdoll.angular_velocity += axis * self.knockdown_spin;
        }
    }

    /// Start a reload. Ammo is refilled by a deferred task, not here.
    pub fn reload(&self, state: &mut SimulationState) -> Result<TaskHandle, ReloadRejected> {
        if !state.round.is_running() {
            return Err(ReloadRejected::RoundOver);
        }
        if !state.player.weapon.begin_reload() {
            return Err(ReloadRejected::AlreadyReloading);
        }
        let handle = state
            .scheduler
            .schedule_in(self.reload_duration, DeferredAction::FinishReload);
        state.pending_reload = Some(handle);
        info!(
            ammo = state.player.weapon.ammo(),
            duration = self.reload_duration,
            "reload_started"
        );
        Ok(handle)
    }
}
