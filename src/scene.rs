use glam::{Quat, Vec3};
use serde::Deserialize;
use tracing::info;

use crate::config::RoundConfig;
use crate::controller::{PhysicsWorld, Scheduler, SimulationState};
use crate::model::{BodyDesc, Camera, EnemyRegistry, HitColliders, Player, RoundClock, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct EnemySpawn {
    pub position: Vec3,
}

/// Scenery that stops bullets but has no physics body.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CoverBox {
    pub center: Vec3,
    pub size: Vec3,
}

/// Where everything starts in a round.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArenaLayout {
    pub ground_height: f32,
    pub player_spawn: Vec3,
    pub player_yaw: f32,
    pub player_radius: f32,
    pub player_mass: f32,
    pub enemy_half_extents: Vec3,
    pub enemy_friction: f32,
    pub enemies: Vec<EnemySpawn>,
    pub cover: Vec<CoverBox>,
}

impl Default for ArenaLayout {
    /// The sniper range: three targets beyond three cover boxes, player
    /// behind them facing -Z.
    fn default() -> Self {
        Self {
            ground_height: 0.0,
            player_spawn: Vec3::new(0.0, 1.2, 8.0),
            player_yaw: std::f32::consts::PI,
            player_radius: 0.35,
            player_mass: 80.0,
            enemy_half_extents: Vec3::new(0.4, 0.8, 0.25),
            enemy_friction: 0.3,
            enemies: vec![
                EnemySpawn {
                    position: Vec3::new(-2.0, 0.8, -12.0),
                },
                EnemySpawn {
                    position: Vec3::new(2.0, 0.8, -14.0),
                },
                EnemySpawn {
                    position: Vec3::new(5.0, 0.8, -10.0),
                },
            ],
            cover: vec![
                CoverBox {
                    center: Vec3::new(0.0, 0.75, -8.0),
                    size: Vec3::new(3.0, 1.5, 1.0),
                },
                CoverBox {
                    center: Vec3::new(3.0, 1.0, -6.0),
                    size: Vec3::new(1.5, 2.0, 1.5),
                },
                CoverBox {
                    center: Vec3::new(-3.0, 1.2, -6.0),
                    size: Vec3::new(1.5, 2.4, 1.5),
                },
            ],
        }
    }
}

impl ArenaLayout {
    /// Create every body and entity for a fresh round.
    pub fn build_round(&self, config: &RoundConfig) -> SimulationState {
        let mut physics =
            PhysicsWorld::new(config.gravity).with_max_wall_delta(config.max_wall_delta);
        physics.add_body(BodyDesc::new(Shape::Plane).at(Vec3::Y * self.ground_height));

        let player_body = physics.add_body(
            BodyDesc::new(Shape::Sphere {
                radius: self.player_radius,
            })
            .with_mass(self.player_mass)
            .at(self.player_spawn)
            .with_fixed_rotation(),
        );
        let mut player = Player::new(player_body, config.player_max_health, config.max_ammo);
        player.yaw = self.player_yaw;

        let enemy_shape = Shape::Box {
            half_extents: self.enemy_half_extents,
        };
        let mut enemies = EnemyRegistry::new();
        let mut colliders = HitColliders::new();
        for spawn in &self.enemies {
            let body = physics.add_body(
                BodyDesc::new(enemy_shape)
                    .at(spawn.position)
                    .with_friction(self.enemy_friction),
            );
            let id = enemies.spawn(body, config.enemy_health, spawn.position, Quat::IDENTITY);
            colliders.add_target(id, body, enemy_shape);
        }
        for cover in &self.cover {
            colliders.add_occluder(
                cover.center,
                Quat::IDENTITY,
                Shape::Box {
                    half_extents: cover.size * 0.5,
                },
            );
        }

        info!(
            enemies = enemies.len(),
            cover = self.cover.len(),
            duration = config.round_duration,
            "round_built"
        );

        let mut state = SimulationState {
            config: config.clone(),
            physics,
            player,
            camera: Camera::new(config.fov_degrees),
            enemies,
            colliders,
            round: RoundClock::new(config.round_duration),
            scheduler: Scheduler::new(),
            message: None,
            pending_reload: None,
        };
        state.sync_camera();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnemyState;
    use approx::assert_relative_eq;

    #[test]
    fn default_arena_matches_range_layout() {
        let state = ArenaLayout::default().build_round(&RoundConfig::default());

        // ground, player, three targets
        assert_eq!(state.physics.len(), 5);
        assert_eq!(state.enemies.len(), 3);
        assert_eq!(state.colliders.len(), 6);
        for enemy in state.enemies.iter() {
            assert_eq!(enemy.state(), EnemyState::Alive);
            assert_eq!(enemy.health(), 50);
            let body = state.physics.body(enemy.body()).expect("body");
            assert!(!body.is_dynamic());
        }
        assert_eq!(state.player.weapon.ammo(), 5);
        assert_eq!(state.round.seconds_left(), 60);
    }

    #[test]
    fn camera_starts_on_player_eye() {
        let state = ArenaLayout::default().build_round(&RoundConfig::default());
        assert_relative_eq!(state.camera.eye, Vec3::new(0.0, 1.65, 8.0), epsilon = 1e-6);
        // facing the targets down -Z
        assert!(state.camera.forward().z < -0.99);
    }

    #[test]
    fn layout_deserialises_with_defaults() {
        let layout: ArenaLayout = serde_json::from_str(
            r#"{
                "player_spawn": [0.0, 2.0, 0.0],
                "enemies": [ { "position": [1.0, 0.8, -20.0] } ],
                "cover": []
            }"#,
        )
        .expect("parse");

        assert_eq!(layout.player_spawn, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(layout.enemies.len(), 1);
        assert!(layout.cover.is_empty());
        assert_eq!(layout.player_radius, 0.35);
    }
}
