use serde::Deserialize;

use crate::error::ConfigError;

/// Gameplay tuning for one round.
///
/// Every field has a default taken from the sniper-range prototype, so a
/// host can deserialize a partial table and only override what it cares
/// about. Call [`RoundConfig::validate`] once at setup; nothing in the tick
/// path re-checks these values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    // movement
    pub base_speed: f32,
    pub sprint_speed: f32,
    pub jump_impulse: f32,
    pub velocity_damping: f32,
    pub move_threshold: f32,
    pub grounded_threshold: f32,
    pub pitch_limit: f32,
    pub look_sensitivity: f32,

    // weapon
    pub fire_cooldown: f32,
    pub damage_per_hit: i32,
    pub max_ammo: u32,
    pub reload_duration: f32,
    pub recoil_kick: f32,
    pub recoil_duration: f32,
    pub min_range: f32,
    pub max_range: f32,

    // targets
    pub enemy_health: i32,
    pub kill_score: u32,
    pub ragdoll_mass: f32,
    pub hit_impulse: f32,
    /// Spin (rad/s) a defeated target picks up about the horizontal axis
    /// across the shot, enough to carry it past its tipping point.
    pub knockdown_spin: f32,

    // round / world
    pub round_duration: f32,
    pub gravity: f32,
    pub fixed_dt: f32,
    pub max_wall_delta: f32,
    pub player_max_health: f32,

    // camera
    pub camera_height: f32,
    pub fov_degrees: f32,
    pub aimed_fov_degrees: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            base_speed: 5.0,
            sprint_speed: 9.0,
            jump_impulse: 6.0,
            velocity_damping: 0.9,
            move_threshold: 0.1,
            grounded_threshold: 0.1,
            pitch_limit: 1.2,
            look_sensitivity: 0.0025,

            fire_cooldown: 0.4,
            damage_per_hit: 50,
            max_ammo: 5,
            reload_duration: 1.2,
            recoil_kick: 0.04,
            recoil_duration: 0.12,
            min_range: 0.1,
            max_range: 200.0,

            enemy_health: 50,
            kill_score: 10,
            ragdoll_mass: 30.0,
            hit_impulse: 8.0,
            knockdown_spin: 4.0,

            round_duration: 60.0,
            gravity: 9.82,
            fixed_dt: 1.0 / 60.0,
            max_wall_delta: 0.05,
            player_max_health: 100.0,

            camera_height: 0.45,
            fov_degrees: 60.0,
            aimed_fov_degrees: 25.0,
        }
    }
}

impl RoundConfig {
    /// Check the setup-time preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("base_speed", self.base_speed),
            ("sprint_speed", self.sprint_speed),
            ("jump_impulse", self.jump_impulse),
            ("pitch_limit", self.pitch_limit),
            ("look_sensitivity", self.look_sensitivity),
            ("reload_duration", self.reload_duration),
            ("recoil_duration", self.recoil_duration),
            ("max_range", self.max_range),
            ("ragdoll_mass", self.ragdoll_mass),
            ("round_duration", self.round_duration),
            ("fixed_dt", self.fixed_dt),
            ("max_wall_delta", self.max_wall_delta),
            ("player_max_health", self.player_max_health),
            ("fov_degrees", self.fov_degrees),
            ("aimed_fov_degrees", self.aimed_fov_degrees),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("move_threshold", self.move_threshold),
            ("grounded_threshold", self.grounded_threshold),
            ("fire_cooldown", self.fire_cooldown),
            ("recoil_kick", self.recoil_kick),
            ("min_range", self.min_range),
            ("hit_impulse", self.hit_impulse),
            ("knockdown_spin", self.knockdown_spin),
            ("gravity", self.gravity),
            ("camera_height", self.camera_height),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.velocity_damping) {
            return Err(ConfigError::DampingOutOfRange(self.velocity_damping));
        }
        if self.sprint_speed < self.base_speed {
            return Err(ConfigError::SprintSlowerThanWalk {
                walk: self.base_speed,
                sprint: self.sprint_speed,
            });
        }
        if self.min_range >= self.max_range {
            return Err(ConfigError::EmptyRayRange {
                min: self.min_range,
                max: self.max_range,
            });
        }
        if self.max_ammo == 0 {
            return Err(ConfigError::EmptyMagazine);
        }
        if self.damage_per_hit <= 0 {
            return Err(ConfigError::NoDamage(self.damage_per_hit));
        }
        if self.enemy_health <= 0 {
            return Err(ConfigError::DeadOnArrival(self.enemy_health));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(RoundConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_table_keeps_remaining_defaults() {
        let config: RoundConfig =
            serde_json::from_str(r#"{ "round_duration": 90.0, "max_ammo": 8 }"#).expect("parse");

        assert_eq!(config.round_duration, 90.0);
        assert_eq!(config.max_ammo, 8);
        assert_eq!(config.base_speed, 5.0);
        assert_eq!(config.fire_cooldown, 0.4);
    }

    #[test]
    fn negative_speed_is_rejected() {
        let config = RoundConfig {
            base_speed: -1.0,
            ..RoundConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "base_speed",
                value: -1.0
            })
        );
    }

    #[test]
    fn sprint_must_not_be_slower_than_walk() {
        let config = RoundConfig {
            sprint_speed: 4.0,
            ..RoundConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SprintSlowerThanWalk { .. })
        ));
    }

    #[test]
    fn ray_range_must_be_non_empty() {
        let config = RoundConfig {
            min_range: 250.0,
            ..RoundConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRayRange { .. })
        ));
    }

    #[test]
    fn nan_is_rejected() {
        let config = RoundConfig {
            gravity: f32::NAN,
            ..RoundConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { field: "gravity", .. })
        ));
    }
}
