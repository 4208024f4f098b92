use thiserror::Error;

/// Why a shoot action did not produce a shot.
///
/// None of these are failures of the simulation. `OutOfAmmo` is shown to
/// the player, the others are dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShotRejected {
    #[error("fire cooldown has not elapsed")]
    FireRateLimited,
    #[error("Out of ammo")]
    OutOfAmmo,
    #[error("round is over")]
    RoundOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReloadRejected {
    #[error("a reload is already in progress")]
    AlreadyReloading,
    #[error("round is over")]
    RoundOver,
}

/// A [`RoundConfig`](crate::config::RoundConfig) precondition that does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a finite value greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be a finite value of at least zero, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("velocity damping must lie in [0, 1], got {0}")]
    DampingOutOfRange(f32),
    #[error("sprint speed {sprint} is slower than walk speed {walk}")]
    SprintSlowerThanWalk { walk: f32, sprint: f32 },
    #[error("ray range is empty: min {min} >= max {max}")]
    EmptyRayRange { min: f32, max: f32 },
    #[error("magazine size must be at least one round")]
    EmptyMagazine,
    #[error("damage per hit must be positive, got {0}")]
    NoDamage(i32),
    #[error("enemy health must be positive, got {0}")]
    DeadOnArrival(i32),
}
