// VIEW: what the simulation hands to the renderer and overlay
pub mod hud;
pub mod render_state;

pub use hud::{HudStatus, StatusMessage};
pub use render_state::{
    CameraTransform, CameraUniform, EnemyTransform, InstanceRaw, RenderSnapshot, WeaponPose,
    AIMED_WEAPON_OFFSET, HIP_WEAPON_OFFSET,
};
