use glam::{Mat4, Quat, Vec3};

use crate::controller::SimulationState;
use crate::model::{EnemyId, EnemyState};
use crate::view::HudStatus;

/// Weapon position in camera space when firing from the hip.
pub const HIP_WEAPON_OFFSET: Vec3 = Vec3::new(-0.25, -0.1, 0.4);
/// Weapon position in camera space while looking down the scope.
pub const AIMED_WEAPON_OFFSET: Vec3 = Vec3::new(-0.05, -0.05, 0.25);

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub position: Vec3,
    pub orientation: Quat,
    pub forward: Vec3,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl CameraTransform {
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.position + self.forward, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y, aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTransform {
    pub id: EnemyId,
    pub position: Vec3,
    pub orientation: Quat,
    pub state: EnemyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponPose {
    pub aiming: bool,
    /// Offset from the camera in camera space.
    pub offset: Vec3,
    pub world_position: Vec3,
}

/// Immutable per-tick picture of the round for the renderer and overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub camera: CameraTransform,
    pub enemies: Vec<EnemyTransform>,
    pub weapon: WeaponPose,
    pub hud: HudStatus,
}

impl RenderSnapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let camera = &state.camera;
        let aiming = state.player.weapon.aiming;
        let offset = if aiming {
            AIMED_WEAPON_OFFSET
        } else {
            HIP_WEAPON_OFFSET
        };

        Self {
            camera: CameraTransform {
                position: camera.eye,
                orientation: camera.orientation(),
                forward: camera.forward(),
                fov_y: camera.fov_y,
                z_near: camera.z_near,
                z_far: camera.z_far,
            },
            enemies: state
                .enemies
                .iter()
                .map(|e| EnemyTransform {
                    id: e.id(),
                    position: e.position,
                    orientation: e.orientation,
                    state: e.state(),
                })
                .collect(),
            weapon: WeaponPose {
                aiming,
                offset,
                world_position: camera.to_world(offset),
            },
            hud: state.hud_status(),
        }
    }

    pub fn camera_uniform(&self, aspect: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.camera.view_proj(aspect).to_cols_array_2d(),
        }
    }

    pub fn enemy_instances(&self) -> Vec<InstanceRaw> {
        self.enemies
            .iter()
            .map(|e| InstanceRaw {
                model: Mat4::from_rotation_translation(e.orientation, e.position)
                    .to_cols_array_2d(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundConfig;
    use crate::scene::ArenaLayout;
    use approx::assert_relative_eq;

    #[test]
    fn weapon_offset_follows_aim() {
        let mut state = ArenaLayout::default().build_round(&RoundConfig::default());
        assert_eq!(RenderSnapshot::capture(&state).weapon.offset, HIP_WEAPON_OFFSET);

        state.player.weapon.aiming = true;
        state.sync_camera();
        let snapshot = RenderSnapshot::capture(&state);
        assert_eq!(snapshot.weapon.offset, AIMED_WEAPON_OFFSET);
        assert_relative_eq!(snapshot.camera.fov_y, 25f32.to_radians());
        assert!(snapshot.hud.scoped);
    }

    #[test]
    fn weapon_sits_in_front_of_camera() {
        let state = ArenaLayout::default().build_round(&RoundConfig::default());
        let snapshot = RenderSnapshot::capture(&state);
        let ahead = (snapshot.weapon.world_position - snapshot.camera.position)
            .dot(snapshot.camera.forward);
        assert_relative_eq!(ahead, 0.4, epsilon = 1e-5);
    }

    #[test]
    fn gpu_buffers_are_plain_bytes() {
        let state = ArenaLayout::default().build_round(&RoundConfig::default());
        let snapshot = RenderSnapshot::capture(&state);

        let uniform = snapshot.camera_uniform(16.0 / 9.0);
        assert_eq!(bytemuck::bytes_of(&uniform).len(), 64);

        let instances = snapshot.enemy_instances();
        assert_eq!(instances.len(), 3);
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 3 * 64);
        // translation lives in the last column
        assert_eq!(instances[0].model[3], [-2.0, 0.8, -12.0, 1.0]);
    }

    #[test]
    fn view_proj_puts_target_in_front() {
        let state = ArenaLayout::default().build_round(&RoundConfig::default());
        let snapshot = RenderSnapshot::capture(&state);
        let clip = snapshot.camera.view_proj(1.0) * glam::Vec4::new(0.0, 1.65, -10.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(clip.w > 0.0);
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
