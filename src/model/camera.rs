use glam::{Mat4, Quat, Vec3};

/// First-person camera.
///
/// Yaw turns about +Y, positive pitch looks up. At yaw 0 and pitch 0 the
/// camera looks down +Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Visual-only pitch offset from weapon kick.
    pub recoil_pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(fov_degrees: f32) -> Self {
        Self {
            eye: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            recoil_pitch: 0.0,
            up: Vec3::Y,
            fov_y: fov_degrees.to_radians(),
            z_near: 0.1,
            z_far: 500.0,
        }
    }

    fn rotation(yaw: f32, pitch: f32) -> Quat {
        Quat::from_rotation_y(yaw) * Quat::from_rotation_x(-pitch)
    }

    /// Rendered orientation, recoil included.
    pub fn orientation(&self) -> Quat {
        Self::rotation(self.yaw, self.pitch + self.recoil_pitch)
    }

    /// Rendered view direction, recoil included.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    /// Direction shots travel. Recoil does not move it.
    pub fn aim_direction(&self) -> Vec3 {
        Self::rotation(self.yaw, self.pitch) * Vec3::Z
    }

    pub fn target(&self) -> Vec3 {
        self.eye + self.forward()
    }

    /// Map a camera-local offset into world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.eye + self.orientation() * local
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, aspect, self.z_near, self.z_far);
        proj * view
    }

    /// Yaw and pitch that point from `eye` at `target`.
    pub fn angles_towards(eye: Vec3, target: Vec3) -> (f32, f32) {
        let dir = target - eye;
        let yaw = dir.x.atan2(dir.z);
        let pitch = dir.y.atan2(Vec3::new(dir.x, 0.0, dir.z).length());
        (yaw, pitch)
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        let (yaw, pitch) = Self::angles_towards(self.eye, target);
        self.yaw = yaw;
        self.pitch = pitch;
    }
}
