use glam::{Quat, Vec3};
use serde::Deserialize;

/// Handle to a body owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Collision shape in body-local space.
///
/// A `Plane` is the infinite half-space below local +Y through the body
/// position. Planes only make sense on static bodies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Plane,
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl Shape {
    /// Diagonal of the local inertia tensor for a solid body of `mass`.
    pub fn inertia(&self, mass: f32) -> Vec3 {
        match *self {
            Shape::Plane => Vec3::ZERO,
            Shape::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
            Shape::Box { half_extents: h } => {
                let sq = h * h;
                Vec3::new(sq.y + sq.z, sq.x + sq.z, sq.x + sq.y) * (mass / 3.0)
            }
        }
    }

    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Plane => f32::INFINITY,
            Shape::Sphere { radius } => radius,
            Shape::Box { half_extents } => half_extents.length(),
        }
    }
}

/// Construction parameters for [`PhysicsWorld::add_body`](crate::controller::PhysicsWorld::add_body).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub shape: Shape,
    pub mass: f32,
    pub position: Vec3,
    pub orientation: Quat,
    pub fixed_rotation: bool,
    pub friction: f32,
}

impl BodyDesc {
    /// A static body of the given shape at the origin.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            mass: 0.0,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            fixed_rotation: false,
            friction: 0.0,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(0.0);
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn oriented(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    pub fn with_fixed_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    id: BodyId,
    mass: f32,
    pub shape: Shape,
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub fixed_rotation: bool,
    pub friction: f32,
}

impl RigidBody {
    pub(crate) fn from_desc(id: BodyId, desc: BodyDesc) -> Self {
        Self {
            id,
            mass: desc.mass,
            shape: desc.shape,
            position: desc.position,
            orientation: desc.orientation,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            fixed_rotation: desc.fixed_rotation,
            friction: desc.friction,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Mass 0 means static: never integrated, immune to impulses.
    pub fn is_dynamic(&self) -> bool {
        self.mass > 0.0
    }

    pub(crate) fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.0);
        if !self.is_dynamic() {
            self.velocity = Vec3::ZERO;
            self.angular_velocity = Vec3::ZERO;
        }
    }

    /// Apply an instantaneous impulse at `world_point`.
    ///
    /// An off-centre point also spins the body unless its rotation is fixed.
    pub fn apply_impulse(&mut self, impulse: Vec3, world_point: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity += impulse / self.mass;

        if self.fixed_rotation {
            return;
        }
        let angular_impulse = (world_point - self.position).cross(impulse);
        self.angular_velocity += self.apply_inverse_inertia(angular_impulse);
    }

    /// Zero for static bodies.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_dynamic() {
            self.mass.recip()
        } else {
            0.0
        }
    }

    /// Velocity of the material point currently at `world_point`.
    pub fn velocity_at(&self, world_point: Vec3) -> Vec3 {
        self.velocity + self.angular_velocity.cross(world_point - self.position)
    }

    /// How much the velocity at `world_point` along `direction` changes per
    /// unit impulse applied there.
    pub(crate) fn impulse_response(&self, world_point: Vec3, direction: Vec3) -> f32 {
        if !self.is_dynamic() {
            return 0.0;
        }
        let linear = self.mass.recip();
        if self.fixed_rotation {
            return linear;
        }
        let r = world_point - self.position;
        let angular = self.apply_inverse_inertia(r.cross(direction)).cross(r);
        linear + direction.dot(angular)
    }

    fn apply_inverse_inertia(&self, world: Vec3) -> Vec3 {
        let inertia = self.shape.inertia(self.mass);
        let inv = Vec3::select(inertia.cmpgt(Vec3::ZERO), inertia.recip(), Vec3::ZERO);
        let local = self.orientation.inverse() * world;
        self.orientation * (local * inv)
    }

    /// Depth below the plane `(point, normal)`, or a non-positive value when clear.
    pub(crate) fn penetration(&self, point: Vec3, normal: Vec3) -> f32 {
        match self.shape {
            Shape::Plane => 0.0,
            Shape::Sphere { radius } => radius - (self.position - point).dot(normal),
            Shape::Box { half_extents } => {
                let lowest = self
                    .corners(half_extents)
                    .into_iter()
                    .map(|c| (c - point).dot(normal))
                    .fold(f32::INFINITY, f32::min);
                -lowest
            }
        }
    }

    /// Points of the body resting on the plane `(point, normal)`: the sphere's
    /// lowest point, or every box corner within `slop` of the surface.
    pub(crate) fn support_points(&self, point: Vec3, normal: Vec3, slop: f32) -> Vec<Vec3> {
        match self.shape {
            Shape::Plane => Vec::new(),
            Shape::Sphere { radius } => vec![self.position - normal * radius],
            Shape::Box { half_extents } => self
                .corners(half_extents)
                .into_iter()
                .filter(|c| (*c - point).dot(normal) <= slop)
                .collect(),
        }
    }

    pub(crate) fn corners(&self, h: Vec3) -> [Vec3; 8] {
        let mut out = [Vec3::ZERO; 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let sign = Vec3::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            *corner = self.position + self.orientation * (h * sign);
        }
        out
    }

    /// World-space normal of a plane body.
    pub fn plane_normal(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dynamic_box() -> RigidBody {
        RigidBody::from_desc(
            BodyId(0),
            BodyDesc::new(Shape::Box {
                half_extents: Vec3::new(0.4, 0.8, 0.25),
            })
            .with_mass(30.0)
            .at(Vec3::new(0.0, 0.8, 0.0)),
        )
    }

    #[test]
    fn static_body_ignores_impulse() {
        let mut body = RigidBody::from_desc(
            BodyId(0),
            BodyDesc::new(Shape::Sphere { radius: 1.0 }),
        );
        body.apply_impulse(Vec3::X * 100.0, body.position);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn central_impulse_changes_only_linear_velocity() {
        let mut body = dynamic_box();
        body.apply_impulse(Vec3::new(0.0, 0.0, -8.0), body.position);
        assert_relative_eq!(body.velocity.z, -8.0 / 30.0, epsilon = 1e-6);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn off_centre_impulse_spins_body() {
        let mut body = dynamic_box();
        let above_centre = body.position + Vec3::Y * 0.5;
        body.apply_impulse(Vec3::new(0.0, 0.0, -8.0), above_centre);
        // pushing the top towards -Z tips the box about -X
        assert!(body.angular_velocity.x < 0.0);
    }

    #[test]
    fn fixed_rotation_never_spins() {
        let mut body = dynamic_box();
        body.fixed_rotation = true;
        body.apply_impulse(Vec3::Z, body.position + Vec3::Y);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }

    #[test]
    fn response_is_stiffer_along_the_centre_line() {
        let body = dynamic_box();
        let centre = body.impulse_response(body.position, Vec3::Z);
        let top = body.impulse_response(body.position + Vec3::Y * 0.8, Vec3::Z);
        assert_relative_eq!(centre, 1.0 / 30.0, epsilon = 1e-6);
        assert!(top > centre);
    }

    #[test]
    fn spinning_body_moves_its_rim() {
        let mut body = dynamic_box();
        body.angular_velocity = Vec3::new(-2.0, 0.0, 0.0);
        let top = body.velocity_at(body.position + Vec3::Y * 0.8);
        assert_relative_eq!(top.z, -1.6, epsilon = 1e-5);
    }

    #[test]
    fn upright_box_rests_on_its_four_bottom_corners() {
        let body = dynamic_box();
        let support = body.support_points(Vec3::ZERO, Vec3::Y, 0.01);
        assert_eq!(support.len(), 4);
        assert!(support.iter().all(|p| p.y.abs() < 1e-5));
    }

    #[test]
    fn box_penetration_uses_lowest_corner() {
        let mut body = dynamic_box();
        body.position.y = 0.7;
        assert_relative_eq!(body.penetration(Vec3::ZERO, Vec3::Y), 0.1, epsilon = 1e-5);
    }

    #[test]
    fn sphere_penetration_is_radius_minus_height() {
        let body = RigidBody::from_desc(
            BodyId(0),
            BodyDesc::new(Shape::Sphere { radius: 0.35 }).at(Vec3::new(0.0, 0.3, 0.0)),
        );
        assert_relative_eq!(body.penetration(Vec3::ZERO, Vec3::Y), 0.05, epsilon = 1e-6);
    }
}
