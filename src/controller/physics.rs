use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use crate::controller::contact::contacts_between;
use crate::model::{BodyDesc, BodyId, PoseSource, RigidBody, Shape};

/// Largest wall-clock delta a single step will integrate.
pub const MAX_WALL_DELTA: f32 = 0.05;
/// Fraction of angular velocity lost per second of free flight.
pub const ANGULAR_DAMPING: f32 = 0.01;
const CONTACT_ITERATIONS: usize = 8;

/// Owns every rigid body and advances them under gravity.
///
/// Bodies live in a `BTreeMap` so iteration order, and with it the whole
/// step, is deterministic.
pub struct PhysicsWorld {
    gravity: Vec3,
    max_wall_delta: f32,
    bodies: BTreeMap<BodyId, RigidBody>,
    next_id: u32,
}

impl PhysicsWorld {
    /// `gravity` is the magnitude of the downward acceleration.
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity: Vec3::new(0.0, -gravity, 0.0),
            max_wall_delta: MAX_WALL_DELTA,
            bodies: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn with_max_wall_delta(mut self, max_wall_delta: f32) -> Self {
        self.max_wall_delta = max_wall_delta;
        self
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn add_body(&mut self, desc: BodyDesc) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, RigidBody::from_desc(id, desc));
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        self.bodies.remove(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.values()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Returns false if the body does not exist.
    pub fn set_mass(&mut self, id: BodyId, mass: f32) -> bool {
        match self.bodies.get_mut(&id) {
            Some(body) => {
                body.set_mass(mass);
                true
            }
            None => false,
        }
    }

    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec3, world_point: Vec3) -> bool {
        match self.bodies.get_mut(&id) {
            Some(body) => {
                body.apply_impulse(impulse, world_point);
                true
            }
            None => false,
        }
    }

    /// Integration step actually used for a given pair of deltas.
    pub fn step_size(&self, fixed_dt: f32, wall_dt: f32) -> f32 {
        let capped = if wall_dt.is_finite() {
            wall_dt.clamp(0.0, self.max_wall_delta)
        } else {
            self.max_wall_delta
        };
        fixed_dt.max(0.0).min(capped)
    }

    /// Advance all dynamic bodies once.
    ///
    /// The step is `fixed_dt` unless the capped wall delta is shorter. Returns
    /// the step that was integrated.
    pub fn step(&mut self, fixed_dt: f32, wall_dt: f32) -> f32 {
        let h = self.step_size(fixed_dt, wall_dt);
        if h <= 0.0 {
            return 0.0;
        }

        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|b| b.is_dynamic()) {
            integrate(body, gravity, h);
        }

        for (a, b) in self.contact_pairs() {
            self.resolve_pair(a, b);
        }
        h
    }

    /// Every pair with at least one dynamic body, ground pairs last so
    /// nothing ends a step below a plane.
    fn contact_pairs(&self) -> Vec<(BodyId, BodyId)> {
        let bodies: Vec<&RigidBody> = self.bodies.values().collect();
        let mut pairs = Vec::new();
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if a.is_dynamic() || b.is_dynamic() {
                    pairs.push((a.id(), b.id()));
                }
            }
        }
        pairs.sort_by_key(|(a, b)| self.is_plane(*a) || self.is_plane(*b));
        pairs
    }

    fn is_plane(&self, id: BodyId) -> bool {
        self.bodies
            .get(&id)
            .is_some_and(|b| matches!(b.shape, Shape::Plane))
    }

    /// Cancel the approach speed at every contact point, then push the bodies
    /// apart by the deepest overlap.
    ///
    /// Impulses accumulate per point over a few sweeps, so a body resting on
    /// several corners shares its weight between them and an off-centre
    /// support tips it over.
    fn resolve_pair(&mut self, a: BodyId, b: BodyId) {
        let (Some(first), Some(second)) = (self.bodies.get(&a), self.bodies.get(&b)) else {
            return;
        };
        let contacts = contacts_between(first, second);
        let Some(deepest) = contacts.first().copied() else {
            return;
        };
        let friction = first.friction.max(second.friction);
        let (inv_a, inv_b) = (first.inverse_mass(), second.inverse_mass());

        let mut pushed = vec![0.0f32; contacts.len()];
        let mut dragged = vec![Vec3::ZERO; contacts.len()];
        for _ in 0..CONTACT_ITERATIONS {
            for (i, contact) in contacts.iter().enumerate() {
                let (point, normal) = (contact.point, contact.normal);

                let Some(response) = self.pair_response(a, b, point, normal) else {
                    continue;
                };
                let approach = self.relative_velocity(a, b, point).dot(normal);
                let total = (pushed[i] - approach / response).max(0.0);
                self.exchange_impulse(a, b, normal * (total - pushed[i]), point);
                pushed[i] = total;

                if friction <= 0.0 {
                    continue;
                }
                let relative = self.relative_velocity(a, b, point);
                let slip = relative - normal * relative.dot(normal);
                let speed = slip.length();
                if speed <= f32::EPSILON {
                    continue;
                }
                let along = slip / speed;
                let Some(response) = self.pair_response(a, b, point, along) else {
                    continue;
                };
                let total = (dragged[i] - along * (speed / response))
                    .clamp_length_max(friction * pushed[i]);
                self.exchange_impulse(a, b, total - dragged[i], point);
                dragged[i] = total;
            }
        }

        let correction = deepest.normal * (deepest.depth / (inv_a + inv_b));
        if let Some(body) = self.bodies.get_mut(&a) {
            body.position += correction * inv_a;
        }
        if let Some(body) = self.bodies.get_mut(&b) {
            body.position -= correction * inv_b;
        }
    }

    fn pair_response(&self, a: BodyId, b: BodyId, point: Vec3, direction: Vec3) -> Option<f32> {
        let response = self.bodies.get(&a)?.impulse_response(point, direction)
            + self.bodies.get(&b)?.impulse_response(point, direction);
        (response > 0.0).then_some(response)
    }

    fn relative_velocity(&self, a: BodyId, b: BodyId, point: Vec3) -> Vec3 {
        let at = |id: BodyId| {
            self.bodies
                .get(&id)
                .map_or(Vec3::ZERO, |body| body.velocity_at(point))
        };
        at(a) - at(b)
    }

    /// `impulse` acts on `a`; `b` takes the reaction.
    fn exchange_impulse(&mut self, a: BodyId, b: BodyId, impulse: Vec3, point: Vec3) {
        if let Some(body) = self.bodies.get_mut(&a) {
            body.apply_impulse(impulse, point);
        }
        if let Some(body) = self.bodies.get_mut(&b) {
            body.apply_impulse(-impulse, point);
        }
    }
}

impl PoseSource for PhysicsWorld {
    fn pose(&self, id: BodyId) -> Option<(Vec3, Quat)> {
        self.body(id).map(|b| (b.position, b.orientation))
    }
}

fn integrate(body: &mut RigidBody, gravity: Vec3, h: f32) {
    body.velocity += gravity * h;
    body.position += body.velocity * h;

    if body.fixed_rotation {
        body.angular_velocity = Vec3::ZERO;
        return;
    }
    if body.angular_velocity != Vec3::ZERO {
        let spin = Quat::from_scaled_axis(body.angular_velocity * h);
        body.orientation = (spin * body.orientation).normalize();
        body.angular_velocity *= (1.0 - ANGULAR_DAMPING).powf(h);
    }
}
