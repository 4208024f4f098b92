use glam::Vec3;

use crate::model::{RigidBody, Shape};

/// Box corners this close to a surface still carry weight.
const CONTACT_SLOP: f32 = 0.01;

/// A single point where two bodies overlap.
///
/// `normal` points the way the first body has to move to separate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Contact {
    pub point: Vec3,
    pub normal: Vec3,
    pub depth: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Overlap points between two bodies, deepest first.
pub(crate) fn contacts_between(a: &RigidBody, b: &RigidBody) -> Vec<Contact> {
    let mut contacts: Vec<Contact> = match (a.shape, b.shape) {
        (Shape::Plane, Shape::Plane) => Vec::new(),
        (_, Shape::Plane) => resting_on(a, b),
        (Shape::Plane, _) => resting_on(b, a).into_iter().map(Contact::flipped).collect(),
        _ if out_of_reach(a, b) => Vec::new(),
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(a.position, ra, b.position, rb)
                .into_iter()
                .collect()
        }
        (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
            sphere_box(a.position, radius, b, half_extents)
                .into_iter()
                .collect()
        }
        (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
            sphere_box(b.position, radius, a, half_extents)
                .map(Contact::flipped)
                .into_iter()
                .collect()
        }
        (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
            box_box(a, ha, b, hb)
        }
    };
    contacts.sort_by(|x, y| y.depth.total_cmp(&x.depth));
    contacts
}

fn out_of_reach(a: &RigidBody, b: &RigidBody) -> bool {
    let reach = a.shape.bounding_radius() + b.shape.bounding_radius();
    a.position.distance_squared(b.position) > reach * reach
}

/// Supporting points of `body` sunk into the plane body `ground`.
fn resting_on(body: &RigidBody, ground: &RigidBody) -> Vec<Contact> {
    let normal = ground.plane_normal();
    let depth = body.penetration(ground.position, normal);
    if depth <= 0.0 {
        return Vec::new();
    }
    body.support_points(ground.position, normal, CONTACT_SLOP)
        .into_iter()
        .map(|point| Contact {
            point,
            normal,
            depth,
        })
        .collect()
}

fn sphere_sphere(a: Vec3, ra: f32, b: Vec3, rb: f32) -> Option<Contact> {
    let offset = a - b;
    let distance = offset.length();
    let depth = ra + rb - distance;
    if depth <= 0.0 {
        return None;
    }
    let normal = if distance > f32::EPSILON {
        offset / distance
    } else {
        Vec3::Y
    };
    Some(Contact {
        point: b + normal * rb,
        normal,
        depth,
    })
}

/// Sphere at `centre` against the box body `cube`; the normal pushes the sphere.
fn sphere_box(centre: Vec3, radius: f32, cube: &RigidBody, h: Vec3) -> Option<Contact> {
    let local = cube.orientation.inverse() * (centre - cube.position);
    let closest = local.clamp(-h, h);
    let outside = local - closest;
    let distance = outside.length();

    let (normal, depth, surface) = if distance > f32::EPSILON {
        if distance >= radius {
            return None;
        }
        (outside / distance, radius - distance, closest)
    } else {
        // centre inside the box: leave through the nearest face
        let axis = nearest_face(local, h);
        let sign = if local[axis] < 0.0 { -1.0 } else { 1.0 };
        let mut normal = Vec3::ZERO;
        normal[axis] = sign;
        let mut surface = local;
        surface[axis] = h[axis] * sign;
        (normal, radius + h[axis] - local[axis].abs(), surface)
    };

    Some(Contact {
        point: cube.position + cube.orientation * surface,
        normal: cube.orientation * normal,
        depth,
    })
}

/// Separating-axis test over both boxes' face normals.
///
/// The normal is the axis of least overlap. Contacts sit at every corner of
/// one box that lies within the other, or halfway between the innermost
/// corners when only edges cross.
fn box_box(a: &RigidBody, ha: Vec3, b: &RigidBody, hb: Vec3) -> Vec<Contact> {
    let axes_a = [a.orientation * Vec3::X, a.orientation * Vec3::Y, a.orientation * Vec3::Z];
    let axes_b = [b.orientation * Vec3::X, b.orientation * Vec3::Y, b.orientation * Vec3::Z];
    let offset = a.position - b.position;

    let mut best: Option<(f32, Vec3)> = None;
    for &axis in axes_a.iter().chain(axes_b.iter()) {
        let distance = offset.dot(axis);
        let reach = projected_radius(&axes_a, ha, axis) + projected_radius(&axes_b, hb, axis);
        let overlap = reach - distance.abs();
        if overlap <= 0.0 {
            return Vec::new();
        }
        if best.map_or(true, |(least, _)| overlap < least) {
            best = Some((overlap, if distance < 0.0 { -axis } else { axis }));
        }
    }
    let Some((depth, normal)) = best else {
        return Vec::new();
    };

    let corners_a = a.corners(ha);
    let corners_b = b.corners(hb);
    let mut points: Vec<Vec3> = corners_a
        .iter()
        .copied()
        .filter(|c| contains(b, hb, *c))
        .collect();
    points.extend(corners_b.iter().copied().filter(|c| contains(a, ha, *c)));
    if points.is_empty() {
        let inner_a = corners_a
            .iter()
            .copied()
            .min_by(|x, y| x.dot(normal).total_cmp(&y.dot(normal)));
        let inner_b = corners_b
            .iter()
            .copied()
            .max_by(|x, y| x.dot(normal).total_cmp(&y.dot(normal)));
        if let (Some(inner_a), Some(inner_b)) = (inner_a, inner_b) {
            points.push((inner_a + inner_b) * 0.5);
        }
    }

    points
        .into_iter()
        .map(|point| Contact {
            point,
            normal,
            depth,
        })
        .collect()
}

fn projected_radius(axes: &[Vec3; 3], h: Vec3, along: Vec3) -> f32 {
    axes.iter()
        .zip(h.to_array())
        .map(|(axis, half)| axis.dot(along).abs() * half)
        .sum()
}

fn contains(cube: &RigidBody, h: Vec3, point: Vec3) -> bool {
    let local = cube.orientation.inverse() * (point - cube.position);
    local.abs().cmple(h + Vec3::splat(CONTACT_SLOP)).all()
}

fn nearest_face(local: Vec3, h: Vec3) -> usize {
    let margin = h - local.abs();
    if margin.x <= margin.y && margin.x <= margin.z {
        0
    } else if margin.y <= margin.z {
        1
    } else {
        2
    }
}
