use glam::{Quat, Vec3};

use crate::model::{BodyId, EnemyId, Shape};

/// Anything that can report where a body currently is.
pub trait PoseSource {
    fn pose(&self, id: BodyId) -> Option<(Vec3, Quat)>;
}

/// Ray-intersection query against hittable geometry.
pub trait RayQuery {
    /// Every hit with `min_distance <= distance <= max_distance`, nearest first.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        min_distance: f32,
        max_distance: f32,
    ) -> Vec<RayHit>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    Target(EnemyId),
    /// Blocks shots but never takes damage.
    Occluder,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderPose {
    /// Follows a physics body every query.
    Body(BodyId),
    Fixed { position: Vec3, orientation: Quat },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub kind: ColliderKind,
    pub pose: ColliderPose,
    pub shape: Shape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub kind: ColliderKind,
    pub distance: f32,
    pub point: Vec3,
}

/// Shapes that shots can hit, kept apart from decorative scenery.
///
/// Ground, sky and the weapon model are never registered here, so a ray
/// cannot stop on them.
#[derive(Debug, Clone, Default)]
pub struct HitColliders {
    colliders: Vec<Collider>,
}

impl HitColliders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&mut self, enemy: EnemyId, body: BodyId, shape: Shape) {
        self.colliders.push(Collider {
            kind: ColliderKind::Target(enemy),
            pose: ColliderPose::Body(body),
            shape,
        });
    }

    pub fn add_occluder(&mut self, position: Vec3, orientation: Quat, shape: Shape) {
        self.colliders.push(Collider {
            kind: ColliderKind::Occluder,
            pose: ColliderPose::Fixed {
                position,
                orientation,
            },
            shape,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Bind to a pose source for querying.
    pub fn view<'a, P: PoseSource>(&'a self, poses: &'a P) -> ColliderView<'a, P> {
        ColliderView {
            colliders: self,
            poses,
        }
    }
}

pub struct ColliderView<'a, P> {
    colliders: &'a HitColliders,
    poses: &'a P,
}

impl<P: PoseSource> RayQuery for ColliderView<'_, P> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        min_distance: f32,
        max_distance: f32,
    ) -> Vec<RayHit> {
        let Some(dir) = direction.try_normalize() else {
            return Vec::new();
        };

        let mut hits: Vec<RayHit> = self
            .colliders
            .iter()
            .filter_map(|collider| {
                let (position, orientation) = match collider.pose {
                    ColliderPose::Body(id) => self.poses.pose(id)?,
                    ColliderPose::Fixed {
                        position,
                        orientation,
                    } => (position, orientation),
                };
                let distance = entry_distance(collider.shape, position, orientation, origin, dir)?;
                (min_distance..=max_distance)
                    .contains(&distance)
                    .then(|| RayHit {
                        kind: collider.kind,
                        distance,
                        point: origin + dir * distance,
                    })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Distance along `dir` to where the ray enters the shape. A ray that starts
/// inside reports nothing.
fn entry_distance(
    shape: Shape,
    position: Vec3,
    orientation: Quat,
    origin: Vec3,
    dir: Vec3,
) -> Option<f32> {
    match shape {
        Shape::Plane => None,
        Shape::Sphere { radius } => {
            let oc = origin - position;
            let b = oc.dot(dir);
            let c = oc.length_squared() - radius * radius;
            let disc = b * b - c;
            if disc < 0.0 {
                return None;
            }
            let t = -b - disc.sqrt();
            (t >= 0.0).then_some(t)
        }
        Shape::Box { half_extents } => {
            let inv = orientation.inverse();
            let local_origin = inv * (origin - position);
            let local_dir = inv * dir;

            let mut t_min = f32::NEG_INFINITY;
            let mut t_max = f32::INFINITY;
            for axis in 0..3 {
                let o = local_origin[axis];
                let d = local_dir[axis];
                let h = half_extents[axis];
                if d.abs() < 1e-8 {
                    if o.abs() > h {
                        return None;
                    }
                    continue;
                }
                let (mut t1, mut t2) = ((-h - o) / d, (h - o) / d);
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_max < t_min {
                    return None;
                }
            }
            (t_min >= 0.0).then_some(t_min)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    struct Poses(HashMap<BodyId, (Vec3, Quat)>);

    impl PoseSource for Poses {
        fn pose(&self, id: BodyId) -> Option<(Vec3, Quat)> {
            self.0.get(&id).copied()
        }
    }

    fn enemy_box() -> Shape {
        Shape::Box {
            half_extents: Vec3::new(0.4, 0.8, 0.25),
        }
    }

    #[test]
    fn hits_come_back_nearest_first() {
        let mut colliders = HitColliders::new();
        colliders.add_target(EnemyId(0), BodyId(1), enemy_box());
        colliders.add_occluder(
            Vec3::new(0.0, 0.75, -8.0),
            Quat::IDENTITY,
            Shape::Box {
                half_extents: Vec3::new(1.5, 0.75, 0.5),
            },
        );
        let poses = Poses(HashMap::from([(
            BodyId(1),
            (Vec3::new(0.0, 0.8, -12.0), Quat::IDENTITY),
        )]));

        let hits = colliders
            .view(&poses)
            .cast_ray(Vec3::new(0.0, 0.8, 0.0), Vec3::NEG_Z, 0.1, 200.0);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].kind, ColliderKind::Occluder);
        assert_relative_eq!(hits[0].distance, 7.5, epsilon = 1e-5);
        assert_eq!(hits[1].kind, ColliderKind::Target(EnemyId(0)));
        assert_relative_eq!(hits[1].distance, 11.75, epsilon = 1e-5);
    }

    #[test]
    fn range_limits_are_inclusive_filters() {
        let mut colliders = HitColliders::new();
        colliders.add_occluder(
            Vec3::new(0.0, 0.0, -250.0),
            Quat::IDENTITY,
            Shape::Sphere { radius: 1.0 },
        );
        let poses = Poses(HashMap::new());

        let hits = colliders
            .view(&poses)
            .cast_ray(Vec3::ZERO, Vec3::NEG_Z, 0.1, 200.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn origin_inside_box_reports_nothing() {
        let mut colliders = HitColliders::new();
        colliders.add_occluder(Vec3::ZERO, Quat::IDENTITY, enemy_box());
        let poses = Poses(HashMap::new());

        let hits = colliders
            .view(&poses)
            .cast_ray(Vec3::ZERO, Vec3::X, 0.0, 200.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn rotated_box_is_tested_in_its_own_frame() {
        let mut colliders = HitColliders::new();
        colliders.add_occluder(
            Vec3::new(0.0, 0.0, -5.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Shape::Box {
                half_extents: Vec3::new(2.0, 0.5, 0.1),
            },
        );
        let poses = Poses(HashMap::new());

        // after the quarter turn the long axis points along Z
        let hits = colliders
            .view(&poses)
            .cast_ray(Vec3::ZERO, Vec3::NEG_Z, 0.1, 200.0);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].distance, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn missing_body_is_skipped() {
        let mut colliders = HitColliders::new();
        colliders.add_target(EnemyId(3), BodyId(9), enemy_box());
        let poses = Poses(HashMap::new());

        let hits = colliders
            .view(&poses)
            .cast_ray(Vec3::ZERO, Vec3::NEG_Z, 0.1, 200.0);
        assert!(hits.is_empty());
    }

    #[test]
    fn sphere_hit_point_lies_on_surface() {
        let mut colliders = HitColliders::new();
        colliders.add_occluder(
            Vec3::new(3.0, 0.0, 0.0),
            Quat::IDENTITY,
            Shape::Sphere { radius: 1.0 },
        );
        let poses = Poses(HashMap::new());

        let hits = colliders
            .view(&poses)
            .cast_ray(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 0.1, 200.0);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point.x, 2.0, epsilon = 1e-5);
    }
}
