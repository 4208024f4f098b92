// MODEL: simulation data
pub mod body;
pub mod camera;
pub mod colliders;
pub mod enemy;
pub mod player;
pub mod round;

pub use body::{BodyDesc, BodyId, RigidBody, Shape};
pub use camera::Camera;
pub use colliders::{
    Collider, ColliderKind, ColliderPose, ColliderView, HitColliders, PoseSource, RayHit,
    RayQuery,
};
pub use enemy::{Enemy, EnemyId, EnemyRegistry, EnemyState, HitResult};
pub use player::{Player, SpeedMode, Weapon};
pub use round::{RoundClock, RoundEnded, RoundPhase};
