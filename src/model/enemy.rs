use glam::{Quat, Vec3};

use crate::model::{BodyId, PoseSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnemyId(pub(crate) u32);

impl EnemyId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// `Defeated` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Alive,
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// Still alive with this much health left.
    Damaged { remaining: i32 },
    /// This hit was the one that took health to zero or below.
    Defeated,
    /// Already defeated; nothing changed.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    body: BodyId,
    health: i32,
    max_health: i32,
    state: EnemyState,
    /// Visual transform, mirrored from the body every tick.
    pub position: Vec3,
    pub orientation: Quat,
}

impl Enemy {
    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    /// True once hit at least once but not yet defeated.
    pub fn is_damaged(&self) -> bool {
        self.is_alive() && self.health < self.max_health
    }

    pub fn take_hit(&mut self, damage: i32) -> HitResult {
        if !self.is_alive() {
            return HitResult::Ignored;
        }
        self.health -= damage;
        if self.health <= 0 {
            self.state = EnemyState::Defeated;
            HitResult::Defeated
        } else {
            HitResult::Damaged {
                remaining: self.health,
            }
        }
    }
}

/// Every targetable enemy in the round, in spawn order.
#[derive(Debug, Clone, Default)]
pub struct EnemyRegistry {
    enemies: Vec<Enemy>,
}

impl EnemyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        body: BodyId,
        health: i32,
        position: Vec3,
        orientation: Quat,
    ) -> EnemyId {
        let id = EnemyId(self.enemies.len() as u32);
        self.enemies.push(Enemy {
            id,
            body,
            health,
            max_health: health,
            state: EnemyState::Alive,
            position,
            orientation,
        });
        id
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Copy body transforms onto the visuals, whatever the enemy's state.
    pub fn sync_transforms<P: PoseSource>(&mut self, poses: &P) {
        for enemy in &mut self.enemies {
            if let Some((position, orientation)) = poses.pose(enemy.body) {
                enemy.position = position;
                enemy.orientation = orientation;
            }
        }
    }
}
