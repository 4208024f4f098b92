use crate::model::BodyId;

/// Walk and sprint are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedMode {
    #[default]
    Walk,
    Sprint,
}

/// Magazine, reload flag and fire-rate bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    ammo: u32,
    max_ammo: u32,
    reloading: bool,
    last_shot_at: Option<f64>,
    pub aiming: bool,
}

impl Weapon {
    pub fn new(max_ammo: u32) -> Self {
        Self {
            ammo: max_ammo,
            max_ammo,
            reloading: false,
            last_shot_at: None,
            aiming: false,
        }
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn max_ammo(&self) -> u32 {
        self.max_ammo
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn last_shot_at(&self) -> Option<f64> {
        self.last_shot_at
    }

    /// The first shot of a round is never rate limited.
    pub fn cooled_down(&self, now: f64, cooldown: f64) -> bool {
        self.last_shot_at
            .map_or(true, |last| now - last >= cooldown)
    }

    /// Spend one round. False when the magazine is empty.
    pub(crate) fn consume_round(&mut self, now: f64) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        self.last_shot_at = Some(now);
        true
    }

    /// False if a reload is already running.
    pub(crate) fn begin_reload(&mut self) -> bool {
        if self.reloading {
            return false;
        }
        self.reloading = true;
        true
    }

    pub(crate) fn finish_reload(&mut self) {
        self.ammo = self.max_ammo;
        self.reloading = false;
    }

    pub(crate) fn abort_reload(&mut self) {
        self.reloading = false;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    body: BodyId,
    pub yaw: f32,
    pub pitch: f32,
    pub speed_mode: SpeedMode,
    health: f32,
    max_health: f32,
    score: u32,
    pub weapon: Weapon,
}

impl Player {
    pub fn new(body: BodyId, max_health: f32, max_ammo: u32) -> Self {
        Self {
            body,
            yaw: 0.0,
            pitch: 0.0,
            speed_mode: SpeedMode::Walk,
            health: max_health,
            max_health,
            score: 0,
            weapon: Weapon::new(max_ammo),
        }
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Reduce health, never below zero. Non-positive amounts are ignored.
    /// Returns the health left.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if amount > 0.0 {
            self.health = (self.health - amount).clamp(0.0, self.max_health);
        }
        self.health
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_is_clamped_and_never_heals() {
        let mut player = Player::new(BodyId(0), 100.0, 5);

        assert_eq!(player.take_damage(30.5), 69.5);
        assert_eq!(player.take_damage(-40.0), 69.5);
        assert_eq!(player.take_damage(f32::NAN), 69.5);
        assert_eq!(player.take_damage(500.0), 0.0);
        assert!(player.is_dead());
    }

    #[test]
    fn magazine_empties_then_refuses() {
        let mut weapon = Weapon::new(2);
        assert!(weapon.consume_round(0.0));
        assert!(weapon.consume_round(1.0));
        assert!(!weapon.consume_round(2.0));
        assert_eq!(weapon.ammo(), 0);
        assert_eq!(weapon.last_shot_at(), Some(1.0));
    }

    #[test]
    fn cooldown_measures_from_last_shot() {
        let mut weapon = Weapon::new(5);
        assert!(weapon.cooled_down(0.0, 0.4));
        weapon.consume_round(1.0);
        assert!(!weapon.cooled_down(1.3, 0.4));
        assert!(weapon.cooled_down(1.5, 0.4));
    }

    #[test]
    fn reload_refills_only_on_finish() {
        let mut weapon = Weapon::new(5);
        weapon.consume_round(0.0);
        assert!(weapon.begin_reload());
        assert!(!weapon.begin_reload());
        assert_eq!(weapon.ammo(), 4);

        weapon.finish_reload();
        assert_eq!(weapon.ammo(), 5);
        assert!(!weapon.is_reloading());
    }
}
