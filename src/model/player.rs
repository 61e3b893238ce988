use glam::{Vec2, Vec3};

/// Player state: position, split velocity, orientation. Mutated only by the
/// locomotion update; everything else reads.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub position: Vec3,
    /// Horizontal velocity on the xz plane.
    pub velocity: Vec2,
    pub vertical_velocity: f32,
    pub grounded: bool,
    /// Radians, unbounded; use `yaw_degrees` for display.
    pub yaw: f32,
    /// Radians, kept strictly inside (-PI/2, PI/2) by the locomotion update.
    pub pitch: f32,
}

impl PlayerState {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec2::ZERO,
            vertical_velocity: 0.0,
            grounded: true,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Reset to a spawn point (explicit respawn; state otherwise lives for
    /// the whole process).
    pub fn respawn(&mut self, spawn: Vec3) {
        *self = Self::new(spawn);
    }

    /// Heading normalized to [0, 360) for HUD display.
    pub fn yaw_degrees(&self) -> f32 {
        self.yaw.to_degrees().rem_euclid(360.0)
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.velocity.length()
    }
}
