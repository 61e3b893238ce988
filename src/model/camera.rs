use glam::{Mat4, Vec3};

use crate::model::PlayerState;

// Slightly less than PI/2 to avoid gimbal lock.
const PITCH_LIMIT: f32 = 1.5533;

/// First-person camera rig. Placed from the player each frame; the rendering
/// collaborator consumes `view_proj`.
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, 15.0),
            yaw: 0.0,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    /// Look direction. Yaw 0 faces -Z; the same basis the locomotion uses
    /// for its wish direction.
    pub fn forward(&self) -> Vec3 {
        let cp = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        Vec3::new(
            -self.yaw.sin() * cp.cos(),
            cp.sin(),
            -self.yaw.cos() * cp.cos(),
        )
        .normalize()
    }

    pub fn target(&self) -> Vec3 {
        self.eye + self.forward()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }

    /// Place the rig at the player's eye point with the player's orientation.
    pub fn follow(&mut self, player: &PlayerState, eye_height: f32) {
        self.eye = player.position + Vec3::new(0.0, eye_height, 0.0);
        self.yaw = player.yaw;
        self.pitch = player.pitch;
    }
}
