use glam::Vec2;

use crate::config::Config;
use crate::controller::input::InputSnapshot;
use crate::model::PlayerState;

// Pitch stays strictly inside (-PI/2, PI/2).
const PITCH_EPSILON: f32 = 1e-3;

/// Walk/look integrator: acceleration with damping on the horizontal plane,
/// gravity against a single floor plane, mouse look. Infallible: out-of-range
/// input is clamped, never rejected.
pub struct Locomotion {
    accel: f32,
    damping: f32,
    max_speed: f32,
    sprint_multiplier: f32,
    gravity: f32,
    jump_speed: f32,
    floor_level: f32,
    look_scale: f32,
}

impl Locomotion {
    pub fn new(config: &Config) -> Self {
        Self {
            accel: config.accel,
            damping: config.damping,
            max_speed: config.max_speed,
            sprint_multiplier: config.sprint_multiplier,
            gravity: config.gravity,
            jump_speed: config.jump_speed,
            floor_level: config.floor_level,
            look_scale: config.look_scale(),
        }
    }

    /// Advance the player by `dt` seconds. Called only while the simulation
    /// is active; `dt` is pre-clamped by the frame driver.
    pub fn update(
        &self,
        player: &mut PlayerState,
        snap: &InputSnapshot,
        look_delta: (f32, f32),
        dt: f32,
    ) {
        self.update_horizontal(player, snap, dt);
        self.update_vertical(player, snap, dt);
        self.apply_look(player, look_delta);
    }

    fn update_horizontal(&self, player: &mut PlayerState, snap: &InputSnapshot, dt: f32) {
        // Wish direction in the xz plane, rotated by yaw. Yaw 0 faces -Z.
        let (sin, cos) = player.yaw.sin_cos();
        let forward = Vec2::new(-sin, -cos);
        let right = Vec2::new(cos, -sin);

        let mut wish = Vec2::ZERO;
        if snap.move_forward {
            wish += forward;
        }
        if snap.move_back {
            wish -= forward;
        }
        if snap.strafe_right {
            wish += right;
        }
        if snap.strafe_left {
            wish -= right;
        }

        let boost = if snap.sprint { self.sprint_multiplier } else { 1.0 };

        if wish.length_squared() > 0.0 {
            player.velocity += wish.normalize() * self.accel * boost * dt;
        } else {
            player.velocity *= (1.0 - self.damping * dt).max(0.0);
        }

        // Cap speed by rescaling the whole vector so direction is preserved.
        let max = self.max_speed * boost;
        let speed = player.velocity.length();
        if speed > max {
            player.velocity *= max / speed;
        }

        player.position.x += player.velocity.x * dt;
        player.position.z += player.velocity.y * dt;
    }

    fn update_vertical(&self, player: &mut PlayerState, snap: &InputSnapshot, dt: f32) {
        if player.grounded && snap.edges.jump_pressed {
            player.vertical_velocity = self.jump_speed;
            player.grounded = false;
        }

        player.vertical_velocity -= self.gravity * dt;
        player.position.y += player.vertical_velocity * dt;

        if player.position.y < self.floor_level {
            player.position.y = self.floor_level;
            player.vertical_velocity = 0.0;
            player.grounded = true;
        }
    }

    fn apply_look(&self, player: &mut PlayerState, (dx, dy): (f32, f32)) {
        player.yaw -= dx * self.look_scale;
        let limit = std::f32::consts::FRAC_PI_2 - PITCH_EPSILON;
        player.pitch = (player.pitch - dy * self.look_scale).clamp(-limit, limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn setup() -> (Locomotion, PlayerState) {
        (
            Locomotion::new(&Config::default()),
            PlayerState::new(Vec3::ZERO),
        )
    }

    fn forward_snap(sprint: bool) -> InputSnapshot {
        InputSnapshot {
            move_forward: true,
            sprint,
            ..Default::default()
        }
    }

    #[test]
    fn test_speed_never_exceeds_cap() {
        let config = Config::default();
        let (loco, mut player) = setup();

        // Uneven dt sequence, always accelerating forward.
        let dts = [0.016, 0.05, 0.002, 0.033, 0.05, 0.01];
        for _ in 0..200 {
            for &dt in &dts {
                loco.update(&mut player, &forward_snap(false), (0.0, 0.0), dt);
                assert!(
                    player.horizontal_speed() <= config.max_speed + 1e-4,
                    "walk speed capped"
                );
            }
        }

        for _ in 0..200 {
            loco.update(&mut player, &forward_snap(true), (0.0, 0.0), 0.05);
            assert!(
                player.horizontal_speed()
                    <= config.max_speed * config.sprint_multiplier + 1e-4,
                "sprint speed capped at x{}",
                config.sprint_multiplier
            );
        }
    }

    #[test]
    fn test_cap_preserves_direction() {
        let (loco, mut player) = setup();
        player.yaw = 0.7;
        for _ in 0..100 {
            loco.update(&mut player, &forward_snap(false), (0.0, 0.0), 0.05);
        }
        let (sin, cos) = player.yaw.sin_cos();
        let forward = Vec2::new(-sin, -cos);
        let dir = player.velocity.normalize();
        assert!(
            dir.dot(forward) > 0.999,
            "clamping rescales the vector instead of clipping components"
        );
    }

    #[test]
    fn test_damping_exact_zero_step() {
        // damping=10 at dt=0.1 scales velocity by exactly 1 - 10*0.1 = 0.
        let loco = Locomotion::new(&Config {
            damping: 10.0,
            ..Config::default()
        });
        let mut player = PlayerState::new(Vec3::ZERO);
        player.velocity = Vec2::new(3.0, -4.0);
        loco.update(&mut player, &InputSnapshot::default(), (0.0, 0.0), 0.1);
        assert_eq!(player.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_damping_never_reverses() {
        // Overshooting the zero step must clamp at zero, not flip direction.
        let loco = Locomotion::new(&Config {
            damping: 30.0,
            ..Config::default()
        });
        let mut player = PlayerState::new(Vec3::ZERO);
        player.velocity = Vec2::new(5.0, 0.0);
        loco.update(&mut player, &InputSnapshot::default(), (0.0, 0.0), 0.1);
        assert_eq!(player.velocity, Vec2::ZERO, "1 - 30*0.1 < 0 clamps to 0");
    }

    #[test]
    fn test_pitch_strictly_bounded() {
        let (loco, mut player) = setup();
        let half_pi = std::f32::consts::FRAC_PI_2;
        for _ in 0..1000 {
            loco.update(&mut player, &InputSnapshot::default(), (0.0, -500.0), 0.016);
            assert!(player.pitch < half_pi, "pitch stays below +90deg");
        }
        for _ in 0..1000 {
            loco.update(&mut player, &InputSnapshot::default(), (0.0, 500.0), 0.016);
            assert!(player.pitch > -half_pi, "pitch stays above -90deg");
        }
    }

    #[test]
    fn test_yaw_unbounded() {
        let (loco, mut player) = setup();
        for _ in 0..10_000 {
            loco.update(&mut player, &InputSnapshot::default(), (100.0, 0.0), 0.016);
        }
        assert!(player.yaw.abs() > std::f32::consts::TAU, "yaw accumulates freely");
        let deg = player.yaw_degrees();
        assert!((0.0..360.0).contains(&deg));
    }

    #[test]
    fn test_jump_integration() {
        let loco = Locomotion::new(&Config {
            jump_speed: 10.0,
            gravity: 30.0,
            ..Config::default()
        });
        let mut player = PlayerState::new(Vec3::ZERO);
        assert!(player.grounded);

        let jump = InputSnapshot {
            edges: crate::controller::input::EdgeFlags {
                jump_pressed: true,
                ..Default::default()
            },
            ..Default::default()
        };
        loco.update(&mut player, &jump, (0.0, 0.0), 0.1);
        assert!(
            (player.vertical_velocity - 7.0).abs() < 1e-5,
            "v = 10 - 30*0.1 after the jump tick"
        );
        assert!(player.position.y > 0.0, "leaves the ground");
        assert!(!player.grounded, "airborne immediately upon jump");
    }

    #[test]
    fn test_jump_ignored_in_air() {
        let loco = Locomotion::new(&Config::default());
        let mut player = PlayerState::new(Vec3::new(0.0, 5.0, 0.0));
        player.grounded = false;
        player.vertical_velocity = -2.0;
        let jump = InputSnapshot {
            edges: crate::controller::input::EdgeFlags {
                jump_pressed: true,
                ..Default::default()
            },
            ..Default::default()
        };
        loco.update(&mut player, &jump, (0.0, 0.0), 0.016);
        assert!(player.vertical_velocity < 0.0, "no double jump");
    }

    #[test]
    fn test_floor_clamp_restores_grounded() {
        let loco = Locomotion::new(&Config::default());
        let mut player = PlayerState::new(Vec3::new(0.0, 0.2, 0.0));
        player.grounded = false;
        for _ in 0..100 {
            loco.update(&mut player, &InputSnapshot::default(), (0.0, 0.0), 0.05);
        }
        assert_eq!(player.position.y, 0.0, "clamped to the floor plane");
        assert_eq!(player.vertical_velocity, 0.0);
        assert!(player.grounded);
    }

    #[test]
    fn test_forward_matches_yaw_basis() {
        let (loco, mut player) = setup();
        // Yaw 0: forward is -Z.
        loco.update(&mut player, &forward_snap(false), (0.0, 0.0), 0.05);
        assert!(player.position.z < 0.0, "forward moves along -Z at yaw 0");
        assert!(player.position.x.abs() < 1e-6);
    }
}
