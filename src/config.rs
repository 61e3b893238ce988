/// All tunables in one place. `Default` supplies the canonical values; the
/// host entry points may override individual fields before startup.
#[derive(Debug, Clone)]
pub struct Config {
    // Locomotion
    pub accel: f32,
    pub damping: f32,
    pub max_speed: f32,
    pub sprint_multiplier: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub floor_level: f32,
    pub eye_height: f32,

    // Look
    pub look_sensitivity: f32,

    // Frame driver
    pub max_dt: f32,

    // Session
    pub escape_hold_ms: f64,
    /// Legacy behavior: any escape release while playing toggles pause,
    /// regardless of hold duration. Off by default.
    pub legacy_escape_toggle: bool,

    // Asset pipeline
    pub nearest_filter: bool,
    pub tiling_unit_size: f32,
}

/// Base look sensitivity; `Config::look_sensitivity` is a multiplier on this.
pub const BASE_SENSITIVITY: f32 = 0.002;

impl Default for Config {
    fn default() -> Self {
        Self {
            accel: 40.0,
            damping: 10.0,
            max_speed: 6.0,
            sprint_multiplier: 1.7,
            gravity: 30.0,
            jump_speed: 10.0,
            floor_level: 0.0,
            eye_height: 1.7,
            look_sensitivity: 1.0,
            max_dt: 0.05,
            escape_hold_ms: 300.0,
            legacy_escape_toggle: false,
            nearest_filter: true,
            tiling_unit_size: 4.0,
        }
    }
}

impl Config {
    /// Effective radians-per-pixel look scale.
    pub fn look_scale(&self) -> f32 {
        BASE_SENSITIVITY * self.look_sensitivity
    }
}
