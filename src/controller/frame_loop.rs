use crate::config::Config;
use crate::controller::input::{InputEvent, InputState};
use crate::controller::locomotion::Locomotion;
use crate::controller::session::{CaptureHost, SessionMachine};
use crate::model::{Camera, PlayerState};
use crate::view::FramePose;

/// Per-frame coordination: aggregate input, run the session transition
/// check, advance locomotion, place the camera. Order is mandatory; acting
/// on stale mode or input is exactly the bug this exists to prevent.
pub struct FrameContext {
    pub config: Config,
    pub input: InputState,
    pub session: SessionMachine,
    pub player: PlayerState,
    pub camera: Camera,
    locomotion: Locomotion,
    last_time_ms: Option<f64>,
}

impl FrameContext {
    pub fn new(config: Config, width: u32, height: u32, spawn: glam::Vec3) -> Self {
        let session = SessionMachine::new(&config);
        let locomotion = Locomotion::new(&config);
        Self {
            input: InputState::default(),
            session,
            player: PlayerState::new(spawn),
            camera: Camera::new(width, height),
            locomotion,
            last_time_ms: None,
            config,
        }
    }

    /// Route a host event. Input events go to the aggregator; a capture loss
    /// additionally forces the session out of play.
    pub fn handle_event(&mut self, event: &InputEvent) {
        if let InputEvent::CaptureChanged { captured: false } = event {
            self.session.capture_lost();
        }
        self.input.process_event(event);
    }

    /// Run one frame. `now_ms` comes from the host clock
    /// (`performance.now()` on web).
    pub fn tick(&mut self, now_ms: f64, host: &mut dyn CaptureHost) -> FramePose {
        // Clamp dt so a frame hitch cannot blow up the integration.
        let dt = match self.last_time_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, self.config.max_dt),
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);

        let snap = self.input.snapshot();
        self.session.update(&snap, now_ms, host);
        self.input.clear_edges();

        let look = self.input.consume_look_delta();
        if self.session.is_simulation_active() {
            self.locomotion.update(&mut self.player, &snap, look, dt);
        }
        // While inactive the consumed delta is discarded, so a stale
        // pre-pause accumulation cannot jerk the camera on resume.

        self.camera.follow(&self.player, self.config.eye_height);

        FramePose {
            position: self.player.position,
            yaw: self.player.yaw,
            pitch: self.player.pitch,
            view_proj: self.camera.view_proj(),
        }
    }
}
