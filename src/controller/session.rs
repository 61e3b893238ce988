use tracing::debug;

use crate::config::Config;
use crate::controller::input::InputSnapshot;

/// Whether the simulation advances and pointer capture is wanted. Exactly one
/// instance exists; initial mode is `Paused` until the first resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Playing,
    Paused,
    Dialogue,
}

/// Capture side effects, performed by the host (pointer lock on web). A
/// denied request is not an error; it is simply retried on the next resume.
pub trait CaptureHost {
    fn request_capture(&mut self);
    fn release_capture(&mut self);
}

/// Pause/dialogue state machine with a debounced escape-hold gesture.
///
/// The hold timer is a pending-since timestamp rather than a toggle flag:
/// naive press/release toggling fires on both edges and pauses then
/// immediately unpauses.
pub struct SessionMachine {
    mode: SessionMode,
    /// Timestamp (ms) of the escape press currently being held, if any.
    escape_down_since: Option<f64>,
    interact_available: bool,
    escape_hold_ms: f64,
    legacy_escape_toggle: bool,
}

impl SessionMachine {
    pub fn new(config: &Config) -> Self {
        Self {
            mode: SessionMode::Paused,
            escape_down_since: None,
            interact_available: false,
            escape_hold_ms: config.escape_hold_ms,
            legacy_escape_toggle: config.legacy_escape_toggle,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_simulation_active(&self) -> bool {
        self.mode == SessionMode::Playing
    }

    /// Signalled by the external range-checking collaborator.
    pub fn set_interact_available(&mut self, available: bool) {
        self.interact_available = available;
    }

    /// Explicit resume action (UI button or equivalent).
    pub fn resume(&mut self, host: &mut dyn CaptureHost) {
        if self.mode == SessionMode::Paused {
            debug!("session: resume");
            self.mode = SessionMode::Playing;
            self.escape_down_since = None;
            host.request_capture();
        }
    }

    /// Explicit close-dialogue action.
    pub fn close_dialogue(&mut self, host: &mut dyn CaptureHost) {
        if self.mode == SessionMode::Dialogue {
            debug!("session: dialogue closed");
            self.mode = SessionMode::Playing;
            host.request_capture();
        }
    }

    /// The host lost pointer capture (OS-level gesture). While playing this
    /// is equivalent to a completed escape hold: a look stream is not
    /// guaranteed uncaptured, so the simulation must stop.
    pub fn capture_lost(&mut self) {
        if self.mode == SessionMode::Playing {
            debug!("session: external capture loss, pausing");
            self.mode = SessionMode::Paused;
            self.escape_down_since = None;
        }
    }

    /// Per-frame transition check; consumes this tick's edge flags.
    pub fn update(&mut self, snap: &InputSnapshot, now_ms: f64, host: &mut dyn CaptureHost) {
        if self.mode != SessionMode::Playing {
            // Escape state is only meaningful in play; drop any stale timer.
            self.escape_down_since = None;
            return;
        }

        if snap.edges.escape_pressed {
            self.escape_down_since = Some(now_ms);
        }

        if snap.escape_held {
            if let Some(since) = self.escape_down_since {
                if now_ms - since >= self.escape_hold_ms {
                    self.pause(host);
                    return;
                }
            }
        }

        if snap.edges.escape_released {
            // Released below threshold: cancel the timer. Canonically the
            // tap is ignored; the legacy flag restores toggle-on-release.
            self.escape_down_since = None;
            if self.legacy_escape_toggle {
                self.pause(host);
                return;
            }
        }

        if snap.edges.interact_pressed && self.interact_available {
            debug!("session: interact, opening dialogue");
            self.mode = SessionMode::Dialogue;
            host.release_capture();
        }
    }

    fn pause(&mut self, host: &mut dyn CaptureHost) {
        debug!("session: pausing");
        self.mode = SessionMode::Paused;
        self.escape_down_since = None;
        host.release_capture();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::EdgeFlags;

    #[derive(Default)]
    struct MockHost {
        requests: u32,
        releases: u32,
    }

    impl CaptureHost for MockHost {
        fn request_capture(&mut self) {
            self.requests += 1;
        }
        fn release_capture(&mut self) {
            self.releases += 1;
        }
    }

    fn playing_machine(host: &mut MockHost) -> SessionMachine {
        let mut m = SessionMachine::new(&Config::default());
        m.resume(host);
        assert!(m.is_simulation_active());
        m
    }

    fn snap_with(edges: EdgeFlags, escape_held: bool) -> InputSnapshot {
        InputSnapshot {
            escape_held,
            edges,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_mode_is_paused() {
        let m = SessionMachine::new(&Config::default());
        assert_eq!(m.mode(), SessionMode::Paused);
        assert!(!m.is_simulation_active());
    }

    #[test]
    fn test_resume_requests_capture() {
        let mut host = MockHost::default();
        let _ = playing_machine(&mut host);
        assert_eq!(host.requests, 1);
    }

    #[test]
    fn test_short_escape_tap_is_ignored() {
        let mut host = MockHost::default();
        let mut m = playing_machine(&mut host);

        let press = snap_with(
            EdgeFlags { escape_pressed: true, ..Default::default() },
            true,
        );
        m.update(&press, 1000.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Playing);

        // Held for 200 ms at a 300 ms threshold, then released.
        m.update(&snap_with(EdgeFlags::default(), true), 1200.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Playing, "sub-threshold hold must not pause");

        let release = snap_with(
            EdgeFlags { escape_released: true, ..Default::default() },
            false,
        );
        m.update(&release, 1210.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Playing, "sub-threshold release is ignored");
        assert_eq!(host.releases, 0, "no side effect for an ignored tap");
    }

    #[test]
    fn test_escape_hold_pauses_exactly_once() {
        let mut host = MockHost::default();
        let mut m = playing_machine(&mut host);

        let press = snap_with(
            EdgeFlags { escape_pressed: true, ..Default::default() },
            true,
        );
        m.update(&press, 1000.0, &mut host);

        m.update(&snap_with(EdgeFlags::default(), true), 1300.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Paused, "300 ms hold fires the transition");
        assert_eq!(host.releases, 1);

        // Still holding: no further transitions, no double toggle.
        m.update(&snap_with(EdgeFlags::default(), true), 1400.0, &mut host);
        let release = snap_with(
            EdgeFlags { escape_released: true, ..Default::default() },
            false,
        );
        m.update(&release, 1500.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Paused, "release after pause must not unpause");
        assert_eq!(host.releases, 1);
    }

    #[test]
    fn test_timer_resets_between_taps() {
        let mut host = MockHost::default();
        let mut m = playing_machine(&mut host);

        // Two 200 ms taps separated by a release must not accumulate.
        for start in [1000.0, 2000.0] {
            let press = snap_with(
                EdgeFlags { escape_pressed: true, ..Default::default() },
                true,
            );
            m.update(&press, start, &mut host);
            let release = snap_with(
                EdgeFlags { escape_released: true, ..Default::default() },
                false,
            );
            m.update(&release, start + 200.0, &mut host);
        }
        assert_eq!(m.mode(), SessionMode::Playing);
    }

    #[test]
    fn test_legacy_toggle_flag() {
        let mut host = MockHost::default();
        let mut m = SessionMachine::new(&Config {
            legacy_escape_toggle: true,
            ..Config::default()
        });
        m.resume(&mut host);

        let press = snap_with(
            EdgeFlags { escape_pressed: true, ..Default::default() },
            true,
        );
        m.update(&press, 1000.0, &mut host);
        let release = snap_with(
            EdgeFlags { escape_released: true, ..Default::default() },
            false,
        );
        m.update(&release, 1050.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Paused, "legacy mode pauses on any release");
    }

    #[test]
    fn test_interact_opens_dialogue_only_when_available() {
        let mut host = MockHost::default();
        let mut m = playing_machine(&mut host);

        let interact = snap_with(
            EdgeFlags { interact_pressed: true, ..Default::default() },
            false,
        );
        m.update(&interact, 1000.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Playing, "no interactable in range");

        m.set_interact_available(true);
        m.update(&interact, 1100.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Dialogue);
        assert_eq!(host.releases, 1);

        m.close_dialogue(&mut host);
        assert_eq!(m.mode(), SessionMode::Playing);
        assert_eq!(host.requests, 2);
    }

    #[test]
    fn test_external_capture_loss_forces_pause() {
        let mut host = MockHost::default();
        let mut m = playing_machine(&mut host);
        m.capture_lost();
        assert_eq!(m.mode(), SessionMode::Paused);

        // While already paused it is a no-op.
        m.capture_lost();
        assert_eq!(m.mode(), SessionMode::Paused);
    }

    #[test]
    fn test_capture_loss_does_not_close_dialogue() {
        let mut host = MockHost::default();
        let mut m = playing_machine(&mut host);
        m.set_interact_available(true);
        let interact = snap_with(
            EdgeFlags { interact_pressed: true, ..Default::default() },
            false,
        );
        m.update(&interact, 1000.0, &mut host);
        assert_eq!(m.mode(), SessionMode::Dialogue);
        m.capture_lost();
        assert_eq!(m.mode(), SessionMode::Dialogue, "dialogue already released capture");
    }
}
