/// Platform-agnostic input aggregation. Tracks held and edge-triggered
/// actions without interpreting them; the session machine and locomotion
/// read from here once per frame.
use std::collections::HashSet;

/// Logical actions the demo understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBack,
    StrafeLeft,
    StrafeRight,
    Sprint,
    Jump,
    Interact,
}

/// Platform-independent input events.
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerMove { dx: f32, dy: f32 },
    FocusLost,
    CaptureChanged { captured: bool },
}

/// Key mapping configuration.
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
    pub sprint: Vec<String>,
    pub interact: Vec<String>,
    pub escape: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec!["w".into(), "W".into(), "ArrowUp".into()],
            backward: vec!["s".into(), "S".into(), "ArrowDown".into()],
            left: vec!["a".into(), "A".into(), "ArrowLeft".into()],
            right: vec!["d".into(), "D".into(), "ArrowRight".into()],
            jump: vec![" ".into(), "Space".into()],
            sprint: vec!["Shift".into()],
            interact: vec!["e".into(), "E".into()],
            escape: "Escape".into(),
        }
    }
}

impl KeyBindings {
    pub fn action_for(&self, key: &str) -> Option<Action> {
        let has = |keys: &[String]| keys.iter().any(|k| k == key);
        if has(&self.forward) {
            Some(Action::MoveForward)
        } else if has(&self.backward) {
            Some(Action::MoveBack)
        } else if has(&self.left) {
            Some(Action::StrafeLeft)
        } else if has(&self.right) {
            Some(Action::StrafeRight)
        } else if has(&self.jump) {
            Some(Action::Jump)
        } else if has(&self.sprint) {
            Some(Action::Sprint)
        } else if has(&self.interact) {
            Some(Action::Interact)
        } else {
            None
        }
    }

    pub fn is_escape(&self, key: &str) -> bool {
        key == self.escape
    }
}

/// Edge-triggered flags for the current tick. Cleared explicitly by the
/// frame driver via `clear_edges` once processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFlags {
    pub escape_pressed: bool,
    pub escape_released: bool,
    pub jump_pressed: bool,
    pub interact_pressed: bool,
}

/// Read-only view of the aggregator handed to consumers.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    pub move_forward: bool,
    pub move_back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub sprint: bool,
    pub escape_held: bool,
    pub edges: EdgeFlags,
}

impl InputSnapshot {
    pub fn any_direction(&self) -> bool {
        self.move_forward || self.move_back || self.strafe_left || self.strafe_right
    }
}

/// The aggregator itself. Single writer (the host event wiring); read-only
/// to everything downstream.
pub struct InputState {
    bindings: KeyBindings,
    held: HashSet<Action>,
    edges: EdgeFlags,
    escape_held: bool,
    look_delta: (f32, f32),
    pub captured: bool,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            edges: EdgeFlags::default(),
            escape_held: false,
            look_delta: (0.0, 0.0),
            captured: false,
        }
    }

    /// Route one platform event into the aggregator.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.on_key_down(key),
            InputEvent::KeyUp(key) => self.on_key_up(key),
            InputEvent::PointerMove { dx, dy } => self.on_pointer_move(*dx, *dy),
            InputEvent::FocusLost => self.clear_held(),
            InputEvent::CaptureChanged { captured } => self.captured = *captured,
        }
    }

    pub fn on_key_down(&mut self, key: &str) {
        if self.bindings.is_escape(key) {
            // Guard against key auto-repeat re-firing the edge.
            if !self.escape_held {
                self.escape_held = true;
                self.edges.escape_pressed = true;
            }
            return;
        }
        if let Some(action) = self.bindings.action_for(key) {
            let newly_held = self.held.insert(action);
            if newly_held {
                match action {
                    Action::Jump => self.edges.jump_pressed = true,
                    Action::Interact => self.edges.interact_pressed = true,
                    _ => {}
                }
            }
        }
    }

    pub fn on_key_up(&mut self, key: &str) {
        if self.bindings.is_escape(key) {
            if self.escape_held {
                self.escape_held = false;
                self.edges.escape_released = true;
            }
            return;
        }
        if let Some(action) = self.bindings.action_for(key) {
            self.held.remove(&action);
        }
    }

    /// Accumulate raw look motion. Only meaningful while captured; the host
    /// routes uncaptured motion elsewhere.
    pub fn on_pointer_move(&mut self, dx: f32, dy: f32) {
        if self.captured {
            self.look_delta.0 += dx;
            self.look_delta.1 += dy;
        }
    }

    /// Return and reset the accumulated look delta. Call at most once per
    /// frame.
    pub fn consume_look_delta(&mut self) -> (f32, f32) {
        std::mem::replace(&mut self.look_delta, (0.0, 0.0))
    }

    /// Non-mutating view of held and edge state.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            move_forward: self.held.contains(&Action::MoveForward),
            move_back: self.held.contains(&Action::MoveBack),
            strafe_left: self.held.contains(&Action::StrafeLeft),
            strafe_right: self.held.contains(&Action::StrafeRight),
            sprint: self.held.contains(&Action::Sprint),
            escape_held: self.escape_held,
            edges: self.edges,
        }
    }

    pub fn clear_edges(&mut self) {
        self.edges = EdgeFlags::default();
    }

    /// Drop all held state (focus loss, tab switch). Edge flags survive so a
    /// pending press is not lost mid-frame.
    pub fn clear_held(&mut self) {
        self.held.clear();
        self.escape_held = false;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
