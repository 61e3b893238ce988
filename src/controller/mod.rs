// CONTROLLER: input aggregation, session logic, and the per-frame update
pub mod frame_loop;
pub mod input;
pub mod locomotion;
pub mod session;

pub use frame_loop::FrameContext;
pub use input::{Action, EdgeFlags, InputEvent, InputSnapshot, InputState, KeyBindings};
pub use locomotion::Locomotion;
pub use session::{CaptureHost, SessionMachine, SessionMode};
