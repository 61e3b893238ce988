// VIEW: data handed to the external rendering/UI collaborators
use glam::{Mat4, Vec3};

use crate::controller::SessionMode;
use crate::model::{Appearance, Submesh, WorldAsset};

/// Camera placement for one frame; everything the renderer needs to pose its
/// rig.
#[derive(Debug, Clone, Copy)]
pub struct FramePose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub view_proj: Mat4,
}

/// One drawable surface: submesh geometry plus its bound appearance.
pub struct DrawSurface<'a> {
    pub submesh: &'a Submesh,
    pub appearance: &'a Appearance,
    pub repeat: u32,
}

/// Flatten a loaded world into the renderer's draw list.
pub fn draw_list(asset: &WorldAsset) -> Vec<DrawSurface<'_>> {
    asset
        .surfaces
        .iter()
        .map(|s| DrawSurface {
            submesh: &asset.geometry.submeshes[s.submesh],
            appearance: &s.appearance,
            repeat: s.repeat,
        })
        .collect()
}

/// Overlay visibility is a pure function of the session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayState {
    pub pause_menu: bool,
    pub dialogue: bool,
}

pub fn overlays_for(mode: SessionMode) -> OverlayState {
    OverlayState {
        pause_menu: mode == SessionMode::Paused,
        dialogue: mode == SessionMode::Dialogue,
    }
}
