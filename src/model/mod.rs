// MODEL: owned state read by the controller and the rendering collaborator
pub mod camera;
pub mod player;
pub mod world;

pub use camera::Camera;
pub use player::PlayerState;
pub use world::{
    Appearance, Geometry, MaterialDef, MaterialLib, Submesh, Surface, TextureCache,
    TextureHandle, WorldAsset,
};
