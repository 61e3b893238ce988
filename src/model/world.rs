use std::collections::HashMap;

use glam::Vec3;
use image::RgbaImage;

/// One named material from the material library: flat colour plus an
/// optional texture reference.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDef {
    pub name: String,
    /// Diffuse colour, linear RGB.
    pub diffuse: [f32; 3],
    /// Texture file referenced by the library, if any.
    pub texture: Option<String>,
}

impl MaterialDef {
    pub fn flat(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse: [0.8, 0.8, 0.8],
            texture: None,
        }
    }
}

/// Materials keyed by name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct MaterialLib {
    pub materials: Vec<MaterialDef>,
}

impl MaterialLib {
    pub fn get(&self, name: &str) -> Option<&MaterialDef> {
        self.materials.iter().find(|m| m.name == name)
    }
}

/// A named, independently shaded partition of the world geometry.
#[derive(Debug, Clone)]
pub struct Submesh {
    pub name: String,
    /// Material name from a `usemtl` line, if the geometry declares one.
    pub material: Option<String>,
    pub positions: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub bbox_min: Vec3,
    pub bbox_max: Vec3,
}

impl Submesh {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            material: None,
            positions: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            bbox_min: Vec3::splat(f32::INFINITY),
            bbox_max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn grow_bbox(&mut self, p: Vec3) {
        self.bbox_min = self.bbox_min.min(p);
        self.bbox_max = self.bbox_max.max(p);
    }

    /// Horizontal bounding-box extent, (x, z). Zero for an empty submesh.
    pub fn footprint(&self) -> (f32, f32) {
        if self.positions.is_empty() {
            return (0.0, 0.0);
        }
        let e = self.bbox_max - self.bbox_min;
        (e.x, e.z)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub submeshes: Vec<Submesh>,
}

/// A decoded texture ready for upload by the rendering collaborator.
pub struct TextureHandle {
    pub name: String,
    pub image: RgbaImage,
    /// Uniform filtering flag; set from config, not per texture.
    pub nearest: bool,
}

/// Logical texture name -> loaded handle. Entries may be absent (failed
/// fetch) without invalidating the cache.
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<String, TextureHandle>,
}

impl TextureCache {
    pub fn insert(&mut self, handle: TextureHandle) {
        self.entries.insert(handle.name.clone(), handle);
    }

    pub fn get(&self, name: &str) -> Option<&TextureHandle> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The renderable appearance bound to a submesh. Never absent: binding falls
/// back to a flat colour when no texture is usable.
#[derive(Debug, Clone, PartialEq)]
pub enum Appearance {
    Textured { texture: String },
    Flat { color: [f32; 3] },
}

/// One drawable surface: a submesh index into the geometry plus its bound
/// appearance and tiling factor.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub submesh: usize,
    pub appearance: Appearance,
    /// Texture repeat count derived from the submesh footprint.
    pub repeat: u32,
}

/// The fully loaded world: immutable once the pipeline emits it.
pub struct WorldAsset {
    pub materials: MaterialLib,
    pub geometry: Geometry,
    pub textures: TextureCache,
    pub surfaces: Vec<Surface>,
    /// Uniform scale applied by the host when instancing the world.
    pub scale: f32,
}
