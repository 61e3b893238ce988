/// Where a world lives: a base path plus the material and geometry
/// filenames, and an ordered list of texture files to probe.
#[derive(Debug, Clone)]
pub struct WorldDescriptor {
    pub base_path: String,
    pub material_file: String,
    pub geometry_file: String,
    /// Probed in order; each entry is independent and may fail.
    pub texture_candidates: Vec<String>,
    /// Uniform scale the host applies when instancing the world.
    pub scale: f32,
}

impl WorldDescriptor {
    pub fn new(base_path: &str, material_file: &str, geometry_file: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
            material_file: material_file.to_string(),
            geometry_file: geometry_file.to_string(),
            texture_candidates: Vec::new(),
            scale: 1.0,
        }
    }

    pub fn with_textures(mut self, candidates: &[&str]) -> Self {
        self.texture_candidates = candidates.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// The bundled demo world.
    pub fn mortal_realm() -> Self {
        Self::new("Resources/world_save/mortal_realm", "a.mtl", "a.obj")
            .with_textures(&[
                "grass.png",
                "water.png",
                "stone.png",
                "sand.png",
                "dirt.png",
                "wood.png",
            ])
            .with_scale(0.1)
    }

    pub fn resolve(&self, file: &str) -> String {
        if self.base_path.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.base_path, file)
        }
    }
}
