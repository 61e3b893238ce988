//! Heuristic material binding: an ordered rule table mapping name keywords
//! to texture candidates, evaluated once per submesh at load time. A submesh
//! is never left without a renderable appearance.

use crate::model::{Appearance, MaterialLib, Submesh, Surface, TextureCache};

/// Appearance used when no texture loaded and the material library has no
/// colour for the submesh.
const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// One binding rule: submesh names containing `keyword` bind `texture`.
#[derive(Debug, Clone)]
pub struct BindingRule {
    pub keyword: String,
    pub texture: String,
}

pub struct MaterialBinder {
    rules: Vec<BindingRule>,
    /// Candidate list in probe order; the fallback picks the first loaded.
    candidates: Vec<String>,
    unit_size: f32,
}

impl MaterialBinder {
    /// Derive the rule table from the candidate list: each candidate's file
    /// stem is its keyword, in list order (first matching rule wins).
    pub fn from_candidates(candidates: &[String], unit_size: f32) -> Self {
        let rules = candidates
            .iter()
            .map(|c| BindingRule {
                keyword: file_stem(c).to_ascii_lowercase(),
                texture: c.clone(),
            })
            .collect();
        Self {
            rules,
            candidates: candidates.to_vec(),
            unit_size,
        }
    }

    /// Bind every submesh, producing one surface each.
    pub fn bind_all(
        &self,
        submeshes: &[Submesh],
        materials: &MaterialLib,
        textures: &TextureCache,
    ) -> Vec<Surface> {
        submeshes
            .iter()
            .enumerate()
            .map(|(i, s)| Surface {
                submesh: i,
                appearance: self.bind(s, materials, textures),
                repeat: self.repeat_for(s),
            })
            .collect()
    }

    fn bind(
        &self,
        submesh: &Submesh,
        materials: &MaterialLib,
        textures: &TextureCache,
    ) -> Appearance {
        let name = submesh.name.to_ascii_lowercase();
        let material = submesh
            .material
            .as_deref()
            .and_then(|m| materials.get(m));
        let material_name = material.map(|m| m.name.to_ascii_lowercase());

        // First matching rule wins; match the submesh name, then the
        // material name it references.
        let matched = self.rules.iter().find(|rule| {
            name.contains(&rule.keyword)
                || material_name
                    .as_deref()
                    .is_some_and(|m| m.contains(&rule.keyword))
        });

        if let Some(rule) = matched {
            if textures.contains(&rule.texture) {
                return Appearance::Textured { texture: rule.texture.clone() };
            }
        }

        // No rule hit, or the matched texture failed to load: first loaded
        // candidate in probe order.
        for candidate in &self.candidates {
            if textures.contains(candidate) {
                return Appearance::Textured { texture: candidate.clone() };
            }
        }

        Appearance::Flat {
            color: material.map(|m| m.diffuse).unwrap_or(DEFAULT_COLOR),
        }
    }

    /// Texture repeats from the bounding-box footprint, so texel density
    /// stays roughly constant across differently sized surfaces.
    pub fn repeat_for(&self, submesh: &Submesh) -> u32 {
        let (ex, ez) = submesh.footprint();
        let repeat = (ex.max(ez) / self.unit_size).round();
        (repeat as u32).max(1)
    }
}

fn file_stem(name: &str) -> &str {
    name.rsplit('/')
        .next()
        .unwrap_or(name)
        .split('.')
        .next()
        .unwrap_or(name)
}
