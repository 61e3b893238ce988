//! Line-oriented OBJ geometry parser covering the subset the demo worlds
//! use: positions, texture coordinates, named groups, material assignment,
//! and polygonal faces (fan-triangulated, negative indices supported).
//! Malformed lines are skipped rather than failing the whole asset.

use std::collections::HashMap;

use glam::Vec3;

use crate::model::{Geometry, Submesh};

pub fn parse(src: &str) -> Geometry {
    let mut parser = Parser::default();
    for line in src.lines() {
        parser.line(line);
    }
    Geometry {
        submeshes: parser
            .submeshes
            .into_iter()
            .filter(|s| !s.indices.is_empty())
            .collect(),
    }
}

#[derive(Default)]
struct Parser {
    positions: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
    submeshes: Vec<Submesh>,
    /// (position index, uv index) -> local vertex, for the current submesh.
    vertex_map: HashMap<(usize, Option<usize>), u32>,
}

impl Parser {
    fn line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword {
            "v" => {
                if let Some(p) = parse_vec3(rest) {
                    self.positions.push(p);
                }
            }
            "vt" => {
                if let Some(uv) = parse_uv(rest) {
                    self.uvs.push(uv);
                }
            }
            "o" | "g" => self.start_submesh(rest),
            "usemtl" => self.assign_material(rest),
            "f" => self.face(rest),
            _ => {}
        }
    }

    fn start_submesh(&mut self, name: &str) {
        let name = if name.is_empty() { "unnamed" } else { name };
        self.submeshes.push(Submesh::new(name));
        self.vertex_map.clear();
    }

    fn assign_material(&mut self, material: &str) {
        if material.is_empty() {
            return;
        }
        if self.submeshes.is_empty() {
            self.start_submesh("default");
        }
        let current = self.submeshes.last_mut().unwrap();
        if current.indices.is_empty() {
            current.material = Some(material.to_string());
        } else if current.material.as_deref() != Some(material) {
            // A second material inside one group starts a new partition.
            let name = format!("{}.{}", current.name, material);
            let mut next = Submesh::new(&name);
            next.material = Some(material.to_string());
            self.submeshes.push(next);
            self.vertex_map.clear();
        }
    }

    fn face(&mut self, rest: &str) {
        let refs: Vec<(usize, Option<usize>)> = rest
            .split_whitespace()
            .filter_map(|token| self.resolve(token))
            .collect();
        if refs.len() < 3 {
            return;
        }
        if self.submeshes.is_empty() {
            self.start_submesh("default");
        }

        let locals: Vec<u32> = refs.iter().map(|&r| self.local_vertex(r)).collect();
        let submesh = self.submeshes.last_mut().unwrap();
        for i in 1..locals.len() - 1 {
            submesh.indices.push(locals[0]);
            submesh.indices.push(locals[i]);
            submesh.indices.push(locals[i + 1]);
        }
    }

    /// Resolve one `v`, `v/vt`, `v//vn` or `v/vt/vn` token into global
    /// indices. OBJ indices are 1-based; negative values count from the end.
    fn resolve(&self, token: &str) -> Option<(usize, Option<usize>)> {
        let mut parts = token.split('/');
        let pos = resolve_index(parts.next()?, self.positions.len())?;
        let uv = match parts.next() {
            Some("") | None => None,
            Some(raw) => resolve_index(raw, self.uvs.len()),
        };
        Some((pos, uv))
    }

    fn local_vertex(&mut self, key: (usize, Option<usize>)) -> u32 {
        if let Some(&local) = self.vertex_map.get(&key) {
            return local;
        }
        let submesh = self.submeshes.last_mut().unwrap();
        let p = self.positions[key.0];
        submesh.positions.push(p);
        submesh.grow_bbox(p);
        submesh
            .uvs
            .push(key.1.map(|i| self.uvs[i]).unwrap_or([0.0, 0.0]));
        let local = (submesh.positions.len() - 1) as u32;
        self.vertex_map.insert(key, local);
        local
    }
}

fn resolve_index(raw: &str, len: usize) -> Option<usize> {
    let value: i64 = raw.parse().ok()?;
    let resolved = if value < 0 {
        len as i64 + value
    } else {
        value - 1
    };
    if (0..len as i64).contains(&resolved) {
        Some(resolved as usize)
    } else {
        None
    }
}

fn parse_vec3(rest: &str) -> Option<Vec3> {
    let mut parts = rest.split_whitespace();
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let z = parts.next()?.parse().ok()?;
    Some(Vec3::new(x, y, z))
}

fn parse_uv(rest: &str) -> Option<[f32; 2]> {
    let mut parts = rest.split_whitespace();
    let u = parts.next()?.parse().ok()?;
    let v = parts.next()?.parse().ok()?;
    Some([u, v])
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o ground_grass
v 0 0 0
v 16 0 0
v 16 0 16
v 0 0 16
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl grass_top
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn test_quad_fan_triangulation() {
        let geo = parse(QUAD);
        assert_eq!(geo.submeshes.len(), 1);
        let s = &geo.submeshes[0];
        assert_eq!(s.name, "ground_grass");
        assert_eq!(s.material.as_deref(), Some("grass_top"));
        assert_eq!(s.positions.len(), 4, "shared vertices deduplicated");
        assert_eq!(s.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_bounding_box() {
        let geo = parse(QUAD);
        let s = &geo.submeshes[0];
        assert_eq!(s.bbox_min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(s.bbox_max, Vec3::new(16.0, 0.0, 16.0));
        assert_eq!(s.footprint(), (16.0, 16.0));
    }

    #[test]
    fn test_negative_indices() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 0 1\nf -3 -2 -1\n";
        let geo = parse(src);
        assert_eq!(geo.submeshes.len(), 1);
        assert_eq!(geo.submeshes[0].indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_faces_without_uvs() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let geo = parse(src);
        assert_eq!(geo.submeshes[0].uvs, vec![[0.0, 0.0]; 3]);
    }

    #[test]
    fn test_second_usemtl_splits_group() {
        let src = "\
o terrain
v 0 0 0
v 1 0 0
v 0 0 1
v 2 0 0
usemtl grass
f 1 2 3
usemtl water
f 2 4 3
";
        let geo = parse(src);
        assert_eq!(geo.submeshes.len(), 2);
        assert_eq!(geo.submeshes[0].material.as_deref(), Some("grass"));
        assert_eq!(geo.submeshes[1].name, "terrain.water");
        assert_eq!(geo.submeshes[1].material.as_deref(), Some("water"));
    }

    #[test]
    fn test_out_of_range_face_skipped() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 99\nf 1 2 2\n";
        let geo = parse(src);
        // First face references a missing vertex, second is degenerate but
        // well-formed; only the second survives.
        assert_eq!(geo.submeshes.len(), 1);
        assert_eq!(geo.submeshes[0].indices.len(), 3);
    }

    #[test]
    fn test_empty_groups_dropped() {
        let src = "o empty\no full\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let geo = parse(src);
        assert_eq!(geo.submeshes.len(), 1);
        assert_eq!(geo.submeshes[0].name, "full");
    }
}
