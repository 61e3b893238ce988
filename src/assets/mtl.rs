//! Minimal MTL material-library parser: the subset the demo worlds actually
//! use (`newmtl`, `Kd`, `map_Kd`). Unknown statements are skipped.

use crate::model::{MaterialDef, MaterialLib};

pub fn parse(src: &str) -> MaterialLib {
    let mut lib = MaterialLib::default();

    for line in src.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword {
            "newmtl" => {
                if !rest.is_empty() {
                    lib.materials.push(MaterialDef::flat(rest));
                }
            }
            "Kd" => {
                if let Some(current) = lib.materials.last_mut() {
                    let mut parts = rest.split_whitespace();
                    let r = parts.next().and_then(|v| v.parse().ok());
                    let g = parts.next().and_then(|v| v.parse().ok());
                    let b = parts.next().and_then(|v| v.parse().ok());
                    if let (Some(r), Some(g), Some(b)) = (r, g, b) {
                        current.diffuse = [r, g, b];
                    }
                }
            }
            "map_Kd" => {
                if let Some(current) = lib.materials.last_mut() {
                    if !rest.is_empty() {
                        // Filenames may contain spaces; take the full rest.
                        current.texture = Some(rest.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    lib
}
