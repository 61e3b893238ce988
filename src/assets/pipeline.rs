//! Dependency-ordered world loading: material library first (hard
//! dependency), then geometry, then independent texture probes, then
//! per-submesh binding. A texture failure never aborts the pipeline; a
//! material or geometry failure always does.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::assets::binding::MaterialBinder;
use crate::assets::descriptor::WorldDescriptor;
use crate::assets::fetch::{FetchError, ResourceFetcher};
use crate::assets::progress::{ProgressTracker, ProgressUpdate};
use crate::assets::{mtl, obj};
use crate::config::Config;
use crate::model::{TextureCache, TextureHandle, WorldAsset};

#[derive(Debug)]
pub enum AssetError {
    Fetch { resource: String, cause: FetchError },
    Corrupt { resource: String, detail: String },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Fetch { resource, cause } => {
                write!(f, "failed to fetch {resource}: {cause}")
            }
            AssetError::Corrupt { resource, detail } => {
                write!(f, "corrupt resource {resource}: {detail}")
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Fetch { cause, .. } => Some(cause),
            AssetError::Corrupt { .. } => None,
        }
    }
}

/// The pipeline's output stream. `Complete` and `FatalFailure` are terminal
/// and mutually exclusive.
pub enum LoadEvent {
    Progress(ProgressUpdate),
    PartialFailure { resource: String, cause: String },
    Complete(WorldAsset),
    FatalFailure(AssetError),
}

pub struct Pipeline {
    descriptor: WorldDescriptor,
    nearest_filter: bool,
    unit_size: f32,
}

impl Pipeline {
    pub fn new(descriptor: WorldDescriptor, config: &Config) -> Self {
        Self {
            descriptor,
            nearest_filter: config.nearest_filter,
            unit_size: config.tiling_unit_size,
        }
    }

    /// Run to a terminal event. Once started the pipeline is not cancelled;
    /// it ends in exactly one `Complete` or `FatalFailure`.
    pub async fn run<F: ResourceFetcher>(self, fetcher: &F, mut emit: impl FnMut(LoadEvent)) {
        match self.load(fetcher, &mut emit).await {
            Ok(asset) => {
                info!(
                    submeshes = asset.geometry.submeshes.len(),
                    textures = asset.textures.len(),
                    "world load complete"
                );
                emit(LoadEvent::Complete(asset));
            }
            Err(e) => {
                error!("world load failed: {e}");
                emit(LoadEvent::FatalFailure(e));
            }
        }
    }

    async fn load<F: ResourceFetcher>(
        &self,
        fetcher: &F,
        emit: &mut impl FnMut(LoadEvent),
    ) -> Result<WorldAsset, AssetError> {
        let mut tracker = ProgressTracker::new();

        // Materials first: submesh names cannot be interpreted without them.
        let material_file = self.descriptor.material_file.clone();
        let bytes = self
            .fetch(fetcher, &mut tracker, emit, &material_file)
            .await
            .map_err(|cause| AssetError::Fetch {
                resource: material_file.clone(),
                cause,
            })?;
        let materials = mtl::parse(&String::from_utf8_lossy(&bytes));
        if materials.materials.is_empty() {
            return Err(AssetError::Corrupt {
                resource: material_file,
                detail: "no material definitions".into(),
            });
        }

        // Geometry next; it references the material names above.
        let geometry_file = self.descriptor.geometry_file.clone();
        let bytes = self
            .fetch(fetcher, &mut tracker, emit, &geometry_file)
            .await
            .map_err(|cause| AssetError::Fetch {
                resource: geometry_file.clone(),
                cause,
            })?;
        let geometry = obj::parse(&String::from_utf8_lossy(&bytes));
        if geometry.submeshes.is_empty() {
            return Err(AssetError::Corrupt {
                resource: geometry_file,
                detail: "no renderable submeshes".into(),
            });
        }

        // Texture probes are independent of each other and of completion.
        let mut textures = TextureCache::default();
        for name in &self.descriptor.texture_candidates {
            match self.fetch(fetcher, &mut tracker, emit, name).await {
                Ok(bytes) => match image::load_from_memory(&bytes) {
                    Ok(img) => {
                        debug!("texture {name} loaded");
                        textures.insert(TextureHandle {
                            name: name.clone(),
                            image: img.to_rgba8(),
                            nearest: self.nearest_filter,
                        });
                    }
                    Err(e) => {
                        warn!("texture {name} failed to decode: {e}");
                        emit(LoadEvent::PartialFailure {
                            resource: name.clone(),
                            cause: e.to_string(),
                        });
                    }
                },
                Err(e) => {
                    warn!("texture {name} failed to load: {e}");
                    emit(LoadEvent::PartialFailure {
                        resource: name.clone(),
                        cause: e.to_string(),
                    });
                }
            }
        }

        let binder =
            MaterialBinder::from_candidates(&self.descriptor.texture_candidates, self.unit_size);
        let surfaces = binder.bind_all(&geometry.submeshes, &materials, &textures);

        Ok(WorldAsset {
            materials,
            geometry,
            textures,
            surfaces,
            scale: self.descriptor.scale,
        })
    }

    async fn fetch<F: ResourceFetcher>(
        &self,
        fetcher: &F,
        tracker: &mut ProgressTracker,
        emit: &mut impl FnMut(LoadEvent),
        file: &str,
    ) -> Result<Vec<u8>, FetchError> {
        let path = self.descriptor.resolve(file);
        debug!("fetching {path}");
        let mut on_bytes = |loaded: u64, total: Option<u64>| {
            tracker.update(file, loaded, total);
            emit(LoadEvent::Progress(tracker.current()));
        };
        fetcher.fetch(&path, &mut on_bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::fetch::MemFetcher;
    use crate::model::Appearance;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    const MTL: &str = "\
newmtl grass_top
Kd 0.2 0.8 0.3
map_Kd grass.png
newmtl water_flat
Kd 0.25 0.66 0.96
";

    const OBJ: &str = "\
o field_grass
v 0 0 0
v 16 0 0
v 16 0 16
v 0 0 16
usemtl grass_top
f 1 2 3 4
o lake_water
v 0 0 0
v 8 0 0
v 8 0 8
usemtl water_flat
f 5 6 7
";

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).expect("encode png");
        out.into_inner()
    }

    fn base_fetcher() -> MemFetcher {
        let mut f = MemFetcher::new();
        f.insert("world/a.mtl", MTL.as_bytes().to_vec());
        f.insert("world/a.obj", OBJ.as_bytes().to_vec());
        f
    }

    fn descriptor() -> WorldDescriptor {
        WorldDescriptor::new("world", "a.mtl", "a.obj")
            .with_textures(&["grass.png", "water.png"])
    }

    fn run(fetcher: &MemFetcher, descriptor: WorldDescriptor) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        let pipeline = Pipeline::new(descriptor, &Config::default());
        pollster::block_on(pipeline.run(fetcher, |e| events.push(e)));
        events
    }

    fn completed(events: &[LoadEvent]) -> Option<&WorldAsset> {
        events.iter().find_map(|e| match e {
            LoadEvent::Complete(asset) => Some(asset),
            _ => None,
        })
    }

    #[test]
    fn test_full_load_binds_textures() {
        let mut fetcher = base_fetcher();
        fetcher.insert("world/grass.png", png_bytes());
        fetcher.insert("world/water.png", png_bytes());

        let events = run(&fetcher, descriptor());
        let asset = completed(&events).expect("pipeline completes");
        assert_eq!(asset.geometry.submeshes.len(), 2);
        assert_eq!(
            asset.surfaces[0].appearance,
            Appearance::Textured { texture: "grass.png".into() }
        );
        assert_eq!(
            asset.surfaces[1].appearance,
            Appearance::Textured { texture: "water.png".into() }
        );
        assert_eq!(asset.surfaces[0].repeat, 4, "16-unit footprint at unit 4");
        assert_eq!(asset.surfaces[1].repeat, 2, "8-unit footprint at unit 4");
        assert!(asset.textures.get("grass.png").unwrap().nearest);
    }

    #[test]
    fn test_material_failure_is_fatal_and_stops_everything() {
        let mut fetcher = MemFetcher::new();
        // Geometry and textures exist but must never be consulted.
        fetcher.insert("world/a.obj", OBJ.as_bytes().to_vec());
        fetcher.insert("world/grass.png", png_bytes());

        let events = run(&fetcher, descriptor());
        let fatals = events
            .iter()
            .filter(|e| matches!(e, LoadEvent::FatalFailure(_)))
            .count();
        assert_eq!(fatals, 1, "exactly one fatal event");
        assert!(completed(&events).is_none());
        assert!(
            !events.iter().any(|e| matches!(e, LoadEvent::PartialFailure { .. })),
            "no texture was attempted after a fatal material failure"
        );
    }

    #[test]
    fn test_geometry_failure_is_fatal() {
        let mut fetcher = MemFetcher::new();
        fetcher.insert("world/a.mtl", MTL.as_bytes().to_vec());

        let events = run(&fetcher, descriptor());
        assert!(completed(&events).is_none(), "no Complete after geometry failure");
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, LoadEvent::FatalFailure(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_empty_geometry_is_corrupt() {
        let mut fetcher = MemFetcher::new();
        fetcher.insert("world/a.mtl", MTL.as_bytes().to_vec());
        fetcher.insert("world/a.obj", b"# nothing here\n".to_vec());

        let events = run(&fetcher, descriptor());
        assert!(events.iter().any(|e| matches!(
            e,
            LoadEvent::FatalFailure(AssetError::Corrupt { .. })
        )));
    }

    #[test]
    fn test_zero_textures_still_completes_with_fallbacks() {
        let events = run(&base_fetcher(), descriptor());
        let asset = completed(&events).expect("texture failures never abort");

        let partials = events
            .iter()
            .filter(|e| matches!(e, LoadEvent::PartialFailure { .. }))
            .count();
        assert_eq!(partials, 2, "one partial failure per missing candidate");

        for surface in &asset.surfaces {
            assert!(
                matches!(surface.appearance, Appearance::Flat { .. }),
                "every submesh still gets a renderable appearance"
            );
        }
        // The flat colour comes from the material library where present.
        assert_eq!(
            asset.surfaces[1].appearance,
            Appearance::Flat { color: [0.25, 0.66, 0.96] }
        );
    }

    #[test]
    fn test_undecodable_texture_is_partial() {
        let mut fetcher = base_fetcher();
        fetcher.insert("world/grass.png", b"not a png".to_vec());
        fetcher.insert("world/water.png", png_bytes());

        let events = run(&fetcher, descriptor());
        let asset = completed(&events).expect("decode failure is partial");
        assert!(!asset.textures.contains("grass.png"));
        // grass submesh falls back to the first loaded candidate.
        assert_eq!(
            asset.surfaces[0].appearance,
            Appearance::Textured { texture: "water.png".into() }
        );
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut fetcher = base_fetcher();
        fetcher.insert("world/grass.png", png_bytes());
        fetcher.insert("world/water.png", png_bytes());

        let events = run(&fetcher, descriptor());
        let mut last = 0.0f32;
        let mut saw_progress = false;
        for e in &events {
            if let LoadEvent::Progress(update) = e {
                if let Some(f) = update.fraction {
                    assert!(f >= last, "overall fraction never decreases");
                    last = f;
                    saw_progress = true;
                }
            }
        }
        assert!(saw_progress, "progress events were emitted");
    }

    #[test]
    fn test_unknown_sizes_report_indeterminate() {
        let mut fetcher = base_fetcher();
        fetcher.hide_sizes = true;

        let events = run(&fetcher, descriptor());
        assert!(completed(&events).is_some());
        for e in &events {
            if let LoadEvent::Progress(update) = e {
                assert_eq!(update.fraction, None, "no fabricated fractions");
            }
        }
    }
}
