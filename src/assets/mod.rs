// ASSETS: progressive, dependency-ordered world streaming
pub mod binding;
pub mod descriptor;
pub mod fetch;
pub mod mtl;
pub mod obj;
pub mod pipeline;
pub mod progress;

pub use binding::MaterialBinder;
pub use descriptor::WorldDescriptor;
pub use fetch::{FetchError, MemFetcher, ResourceFetcher};
#[cfg(not(target_arch = "wasm32"))]
pub use fetch::FsFetcher;
#[cfg(target_arch = "wasm32")]
pub use fetch::WebFetcher;
pub use pipeline::{AssetError, LoadEvent, Pipeline};
pub use progress::{ProgressTracker, ProgressUpdate};
