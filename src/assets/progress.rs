//! Overall load-progress aggregation: the reported fraction follows the
//! largest in-flight resource (byte-wise) and never decreases.

/// `fraction` is `None` when total sizes are unknown (indeterminate) rather
/// than a fabricated number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub fraction: Option<f32>,
}

struct Resource {
    name: String,
    loaded: u64,
    total: Option<u64>,
}

#[derive(Default)]
pub struct ProgressTracker {
    resources: Vec<Resource>,
    /// Monotonic floor: the fraction may not go backwards when a smaller
    /// resource starts reporting.
    floor: f32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record bytes for one resource. Per-resource counts are themselves
    /// kept non-decreasing.
    pub fn update(&mut self, name: &str, loaded: u64, total: Option<u64>) {
        if let Some(r) = self.resources.iter_mut().find(|r| r.name == name) {
            r.loaded = r.loaded.max(loaded);
            if r.total.is_none() {
                r.total = total;
            }
        } else {
            self.resources.push(Resource {
                name: name.to_string(),
                loaded,
                total,
            });
        }
    }

    /// Overall completion right now.
    pub fn current(&mut self) -> ProgressUpdate {
        let largest = self
            .resources
            .iter()
            .filter_map(|r| r.total.map(|t| (r, t)))
            .max_by_key(|&(_, t)| t);

        match largest {
            Some((r, total)) if total > 0 => {
                let fraction = (r.loaded as f32 / total as f32).clamp(0.0, 1.0);
                self.floor = self.floor.max(fraction);
                ProgressUpdate { fraction: Some(self.floor) }
            }
            _ => ProgressUpdate { fraction: None },
        }
    }
}
