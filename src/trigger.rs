use crate::color::Rgb;

/// Identifies one marker region across visibility notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionId(pub usize);

/// A tagged region whose visibility drives the shared background color.
/// Regions without a color are observed but never change the background.
#[derive(Clone, Debug)]
pub struct MarkerRegion {
    pub id: RegionId,
    pub color: Option<Rgb>,
}

struct RegionState {
    region: MarkerRegion,
    intersecting: bool,
}

/// Maps visibility events to a single current background color.
///
/// Holds no queue: each `observe` call is processed immediately, so when
/// several regions cross the threshold in one batch the last one wins.
pub struct TriggerWatcher {
    regions: Vec<RegionState>,
    threshold: f64,
    background: Rgb,
}

impl TriggerWatcher {
    pub fn new(threshold: f64, initial_background: Rgb, regions: Vec<MarkerRegion>) -> Self {
        TriggerWatcher {
            regions: regions
                .into_iter()
                .map(|region| RegionState {
                    region,
                    intersecting: false,
                })
                .collect(),
            threshold,
            background: initial_background,
        }
    }

    /// Delivers one visibility notification. The background changes only on
    /// an upward crossing of the threshold by a region that carries a color.
    pub fn observe(&mut self, id: RegionId, visible_fraction: f64) {
        let Some(state) = self.regions.iter_mut().find(|s| s.region.id == id) else {
            return;
        };
        let intersecting = visible_fraction >= self.threshold;
        if intersecting && !state.intersecting {
            match state.region.color {
                Some(color) => self.background = color,
                None => tracing::debug!(id = id.0, "region has no color tag, ignoring"),
            }
        }
        state.intersecting = intersecting;
    }

    pub fn background(&self) -> Rgb {
        self.background
    }
}
