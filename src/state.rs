use crate::config::Config;

/// Application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Simulation paused
    pub paused: bool,
    /// Enable debug overlay
    pub debug: bool,
    /// Ground grid enabled
    pub grid: bool,
    /// Zoom level
    pub zoom: f64,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            paused: false,
            debug: config.debug,
            grid: true,
            zoom: config.zoom,
        }
    }
}
