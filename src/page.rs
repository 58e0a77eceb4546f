use crate::color::Rgb;
use crate::trigger::{MarkerRegion, RegionId, TriggerWatcher};

/// One band of the virtual page, measured in pixel rows.
#[derive(Clone, Debug)]
pub struct Section {
    pub height: f64,
    pub color: Option<Rgb>,
}

/// A virtual vertical page the user scrolls a viewport over. Stands in for
/// the document the marker regions originally lived in: each frame the
/// visible fraction of every section is delivered to the trigger watcher.
pub struct Page {
    sections: Vec<Section>,
    scroll: f64,
    viewport: f64,
}

impl Page {
    pub fn new(sections: Vec<Section>, viewport: f64) -> Self {
        Page {
            sections,
            scroll: 0.0,
            viewport,
        }
    }

    /// The default page: a handful of dark backdrop bands, each 1.5
    /// viewports tall so exactly one dominates the view at a time.
    pub fn standard(viewport: f64) -> Self {
        let band = (viewport * 1.5).max(1.0);
        let colors = [
            Rgb::new(0x14, 0x21, 0x3d),
            Rgb::new(0x22, 0x33, 0x3b),
            Rgb::new(0x3a, 0x2e, 0x39),
            Rgb::new(0x2b, 0x2d, 0x42),
            Rgb::new(0x1d, 0x35, 0x57),
        ];
        let sections = colors
            .iter()
            .map(|&color| Section {
                height: band,
                color: Some(color),
            })
            .collect();
        Page::new(sections, viewport)
    }

    /// Marker regions for the trigger watcher, one per section.
    pub fn regions(&self) -> Vec<MarkerRegion> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, section)| MarkerRegion {
                id: RegionId(i),
                color: section.color,
            })
            .collect()
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll + delta);
    }

    pub fn scroll_to(&mut self, offset: f64) {
        let max = (self.total_height() - self.viewport).max(0.0);
        self.scroll = offset.clamp(0.0, max);
    }

    pub fn set_viewport(&mut self, viewport: f64) {
        self.viewport = viewport.max(0.0);
        // Re-clamp so a grown viewport cannot leave us over-scrolled
        self.scroll_to(self.scroll);
    }

    fn total_height(&self) -> f64 {
        self.sections.iter().map(|s| s.height).sum()
    }

    /// Visible fraction of section `index` for the current scroll position.
    pub fn visible_fraction(&self, index: usize) -> f64 {
        let mut top = 0.0;
        for (i, section) in self.sections.iter().enumerate() {
            if i == index {
                if section.height <= 0.0 {
                    return 0.0;
                }
                let visible = overlap(top, top + section.height, self.scroll, self.scroll + self.viewport);
                return visible / section.height;
            }
            top += section.height;
        }
        0.0
    }

    /// Delivers one batch of visibility notifications, in document order.
    pub fn emit(&self, watcher: &mut TriggerWatcher) {
        for i in 0..self.sections.len() {
            watcher.observe(RegionId(i), self.visible_fraction(i));
        }
    }
}

fn overlap(a0: f64, a1: f64, b0: f64, b1: f64) -> f64 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        let sections = vec![
            Section { height: 100.0, color: Some(Rgb::new(1, 1, 1)) },
            Section { height: 200.0, color: Some(Rgb::new(2, 2, 2)) },
            Section { height: 100.0, color: Some(Rgb::new(3, 3, 3)) },
        ];
        Page::new(sections, 100.0)
    }

    #[test]
    fn fractions_track_scroll_position() {
        let mut p = page();
        assert_eq!(p.visible_fraction(0), 1.0);
        assert_eq!(p.visible_fraction(1), 0.0);

        p.scroll_to(30.0);
        assert!((p.visible_fraction(0) - 0.7).abs() < 1e-12);
        assert!((p.visible_fraction(1) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn scroll_is_clamped_to_page_bounds() {
        let mut p = page();
        p.scroll_by(-50.0);
        assert_eq!(p.scroll(), 0.0);
        p.scroll_by(10_000.0);
        assert_eq!(p.scroll(), 300.0);
    }

    #[test]
    fn growing_viewport_reclamps_scroll() {
        let mut p = page();
        p.scroll_to(300.0);
        p.set_viewport(300.0);
        assert_eq!(p.scroll(), 100.0);
    }

    #[test]
    fn scrolling_through_sections_drives_the_watcher() {
        let mut p = page();
        let mut watcher = TriggerWatcher::new(0.4, Rgb::new(0, 0, 0), p.regions());

        p.emit(&mut watcher);
        assert_eq!(watcher.background(), Rgb::new(1, 1, 1));

        // Section 1 becomes 45% visible: 0.45 * 200 = 90 rows on screen
        p.scroll_to(90.0);
        p.emit(&mut watcher);
        assert_eq!(watcher.background(), Rgb::new(2, 2, 2));

        // Scrolling back re-crosses section 0 upward
        p.scroll_to(0.0);
        p.emit(&mut watcher);
        assert_eq!(watcher.background(), Rgb::new(1, 1, 1));
    }
}
