//! Inline-SVG sparkline renderer.
//!
//! A compact stand-in for the render capability: one panel per
//! measurement kind present in the window, one polyline per sensor
//! label. Colors are assigned per label at construction, scoped to this
//! renderer instance -- no process-wide palette state.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use telemon_core::render::{RenderError, Renderer};
use telemon_core::sensors::SensorDescriptor;
use telemon_types::{MeasurementKind, Snapshot};

/// Panel width in SVG units.
const PANEL_WIDTH: f64 = 600.0;
/// Panel height in SVG units.
const PANEL_HEIGHT: f64 = 100.0;
/// Padding inside each panel.
const PAD: f64 = 12.0;

/// ColorBrewer Dark2, the palette the dashboard styling expects.
const PALETTE: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];

/// Renders snapshot windows as stacked SVG sparkline panels.
pub struct SparklineRenderer {
    colors: BTreeMap<String, &'static str>,
}

impl SparklineRenderer {
    /// Assign palette colors to the configured sensor names, sorted so
    /// the assignment is stable across restarts.
    #[must_use]
    pub fn from_descriptors(table: &[SensorDescriptor]) -> Self {
        let mut names: Vec<&str> = table.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();

        let colors = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.to_owned(), PALETTE[i % PALETTE.len()]))
            .collect();
        Self { colors }
    }

    fn color_of(&self, name: &str) -> &'static str {
        self.colors.get(name).copied().unwrap_or("#666666")
    }

    /// Draw one panel for `kind`, returning `None` when no sensor in the
    /// window produces that kind.
    fn panel(&self, window: &[Snapshot], kind: MeasurementKind, y_offset: f64) -> Option<String> {
        let latest = window.last()?;
        let names = latest.names_for(kind);
        if names.is_empty() {
            return None;
        }

        // Series share one vertical scale per panel.
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut series: Vec<(&str, Vec<(usize, f64)>)> = Vec::new();
        for name in names {
            let points: Vec<(usize, f64)> = window
                .iter()
                .enumerate()
                .filter_map(|(i, snap)| snap.value_of(name, kind).map(|v| (i, v)))
                .collect();
            for &(_, value) in &points {
                min = min.min(value);
                max = max.max(value);
            }
            if !points.is_empty() {
                series.push((name, points));
            }
        }
        if series.is_empty() {
            return None;
        }

        let span = if (max - min).abs() < f64::EPSILON {
            1.0
        } else {
            max - min
        };
        let x_step = (PANEL_WIDTH - 2.0 * PAD) / (window.len().saturating_sub(1).max(1)) as f64;

        let mut svg = String::new();
        let _ = write!(
            svg,
            r##"<text x="{PAD}" y="{}" fill="#8b949e" font-size="12">{kind}</text>"##,
            y_offset + PAD,
        );
        for (name, points) in series {
            let mut path = String::new();
            for (i, value) in points {
                let x = PAD + i as f64 * x_step;
                let y = y_offset + PANEL_HEIGHT - PAD
                    - (value - min) / span * (PANEL_HEIGHT - 2.0 * PAD);
                let _ = write!(path, "{x:.1},{y:.1} ");
            }
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                self.color_of(name),
                path.trim_end(),
            );
        }
        Some(svg)
    }
}

impl Renderer for SparklineRenderer {
    fn render(&self, window: &[Snapshot]) -> Result<String, RenderError> {
        if window.is_empty() {
            return Err(RenderError::EmptyWindow);
        }

        let mut panels = Vec::new();
        for kind in MeasurementKind::ALL {
            let y_offset = panels.len() as f64 * PANEL_HEIGHT;
            if let Some(panel) = self.panel(window, kind, y_offset) {
                panels.push(panel);
            }
        }

        let height = (panels.len().max(1)) as f64 * PANEL_HEIGHT;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {PANEL_WIDTH} {height}" width="{PANEL_WIDTH}" height="{height}">"#
        );
        for panel in panels {
            svg.push_str(&panel);
        }
        svg.push_str("</svg>");
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Utc;
    use telemon_core::render::{RenderError, Renderer};
    use telemon_core::sensors::{SensorDescriptor, SensorModel};
    use telemon_types::{MeasurementKind, Snapshot};

    use super::SparklineRenderer;

    fn renderer() -> SparklineRenderer {
        SparklineRenderer::from_descriptors(&[SensorDescriptor {
            name: String::from("cave"),
            channel: 0,
            model: SensorModel::Hts221,
            i2c_addr: None,
        }])
    }

    fn window(values: &[f64]) -> Vec<Snapshot> {
        values
            .iter()
            .map(|&v| {
                let mut snap = Snapshot::new(Utc::now());
                snap.record("cave", MeasurementKind::Humidity, v);
                snap
            })
            .collect()
    }

    #[test]
    fn empty_window_is_an_error() {
        assert!(matches!(
            renderer().render(&[]),
            Err(RenderError::EmptyWindow)
        ));
    }

    #[test]
    fn renders_one_polyline_per_label() {
        let svg = renderer().render(&window(&[40.0, 42.0, 41.0])).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains("humidity"));
        // First configured label gets the first palette color.
        assert!(svg.contains("#1b9e77"));
    }

    #[test]
    fn single_sample_and_flat_series_render_without_dividing_by_zero() {
        let svg = renderer().render(&window(&[40.0])).unwrap();
        assert!(svg.contains("<polyline"));

        let flat = renderer().render(&window(&[40.0, 40.0, 40.0])).unwrap();
        assert!(!flat.contains("NaN"));
        assert!(!flat.contains("inf"));
    }
}
