//! Layout renderers for the `layout` command

use std::fmt::Write as _;

use sheetline_core::{BandKind, LayoutModel, RenderError, Renderer};

/// Serializes the full layout model
#[derive(Debug, Default)]
pub struct JsonRenderer {
    pub compact: bool,
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, layout: &LayoutModel) -> Result<String, RenderError> {
        let result = if self.compact {
            serde_json::to_string(layout)
        } else {
            serde_json::to_string_pretty(layout)
        };
        result.map_err(|e| RenderError::Format(e.to_string()))
    }
}

/// Plain-text outline of tracks, bands and the milestone
#[derive(Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, layout: &LayoutModel) -> Result<String, RenderError> {
        let Some(range) = layout.date_range else {
            return Err(RenderError::InvalidData("no displayable data".into()));
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "timeline {} to {} ({} days, {} rows)",
            range.start,
            range.end,
            range.days(),
            layout.rows.len()
        );

        for track in &layout.tracks {
            let _ = writeln!(out, "\n[{}] {}", track.color, track.name);
            for row in &layout.rows[track.first_row..=track.last_row] {
                let entry = &row.entry;
                let _ = writeln!(
                    out,
                    "  {:>6.1}  {}  {}  {:>4}d  {}",
                    row.y,
                    entry.start,
                    entry.end,
                    entry.duration_days(),
                    entry.label
                );
            }
        }

        for (kind, title) in [
            (BandKind::Phase, "phases"),
            (BandKind::Year, "years"),
            (BandKind::Month, "months"),
        ] {
            let bands: Vec<String> = layout
                .bands_of(kind)
                .map(|b| format!("{} [{}, {})", b.label, b.start, b.end))
                .collect();
            let _ = writeln!(out, "\n{title}: {}", bands.join("; "));
        }

        if let Some(milestone) = &layout.milestone {
            let _ = writeln!(out, "\nmilestone: {} {}", milestone.label, milestone.date);
        }
        Ok(out)
    }
}
