//! Timeline layout
//!
//! Computes everything a chart backend needs to draw a schedule: row
//! positions grouped into category tracks, phase/month/year bands, legend
//! swatches and the completion milestone. Positions are abstract: x is a
//! calendar date, y is measured in row units growing downward from row 0.

use std::fmt::Write as _;

use chrono::{Datelike, Days, Duration, NaiveDate};
use sheetline_core::{
    BandKind, DateRange, LayoutModel, LayoutOptions, LegendSwatch, Milestone,
    RowPlacement, ScheduleConfig, ScheduleEntry, TimeBand, TrackSpan,
};

/// Lay out classified entries.
///
/// Entries without a category, or with one the configuration does not know,
/// are placed on the default category's track. No entries yields an empty
/// model.
pub fn compute_layout(entries: &[ScheduleEntry], config: &ScheduleConfig) -> LayoutModel {
    let Some(range) = date_range(entries) else {
        return LayoutModel::default();
    };
    let options = &config.layout;

    let (rows, tracks) = place_rows(entries, config);
    let height = tracks.last().map_or(0.0, |t| t.y_bottom);

    let months = month_bands(range, &options.month_label_format);
    let mut bands = phase_bands(range, &config.phases);
    bands.extend(year_bands(&months, options.year_band_pad_days));
    bands.extend(months);

    let model = LayoutModel {
        rows,
        tracks,
        bands,
        legend: legend(config),
        milestone: Some(Milestone {
            date: range.end,
            label: options.milestone_label.clone(),
            y: height,
        }),
        date_range: Some(range),
        height,
    };

    tracing::info!(
        rows = model.rows.len(),
        tracks = model.tracks.len(),
        bands = model.bands.len(),
        "computed layout"
    );
    model
}

/// `[min start, max end]` over all entries
pub fn date_range(entries: &[ScheduleEntry]) -> Option<DateRange> {
    let start = entries.iter().map(|e| e.start).min()?;
    let end = entries.iter().map(|e| e.end).max()?;
    Some(DateRange { start, end })
}

fn track_of<'a>(entry: &'a ScheduleEntry, config: &'a ScheduleConfig) -> &'a str {
    match entry.category.as_deref() {
        Some(id) if config.is_known_category(id) => id,
        _ => &config.default_category,
    }
}

fn row_y(row_index: usize, track_index: usize, options: &LayoutOptions) -> f64 {
    row_index as f64 * (options.row_height + options.row_spacing)
        + track_index as f64 * options.track_gap
}

fn place_rows(entries: &[ScheduleEntry], config: &ScheduleConfig) -> (Vec<RowPlacement>, Vec<TrackSpan>) {
    let options = &config.layout;
    let mut rows = Vec::with_capacity(entries.len());
    let mut tracks = Vec::new();

    for category in &config.categories {
        let mut members: Vec<&ScheduleEntry> = entries
            .iter()
            .filter(|e| track_of(e, config) == category.id)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_by_key(|e| (e.start, e.ordinal));

        let track_index = tracks.len();
        let first_row = rows.len();
        for entry in members {
            let row_index = rows.len();
            let mut entry = entry.clone();
            entry.category = Some(category.id.clone());
            rows.push(RowPlacement {
                entry,
                row_index,
                track_index,
                y: row_y(row_index, track_index, options),
            });
        }
        let last_row = rows.len() - 1;

        tracks.push(TrackSpan {
            category: category.id.clone(),
            name: category.name.clone(),
            color: category.color.clone(),
            first_row,
            last_row,
            y_top: row_y(first_row, track_index, options),
            y_bottom: row_y(last_row, track_index, options) + options.row_height,
        });
    }

    (rows, tracks)
}

/// Split the range into equal elapsed-time segments, one per phase name.
///
/// Boundary `i` lies `floor(i * total / n)` days after the start, so the
/// bands are contiguous and the last one ends exactly at the range end.
pub fn phase_bands(range: DateRange, phases: &[String]) -> Vec<TimeBand> {
    let n = phases.len() as i64;
    if n == 0 {
        return Vec::new();
    }
    let total = range.days();
    let boundary = |i: i64| {
        range
            .start
            .checked_add_signed(Duration::days(i * total / n))
            .unwrap_or(range.end)
    };

    phases
        .iter()
        .zip(0_i64..)
        .map(|(name, i)| TimeBand {
            kind: BandKind::Phase,
            label: name.clone(),
            start: boundary(i),
            end: boundary(i + 1),
        })
        .collect()
}

/// One band per calendar month touched by the range
pub fn month_bands(range: DateRange, label_format: &str) -> Vec<TimeBand> {
    let mut bands = Vec::new();
    let mut month = first_of_month(range.start);
    let last = first_of_month(range.end);

    while month <= last {
        let next = next_month(month);
        bands.push(TimeBand {
            kind: BandKind::Month,
            label: month_label(month, label_format),
            start: month,
            end: next.unwrap_or(range.end),
        });
        match next {
            Some(next) => month = next,
            None => break,
        }
    }
    bands
}

/// Falls back to `YYYY-MM` when the format cannot be rendered
fn month_label(month: NaiveDate, label_format: &str) -> String {
    let mut label = String::new();
    if write!(label, "{}", month.format(label_format)).is_err() {
        label = format!("{}-{:02}", month.year(), month.month());
    }
    label
}

/// Month bands grouped by calendar year; the final band is padded
pub fn year_bands(months: &[TimeBand], pad_days: i64) -> Vec<TimeBand> {
    let mut bands: Vec<TimeBand> = Vec::new();

    for month in months {
        match bands.last_mut() {
            Some(band) if band.start.year() == month.start.year() => band.end = month.end,
            _ => bands.push(TimeBand {
                kind: BandKind::Year,
                label: month.start.year().to_string(),
                start: month.start,
                end: month.end,
            }),
        }
    }

    if let Some(last) = bands.last_mut() {
        last.end = u64::try_from(pad_days)
            .ok()
            .and_then(|pad| last.end.checked_add_days(Days::new(pad)))
            .unwrap_or(last.end);
    }
    bands
}

/// Legend swatches left to right in configured category order
pub fn legend(config: &ScheduleConfig) -> Vec<LegendSwatch> {
    let count = config.categories.len();
    config
        .categories
        .iter()
        .enumerate()
        .map(|(slot, category)| LegendSwatch {
            category: category.id.clone(),
            name: category.name.clone(),
            color: category.color.clone(),
            slot,
            x: slot as f64 / count as f64,
            y: -config.layout.legend_offset,
        })
        .collect()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year().checked_add(1)?, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}
