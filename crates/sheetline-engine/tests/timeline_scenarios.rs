//! Pipeline scenarios from raw grid to layout

use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use sheetline_core::{BandKind, Classifier, RawGrid, ScheduleConfig, ScheduleEntry};
use sheetline_engine::{classify_entries, compute_layout, Pipeline, RuleClassifier};
use sheetline_ingest::{IngestWarning, ReadOptions, SourceFormat};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(ScheduleConfig::default()).unwrap()
}

#[test]
fn placeholder_dates_never_reach_the_layout() {
    let grid = RawGrid::from_text_rows(vec![
        vec!["Fit-out programme", "", "", ""],
        vec!["", "", "", ""],
        vec!["WBS", "Task", "Start", "End"],
        vec!["1", "Kickoff", "1899-12-30", "1899-12-30"],
        vec!["2", "Design", "2025-01-01", "2025-01-15"],
    ]);
    let outcome = pipeline().run_grid(&grid).unwrap();

    assert_eq!(outcome.ingestion.header_row, 2);
    assert_eq!(outcome.layout.rows.len(), 1);

    let row = &outcome.layout.rows[0];
    assert_eq!(row.entry.label, "2. Design");
    assert_eq!(row.entry.category.as_deref(), Some("design"));
    assert_eq!(outcome.layout.milestone.as_ref().map(|m| m.date), Some(date(2025, 1, 15)));
}

#[test]
fn equal_starts_keep_source_order_within_a_track() {
    let grid = RawGrid::from_text_rows(vec![
        vec!["Task", "Start", "End"],
        vec!["Order cables", "2025-03-01", "2025-03-20"],
        vec!["Order switchgear", "2025-03-01", "2025-03-10"],
        vec!["Order generator", "2025-02-15", "2025-04-01"],
        vec!["Order lifts", "2025-03-01", "2025-03-05"],
    ]);
    let outcome = pipeline().run_grid(&grid).unwrap();

    let order: Vec<&str> = outcome
        .layout
        .rows
        .iter()
        .map(|r| r.entry.task.as_str())
        .collect();
    assert_eq!(
        order,
        vec!["Order generator", "Order cables", "Order switchgear", "Order lifts"]
    );
    assert!(outcome
        .layout
        .rows
        .iter()
        .all(|r| r.entry.category.as_deref() == Some("procurement")));
}

#[test]
fn nothing_valid_gives_an_empty_layout_not_an_error() {
    let grid = RawGrid::from_text_rows(vec![
        vec!["Task", "Start", "End"],
        vec!["Kickoff", "", ""],
        vec!["Design", "1899-12-30", "1899-12-30"],
    ]);
    let outcome = pipeline().run_grid(&grid).unwrap();

    assert!(outcome.is_empty());
    assert!(outcome.layout.milestone.is_none());
    assert!(outcome.layout.bands.is_empty());
    assert!(outcome.layout.tracks.is_empty());
    assert_eq!(
        outcome.warnings(),
        vec![IngestWarning::EmptyDataset { rows_scanned: 2 }]
    );
}

#[test]
fn far_future_typo_is_dropped_not_fatal() {
    let grid = RawGrid::from_text_rows(vec![
        vec!["Task", "Start", "End"],
        vec!["Typo", "+262142-12-31", "+262142-12-31"],
        vec!["Handover", "2025-06-01", "Dec 31, +262142"],
        vec!["Commissioning", "2025-05-01", "2025-05-20"],
    ]);
    let outcome = pipeline().run_grid(&grid).unwrap();

    assert_eq!(outcome.ingestion.report.dropped.len(), 2);
    assert_eq!(outcome.layout.rows.len(), 1);
    assert_eq!(outcome.layout.date_range.map(|r| r.end), Some(date(2025, 5, 20)));
}

#[test]
fn hundred_day_project_has_five_twenty_day_phases() {
    let start = date(2025, 1, 1);
    let entries = vec![
        ScheduleEntry::new(0, "Survey", start, start + Duration::days(30)),
        ScheduleEntry::new(1, "Build", start + Duration::days(20), start + Duration::days(100)),
    ];
    let layout = compute_layout(&entries, &ScheduleConfig::default());

    let phases: Vec<_> = layout.bands_of(BandKind::Phase).collect();
    assert_eq!(phases.len(), 5);
    assert_eq!(phases[0].start, start);
    assert_eq!(phases[4].end, start + Duration::days(100));
    for band in &phases {
        assert_eq!(band.days(), 20);
    }
    for pair in phases.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    let names: Vec<&str> = phases.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(names, vec!["Initiation", "Planning", "Execution", "Monitoring", "Closure"]);
}

#[test]
fn same_input_gives_the_same_layout() {
    let csv = "\
Site handover programme,,,,
WBS,Task,Start,End,Owner
1.1,Kickoff meeting,2025-01-06,2025-01-07,PM
2.1,Structural drawings,2025-01-08,2025-02-14,Design
3.2,Order chillers,2025-02-01,2025-03-30,Procurement
4.1,Install chillers,2025-04-01,2025-05-15,Site
5.1,Commissioning,2025-05-16,2025-05-30,QA
6.1,Training,2025-06-02,2025-06-06,PM
";
    let run = || {
        pipeline()
            .run_bytes(csv.as_bytes(), SourceFormat::Csv, &ReadOptions::default())
            .unwrap()
    };
    let first = run();
    let second = run();

    assert_eq!(first, second);
    assert_eq!(first.layout.rows.len(), 6);
    assert_eq!(first.layout.tracks.len(), 6);

    let tracks: Vec<&str> = first.layout.tracks.iter().map(|t| t.category.as_str()).collect();
    assert_eq!(
        tracks,
        vec!["management", "design", "procurement", "execution", "testing", "handover"]
    );
    assert_eq!(first.layout.bands_of(BandKind::Year).count(), 1);
    assert_eq!(first.layout.bands_of(BandKind::Month).count(), 6);
}

#[test]
fn classification_is_total_over_configured_categories() {
    let config = ScheduleConfig::default();
    let classifier = RuleClassifier::from_config(&config).unwrap();
    let start = date(2025, 1, 1);

    let tasks = [
        ("", None),
        ("x", Some("")),
        ("Misc", Some("99")),
        ("Kiểm tra chất lượng", None),
        ("Procurement of valves", Some("4")),
        ("Something", Some("6.2.1")),
        ("12345", Some("abc")),
    ];
    let entries: Vec<ScheduleEntry> = tasks
        .iter()
        .enumerate()
        .map(|(i, (task, wbs))| {
            let entry = ScheduleEntry::new(i, *task, start, start + Duration::days(1));
            match wbs {
                Some(code) => entry.wbs(*code),
                None => entry,
            }
        })
        .collect();

    for entry in &entries {
        let category = classifier.classify(entry);
        assert!(config.is_known_category(&category), "{category}");
    }

    let classified = classify_entries(entries, &classifier);
    assert!(classified.iter().all(|e| e.category.is_some()));
    assert_eq!(classified[5].category.as_deref(), Some("handover"));
}
