use dupescan::duplicates::DuplicateFinder;
use dupescan::output::{CsvOutput, JsonOutput};
use dupescan::error::ExitCode;
use std::fs;
use tempfile::tempdir;

fn populate(root: &std::path::Path) {
    let sub = root.join("sub");
    fs::create_dir(&sub).unwrap();
    for i in 0..12 {
        let target = if i % 2 == 0 { root } else { sub.as_path() };
        fs::write(target.join(format!("file{}", i)), vec![(i % 3) as u8; 64]).unwrap();
    }
    fs::write(root.join("loner"), b"unique").unwrap();
}

#[test]
fn test_repeated_scans_produce_identical_reports() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let finder = DuplicateFinder::with_defaults();

    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_groups, 3);
    assert_eq!(first.reclaimable_bytes, 3 * 3 * 64);
}

#[test]
fn test_repeated_scans_render_identically() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let finder = DuplicateFinder::with_defaults();

    let render = || {
        let (report, summary) = finder.find_duplicates(dir.path()).unwrap();
        let json = serde_json::to_value(
            JsonOutput::new(&report, &summary, ExitCode::Success).report,
        )
        .unwrap();
        let csv = CsvOutput::new(&report).to_string().unwrap();
        (json, csv)
    };

    assert_eq!(render(), render());
}
