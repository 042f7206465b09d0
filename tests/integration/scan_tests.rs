use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::WalkerConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

fn write(dir: &Path, name: &str, content: &[u8]) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.reclaimable_bytes, 0);
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.warning_count(), 0);
}

#[test]
fn test_scan_unique_sizes_are_never_hashed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"1");
    write(dir.path(), "b.txt", b"22");
    write(dir.path(), "c.txt", b"333");

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "A", &[b'x'; 100]);
    write(dir.path(), "B", &[b'x'; 100]);
    write(dir.path(), "C", &[b'y'; 100]);

    let (report, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(names(report.groups[0].paths()), vec!["A", "B"]);
    assert_eq!(report.groups[0].size(), 100);
    assert_eq!(report.reclaimable_bytes, 100);
    assert_eq!(report.redundant_files, 1);
}

#[test]
fn test_scan_two_empty_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let (report, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].size(), 0);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.reclaimable_bytes, 0);
}

#[test]
fn test_scan_exclude_empty() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let finder = DuplicateFinder::new(FinderConfig::default().with_include_empty(false));
    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(report.is_empty());
    assert_eq!(summary.excluded_empty, 2);
}

#[test]
fn test_scan_nested_directories_and_names_do_not_matter() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two");
    fs::create_dir_all(&deep).unwrap();
    write(dir.path(), "report.pdf", b"same bytes here");
    write(&deep, "copy-of-something.bin", b"same bytes here");
    write(&dir.path().join("one"), "third", b"same bytes here");

    let (report, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].len(), 3);
    assert_eq!(report.reclaimable_bytes, 2 * 15);
    assert!(report.groups[0].paths().iter().all(|p| p.is_absolute()));
}

#[test]
fn test_scan_groups_ordered_by_size() {
    let dir = tempdir().unwrap();
    write(dir.path(), "s1", b"ab");
    write(dir.path(), "s2", b"ab");
    write(dir.path(), "l1", &[7u8; 5000]);
    write(dir.path(), "l2", &[7u8; 5000]);
    write(dir.path(), "m1", &[1u8; 300]);
    write(dir.path(), "m2", &[1u8; 300]);

    let (report, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let sizes: Vec<u64> = report.groups.iter().map(|g| g.size()).collect();
    assert_eq!(sizes, vec![5000, 300, 2]);
    assert_eq!(report.reclaimable_bytes, 5000 + 300 + 2);
    assert_eq!(report.duplicate_files, 6);
}

#[test]
fn test_scan_large_files_spanning_chunks() {
    let dir = tempdir().unwrap();
    let mut content = vec![0u8; 300 * 1024];
    write(dir.path(), "big1", &content);
    write(dir.path(), "big2", &content);
    // Same size, differs only in the last byte
    *content.last_mut().unwrap() = 1;
    write(dir.path(), "big3", &content);

    let finder = DuplicateFinder::new(FinderConfig::default().with_chunk_size(4096));
    let (report, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(names(report.groups[0].paths()), vec!["big1", "big2"]);
}

#[test]
fn test_scan_single_worker_matches_many_workers() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(dir.path(), &format!("f{:02}", i), format!("{}", i % 4).as_bytes());
    }

    let one = DuplicateFinder::new(FinderConfig::default().with_workers(1))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let many = DuplicateFinder::new(FinderConfig::default().with_workers(8))
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(one, many);
    assert_eq!(one.total_groups, 4);
    assert_eq!(one.duplicate_files, 20);
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    write(dir.path(), "visible", b"dup");
    write(dir.path(), ".hidden", b"dup");

    let (report, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(report.total_groups, 1);

    let config = FinderConfig::default().with_walker_config(WalkerConfig {
        skip_hidden: true,
        ..Default::default()
    });
    let (report, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(report.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_size_filters() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1", b"ab");
    write(dir.path(), "small2", b"ab");
    write(dir.path(), "big1", &[3u8; 2048]);
    write(dir.path(), "big2", &[3u8; 2048]);

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(
        false,
        Some(1024),
        None,
    ));
    let (report, _) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].size(), 2048);
}

#[test]
fn test_scan_invalid_roots() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain");
    fs::write(&file, b"x").unwrap();
    let finder = DuplicateFinder::with_defaults();

    let missing = finder.find_duplicates(&dir.path().join("missing"));
    assert!(matches!(
        missing,
        Err(dupescan::duplicates::FinderError::RootInvalid { .. })
    ));

    let not_dir = finder.find_duplicates(&file);
    assert!(matches!(
        not_dir,
        Err(dupescan::duplicates::FinderError::RootInvalid { .. })
    ));
}
