use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::{FileRef, HashError, ScanError, Walker, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::SystemTime;
use tempfile::tempdir;

fn file_ref(path: PathBuf) -> FileRef {
    let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(100);
    FileRef::new(path, size, SystemTime::now())
}

#[test]
fn test_missing_files_become_warnings() {
    let finder = DuplicateFinder::with_defaults();
    let file1 = FileRef::new(PathBuf::from("nonexistent_1.txt"), 100, SystemTime::now());
    let file2 = FileRef::new(PathBuf::from("nonexistent_2.txt"), 100, SystemTime::now());

    let (report, summary) = finder
        .find_duplicates_from_files(vec![file1, file2])
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);
    for err in &summary.scan_errors {
        match err {
            ScanError::Hash(HashError::NotFound(_)) => {}
            other => panic!("Expected NotFound hash failure, got: {:?}", other),
        }
    }
}

#[test]
fn test_file_removed_between_walk_and_hash() {
    let dir = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, [9u8; 256]).unwrap();
            path
        })
        .collect();
    let files: Vec<FileRef> = paths.iter().cloned().map(file_ref).collect();
    fs::remove_file(&paths[1]).unwrap();

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].paths(), &[paths[0].clone(), paths[2].clone()]);
    assert_eq!(report.reclaimable_bytes, 256);
    assert_eq!(summary.hash_failures(), 1);
    assert_eq!(summary.scan_errors[0].path(), paths[1].as_path());
}

#[test]
fn test_file_grown_between_walk_and_hash() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"12345").unwrap();
    fs::write(&b, b"12345").unwrap();
    let files = vec![file_ref(a.clone()), file_ref(b.clone())];
    fs::write(&b, b"1234567890").unwrap();

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(summary.partial_buckets, 1);
    match &summary.scan_errors[..] {
        [ScanError::Hash(HashError::SizeChanged {
            path,
            expected: 5,
            actual: 10,
        })] => assert_eq!(path, &b),
        other => panic!("Expected one SizeChanged warning, got: {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();
    fs::write(&locked, b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (report, summary) = if fs::read(&locked).is_ok() {
        // Permission bits do not stop root, so make the file vanish instead.
        let files: Vec<FileRef> = Walker::new(dir.path(), WalkerConfig::default())
            .walk()
            .collect::<Result<_, _>>()
            .unwrap();
        fs::remove_file(&locked).unwrap();
        finder.find_duplicates_from_files(files).unwrap()
    } else {
        let result = finder.find_duplicates(dir.path()).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        result
    };

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.reclaimable_bytes, 4);
    assert_eq!(summary.hash_failures(), 1);
    assert!(matches!(
        summary.scan_errors[0],
        ScanError::Hash(HashError::PermissionDenied(_) | HashError::NotFound(_))
    ));
    assert!(summary.scan_errors[0].path().ends_with("locked"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("inner"), b"same").unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(summary.unreadable_entries(), 1);
    assert_eq!(summary.hash_failures(), 0);
}

#[test]
fn test_cancellation_before_hashing_yields_empty_report() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"dup").unwrap();
    fs::write(dir.path().join("b"), b"dup").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));
    let (report, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.reclaimable_bytes, 0);
    assert!(summary.interrupted);
    assert_eq!(summary.warning_count(), 0);
}
