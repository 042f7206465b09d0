use dupescan::duplicates::DuplicateFinder;
use dupescan::scanner::{FileRef, HashError, ScanError, Walker, WalkerConfig};
use std::fs;
use tempfile::tempdir;

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, b"only one real file").unwrap();
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_symlinked_directory_is_not_entered() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("data"), b"payload").unwrap();
    std::os::unix::fs::symlink(&real, dir.path().join("alias")).unwrap();
    // A loop back to the root must not hang the walk either
    std::os::unix::fs::symlink(dir.path(), real.join("loop")).unwrap();

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_hard_links_reported_but_read_once() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original");
    fs::write(&original, vec![5u8; 1000]).unwrap();
    fs::hard_link(&original, dir.path().join("link1")).unwrap();
    fs::hard_link(&original, dir.path().join("link2")).unwrap();
    fs::write(dir.path().join("copy"), vec![5u8; 1000]).unwrap();

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].len(), 4);
    assert_eq!(report.reclaimable_bytes, 3000);
    assert_eq!(summary.hashed_files, 4);
    assert_eq!(summary.shared_digests, 2);
    assert_eq!(summary.bytes_hashed, 2000);
}

#[cfg(unix)]
#[test]
fn test_removed_hard_link_falls_back_to_surviving_alias() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    fs::write(&a, vec![7u8; 512]).unwrap();
    fs::hard_link(&a, &b).unwrap();
    fs::write(&c, vec![7u8; 512]).unwrap();

    let files: Vec<FileRef> = Walker::new(dir.path(), WalkerConfig::default())
        .walk()
        .collect::<Result<_, _>>()
        .unwrap();
    fs::remove_file(&a).unwrap();

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert_eq!(report.total_groups, 1);
    assert_eq!(report.groups[0].paths(), &[b.clone(), c.clone()]);
    assert_eq!(report.reclaimable_bytes, 512);
    assert_eq!(summary.hash_failures(), 1);
    assert!(matches!(
        &summary.scan_errors[0],
        ScanError::Hash(HashError::NotFound(path)) if *path == a
    ));
}

#[cfg(unix)]
#[test]
fn test_all_hard_link_aliases_removed() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    fs::write(&a, vec![3u8; 64]).unwrap();
    fs::hard_link(&a, dir.path().join("b")).unwrap();
    fs::write(dir.path().join("c"), vec![3u8; 64]).unwrap();

    let files: Vec<FileRef> = Walker::new(dir.path(), WalkerConfig::default())
        .walk()
        .collect::<Result<_, _>>()
        .unwrap();
    fs::remove_file(&a).unwrap();
    fs::remove_file(dir.path().join("b")).unwrap();

    let (report, summary) = DuplicateFinder::with_defaults()
        .find_duplicates_from_files(files)
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(summary.hash_failures(), 2);
}
