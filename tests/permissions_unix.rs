#![cfg(unix)]

use safe_fileops::{FailureKind, Permission, check_permission, delete_file, set_permissions};
use std::fs;
use std::os::unix::fs::PermissionsExt;

fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[test]
fn set_then_check_owner_bits() {
    let td = tempfile::tempdir().unwrap();
    let f = td.path().join("script.sh");
    fs::write(&f, "#!/bin/sh\n").unwrap();

    set_permissions(&f, true, true, true).unwrap();
    assert_eq!(fs::metadata(&f).unwrap().permissions().mode() & 0o777, 0o700);
    assert!(check_permission(&f, Permission::Execute));

    set_permissions(&f, true, false, false).unwrap();
    assert_eq!(fs::metadata(&f).unwrap().permissions().mode() & 0o777, 0o400);
    if !running_as_root() {
        assert!(!check_permission(&f, Permission::Write));
    }
}

#[test]
fn locked_directory_denies_delete() {
    if running_as_root() {
        eprintln!("skipping: root bypasses directory permissions");
        return;
    }
    let td = tempfile::tempdir().unwrap();
    let dir = td.path().join("locked");
    fs::create_dir(&dir).unwrap();
    let f = dir.join("keep.txt");
    fs::write(&f, "x").unwrap();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o500)).unwrap();

    let err = delete_file(&f).unwrap_err();

    fs::set_permissions(&dir, fs::Permissions::from_mode(0o700)).unwrap();
    assert_eq!(err.kind(), FailureKind::PermissionDenied);
    assert!(f.exists());
}

#[test]
fn missing_path_has_no_permissions() {
    let td = tempfile::tempdir().unwrap();
    let ghost = td.path().join("ghost");
    assert!(!check_permission(&ghost, Permission::Read));
    assert_eq!(
        set_permissions(&ghost, true, true, false).unwrap_err().kind(),
        FailureKind::NotFound
    );
}
