use assert_fs::prelude::*;
use safe_fileops::{FailureKind, move_directory};
use std::fs;

#[test]
fn directory_tree_moves_intact() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("meeting");
    src.child("audio").child("part1.wav").write_binary(&[1, 2, 3]).unwrap();
    src.child("notes.md").write_str("# Notes").unwrap();
    let dest = temp.child("vault").child("meeting");

    let out = move_directory(src.path(), dest.path()).unwrap();

    assert_eq!(out, dest.path());
    assert!(!src.path().exists());
    dest.child("notes.md").assert("# Notes");
    assert_eq!(fs::read(dest.child("audio").child("part1.wav").path()).unwrap(), [1, 2, 3]);
}

#[test]
fn existing_destination_directory_receives_the_tree() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("meeting");
    src.child("notes.md").write_str("# Notes").unwrap();
    let archive = temp.child("archive");
    archive.create_dir_all().unwrap();

    let out = move_directory(src.path(), archive.path()).unwrap();

    assert_eq!(out, archive.path().join("meeting"));
    assert!(!src.path().exists());
    archive.child("meeting").child("notes.md").assert("# Notes");
}

#[test]
fn occupied_name_inside_destination_is_rejected() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("a");
    src.create_dir_all().unwrap();
    let dest = temp.child("b");
    dest.child("a").create_dir_all().unwrap();

    let err = move_directory(src.path(), dest.path()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::AlreadyExists);
    assert!(src.path().is_dir());
}

#[test]
fn file_source_is_not_a_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    let src = temp.child("file.txt");
    src.write_str("x").unwrap();

    let err = move_directory(src.path(), temp.child("dest").path()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotADirectory);
}
