/*!
 * Tests for file and directory utilities
 */

use chrono::{Local, TimeZone};
use patent_translator::file_utils::FileManager;
use std::fs;
use std::path::PathBuf;

use crate::common::create_temp_dir;

#[test]
fn test_findFiles_shouldMatchExtensionAndSkipLockFiles() {
    let dir = create_temp_dir().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("nested")).unwrap();
    for name in ["b.docx", "a.DOCX", "~$a.docx", "notes.txt", "nested/c.docx"] {
        fs::write(root.join(name), b"x").unwrap();
    }

    let found = FileManager::find_files(root, ".docx").unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.DOCX", "b.docx", "nested/c.docx"]);
}

#[test]
fn test_generateOutputPath_shouldKeepStemAndDirectory() {
    let ts = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let path = FileManager::generate_output_path("spec.v2.docx", "out", ts);
    assert_eq!(path, PathBuf::from("out/spec.v2_translated_20250102_030405.docx"));
    assert!(!FileManager::is_translated_output("spec.v2.docx"));
}

#[test]
fn test_writeBytesAtomic_withExistingFile_shouldRespectOverwriteFlag() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("out.docx");
    fs::write(&path, b"old").unwrap();

    assert!(FileManager::write_bytes_atomic(&path, b"new", false).is_err());
    assert_eq!(fs::read(&path).unwrap(), b"old");

    FileManager::write_bytes_atomic(&path, b"new", true).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"new");
}

#[test]
fn test_writeBytesAtomic_shouldCreateParentAndLeaveNoTempFiles() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("sub").join("out.docx");

    FileManager::write_bytes_atomic(&path, b"content", false).unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"content");
    let entries: Vec<_> = fs::read_dir(dir.path().join("sub")).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
