use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Marker inserted between the input stem and the timestamp of output files
pub const TRANSLATED_SUFFIX: &str = "_translated_";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a translated document
    // @params: input_file, output_dir, timestamp
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        timestamp: DateTime<Local>,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let output_filename = format!(
            "{}{}{}.docx",
            stem,
            TRANSLATED_SUFFIX,
            timestamp.format("%Y%m%d_%H%M%S")
        );

        output_dir.as_ref().join(output_filename)
    }

    /// Whether a file name looks like one of our own outputs
    pub fn is_translated_output<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().contains(TRANSLATED_SUFFIX))
            .unwrap_or(false)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            // Word keeps "~$name.docx" lock files next to open documents
            let is_lock_file = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("~$"));

            if path.is_file() && !is_lock_file {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a whole file
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes through a temporary file in the target directory, then rename
    ///
    /// The destination is either the complete content or untouched.
    pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, content: &[u8], overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(anyhow!("Output file already exists: {:?} (use --force to overwrite)", path));
        }

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        temp.flush()?;

        if overwrite {
            temp.persist(path)
                .map_err(|e| anyhow!("Failed to move output into place at {:?}: {}", path, e.error))?;
        } else {
            temp.persist_noclobber(path)
                .map_err(|e| anyhow!("Failed to move output into place at {:?}: {}", path, e.error))?;
        }
        Ok(())
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent)?;
            }
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
