use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn pick_source_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open Python file")
        .add_filter("Python", &["py", "pyw"])
        .add_filter("All files", &["*"])
        .pick_file()
}

pub fn pick_save_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Save corrected code")
        .add_filter("Python", &["py"])
        .set_file_name("corrected.py")
        .save_file()
}

pub fn load_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}

pub fn save_code(path: &Path, code: &str) -> Result<()> {
    let mut contents = code.to_owned();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    fs::write(path, contents).with_context(|| format!("could not write {}", path.display()))
}

/// File name for toasts, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
