//! Source-path helpers
//!
//! The section-retention check and the main-source test both key off the
//! analyzed file's name, and the toolchain sometimes reports the compiled
//! file under the sibling extension (`.c` compiled as C++, or vice versa),
//! so resolution tolerates either spelling on disk.

use std::path::{Path, PathBuf};

/// File stem of the analyzed source (`src/demo.cpp` → `demo`). Sections
/// compiled from it are named `.text.<stem>...`.
#[must_use]
pub fn source_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// File name the source goes by in DWARF file tables (`src/demo.cpp` →
/// `demo.cpp`).
#[must_use]
pub fn source_file_name(path: &Path) -> String {
    path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Resolve the source path against the filesystem, falling back to the
/// sibling C/C++ extension when the named file does not exist. Never fails;
/// the original path comes back when neither candidate exists.
#[must_use]
pub fn resolve_source_candidate(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let sibling = match path.extension().and_then(|e| e.to_str()) {
        Some("c") => Some(path.with_extension("cpp")),
        Some("cpp") => Some(path.with_extension("c")),
        _ => None,
    };
    match sibling {
        Some(candidate) if candidate.exists() => candidate,
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_stem_and_file_name() {
        let path = Path::new("work/src/demo.cpp");
        assert_eq!(source_stem(path), "demo");
        assert_eq!(source_file_name(path), "demo.cpp");
    }

    #[test]
    fn test_resolve_prefers_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let c = dir.path().join("demo.c");
        fs::write(&c, "int main(){}").unwrap();
        assert_eq!(resolve_source_candidate(&c), c);
    }

    #[test]
    fn test_resolve_falls_back_to_sibling_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cpp = dir.path().join("demo.cpp");
        fs::write(&cpp, "int main(){}").unwrap();
        let asked = dir.path().join("demo.c");
        assert_eq!(resolve_source_candidate(&asked), cpp);
    }

    #[test]
    fn test_resolve_keeps_missing_path() {
        let asked = Path::new("/nonexistent/demo.c");
        assert_eq!(resolve_source_candidate(asked), asked.to_path_buf());
    }
}
