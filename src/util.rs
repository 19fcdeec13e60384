use crate::bazel;
use crate::cmake;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Read a whole file, naming it in any error.
fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::new(e.kind(), format!("{}: {}", path.display(), e)))
}

/// Read the given cmake export file and extract its libraries.
pub fn read_libraries(path: &Path) -> Result<cmake::Libraries> {
    let data = read_file(path)?;
    let libraries = cmake::extract_libraries(&data);
    if libraries.is_empty() {
        warn!(path = %path.display(), "no libraries found");
    } else {
        debug!(path = %path.display(), libraries = libraries.len(), "extracted");
    }
    Ok(libraries)
}

/// Read the given file into a set of classification tables.
pub fn read_tables(path: &Path) -> Result<bazel::Tables> {
    let data = read_file(path)?;
    match toml::from_str(&data) {
        Ok(tables) => Ok(tables),
        Err(e) => Err(Error::new(
            ErrorKind::Other,
            format!("{}: {}", path.display(), e),
        )),
    }
}

/// Convert one cmake export file into rule text, headed by a comment naming
/// the file it came from.
pub fn convert(path: &Path, tables: &bazel::Tables) -> Result<String> {
    let libraries = read_libraries(path)?;
    let build = bazel::BuildFile::from_libraries(&libraries, tables);
    Ok(format!("# Source: {}\n{}\n", path.display(), build.emit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_convert_file() {
        let file = write_temp(
            "add_library(Foo STATIC IMPORTED)\n\
             set_target_properties(Foo PROPERTIES\n  \
             INTERFACE_LINK_LIBRARIES \"Bar;ZLIB::ZLIB\"\n)\n",
        );
        let out = convert(file.path(), &bazel::Tables::default())
            .expect("Failed to convert");
        let header = format!("# Source: {}\n", file.path().display());
        assert!(out.starts_with(&header));
        assert!(out[header.len()..].starts_with("cc_library(\n    name = \"lib_Foo\",\n"));
        assert!(out.ends_with(")\n\n\n"));
    }

    #[test]
    fn test_convert_empty_file() {
        let file = write_temp("");
        let out = convert(file.path(), &bazel::Tables::default())
            .expect("Failed to convert");
        assert_eq!(out, format!("# Source: {}\n\n", file.path().display()));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("missing.cmake");
        let err = convert(&path, &bazel::Tables::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_missing_tables_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("tables.toml");
        let err = read_tables(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with(&path.display().to_string()));
    }

    #[test]
    fn test_read_tables() {
        let file = write_temp(
            "[external_deps]\n\"zstd::libzstd_static\" = \"@com_github_facebook_zstd//:zstd\"\n",
        );
        let tables = read_tables(file.path()).expect("Failed to read tables");
        assert_eq!(
            tables.classify("zstd::libzstd_static"),
            bazel::Dependency::External("@com_github_facebook_zstd//:zstd".into())
        );
        assert!(tables.system_libraries.is_empty());
    }

    #[test]
    fn test_read_tables_invalid() {
        let file = write_temp("[system_libraries\n");
        let err = read_tables(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().starts_with(&file.path().display().to_string()));
    }
}
