//! Safety checks before a batch run overwrites its output file.
//!
//! The output path is the last positional argument, right after the input
//! list; a swapped pair or a database path must not get clobbered.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that an output path is safe to overwrite.
///
/// Checks:
/// - Output must have the required extension (e.g. "json")
/// - Output must not be an existing directory
/// - Output cannot be the same file as any of the provided source paths
pub fn validate_output_path(
    output: &Path,
    required_extension: &str,
    source_paths: &[&Path],
) -> Result<()> {
    let extension = output.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !extension.eq_ignore_ascii_case(required_extension) {
        bail!(
            "Safety check failed: output file '{}' must have a .{} extension",
            output.display(),
            required_extension
        );
    }

    if output.is_dir() {
        bail!("Safety check failed: output '{}' is a directory", output.display());
    }

    for source in source_paths {
        let same = output == *source
            || match (output.canonicalize(), source.canonicalize()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            };
        if same {
            bail!(
                "Safety check failed: output '{}' cannot be the same as source '{}'",
                output.display(),
                source.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_output() {
        let output = PathBuf::from("/tmp/metadata.json");
        let source = PathBuf::from("/data/urls.txt");
        assert!(validate_output_path(&output, "json", &[&source]).is_ok());
    }

    #[test]
    fn test_wrong_extension() {
        let output = PathBuf::from("/tmp/music.db");
        let result = validate_output_path(&output, "json", &[]);
        assert!(result.unwrap_err().to_string().contains("must have a .json extension"));
    }

    #[test]
    fn test_output_equals_source() {
        let path = PathBuf::from("/data/urls.json");
        let result = validate_output_path(&path, "json", &[&path]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as source"));
    }

    #[test]
    fn test_same_file_via_different_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("list.json");
        std::fs::write(&file, "[]").unwrap();
        let indirect = dir.path().join(".").join("list.json");
        assert!(validate_output_path(&indirect, "json", &[&file]).is_err());
    }
}
