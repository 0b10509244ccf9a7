//! Local file writes

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Write through a temporary file in the same directory, then rename
///
/// Readers never observe a half-written file; an existing file is
/// replaced as a whole.
pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like [`write_atomic`], and marks the file executable on Unix
pub fn write_executable(path: &Path, content: &[u8]) -> std::io::Result<()> {
    write_atomic(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}
