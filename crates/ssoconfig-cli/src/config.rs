use anyhow::{Context, Result};
use similar::TextDiff;
use ssoconfig::Document;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";

// ============================================================================
// Path resolution
// ============================================================================

/// `--config`, else `$AWS_CONFIG_FILE`, else `~/.aws/config`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    resolve_from(
        explicit,
        std::env::var_os(CONFIG_FILE_ENV),
        dirs::home_dir(),
    )
}

fn resolve_from(
    explicit: Option<PathBuf>,
    env_value: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(value));
    }
    let home = home.context("could not determine home directory; pass --config")?;
    Ok(home.join(".aws").join("config"))
}

// ============================================================================
// Reading and writing
// ============================================================================

pub fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

/// Raw config text. A missing file reads as empty.
pub fn read_config(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} does not exist yet", path.display());
            Ok(String::new())
        }
        Err(e) => {
            Err(e).with_context(|| format!("failed to read config file: {}", path.display()))
        }
    }
}

pub fn parse_config(text: &str, path: &Path) -> Result<Document> {
    Document::parse(text)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Replace `path` with `content` via a temp file in the same directory.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .context("failed to create temp file for atomic write")?;
    io::Write::write_all(&mut tmp, content.as_bytes())
        .context("failed to write config contents")?;
    tmp.persist(path)
        .with_context(|| format!("failed to persist config file: {}", path.display()))?;
    Ok(())
}

pub fn compute_diff(old: &str, new: &str) -> Option<String> {
    let diff = TextDiff::from_lines(old, new);
    let unified = diff.unified_diff().context_radius(3).to_string();
    if unified.is_empty() {
        None
    } else {
        Some(unified)
    }
}

/// Write the change, or with `dry_run` hand back its diff for the caller to
/// print. Returns `None` when nothing changed or the file was written.
pub fn commit(path: &Path, old: &str, new: &str, dry_run: bool) -> Result<Option<String>> {
    let Some(diff) = compute_diff(old, new) else {
        tracing::info!("{} is up to date", path.display());
        return Ok(None);
    };
    if dry_run {
        return Ok(Some(diff));
    }
    write_atomic(path, new)?;
    tracing::info!("wrote {}", path.display());
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── Path resolution ──────────────────────────────────────────────────

    #[test]
    fn test_resolve_explicit_wins() {
        let path = resolve_from(
            Some(PathBuf::from("/custom/config")),
            Some(OsString::from("/env/config")),
            Some(PathBuf::from("/home/alex")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/custom/config"));
    }

    #[test]
    fn test_resolve_env_before_home() {
        let path = resolve_from(
            None,
            Some(OsString::from("/env/config")),
            Some(PathBuf::from("/home/alex")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/env/config"));
    }

    #[test]
    fn test_resolve_empty_env_ignored() {
        let path = resolve_from(
            None,
            Some(OsString::new()),
            Some(PathBuf::from("/home/alex")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/home/alex/.aws/config"));
    }

    #[test]
    fn test_resolve_without_home() {
        assert!(resolve_from(None, None, None).is_err());
    }

    // ── Files ────────────────────────────────────────────────────────────

    #[test]
    fn test_read_missing_config_is_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_config(&dir.path().join("config")).unwrap(), "");
    }

    #[test]
    fn test_write_atomic_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".aws").join("config");
        write_atomic(&path, "[profile example]\ntest = 1\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[profile example]\ntest = 1\n"
        );
    }

    #[test]
    fn test_write_atomic_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "old\n").unwrap();
        write_atomic(&path, "new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        // no temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_parse_config_error_names_file() {
        let err = parse_config("[broken\n", Path::new("/tmp/config")).unwrap_err();
        assert!(err.to_string().contains("/tmp/config"));
    }

    // ── Diffs ────────────────────────────────────────────────────────────

    #[test]
    fn test_compute_diff_identical() {
        assert!(compute_diff("a = 1\n", "a = 1\n").is_none());
    }

    #[test]
    fn test_compute_diff_changed() {
        let diff = compute_diff("[profile a]\n", "[profile b]\n").unwrap();
        assert!(diff.contains("-[profile a]"));
        assert!(diff.contains("+[profile b]"));
    }

    #[test]
    fn test_commit_dry_run_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "old\n").unwrap();
        let diff = commit(&path, "old\n", "new\n", true).unwrap().unwrap();
        assert!(diff.contains("+new"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\n");
    }

    #[test]
    fn test_commit_unchanged_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        assert!(commit(&path, "same\n", "same\n", false).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_commit_writes_without_diff() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        assert!(commit(&path, "", "new\n", false).unwrap().is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }
}
