//! Shared utility functions

use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};
use which::which_in;

/// Locate `name` the way a process started in `work_dir` would.
///
/// Names with a path separator (`vendor/bin/wp`) resolve against `work_dir`;
/// bare names are looked up on PATH.
pub fn find_cmd(name: &str, work_dir: &Path) -> Option<PathBuf> {
    which_in(name, env::var_os("PATH"), work_dir).ok()
}

/// Ensure the wp-cli binary can be started from the site directory
pub fn ensure_wp_cli(binary: &str, work_dir: &Path) -> Result<()> {
    if find_cmd(binary, work_dir).is_none() {
        return Err(anyhow!(
            "{} not found from {}. Install wp-cli from https://wp-cli.org/ or set [wp].binary in the config.",
            binary,
            work_dir.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_wp_cli_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_wp_cli("wp-cli-that-does-not-exist", dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("wp-cli-that-does-not-exist not found from"));
    }

    #[cfg(unix)]
    #[test]
    fn test_project_local_binary_resolves_from_site_dir() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let site = tempfile::tempdir().unwrap();
        let bin = site.path().join("vendor/bin");
        fs::create_dir_all(&bin).unwrap();
        let wp = bin.join("wp");
        fs::write(&wp, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&wp, fs::Permissions::from_mode(0o755)).unwrap();

        ensure_wp_cli("vendor/bin/wp", site.path()).unwrap();

        let elsewhere = tempfile::tempdir().unwrap();
        assert!(ensure_wp_cli("vendor/bin/wp", elsewhere.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_bare_name_uses_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_cmd("sh", dir.path()).is_some());
    }
}
