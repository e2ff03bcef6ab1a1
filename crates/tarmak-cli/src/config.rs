// ABOUTME: Configuration directory resolution for tarmak commands
// ABOUTME: Expands ~ and relative paths, and vets environment names used as path segments

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Config directory used when neither the flag nor TARMAK_CONFIG is set.
pub const DEFAULT_CONFIG_DIRECTORY: &str = "~/.tarmak";

/// Environment variable overriding the default config directory.
pub const CONFIG_DIRECTORY_ENV: &str = "TARMAK_CONFIG";

/// Resolve the config directory given on the command line to an absolute path.
pub fn resolve_config_directory(raw: &str) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    expand_config_directory(raw, dirs::home_dir().as_deref(), &cwd)
}

/// Expand `~` against `home` and make relative paths absolute against `cwd`.
pub fn expand_config_directory(raw: &str, home: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if raw.is_empty() {
        bail!("Config directory must not be empty");
    }

    let expanded = if raw == "~" {
        home.context("Could not determine home directory")?
            .to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.context("Could not determine home directory")?
            .join(rest)
    } else {
        PathBuf::from(raw)
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(cwd.join(expanded))
    }
}

/// Reject environment names that would escape their own directory.
pub fn validate_environment_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Environment name must not be empty");
    }
    if name == "." || name == ".." {
        bail!("Environment name '{}' is not allowed", name);
    }
    if name.contains(['/', '\\', '\0']) {
        bail!(
            "Environment name '{}' must not contain path separators",
            name.escape_default()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_default_directory() {
        let dir = expand_config_directory(
            DEFAULT_CONFIG_DIRECTORY,
            Some(Path::new("/home/op")),
            Path::new("/work"),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/home/op/.tarmak"));
    }

    #[test]
    fn expands_bare_tilde() {
        let dir =
            expand_config_directory("~", Some(Path::new("/home/op")), Path::new("/work")).unwrap();
        assert_eq!(dir, PathBuf::from("/home/op"));
    }

    #[test]
    fn keeps_absolute_paths() {
        let dir = expand_config_directory("/srv/tarmak", None, Path::new("/work")).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/tarmak"));
    }

    #[test]
    fn anchors_relative_paths_at_cwd() {
        let dir = expand_config_directory("state/tarmak", None, Path::new("/work")).unwrap();
        assert_eq!(dir, PathBuf::from("/work/state/tarmak"));
    }

    #[test]
    fn tilde_without_home_is_an_error() {
        let err = expand_config_directory("~/.tarmak", None, Path::new("/work")).unwrap_err();
        assert!(err.to_string().contains("home directory"));
    }

    #[test]
    fn empty_directory_is_an_error() {
        assert!(expand_config_directory("", None, Path::new("/work")).is_err());
    }

    #[test]
    fn tilde_user_form_is_left_alone() {
        let dir =
            expand_config_directory("~other/x", Some(Path::new("/home/op")), Path::new("/work"))
                .unwrap();
        assert_eq!(dir, PathBuf::from("/work/~other/x"));
    }

    #[test]
    fn resolve_returns_absolute_path() {
        let dir = resolve_config_directory("relative-dir").unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("relative-dir"));
    }

    #[test]
    fn accepts_plain_environment_names() {
        for name in ["fake", "staging", "prod-eu-west-1", "env.with.dots"] {
            validate_environment_name(name).unwrap();
        }
    }

    #[test]
    fn rejects_traversal_environment_names() {
        for name in ["", ".", "..", "../etc", "a/b", "a\\b", "nul\0byte"] {
            assert!(
                validate_environment_name(name).is_err(),
                "{name:?} should be rejected"
            );
        }
    }
}
