//! Policy file resolution with global fallback.
//!
//! The policy file is looked up in a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/cstyle.toml` or `.cstyle.toml`
//! 3. `~/.cstyle/config.toml` (global fallback)
//! 4. Nothing found; every check stays disabled until flags enable it

use std::path::{Path, PathBuf};

/// Where the policy file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via the `--config` flag.
    Explicit(PathBuf),
    /// Found next to the checked files.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.cstyle/`).
    Global(PathBuf),
    /// No policy file found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the policy came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Project-level policy file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["cstyle.toml", ".cstyle.toml"];

/// Policy file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the policy file path.
///
/// See module-level docs for the resolution order. The global directory is
/// `$CSTYLE_CONFIG_DIR` when set (tests and CI setups with no home
/// directory), `~/.cstyle/` otherwise.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let global = std::env::var_os("CSTYLE_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".cstyle")))
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME));
    lookup(project_dir, explicit, global)
}

/// Testable core: the global candidate comes in as a plain path so tests
/// never touch the environment.
fn lookup(project_dir: &Path, explicit: Option<&Path>, global: Option<PathBuf>) -> ConfigSource {
    // explicit paths are trusted as-is; a missing file errors at load time
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let project = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.exists());
    if let Some(found) = project {
        tracing::debug!("found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    match global.filter(|candidate| candidate.exists()) {
        Some(found) => {
            tracing::debug!("found global config: {}", found.display());
            ConfigSource::Global(found)
        }
        None => ConfigSource::Default,
    }
}
