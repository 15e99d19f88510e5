use std::path::{Path, PathBuf};

use super::ComposeError;

/// Name of the link under `<home>/workdirs` that points at the active workdir.
pub const ACTIVE_LINK: &str = "__active__";

/// Files every working directory must contain.
const REQUIRED_FILES: [&str; 2] = ["docker-compose.yml", ".env"];

/// Resolve the working directory docker-compose runs in.
///
/// An explicit path wins; otherwise the active link under `home` is followed.
/// Missing, non-directory and incomplete directories map to the fail-fast
/// [`ComposeError`] variants.
pub fn resolve(home: &Path, explicit: Option<&Path>) -> Result<PathBuf, ComposeError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => home.join("workdirs").join(ACTIVE_LINK),
    };

    if !path.exists() {
        return Err(ComposeError::DirNotExist(path));
    }
    if !path.is_dir() {
        return Err(ComposeError::DirNotValid(path));
    }

    let resolved = path.canonicalize()?;
    for name in REQUIRED_FILES {
        if !resolved.join(name).is_file() {
            return Err(ComposeError::WorkdirMalformed {
                path: resolved,
                reason: format!("missing {name}"),
            });
        }
    }

    Ok(resolved)
}
