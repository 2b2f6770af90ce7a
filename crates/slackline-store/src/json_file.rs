use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Read a JSON document, falling back to `default` when the file is missing or unreadable.
pub(crate) fn load_or<T: DeserializeOwned>(path: &Path, default: T) -> T {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read file, using defaults");
            return default;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not parse file, using defaults");
            default
        }
    }
}

/// Write `value` as indented JSON.
pub(crate) fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(|e| StoreError::io(path, e))
}

/// Owner-only permissions for files holding credentials. Best effort.
pub(crate) fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            tracing::warn!(path = %path.display(), error = %e, "could not restrict token file permissions");
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}
