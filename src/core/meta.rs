//! Executable metadata used as default application name and version.

use std::{env, fs, path::Path};

use chrono::{DateTime, Local};

/// Layout of the inferred version string.
const VERSION_FORMAT: &str = "%Y%m%d-%H%M%S";

/// File name of `argv[0]`, or `""` when unavailable.
pub(crate) fn executable_name() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}

/// Modification time of `argv[0]` as `YYYYMMDD-HHMMSS` (local time), or `""`.
pub(crate) fn executable_version() -> String {
    env::args_os()
        .next()
        .and_then(|arg0| fs::metadata(arg0).ok())
        .and_then(|meta| meta.modified().ok())
        .map(|mtime| DateTime::<Local>::from(mtime).format(VERSION_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_test_binary() {
        let name = executable_name();
        assert!(name.starts_with("servisor"), "name is {name:?}");
    }

    #[test]
    fn test_version_layout() {
        let version = executable_version();
        assert_eq!(version.len(), 15, "version is {version:?}");
        for (i, c) in version.chars().enumerate() {
            if i == 8 {
                assert_eq!(c, '-');
            } else {
                assert!(c.is_ascii_digit(), "version is {version:?}");
            }
        }
    }
}
