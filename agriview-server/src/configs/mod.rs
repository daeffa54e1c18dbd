mod schema;
mod settings;
mod storage;

use std::env;
use std::io;
use std::path::PathBuf;

pub use schema::SchemaManager;
pub use settings::{Advisor, Automation, Database, Gateway, GatewayAuth, Logger, Server, Settings};
pub use storage::Storage;

/// Resolves `~/` against the project root, leaves other paths untouched.
pub fn normalize_path(path: &str) -> io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    match path_buf.strip_prefix("~/") {
        Ok(relative) => Ok(project_root()?.join(relative)),
        Err(_) => Ok(path_buf),
    }
}

fn project_root() -> io::Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // development and testing environments
        Ok(PathBuf::from(manifest_dir))
    } else {
        // runtime root relative path `folder/executable` -> `folder/`
        let executable = env::current_exe()?;
        executable
            .parent()
            .map(|parent| parent.to_path_buf())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/etc/certs/farm.pem").unwrap(), PathBuf::from("/etc/certs/farm.pem"));

        let home_relative = normalize_path("~/certs/farm.pem").unwrap();
        assert!(home_relative.ends_with("certs/farm.pem"));
        assert!(!home_relative.to_string_lossy().contains('~'));
    }
}
