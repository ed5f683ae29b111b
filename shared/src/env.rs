use std::path::PathBuf;

use log::{debug, warn};

/// What happened to the `.env` file. Loading runs before the logger exists so
/// the file may set `RUST_LOG`; the outcome is logged afterwards.
#[derive(Debug)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing,
    Malformed(String),
}

impl EnvFile {
    pub fn log(&self) {
        match self {
            EnvFile::Loaded(path) => debug!("Loaded environment from {}", path.display()),
            EnvFile::Missing => debug!("No .env file found"),
            EnvFile::Malformed(e) => warn!("Ignoring malformed .env file: {}", e),
        }
    }
}

impl From<dotenv::Result<PathBuf>> for EnvFile {
    fn from(result: dotenv::Result<PathBuf>) -> Self {
        match result {
            Ok(path) => EnvFile::Loaded(path),
            Err(e) if e.not_found() => EnvFile::Missing,
            Err(e) => EnvFile::Malformed(e.to_string()),
        }
    }
}

/// Loads a `.env` file from the working directory (or any parent) into the
/// process environment. A missing file is not an error.
pub fn init() -> EnvFile {
    EnvFile::from(dotenv::dotenv())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let missing = Err(dotenv::Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "no .env",
        )));
        assert!(matches!(EnvFile::from(missing), EnvFile::Missing));
    }

    #[test]
    fn bad_line_is_reported() {
        let malformed = Err(dotenv::Error::LineParse("=oops".to_string(), 0));
        assert!(matches!(EnvFile::from(malformed), EnvFile::Malformed(_)));
    }

    #[test]
    fn loaded_path_is_kept() {
        let loaded = EnvFile::from(Ok(PathBuf::from("/tmp/.env")));
        assert!(matches!(loaded, EnvFile::Loaded(path) if path == PathBuf::from("/tmp/.env")));
    }
}
