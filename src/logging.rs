//! Logger setup shared by the server and the CLI
//!
//! Everything logs through the `log` facade. Request lines use the
//! [`REQUEST_TARGET`] target so they can be filtered separately, e.g.
//! `RUST_LOG=info,requests=off`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use env_logger::{Env, Target};

/// Log target for per-request access lines
pub const REQUEST_TARGET: &str = "requests";

/// Writes every line to stderr and to a log file
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Install the global logger.
///
/// `default_filter` applies when `RUST_LOG` is unset. With `log_file`, lines
/// are appended to that file as well. Calling this twice keeps the first logger.
pub fn init(default_filter: &str, log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(Tee { file })));
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tee_writes_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let file = OpenOptions::new().create(true).append(true).open(&path).unwrap();

        let mut tee = Tee { file };
        tee.write_all(b"hello\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_init_creates_log_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("app.log");
        init("info", Some(&path)).unwrap();
        assert!(path.exists());
    }
}
