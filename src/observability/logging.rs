//! Structured logging.
//!
//! # Responsibilities
//! - Create the log directory and the rolling log file
//! - Install the process-wide `tracing` subscriber (console + file)
//! - Rotate the file by size and at the UTC day boundary
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Every line carries timestamp, thread id/name and level
//! - Log level comes from config only, never from the environment

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Errors raised while bringing up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("mkdir {path} failed: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file: {0}")]
    File(#[source] io::Error),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Install console and file logging for the current process.
///
/// Must run before any service loop starts; a second call fails with
/// [`LoggingError::Install`].
pub fn init_logging(config: &LoggingConfig) -> Result<LogHandle, LoggingError> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
        path: directory.to_path_buf(),
        source,
    })?;

    let file = Arc::new(
        RollingFile::open(directory, &config.file_name, config.rotation_size_bytes)
            .map_err(LoggingError::File)?,
    );

    let filter = EnvFilter::try_new(&config.level)?;

    let console = config.console.then(|| {
        fmt::layer()
            .with_thread_ids(true)
            .with_thread_names(true)
    });

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_writer(Arc::clone(&file));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()?;

    Ok(LogHandle { file })
}

/// Handle to the installed log file, used to flush it.
#[derive(Debug, Clone)]
pub struct LogHandle {
    file: Arc<RollingFile>,
}

impl LogHandle {
    pub fn flush(&self) -> io::Result<()> {
        self.file.flush()
    }

    /// Path of the file currently being written.
    pub fn path(&self) -> PathBuf {
        self.file.active_path()
    }
}

/// Append-only log file that rolls over by size and by UTC day.
///
/// Rolled files are renamed `<stem>.<YYYY-MM-DD>.<seq>.log` next to the
/// active `<stem>.log`.
#[derive(Debug)]
pub struct RollingFile {
    directory: PathBuf,
    stem: String,
    max_bytes: u64,
    state: Mutex<RollState>,
}

#[derive(Debug)]
struct RollState {
    writer: BufWriter<File>,
    written: u64,
    day: u64,
}

impl RollingFile {
    /// Open (or continue) `<directory>/<stem>.log`.
    pub fn open(directory: &Path, stem: &str, max_bytes: u64) -> io::Result<Self> {
        let path = directory.join(format!("{stem}.log"));
        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            directory: directory.to_path_buf(),
            stem: stem.to_string(),
            max_bytes,
            state: Mutex::new(RollState {
                writer: BufWriter::new(file),
                written,
                day: unix_secs() / SECS_PER_DAY,
            }),
        })
    }

    pub fn active_path(&self) -> PathBuf {
        self.directory.join(format!("{}.log", self.stem))
    }

    pub fn flush(&self) -> io::Result<()> {
        self.state.lock().writer.flush()
    }

    fn write_on_day(&self, buf: &[u8], day: u64) -> io::Result<usize> {
        let mut state = self.state.lock();
        let incoming = buf.len() as u64;

        if state.written == 0 {
            state.day = day;
        } else if day != state.day || state.written + incoming > self.max_bytes {
            self.roll(&mut state, day)?;
        }

        state.writer.write_all(buf)?;
        state.written += incoming;
        Ok(buf.len())
    }

    fn roll(&self, state: &mut RollState, day: u64) -> io::Result<()> {
        state.writer.flush()?;

        // Named after the day the closed file was written on; never replaces
        // an earlier roll, including one left by a previous process.
        let date = utc_date(state.day);
        let rolled = (1u64..)
            .map(|seq| {
                self.directory
                    .join(format!("{}.{}.{}.log", self.stem, date, seq))
            })
            .find(|path| !path.exists())
            .ok_or_else(|| io::Error::other("no free name for rolled log"))?;
        let active = self.active_path();
        fs::rename(&active, rolled)?;

        state.writer = BufWriter::new(open_append(&active)?);
        state.written = 0;
        state.day = day;
        Ok(())
    }
}

impl Write for &RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_on_day(buf, unix_secs() / SECS_PER_DAY)
    }

    fn flush(&mut self) -> io::Result<()> {
        RollingFile::flush(self)
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// `YYYY-MM-DD` for a count of days since the Unix epoch (UTC).
fn utc_date(days: u64) -> String {
    let z = days as i64 + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    format!("{year:04}-{month:02}-{day:02}")
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tcp-demos-logging-{}-{}",
            std::process::id(),
            DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn rolled_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name() != "demo.log")
            .count()
    }

    #[test]
    fn rolls_when_size_exceeded() {
        let dir = scratch_dir();
        let file = RollingFile::open(&dir, "demo", 16).unwrap();
        let day = unix_secs() / SECS_PER_DAY;

        file.write_on_day(b"0123456789", day).unwrap();
        assert_eq!(rolled_files(&dir), 0);

        file.write_on_day(b"0123456789", day).unwrap();
        file.flush().unwrap();
        assert_eq!(rolled_files(&dir), 1);
        assert_eq!(fs::read(file.active_path()).unwrap(), b"0123456789");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rolls_at_day_boundary() {
        let dir = scratch_dir();
        let file = RollingFile::open(&dir, "demo", 1024).unwrap();
        let day = unix_secs() / SECS_PER_DAY;

        file.write_on_day(b"yesterday\n", day).unwrap();
        file.write_on_day(b"today\n", day + 1).unwrap();
        file.flush().unwrap();

        assert_eq!(rolled_files(&dir), 1);
        assert_eq!(fs::read(file.active_path()).unwrap(), b"today\n");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rolled_names_follow_closed_day_and_never_collide() {
        let dir = scratch_dir();
        let day = unix_secs() / SECS_PER_DAY;
        let closed = utc_date(day);

        let file = RollingFile::open(&dir, "demo", 1024).unwrap();
        file.write_on_day(b"first run\n", day).unwrap();
        file.write_on_day(b"next day\n", day + 1).unwrap();
        file.flush().unwrap();
        drop(file);

        // A restarted process rolling the same day again.
        let file = RollingFile::open(&dir, "demo", 1024).unwrap();
        file.write_on_day(b"second run\n", day).unwrap();
        file.write_on_day(b"later\n", day + 1).unwrap();
        file.flush().unwrap();

        assert_eq!(
            fs::read(dir.join(format!("demo.{closed}.1.log"))).unwrap(),
            b"first run\n"
        );
        assert_eq!(
            fs::read(dir.join(format!("demo.{closed}.2.log"))).unwrap(),
            b"next day\nsecond run\n"
        );
        assert_eq!(rolled_files(&dir), 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn utc_dates() {
        assert_eq!(utc_date(0), "1970-01-01");
        assert_eq!(utc_date(19_783), "2024-03-01");
        assert_eq!(utc_date(19_782), "2024-02-29");
    }

    #[test]
    fn oversized_first_write_is_kept() {
        let dir = scratch_dir();
        let file = RollingFile::open(&dir, "demo", 4).unwrap();

        (&file).write_all(b"longer than four").unwrap();
        (&file).flush().unwrap();

        assert_eq!(rolled_files(&dir), 0);
        fs::remove_dir_all(&dir).unwrap();
    }
}
