use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::error;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "quickswitch.log";
const ARCHIVE_PREFIX: &str = "quickswitch-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

pub const LOG_ENV: &str = "QUICKSWITCH_LOG";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

pub fn default_logs_dir() -> PathBuf {
    std::env::temp_dir().join("quickswitch").join("logs")
}

/// Routes `tracing` output to `<log_dir>/quickswitch.log`. Later calls return the
/// first log path and change nothing.
pub fn init(log_dir: &Path) -> Result<PathBuf, std::io::Error> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path, log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // another global subscriber (a test harness, an embedding app) keeps priority
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    let _ = LOG_PATH.set(log_path.clone());
    install_panic_hook();
    Ok(log_path)
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let meta = match fs::metadata(log_path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    if meta.len() < MAX_LOG_BYTES {
        return Ok(());
    }

    let archived = log_dir.join(format!("{ARCHIVE_PREFIX}{}.log", now_millis()));
    fs::rename(log_path, archived)?;
    prune_old_archives(log_dir)
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(ARCHIVE_PREFIX) && n.ends_with(".log"))
        })
        .collect::<Vec<_>>();

    archives.sort();
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in archives.into_iter().take(excess) {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            error!("panic at {location}: {payload}");
            prior(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{prune_old_archives, rotate_if_needed, LOG_FILE_NAME, MAX_ARCHIVES, MAX_LOG_BYTES};

    fn unique_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("quickswitch-logging-{name}-{nanos}"));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        dir
    }

    #[test]
    fn rotates_oversized_log() {
        let dir = unique_dir("rotate");
        let log = dir.join(LOG_FILE_NAME);
        fs::write(&log, vec![b'x'; MAX_LOG_BYTES as usize]).unwrap();

        rotate_if_needed(&log, &dir).unwrap();
        assert!(!log.exists());
        let archives = fs::read_dir(&dir).unwrap().count();
        assert_eq!(archives, 1);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn small_log_is_left_alone() {
        let dir = unique_dir("small");
        let log = dir.join(LOG_FILE_NAME);
        fs::write(&log, b"hello").unwrap();
        rotate_if_needed(&log, &dir).unwrap();
        assert!(log.exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn prunes_oldest_archives() {
        let dir = unique_dir("prune");
        for i in 0..(MAX_ARCHIVES + 2) {
            fs::write(dir.join(format!("quickswitch-{i:04}.log")), b"old").unwrap();
        }
        fs::write(dir.join("unrelated.txt"), b"keep").unwrap();

        prune_old_archives(&dir).unwrap();
        let mut left: Vec<String> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        left.sort();
        assert_eq!(left.len(), MAX_ARCHIVES + 1);
        assert_eq!(left[0], "quickswitch-0002.log");
        assert!(left.contains(&"unrelated.txt".to_string()));
        let _ = fs::remove_dir_all(dir);
    }
}
