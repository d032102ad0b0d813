use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::config::APP_DIR;

const LOG_FILE: &str = "qadeck.log";

/// Map `-v` / `--quiet` to a log level.
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_DIR).join(LOG_FILE))
}

/// Initialize the file logger. The window owns the terminal-less session, so
/// everything goes to a log file; failure to open it leaves logging disabled.
pub fn init(level: LevelFilter) {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(log_file) = open_log(&path) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

/// Earlier sessions stay in the file.
fn open_log(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
