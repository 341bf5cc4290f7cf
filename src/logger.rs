//! `log` backend that appends to a file, since the terminal belongs to the game.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

use crate::error::SolitaireError;

struct FileLogger {
    file: Mutex<File>,
    start: Instant,
    level: LevelFilter
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "[{:>10.3}] {:<5} {}: {}",
                self.start.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn init(path: &Path, level: LevelFilter) -> Result<(), SolitaireError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let logger = FileLogger { file: Mutex::new(file), start: Instant::now(), level };
    log::set_logger(Box::leak(Box::new(logger))).map_err(|e| SolitaireError::Config(e.to_string()))?;
    log::set_max_level(level);
    Ok(())
}
