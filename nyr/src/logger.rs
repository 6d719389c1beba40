//! Minimal [`log`] backend writing to stderr.

use console::style;
use log::{Level, LevelFilter, Log, Metadata, Record};

pub struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let level = match record.level() {
                Level::Error => style("ERROR").red(),
                Level::Warn => style("WARN").yellow(),
                Level::Info => style("INFO").green(),
                Level::Debug => style("DEBUG").blue(),
                Level::Trace => style("TRACE").dim(),
            };
            eprintln!(
                "[{level}][{target}] {message}",
                level = level,
                target = record.target(),
                message = record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Maps the number of `-v` flags to a level. Warnings are always shown.
pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    static LOGGER: StderrLogger = StderrLogger;
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}
