//! `log` backend for the debug UART

use alloc::boxed::Box;
use alloc::format;

/// Where formatted log lines go.
pub trait LogSink: Send + Sync {
    fn write_str(&self, s: &str);
}

/// Writes `[LEVEL target] message` lines to a sink.
pub struct DebugLogger<S> {
    sink: S,
    level: log::LevelFilter,
}

impl<S: LogSink> DebugLogger<S> {
    pub fn new(sink: S, level: log::LevelFilter) -> Self {
        Self { sink, level }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: LogSink> log::Log for DebugLogger<S> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            // one write per record so lines from both cores don't interleave
            self.sink
                .write_str(&format!("[{} {}] {}\r\n", record.level(), record.target(), record.args()));
        }
    }

    fn flush(&self) {}
}

/// Install the logger (call once at boot). Later calls are ignored.
pub fn init_logger<S: LogSink + 'static>(sink: S, level: log::LevelFilter) {
    let logger = Box::leak(Box::new(DebugLogger::new(sink, level)));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

/// Log sink for host builds.
#[cfg(any(test, feature = "std"))]
pub struct StderrSink;

#[cfg(any(test, feature = "std"))]
impl LogSink for StderrSink {
    fn write_str(&self, s: &str) {
        use std::io::Write;
        let _ = std::io::stderr().write_all(s.as_bytes());
    }
}
