//! Simple logger for the scheduler core
//!
//! Records are formatted as `[LEVEL] message` without allocating, then kept in
//! a bounded in-memory ring that the platform binding and the tests read back
//! through [`snapshot`].

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use log::{Level, LevelFilter, Metadata, Record};
use spin::Mutex;

/// Number of formatted lines kept before the oldest are dropped
pub const LOG_RING_CAPACITY: usize = 512;

/// Longest formatted line, longer records are cut
const LINE_MAX: usize = 256;

/// Simple logger that writes to the log ring
struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_str = match record.level() {
            Level::Error => "ERROR",
            Level::Warn  => "WARN ",
            Level::Info  => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };

        use core::fmt::Write;
        let mut buf = [0u8; LINE_MAX];
        let pos = {
            let mut writer = BufferWriter { buffer: &mut buf, pos: 0 };
            let _ = core::write!(&mut writer, "[{}] {}", level_str, record.args());
            writer.pos
        };

        LOG_RING.lock().push(String::from_utf8_lossy(&buf[..pos]).into_owned());
    }

    fn flush(&self) {}
}

/// Simple buffer writer for formatting without alloc
pub struct BufferWriter<'a> {
    pub buffer: &'a mut [u8],
    pub pos: usize,
}

impl<'a> core::fmt::Write for BufferWriter<'a> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let remaining = self.buffer.len() - self.pos;
        let to_write = bytes.len().min(remaining);

        if to_write > 0 {
            self.buffer[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
        }

        Ok(())
    }
}

/// Bounded FIFO of formatted log lines
pub struct LogRing {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogRing {
    pub const fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

/// Global logger instance
static LOGGER: SimpleLogger = SimpleLogger;

/// Captured lines
static LOG_RING: Mutex<LogRing> = Mutex::new(LogRing::new(LOG_RING_CAPACITY));

/// Initialize the logger at INFO
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Initialize with specific log level
///
/// Installing twice is harmless: the first logger stays, only the level moves.
pub fn init_with_level(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Copy of the captured lines, ring left untouched
pub fn snapshot() -> Vec<String> {
    LOG_RING.lock().lines.iter().cloned().collect()
}

/// Log at DEBUG level
#[inline]
pub fn debug(msg: &str) {
    log::debug!("{}", msg);
}

/// Log at INFO level
#[inline]
pub fn info(msg: &str) {
    log::info!("{}", msg);
}

/// Log at WARN level
#[inline]
pub fn warn(msg: &str) {
    log::warn!("{}", msg);
}

/// Log at ERROR level
#[inline]
pub fn error(msg: &str) {
    log::error!("{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_buffer_writer_truncates() {
        use core::fmt::Write;
        let mut buf = [0u8; 4];
        let mut writer = BufferWriter { buffer: &mut buf, pos: 0 };
        let _ = writer.write_str("abcdef");
        assert_eq!(writer.pos, 4);
        assert_eq!(&buf, b"abcd");
    }

    #[test]
    fn test_ring_drops_oldest() {
        let mut ring = LogRing::new(2);
        ring.push("a".to_string());
        ring.push("b".to_string());
        ring.push("c".to_string());
        assert_eq!(ring.lines.iter().cloned().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn test_records_are_captured() {
        init();
        warn("logger-capture-check");
        assert!(snapshot().iter().any(|l| l == "[WARN ] logger-capture-check"));
    }
}
