//! Diagnostic output sinks for the `print` oracle functions.
//!
//! Native entry points write to stdout; Rust callers and tests pass a
//! [`CaptureSink`] so observed output stays deterministic when tests run in
//! parallel.

use std::io::Write;
use std::sync::Mutex;

/// Destination for one line of oracle output.
pub trait OracleSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes each line to the process stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OracleSink for StdoutSink {
    fn emit(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if let Err(err) = writeln!(handle, "{line}").and_then(|_| handle.flush()) {
            log::warn!("[Sink] Failed to write oracle output: {}", err);
        }
    }
}

/// Collects emitted lines in memory.
#[derive(Debug, Default)]
pub struct CaptureSink {
    lines: Mutex<Vec<String>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain and return everything emitted so far.
    pub fn take(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(mut lines) => std::mem::take(&mut *lines),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl OracleSink for CaptureSink {
    fn emit(&self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_sink_drains_in_order() {
        let sink = CaptureSink::new();
        sink.emit("1");
        sink.emit("255");
        assert_eq!(sink.take(), vec!["1".to_string(), "255".to_string()]);
        assert!(sink.take().is_empty());
    }

    #[test]
    fn capture_sink_is_shareable_across_threads() {
        let sink = std::sync::Arc::new(CaptureSink::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sink = sink.clone();
                std::thread::spawn(move || sink.emit(&i.to_string()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let mut lines = sink.take();
        lines.sort();
        assert_eq!(lines, vec!["0", "1", "2", "3"]);
    }
}
