//! The console sink shared by every demo.
//!
//! Demos never touch `stdout`/`stderr` directly; they print through an
//! injected [`Console`], which tests replace with an in-memory [`Capture`].
//! Each line is written under the writer's lock, so lines from different
//! threads may interleave but never tear.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Line-oriented output and error streams.
#[derive(Clone)]
pub struct Console {
    out: SharedWriter,
    err: SharedWriter,
}

impl Console {
    /// A console writing to the process's standard output and error.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// A console writing to arbitrary writers.
    pub fn new<O, E>(out: O, err: E) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Self {
            out: Arc::new(Mutex::new(out)),
            err: Arc::new(Mutex::new(err)),
        }
    }

    /// A console backed by memory, plus the handle used to read it back.
    #[must_use]
    pub fn capture() -> (Self, Capture) {
        let capture = Capture::default();
        let console = Self::new(
            SharedBuffer(capture.out.clone()),
            SharedBuffer(capture.err.clone()),
        );
        (console, capture)
    }

    /// Write one line to the output stream.
    pub fn println(&self, line: impl Display) {
        write_line(&self.out, &line, "stdout");
    }

    /// Write one line to the error stream.
    pub fn eprintln(&self, line: impl Display) {
        write_line(&self.err, &line, "stderr");
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

fn write_line(writer: &SharedWriter, line: &dyn Display, stream: &'static str) {
    let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(err) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
        tracing::warn!(stream, error = %err, "failed to write console line");
    }
}

/// In-memory copy of everything written to a captured [`Console`].
#[derive(Clone, Default)]
pub struct Capture {
    out: Arc<Mutex<Vec<u8>>>,
    err: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    /// Lines written to the output stream so far.
    #[must_use]
    pub fn stdout_lines(&self) -> Vec<String> {
        lines(&self.out)
    }

    /// Lines written to the error stream so far.
    #[must_use]
    pub fn stderr_lines(&self) -> Vec<String> {
        lines(&self.err)
    }
}

fn lines(buffer: &Mutex<Vec<u8>>) -> Vec<String> {
    let bytes = buffer.lock().unwrap_or_else(PoisonError::into_inner);
    String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_owned)
        .collect()
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_capture_separates_streams() {
        let (console, capture) = Console::capture();
        console.println("hello");
        console.eprintln(format_args!("oops {}", 1));
        console.println(48);

        assert_eq!(capture.stdout_lines(), vec!["hello", "48"]);
        assert_eq!(capture.stderr_lines(), vec!["oops 1"]);
    }

    #[test]
    fn test_lines_from_threads_do_not_tear() {
        let (console, capture) = Console::capture();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let console = console.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        console.println(format!("thread {t} line {i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = capture.stdout_lines();
        assert_eq!(lines.len(), 100);
        assert!(lines.iter().all(|l| l.starts_with("thread ")));
    }
}
