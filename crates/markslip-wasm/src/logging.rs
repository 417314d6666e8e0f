use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

type Sink = fn(Level, &str);

/// Send one formatted event to the matching `console` method
fn console_sink(level: Level, line: &str) {
    let line = line.into();
    match level {
        Level::ERROR => web_sys::console::error_1(&line),
        Level::WARN => web_sys::console::warn_1(&line),
        Level::INFO => web_sys::console::info_1(&line),
        _ => web_sys::console::debug_1(&line),
    }
}

/// Writes tracing events to the browser console, one call per event
#[derive(Clone, Copy)]
pub struct ConsoleMakeWriter {
    sink: Sink,
}

impl Default for ConsoleMakeWriter {
    fn default() -> Self {
        Self { sink: console_sink }
    }
}

pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
    sink: Sink,
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
            sink: self.sink,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
            sink: self.sink,
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(self.level, line);
        }
    }
}

/// Install the console subscriber; a second call is a no-op
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter::default())
        .without_time()
        .with_max_level(Level::DEBUG)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static LINES: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
    }

    fn record(level: Level, line: &str) {
        LINES.with(|lines| lines.borrow_mut().push((level, line.to_string())));
    }

    #[test]
    fn test_events_routed_by_level() {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(ConsoleMakeWriter { sink: record })
            .without_time()
            .with_max_level(Level::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(code = "NETWORK", "auto-save error: offline");
            tracing::warn!("localStorage unavailable");
            tracing::info!(count = 2, "loaded roster");
            tracing::trace!("not shown");
        });

        let lines = LINES.with(|lines| lines.borrow().clone());
        let levels: Vec<Level> = lines.iter().map(|(level, _)| *level).collect();
        assert_eq!(levels, vec![Level::ERROR, Level::WARN, Level::INFO]);
        assert!(lines[0].1.contains("auto-save error: offline"));
        assert!(lines[0].1.contains("code=\"NETWORK\""));
        assert!(lines[2].1.contains("count=2"));
        assert!(lines.iter().all(|(_, line)| !line.ends_with('\n')));
    }
}
