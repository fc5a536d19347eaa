use std::io;

use tracing_subscriber::fmt::MakeWriter;

use crate::{RecordSink, Syslog};

/// Routes `tracing_subscriber::fmt` output into a [`RecordSink`].
///
/// Every event the `fmt` layer writes becomes one record, tagged with this
/// writer's source address (the process id by default).
///
/// ```no_run
/// use tinyflake_syslog::{LoggerConfig, Syslog, SyslogMakeWriter};
///
/// let syslog = Syslog::open(&LoggerConfig::parse(Some("app,PERROR"))).unwrap();
/// tracing_subscriber::fmt()
///     .with_ansi(false)
///     .with_writer(SyslogMakeWriter::new(syslog))
///     .init();
/// ```
#[derive(Debug)]
pub struct SyslogMakeWriter<S = Syslog> {
    sink: S,
    source: u32,
}

impl<S: RecordSink> SyslogMakeWriter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_source(sink, std::process::id())
    }

    pub fn with_source(sink: S, source: u32) -> Self {
        Self { sink, source }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<'a, S: RecordSink + 'a> MakeWriter<'a> for SyslogMakeWriter<S> {
    type Writer = RecordWriter<'a, S>;

    fn make_writer(&'a self) -> Self::Writer {
        RecordWriter {
            sink: &self.sink,
            source: self.source,
            buf: Vec::new(),
        }
    }
}

/// Buffers one event and emits it on flush or drop.
pub struct RecordWriter<'a, S: RecordSink> {
    sink: &'a S,
    source: u32,
    buf: Vec<u8>,
}

impl<S: RecordSink> RecordWriter<'_, S> {
    fn emit_buffered(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        let msg = text.trim_end_matches(['\n', '\r']);
        if !msg.is_empty() {
            self.sink.emit(self.source, msg);
        }
        self.buf.clear();
    }
}

impl<S: RecordSink> io::Write for RecordWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_buffered();
        Ok(())
    }
}

impl<S: RecordSink> Drop for RecordWriter<'_, S> {
    fn drop(&mut self) {
        self.emit_buffered();
    }
}
