use crate::buffer::RecordBuffer;
use crate::error::{Result, WalkError};
use crate::record::HEADER;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Fast frames, default frame parameters.
const COMPRESSION_LEVEL: i32 = 1;

type SinkBox = Box<dyn Write + Send>;

enum SinkWriter {
    Plain(SinkBox),
    Compressed(zstd::stream::write::Encoder<'static, SinkBox>),
}

struct SinkState {
    /// Taken out at finalization; late flushes from workers that outlive a
    /// termination timeout then become no-ops.
    writer: Option<SinkWriter>,
    /// First underlying write error. Workers keep going; the walk surfaces
    /// this once, at the end.
    first_error: Option<io::Error>,
}

/**
Process-wide serialization point for the output stream.

All payload bytes pass through the guard; when compression is on they are
fed to a streaming zstd encoder whose output lands on the underlying file.
The fixed header line is the single exception: it bypasses the encoder so
the first line of the file stays readable as plain text.
*/
pub struct OutputSink {
    state: Mutex<SinkState>,
}

impl OutputSink {
    /// Opens the sink file and, if asked, wraps it in a zstd stream.
    ///
    /// # Errors
    /// `SinkCreate` if the file cannot be created, `Compressor` if the
    /// encoder refuses the stream settings. Both are fatal to the walk.
    pub fn create(path: &Path, compress: bool) -> Result<Self> {
        let file =
            File::create(path).map_err(|err| WalkError::SinkCreate(path.to_path_buf(), err))?;
        let raw: SinkBox = Box::new(BufWriter::new(file));
        Self::from_raw(raw, compress)
    }

    fn from_raw(raw: SinkBox, compress: bool) -> Result<Self> {
        let writer = if compress {
            let encoder = zstd::stream::write::Encoder::new(raw, COMPRESSION_LEVEL)
                .map_err(WalkError::Compressor)?;
            SinkWriter::Compressed(encoder)
        } else {
            SinkWriter::Plain(raw)
        };
        Ok(Self {
            state: Mutex::new(SinkState {
                writer: Some(writer),
                first_error: None,
            }),
        })
    }

    #[cfg(test)]
    pub(crate) fn discard() -> Self {
        Self::from_raw(Box::new(io::sink()), false).expect("plain sink cannot fail")
    }

    #[cfg(test)]
    pub(crate) fn with_writer(raw: SinkBox, compress: bool) -> Result<Self> {
        Self::from_raw(raw, compress)
    }

    /// Writes the fixed header line straight to the underlying writer,
    /// before the encoder has emitted any frame bytes. Called once, before
    /// the first worker starts.
    ///
    /// # Errors
    /// `SinkWrite` on an underlying write failure; nothing useful has been
    /// produced yet, so the caller treats this as fatal.
    pub fn write_header(&self) -> Result<()> {
        let mut state = self.lock();
        let result = match state.writer.as_mut() {
            Some(SinkWriter::Plain(writer)) => writer.write_all(HEADER),
            Some(SinkWriter::Compressed(encoder)) => encoder.get_mut().write_all(HEADER),
            None => Ok(()),
        };
        result.map_err(WalkError::SinkWrite)
    }

    /// Drains a worker's staging buffer under the guard. Write failures are
    /// recorded (first one wins) and the buffer is cleared either way, so a
    /// broken sink never wedges the traversal.
    pub fn flush(&self, buf: &mut RecordBuffer) {
        if buf.is_empty() {
            return;
        }
        let mut state = self.lock();
        if let Some(writer) = state.writer.as_mut() {
            let result = match writer {
                SinkWriter::Plain(inner) => inner.write_all(buf.staged()),
                SinkWriter::Compressed(encoder) => encoder.write_all(buf.staged()),
            };
            if let Err(err) = result {
                if state.first_error.is_none() {
                    state.first_error = Some(err);
                }
            }
        }
        buf.clear();
    }

    /// Ends the compression frame (if any), flushes, and closes the sink.
    /// Returns the first recorded payload write error in preference to any
    /// finalization error.
    ///
    /// # Errors
    /// `SinkWrite` carrying whichever failure was seen first.
    pub fn finalize(&self) -> Result<()> {
        let mut state = self.lock();
        let close_result = match state.writer.take() {
            Some(SinkWriter::Plain(mut writer)) => writer.flush(),
            Some(SinkWriter::Compressed(encoder)) => {
                encoder.finish().and_then(|mut writer| writer.flush())
            }
            None => Ok(()),
        };
        if let Some(err) = state.first_error.take() {
            return Err(WalkError::SinkWrite(err));
        }
        close_result.map_err(WalkError::SinkWrite)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;
    use crate::record::ENTRY_FCOUNT;

    fn fake_meta() -> Metadata {
        Metadata {
            ino: 42,
            dev: 1,
            nlink: 1,
            mode: 0o100600,
            uid: 0,
            gid: 0,
            size: 5,
            blocks: 8,
            atime: 1,
            mtime: 2,
            ctime: 3,
        }
    }

    #[test]
    fn plain_stream_is_header_then_records() {
        let path = std::env::temp_dir().join("fsweep_sink_plain.csv");
        let sink = OutputSink::create(&path, false).unwrap();
        sink.write_header().unwrap();

        let mut buf = RecordBuffer::new();
        buf.append_record(&sink, b"/x/y.txt", &fake_meta(), 7, 0, ENTRY_FCOUNT, 0);
        sink.flush(&mut buf);
        assert!(buf.is_empty());
        sink.finalize().unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(HEADER));
        let body = std::str::from_utf8(&written[HEADER.len()..]).unwrap();
        assert!(body.starts_with("42,7,0,\"y.txt\",\"txt\","));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn compressed_stream_keeps_the_header_raw() {
        let path = std::env::temp_dir().join("fsweep_sink_zstd.csv");
        let sink = OutputSink::create(&path, true).unwrap();
        sink.write_header().unwrap();

        let mut buf = RecordBuffer::new();
        buf.append_record(&sink, b"/x/y.txt", &fake_meta(), 7, 0, ENTRY_FCOUNT, 0);
        sink.flush(&mut buf);
        sink.finalize().unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(HEADER));
        // the payload after the header is a single valid zstd frame
        let frame = &written[HEADER.len()..];
        let decoded = zstd::stream::decode_all(frame).unwrap();
        let body = std::str::from_utf8(&decoded).unwrap();
        assert!(body.starts_with("42,7,0,\"y.txt\",\"txt\","));
        assert!(body.ends_with('\n'));
        let _ = std::fs::remove_file(&path);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn first_write_error_is_recorded_and_surfaced_once() {
        let sink = OutputSink::with_writer(Box::new(FailingWriter), false).unwrap();
        let mut buf = RecordBuffer::new();
        buf.append_record(&sink, b"/x/a", &fake_meta(), 7, 0, ENTRY_FCOUNT, 0);
        sink.flush(&mut buf);
        // buffer is drained even though the write failed
        assert!(buf.is_empty());
        buf.append_record(&sink, b"/x/b", &fake_meta(), 7, 0, ENTRY_FCOUNT, 0);
        sink.flush(&mut buf);

        match sink.finalize() {
            Err(WalkError::SinkWrite(err)) => assert_eq!(err.to_string(), "disk on fire"),
            other => panic!("expected a recorded write error, got {other:?}"),
        }
    }

    #[test]
    fn flushes_after_finalize_are_noops() {
        let sink = OutputSink::discard();
        sink.finalize().unwrap();
        let mut buf = RecordBuffer::new();
        buf.append_record(&sink, b"/x/a", &fake_meta(), 7, 0, ENTRY_FCOUNT, 0);
        sink.flush(&mut buf);
        assert!(buf.is_empty());
        assert!(sink.finalize().is_ok());
    }
}
