use crate::config::BUFFER_SIZE;
use crate::metadata::Metadata;
use crate::record::encode_record;
use crate::sink::OutputSink;

/**
Per-worker staging area for encoded record lines.

Owned by exactly one worker at a time: a claim moves a buffer out of the
pool's free-list into the worker, release moves it back. Records are
appended whole, so a flush boundary never splits a line, and flushes go
through the sink's guard one buffer at a time.
*/
#[derive(Debug)]
pub struct RecordBuffer {
    bytes: Vec<u8>,
    line: Vec<u8>,
    capacity: usize,
}

impl RecordBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_SIZE)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            line: Vec::new(),
            capacity,
        }
    }

    /// Encodes one record and stages it, flushing the buffer through the
    /// sink first if the line would not fit.
    pub fn append_record(
        &mut self,
        sink: &OutputSink,
        path: &[u8],
        meta: &Metadata,
        parent_inode: u64,
        depth: i64,
        fcount: i64,
        dirsum: u64,
    ) {
        self.line.clear();
        encode_record(
            &mut self.line,
            path,
            meta,
            parent_inode,
            depth,
            fcount,
            dirsum,
        );
        debug_assert!(
            self.line.len() <= self.capacity,
            "record line exceeds the staging buffer"
        );
        if self.bytes.len() + self.line.len() > self.capacity {
            sink.flush(self);
        }
        self.bytes.extend_from_slice(&self.line);
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub(crate) fn staged(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl Default for RecordBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ENTRY_FCOUNT;

    fn fake_meta(size: u64) -> Metadata {
        Metadata {
            ino: 1,
            dev: 1,
            nlink: 1,
            mode: 0o100644,
            uid: 0,
            gid: 0,
            size,
            blocks: 0,
            atime: 0,
            mtime: 0,
            ctime: 0,
        }
    }

    #[test]
    fn records_accumulate_until_flushed() {
        let sink = OutputSink::discard();
        let mut buf = RecordBuffer::new();
        assert!(buf.is_empty());
        buf.append_record(&sink, b"/a/b.txt", &fake_meta(3), 9, 0, ENTRY_FCOUNT, 0);
        let one = buf.len();
        assert!(one > 0);
        buf.append_record(&sink, b"/a/c.txt", &fake_meta(3), 9, 0, ENTRY_FCOUNT, 0);
        assert_eq!(buf.len(), one * 2);
    }

    #[test]
    fn overflow_flushes_before_appending() {
        let sink = OutputSink::discard();
        // small enough to force a flush on the second record
        let mut buf = RecordBuffer::with_capacity(96);
        buf.append_record(&sink, b"/a/b.txt", &fake_meta(3), 9, 0, ENTRY_FCOUNT, 0);
        let first = buf.len();
        assert!(first <= 96);
        buf.append_record(&sink, b"/a/c.txt", &fake_meta(3), 9, 0, ENTRY_FCOUNT, 0);
        // the first record went to the sink, only the second is staged
        assert_eq!(buf.len(), first);
    }
}
