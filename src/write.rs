//! Write chunked streams.

use std::io::prelude::*;

use byteorder::{BigEndian, WriteBytesExt};
use flate2::{write::GzEncoder, Compression};
use log::debug;

use crate::{records::Collection, GobyError, GobyResult, DEFAULT_ENTRIES_PER_CHUNK, DELIMITER};

/// Buffers records into a collection and emits it as one framed,
/// gzip-compressed chunk whenever the configured record count is reached.
///
/// Callers should finish with [`close()`](Self::close); a writer dropped
/// without it leaves the stream without its zero-length terminator, which
/// readers treat as truncation at the last complete chunk.
pub struct ChunkWriter<C: Collection, W: Write> {
    writer: W,
    collection: C,
    entries_per_chunk: usize,
    chunks_written: u64,
    closed: bool,
}

impl<C: Collection, W: Write> ChunkWriter<C, W> {
    pub fn new(writer: W) -> Self {
        Self::with_entries_per_chunk(writer, DEFAULT_ENTRIES_PER_CHUNK)
    }

    /// Like [`new()`](Self::new), but flushing a chunk after every
    /// `entries_per_chunk` records instead of the default.
    pub fn with_entries_per_chunk(writer: W, entries_per_chunk: usize) -> Self {
        Self {
            writer,
            collection: C::default(),
            entries_per_chunk: entries_per_chunk.max(1),
            chunks_written: 0,
            closed: false,
        }
    }

    /// Number of records buffered in the current collection.
    pub fn buffered_records(&self) -> usize {
        self.collection.len()
    }

    /// Number of chunks emitted so far.
    pub fn chunks_written(&self) -> u64 {
        self.chunks_written
    }

    /// Appends a blank record to the current collection and returns it for
    /// the caller to populate.
    ///
    /// If the collection is already full, it is emitted as a chunk first;
    /// the returned record always starts a collection with spare capacity.
    pub fn append_record(&mut self) -> GobyResult<&mut C::Record> {
        if self.collection.len() >= self.entries_per_chunk {
            self.flush()?;
        }
        self.collection.push(C::Record::default());
        Ok(self
            .collection
            .last_mut()
            .expect("a record was just appended"))
    }

    /// Emits the buffered collection as one chunk, even if it is under the
    /// configured threshold. Flushing an empty collection is a no-op.
    ///
    /// The payload is fully serialized and compressed before any byte goes
    /// out, so a chunk is either emitted whole or not at all.
    pub fn flush(&mut self) -> GobyResult<()> {
        if self.collection.is_empty() {
            return Ok(());
        }

        let collection = std::mem::take(&mut self.collection);
        let record_count = collection.len();

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&collection.encode_to_vec())?;
        let payload = encoder.finish()?;

        if payload.len() > i32::MAX as usize {
            return Err(GobyError::ChunkTooLarge {
                length: payload.len(),
            });
        }

        self.writer.write_all(&DELIMITER)?;
        self.writer.write_i32::<BigEndian>(payload.len() as i32)?;
        self.writer.write_all(&payload)?;

        debug!(
            "emitted chunk #{} with {record_count} records ({} compressed bytes)",
            self.chunks_written,
            payload.len()
        );
        self.chunks_written += 1;
        Ok(())
    }

    /// Flushes any buffered records, writes the zero-length terminator, and
    /// flushes the underlying writer. Subsequent calls are no-ops.
    pub fn close(&mut self) -> GobyResult<()> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.writer.write_all(&DELIMITER)?;
        self.writer.write_i32::<BigEndian>(0)?;
        self.writer.flush()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        records::{ReadCollection, ReadEntry},
        CHUNK_FRAME_LENGTH,
    };

    fn writer(entries_per_chunk: usize) -> ChunkWriter<ReadCollection, Vec<u8>> {
        ChunkWriter::with_entries_per_chunk(Vec::new(), entries_per_chunk)
    }

    fn blank_entry(w: &mut ChunkWriter<ReadCollection, Vec<u8>>) {
        let record: &mut ReadEntry = w.append_record().unwrap();
        record.read_index = 0;
    }

    #[test]
    fn append_flushes_at_the_threshold() {
        let mut w = writer(2);
        blank_entry(&mut w);
        blank_entry(&mut w);
        assert_eq!(w.chunks_written(), 0);

        // the third record forces the first two out as a chunk
        blank_entry(&mut w);
        assert_eq!(w.chunks_written(), 1);
        assert_eq!(w.buffered_records(), 1);
    }

    #[test]
    fn flush_of_empty_collection_emits_nothing() {
        let mut w = writer(2);
        w.flush().unwrap();
        assert_eq!(w.chunks_written(), 0);
        assert!(w.writer.is_empty());
    }

    #[test]
    fn close_writes_only_the_terminator_for_an_empty_stream() {
        let mut w = writer(2);
        w.close().unwrap();
        assert_eq!(w.writer.len(), CHUNK_FRAME_LENGTH);
        assert_eq!(&w.writer[..8], &DELIMITER);
        assert_eq!(&w.writer[8..], &[0, 0, 0, 0]);
    }

    #[test]
    fn close_is_idempotent() {
        let mut w = writer(2);
        w.close().unwrap();
        w.close().unwrap();
        assert_eq!(w.writer.len(), CHUNK_FRAME_LENGTH);
    }
}
