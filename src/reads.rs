//! Write and read `.compact-reads` streams.

use std::{
    fs::File,
    io::{BufWriter, SeekFrom},
    path::{Path, PathBuf},
};

use crate::{
    records::{ReadCollection, ReadEntry},
    sidecar_path,
    write::ChunkWriter,
    EntryIterator, GobyResult, READS_EXTENSION,
};

/// Reads the `.compact-reads` stream of a dataset.
pub struct ReadsReader {
    path: PathBuf,
}

impl ReadsReader {
    /// Points the reader at `basename`; a full `.compact-reads` filename is
    /// accepted too.
    pub fn open<P: AsRef<Path>>(basename: P) -> Self {
        let name = basename.as_ref().as_os_str().to_string_lossy();
        let basename = PathBuf::from(crate::basename(&name));
        Self {
            path: sidecar_path(&basename, READS_EXTENSION),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterates every read entry from the start of the stream.
    pub fn entries(&self) -> GobyResult<EntryIterator<ReadCollection>> {
        EntryIterator::open(&self.path)
    }

    /// Resumes iteration from a chunk boundary recorded earlier.
    pub fn entries_at(&self, position: SeekFrom) -> GobyResult<EntryIterator<ReadCollection>> {
        EntryIterator::open_at(&self.path, position)
    }
}

/// Writes the `.compact-reads` stream of a dataset.
///
/// The pending-field setters describe the next read;
/// [`append_entry`](Self::append_entry) materializes it, assigns it the next
/// read index, and clears the pending fields. Absent fields stay absent in
/// the stream.
pub struct ReadsWriter {
    chunks: ChunkWriter<ReadCollection, BufWriter<File>>,
    next_read_index: u32,
    sequence: Option<Vec<u8>>,
    quality_scores: Option<Vec<u8>>,
    identifier: Option<String>,
    description: Option<String>,
}

impl ReadsWriter {
    /// Creates `basename.compact-reads` with the default chunk size.
    pub fn create<P: AsRef<Path>>(basename: P) -> GobyResult<Self> {
        Self::with_entries_per_chunk(basename, crate::DEFAULT_ENTRIES_PER_CHUNK)
    }

    /// Like [`create`](Self::create) with an explicit `entries_per_chunk`.
    pub fn with_entries_per_chunk<P: AsRef<Path>>(
        basename: P,
        entries_per_chunk: usize,
    ) -> GobyResult<Self> {
        let name = basename.as_ref().as_os_str().to_string_lossy();
        let basename = PathBuf::from(crate::basename(&name));
        let file = File::create(sidecar_path(&basename, READS_EXTENSION))?;
        Ok(Self {
            chunks: ChunkWriter::with_entries_per_chunk(BufWriter::new(file), entries_per_chunk),
            next_read_index: 0,
            sequence: None,
            quality_scores: None,
            identifier: None,
            description: None,
        })
    }

    pub fn set_sequence(&mut self, sequence: &[u8]) {
        self.sequence = Some(sequence.to_vec());
    }

    pub fn set_quality_scores(&mut self, quality_scores: &[u8]) {
        self.quality_scores = Some(quality_scores.to_vec());
    }

    pub fn set_identifier(&mut self, identifier: &str) {
        self.identifier = Some(identifier.to_owned());
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_owned());
    }

    /// Materializes the pending fields into a read entry and returns the
    /// index it was assigned.
    pub fn append_entry(&mut self) -> GobyResult<u32> {
        let read_index = self.next_read_index;
        self.next_read_index += 1;

        let sequence = self.sequence.take();
        let read_length = sequence.as_ref().map(Vec::len).unwrap_or(0) as u32;

        *self.chunks.append_record()? = ReadEntry {
            read_index,
            read_length,
            sequence,
            quality_scores: self.quality_scores.take(),
            read_identifier: self.identifier.take(),
            description: self.description.take(),
        };
        Ok(read_index)
    }

    /// Number of reads appended so far.
    pub fn number_of_reads(&self) -> u32 {
        self.next_read_index
    }

    /// Flushes the trailing collection and terminates the stream.
    pub fn close(&mut self) -> GobyResult<()> {
        self.chunks.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_fields_clear_between_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ReadsWriter::create(dir.path().join("sample")).unwrap();

        writer.set_sequence(b"ACGT");
        writer.set_identifier("first");
        assert_eq!(writer.append_entry().unwrap(), 0);

        writer.set_sequence(b"TT");
        assert_eq!(writer.append_entry().unwrap(), 1);
        writer.close().unwrap();

        let reader = ReadsReader::open(dir.path().join("sample"));
        let entries: Vec<_> = reader
            .entries()
            .unwrap()
            .collect::<GobyResult<Vec<_>>>()
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].read_identifier.as_deref(), Some("first"));
        assert_eq!(entries[1].read_identifier, None);
        assert_eq!(entries[1].read_length, 2);
    }

    #[test]
    fn reader_accepts_the_full_filename() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ReadsWriter::create(dir.path().join("named")).unwrap();
        writer.set_sequence(b"A");
        writer.append_entry().unwrap();
        writer.close().unwrap();

        let reader = ReadsReader::open(dir.path().join("named.compact-reads"));
        assert_eq!(reader.entries().unwrap().count(), 1);
    }
}
