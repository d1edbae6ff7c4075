//! Read chunked streams: scan the chunk index, then iterate collections or
//! individual records.
//!
//! Chunks are only decompressed when the iterator reaches them, so opening a
//! multi-gigabyte stream costs one pass over the 12-byte frames.

use std::{
    fs::File,
    io::{self, prelude::*, BufReader, SeekFrom},
    marker::PhantomData,
    path::{Path, PathBuf},
};

use byteorder::{BigEndian, ReadBytesExt};
use flate2::read::GzDecoder;
use log::{debug, warn};

use crate::{records::Collection, GobyError, GobyResult, CHUNK_FRAME_LENGTH, DELIMITER};

/// Index entry for one compressed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageChunk {
    /// Byte offset where the compressed payload begins.
    pub position: u64,
    /// Compressed payload length in bytes.
    pub length: usize,
}

/// Walks the stream from its current position, recording the offset and
/// length of every chunk until the zero-length terminator or end of file.
///
/// The index may include a final chunk whose payload runs past the end of a
/// truncated file; dereferencing it reports the truncation.
pub(crate) fn scan_chunks<R: Read + Seek>(stream: &mut R) -> GobyResult<Vec<MessageChunk>> {
    let mut chunks = Vec::new();
    let mut frame = [0u8; CHUNK_FRAME_LENGTH];

    loop {
        let filled = fill_frame(stream, &mut frame)?;
        if filled < frame.len() {
            // A well-formed stream always ends with a zero-length frame; an
            // empty scan may just have started at the end of the file.
            if filled > 0 || !chunks.is_empty() {
                warn!("chunk stream ended without a terminator; treating as truncated");
            }
            break;
        }

        // The delimiter bytes are skipped unconditionally; only the length
        // is interpreted.
        let mut length_bytes = &frame[DELIMITER.len()..];
        let length = length_bytes.read_i32::<BigEndian>()?;
        if length == 0 {
            break;
        }
        let position = stream.stream_position()?;
        if length < 0 {
            return Err(GobyError::NegativeChunkLength {
                offset: position,
                length,
            });
        }

        debug!(
            "chunk #{} at offset {position} spans {length} compressed bytes",
            chunks.len()
        );
        chunks.push(MessageChunk {
            position,
            length: length as usize,
        });
        stream.seek(SeekFrom::Current(length as i64))?;
    }

    Ok(chunks)
}

/// Reads a frame, returning how many bytes were available before the
/// stream ended.
fn fill_frame<R: Read>(stream: &mut R, frame: &mut [u8; CHUNK_FRAME_LENGTH]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < frame.len() {
        let n = stream.read(&mut frame[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Lazy forward iterator over the collections of a chunked stream.
///
/// Construction scans the file once to build the chunk index; each call to
/// [`next`](Iterator::next) then seeks to one chunk, decompresses it, and
/// parses it into an owned collection. Nothing is cached across advances.
pub struct ChunkIterator<C: Collection> {
    path: PathBuf,
    stream: BufReader<File>,
    chunks: Vec<MessageChunk>,
    cursor: usize,
    _collection: PhantomData<C>,
}

impl<C: Collection> ChunkIterator<C> {
    /// Opens `path` and indexes its chunks from the start of the file.
    pub fn open<P: AsRef<Path>>(path: P) -> GobyResult<Self> {
        Self::open_at(path, SeekFrom::Start(0))
    }

    /// Opens `path` and resumes indexing from `position`.
    ///
    /// The position must land on a chunk boundary (for example one recorded
    /// by [`MessageChunk::position`] minus its frame, or `SeekFrom::End(0)`
    /// for an exhausted iterator); mid-chunk positions are not supported.
    pub fn open_at<P: AsRef<Path>>(path: P, position: SeekFrom) -> GobyResult<Self> {
        let path = path.as_ref().to_owned();
        let mut stream = BufReader::new(File::open(&path)?);
        stream.seek(position)?;
        let chunks = scan_chunks(&mut stream)?;

        Ok(Self {
            path,
            stream,
            chunks,
            cursor: 0,
            _collection: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The indexed chunks, in file order.
    pub fn chunks(&self) -> &[MessageChunk] {
        &self.chunks
    }

    /// Index of the chunk the next [`next`](Iterator::next) call will parse.
    pub fn chunk_cursor(&self) -> usize {
        self.cursor
    }

    fn read_chunk(&mut self, chunk: MessageChunk) -> GobyResult<C> {
        self.stream.seek(SeekFrom::Start(chunk.position))?;

        let mut compressed = vec![0u8; chunk.length];
        self.stream
            .read_exact(&mut compressed)
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => GobyError::TruncatedChunk {
                    offset: chunk.position,
                },
                _ => GobyError::Io(e),
            })?;

        // The decompressor hands data back in arbitrary-sized pieces;
        // read_to_end assembles them before the collection is parsed.
        let mut serialized = Vec::new();
        GzDecoder::new(&compressed[..])
            .read_to_end(&mut serialized)
            .map_err(|source| GobyError::BadCompression {
                offset: chunk.position,
                source,
            })?;

        C::decode(&serialized[..]).map_err(|source| GobyError::BadCollection {
            offset: chunk.position,
            source,
        })
    }
}

impl<C: Collection> Iterator for ChunkIterator<C> {
    type Item = GobyResult<C>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = *self.chunks.get(self.cursor)?;
        self.cursor += 1;
        Some(self.read_chunk(chunk))
    }
}

/// Flattens a chunked stream into a sequence of individual records.
///
/// Records are yielded owned; advancing never invalidates a previously
/// returned record. An error stops iteration at the failing chunk, but the
/// records of chunks already decoded remain valid.
pub struct EntryIterator<C: Collection> {
    chunks: ChunkIterator<C>,
    records: std::vec::IntoIter<C::Record>,
    record_index: usize,
}

impl<C: Collection> EntryIterator<C> {
    pub fn open<P: AsRef<Path>>(path: P) -> GobyResult<Self> {
        Ok(Self::from_chunks(ChunkIterator::open(path)?))
    }

    pub fn open_at<P: AsRef<Path>>(path: P, position: SeekFrom) -> GobyResult<Self> {
        Ok(Self::from_chunks(ChunkIterator::open_at(path, position)?))
    }

    pub fn from_chunks(chunks: ChunkIterator<C>) -> Self {
        Self {
            chunks,
            records: Vec::new().into_iter(),
            record_index: 0,
        }
    }

    pub fn path(&self) -> &Path {
        self.chunks.path()
    }

    /// Index of the current record within its chunk.
    pub fn record_index(&self) -> usize {
        self.record_index
    }

    /// Index of the chunk the records are currently drawn from.
    pub fn chunk_cursor(&self) -> usize {
        self.chunks.chunk_cursor()
    }
}

impl<C: Collection> Iterator for EntryIterator<C> {
    type Item = GobyResult<C::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.records.next() {
                self.record_index += 1;
                return Some(Ok(record));
            }

            match self.chunks.next() {
                Some(Ok(collection)) => {
                    self.records = collection.into_records().into_iter();
                    self.record_index = 0;
                }
                Some(Err(e)) => return Some(Err(e)),
                None => return None,
            }
        }
    }
}
