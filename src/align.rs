//! Write and read compact alignments.
//!
//! [`AlignmentWriter`] is an incremental builder:
//! [`append_entry`](AlignmentWriter::append_entry) starts a fresh entry, the
//! setters fill it in, and the entry is committed to the chunked `.entries`
//! stream when the next one starts (or at
//! [`finished`](AlignmentWriter::finished), which also writes the `.header`,
//! `.tmh`, and `.stats` sidecars).

use std::{
    collections::HashMap,
    fs::File,
    io::{prelude::*, BufWriter},
    path::{Path, PathBuf},
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use prost::Message;

use crate::{
    records::{
        AlignmentCollection, AlignmentEntry, AlignmentHeader, IdentifierEntry, PlacedUnmapped,
        SequenceVariation, Statistic, TargetEntry, TooManyHit, TooManyHitsCollection,
    },
    sam::reverse_complement,
    sidecar_path,
    write::ChunkWriter,
    EntryIterator, GobyError, GobyResult, ENTRIES_EXTENSION, HEADER_EXTENSION, NO_QUAL,
    STATS_EXTENSION, TMH_EXTENSION,
};

/// Tallies returned by
/// [`output_sequence_variations`](AlignmentWriter::output_sequence_variations).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariationCounts {
    pub matches: u32,
    pub substitutions: u32,
    pub insertions: u32,
    pub deletions: u32,
}

/// Writes one alignment dataset: the chunked `.entries` stream plus its
/// `.header`, `.tmh`, and `.stats` sidecars.
///
/// The writer owns its output files exclusively for its lifetime. Dropping
/// it without [`finished`](Self::finished) leaves the streams without their
/// terminators; readers treat that as truncation.
pub struct AlignmentWriter {
    basename: PathBuf,
    entries: ChunkWriter<AlignmentCollection, BufWriter<File>>,
    tmh: ChunkWriter<TooManyHitsCollection, BufWriter<File>>,
    header: AlignmentHeader,

    current: Option<AlignmentEntry>,
    last_seq_var_read_index: Option<u32>,
    smallest_query_index: Option<u32>,
    largest_query_index: Option<u32>,
    number_of_aligned_reads: u32,

    quality_adjustment: i32,
    store_occurrences: bool,
    occurrences: HashMap<u32, u32>,
    target_indices: HashMap<String, u32>,
    query_indices: HashMap<String, u32>,
    next_query_index: u32,
    finished: bool,
}

impl AlignmentWriter {
    /// Creates the output files for `basename` with the default chunk size.
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

        let entries_file = File::create(sidecar_path(&basename, ENTRIES_EXTENSION))?;
        let tmh_file = File::create(sidecar_path(&basename, TMH_EXTENSION))?;

        Ok(Self {
            basename,
            entries: ChunkWriter::with_entries_per_chunk(
                BufWriter::new(entries_file),
                entries_per_chunk,
            ),
            tmh: ChunkWriter::with_entries_per_chunk(BufWriter::new(tmh_file), entries_per_chunk),
            header: AlignmentHeader::default(),
            current: None,
            last_seq_var_read_index: None,
            smallest_query_index: None,
            largest_query_index: None,
            number_of_aligned_reads: 0,
            quality_adjustment: 0,
            store_occurrences: false,
            occurrences: HashMap::new(),
            target_indices: HashMap::new(),
            query_indices: HashMap::new(),
            next_query_index: 0,
            finished: false,
        })
    }

    pub fn set_aligner_name(&mut self, name: &str) {
        self.header.aligner_name = Some(name.to_owned());
    }

    pub fn set_aligner_version(&mut self, version: &str) {
        self.header.aligner_version = Some(version.to_owned());
    }

    /// Marks the output as sorted by target position.
    pub fn set_sorted(&mut self, sorted: bool) {
        self.header.sorted = Some(sorted);
    }

    /// Marks the output as carrying a companion index.
    pub fn set_indexed(&mut self, indexed: bool) {
        self.header.indexed = Some(indexed);
    }

    pub fn quality_adjustment(&self) -> i32 {
        self.quality_adjustment
    }

    /// Offset subtracted from every quality byte as it is stored.
    pub fn set_quality_adjustment(&mut self, adjustment: i32) {
        self.quality_adjustment = adjustment;
    }

    /// When set, each committed entry carries the number of times its query
    /// index had been observed by then.
    pub fn set_query_index_occurrences_stored_in_entries(&mut self, store: bool) {
        self.store_occurrences = store;
    }

    fn adjust_quality(&self, quality: u8) -> u8 {
        (quality as i32 - self.quality_adjustment) as u8
    }

    /// Registers a target sequence in the header's target table.
    pub fn add_target(&mut self, index: u32, name: &str, length: u32) {
        self.target_indices.insert(name.to_owned(), index);
        self.header.targets.push(TargetEntry {
            index,
            name: name.to_owned(),
            length,
            aligner_index: None,
        });
    }

    /// Registers a target whose index inside the aligner differs from the
    /// index used in this output.
    pub fn add_target_with_translation(
        &mut self,
        index: u32,
        aligner_index: u32,
        name: &str,
        length: u32,
    ) {
        self.target_indices.insert(name.to_owned(), index);
        self.header.targets.push(TargetEntry {
            index,
            name: name.to_owned(),
            length,
            aligner_index: Some(aligner_index),
        });
    }

    pub fn is_target_registered(&self, name: &str) -> bool {
        self.target_indices.contains_key(name)
    }

    pub fn target_index_for_identifier(&self, name: &str) -> Option<u32> {
        self.target_indices.get(name).copied()
    }

    /// Registers a query identifier, assigning the next free index; a name
    /// registered before keeps its index.
    pub fn add_query_identifier(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.query_indices.get(name) {
            return index;
        }
        let index = self.next_query_index;
        self.add_query_identifier_with_index(name, index);
        index
    }

    /// Registers a query identifier under an index chosen by the caller.
    pub fn add_query_identifier_with_index(&mut self, name: &str, index: u32) {
        self.query_indices.insert(name.to_owned(), index);
        self.header.query_identifiers.push(IdentifierEntry {
            name: name.to_owned(),
            index,
        });
        self.next_query_index = self.next_query_index.max(index + 1);
    }

    /// Records that `query_index` was seen, for header bounds and (when
    /// enabled) per-entry occurrence counts.
    pub fn observe_query_index(&mut self, query_index: u32) {
        self.smallest_query_index = Some(match self.smallest_query_index {
            None => query_index,
            Some(smallest) => smallest.min(query_index),
        });
        self.largest_query_index = Some(match self.largest_query_index {
            None => query_index,
            Some(largest) => largest.max(query_index),
        });
        if self.store_occurrences {
            *self.occurrences.entry(query_index).or_insert(0) += 1;
        }
    }

    /// Adds a free-form statistic; insertion order is preserved in the
    /// header and the `.stats` sidecar.
    pub fn add_statistic(&mut self, description: &str, value: &str) {
        self.header.statistics.push(Statistic {
            description: description.to_owned(),
            value: value.to_owned(),
        });
    }

    pub fn add_statistic_int(&mut self, description: &str, value: i64) {
        self.add_statistic(description, &value.to_string());
    }

    pub fn add_statistic_double(&mut self, description: &str, value: f64) {
        self.add_statistic(description, &format!("{value}"));
    }

    /// Commits the entry in progress, if any, and starts a fresh one that
    /// the setters below populate.
    pub fn append_entry(&mut self) -> GobyResult<()> {
        self.commit_entry()?;
        self.current = Some(AlignmentEntry::default());
        self.last_seq_var_read_index = None;
        Ok(())
    }

    fn commit_entry(&mut self) -> GobyResult<()> {
        let Some(mut entry) = self.current.take() else {
            return Ok(());
        };
        if let (Some(aligned), Some(length)) = (entry.query_aligned_length, entry.query_length) {
            if aligned > length {
                return Err(GobyError::BadAlignedLength { aligned, length });
            }
        }
        if self.store_occurrences && entry.query_index_occurrences.is_none() {
            entry.query_index_occurrences = self.occurrences.get(&entry.query_index).copied();
        }
        *self.entries.append_record()? = entry;
        self.number_of_aligned_reads += 1;
        Ok(())
    }

    fn entry_mut(&mut self) -> GobyResult<&mut AlignmentEntry> {
        self.current.as_mut().ok_or(GobyError::NoActiveEntry)
    }

    pub fn set_query_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.query_index = value;
        self.observe_query_index(value);
        Ok(())
    }

    pub fn query_index(&self) -> GobyResult<u32> {
        self.current
            .as_ref()
            .map(|e| e.query_index)
            .ok_or(GobyError::NoActiveEntry)
    }

    pub fn set_target_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.target_index = value;
        Ok(())
    }

    pub fn set_position(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.position = value;
        Ok(())
    }

    pub fn set_matching_reverse_strand(&mut self, value: bool) -> GobyResult<()> {
        self.entry_mut()?.matching_reverse_strand = Some(value);
        Ok(())
    }

    pub fn set_multiplicity(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.multiplicity = Some(value);
        Ok(())
    }

    pub fn set_query_position(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.query_position = Some(value);
        Ok(())
    }

    pub fn set_score(&mut self, value: f32) -> GobyResult<()> {
        self.entry_mut()?.score = Some(value);
        Ok(())
    }

    pub fn set_number_of_mismatches(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.number_of_mismatches = Some(value);
        Ok(())
    }

    pub fn set_number_of_indels(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.number_of_indels = Some(value);
        Ok(())
    }

    pub fn set_query_aligned_length(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.query_aligned_length = Some(value);
        Ok(())
    }

    pub fn set_target_aligned_length(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.target_aligned_length = Some(value);
        Ok(())
    }

    pub fn set_query_length(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.query_length = Some(value);
        Ok(())
    }

    pub fn set_mapping_quality(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.mapping_quality = Some(value);
        Ok(())
    }

    pub fn set_fragment_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.fragment_index = Some(value);
        Ok(())
    }

    pub fn set_insert_size(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.insert_size = Some(value);
        Ok(())
    }

    pub fn set_ambiguity(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.ambiguity = Some(value);
        Ok(())
    }

    pub fn set_query_index_occurrences(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.query_index_occurrences = Some(value);
        Ok(())
    }

    pub fn set_pair_flags(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.pair_flags = Some(value);
        Ok(())
    }

    pub fn set_pair_target_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .pair_alignment_link
            .get_or_insert_with(Default::default)
            .target_index = Some(value);
        Ok(())
    }

    pub fn set_pair_position(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .pair_alignment_link
            .get_or_insert_with(Default::default)
            .position = Some(value);
        Ok(())
    }

    pub fn set_pair_fragment_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .pair_alignment_link
            .get_or_insert_with(Default::default)
            .fragment_index = Some(value);
        Ok(())
    }

    pub fn set_spliced_flags(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?.spliced_flags = Some(value);
        Ok(())
    }

    pub fn set_spliced_forward_target_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .spliced_forward_link
            .get_or_insert_with(Default::default)
            .target_index = Some(value);
        Ok(())
    }

    pub fn set_spliced_forward_position(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .spliced_forward_link
            .get_or_insert_with(Default::default)
            .position = Some(value);
        Ok(())
    }

    pub fn set_spliced_forward_fragment_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .spliced_forward_link
            .get_or_insert_with(Default::default)
            .fragment_index = Some(value);
        Ok(())
    }

    pub fn set_spliced_backward_target_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .spliced_backward_link
            .get_or_insert_with(Default::default)
            .target_index = Some(value);
        Ok(())
    }

    pub fn set_spliced_backward_position(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .spliced_backward_link
            .get_or_insert_with(Default::default)
            .position = Some(value);
        Ok(())
    }

    pub fn set_spliced_backward_fragment_index(&mut self, value: u32) -> GobyResult<()> {
        self.entry_mut()?
            .spliced_backward_link
            .get_or_insert_with(Default::default)
            .fragment_index = Some(value);
        Ok(())
    }

    /// Attaches the bases clipped off the left end of the read:
    /// `bases[start..start + size]` with their (adjusted) qualities.
    pub fn set_soft_clipped_left(
        &mut self,
        start: usize,
        size: usize,
        bases: &[u8],
        quality: Option<&[u8]>,
    ) -> GobyResult<()> {
        let (clipped, quals) = self.clip(start, size, bases, quality)?;
        let entry = self.entry_mut()?;
        entry.soft_clipped_bases_left = Some(clipped);
        entry.soft_clipped_quality_left = quals;
        Ok(())
    }

    /// Attaches the bases clipped off the right end of the read.
    pub fn set_soft_clipped_right(
        &mut self,
        start: usize,
        size: usize,
        bases: &[u8],
        quality: Option<&[u8]>,
    ) -> GobyResult<()> {
        let (clipped, quals) = self.clip(start, size, bases, quality)?;
        let entry = self.entry_mut()?;
        entry.soft_clipped_bases_right = Some(clipped);
        entry.soft_clipped_quality_right = quals;
        Ok(())
    }

    fn clip(
        &self,
        start: usize,
        size: usize,
        bases: &[u8],
        quality: Option<&[u8]>,
    ) -> GobyResult<(Vec<u8>, Option<Vec<u8>>)> {
        let end = start + size;
        if end > bases.len() {
            return Err(GobyError::BadSoftClip {
                start,
                end,
                len: bases.len(),
            });
        }
        let quals = match quality {
            Some(quality) => {
                if end > quality.len() {
                    return Err(GobyError::BadSoftClip {
                        start,
                        end,
                        len: quality.len(),
                    });
                }
                Some(
                    quality[start..end]
                        .iter()
                        .map(|&q| self.adjust_quality(q))
                        .collect(),
                )
            }
            None => None,
        };
        Ok((bases[start..end].to_vec(), quals))
    }

    /// Captures the full read and qualities of a placed but unmapped entry.
    /// With `translate_query` set and the read on the reverse strand, the
    /// bases are reverse-complemented and the qualities reversed.
    pub fn set_placed_unmapped(
        &mut self,
        bases: &[u8],
        quality: Option<&[u8]>,
        translate_query: bool,
        reverse_strand: bool,
    ) -> GobyResult<()> {
        let sequence = if translate_query && reverse_strand {
            reverse_complement(bases)
        } else {
            bases.to_vec()
        };
        let quality_scores = quality.map(|quality| {
            let adjusted = quality.iter().map(|&q| self.adjust_quality(q));
            if translate_query && reverse_strand {
                adjusted.rev().collect()
            } else {
                adjusted.collect()
            }
        });
        self.entry_mut()?.placed_unmapped = Some(PlacedUnmapped {
            sequence,
            quality_scores,
        });
        Ok(())
    }

    /// Records one read/reference difference on the current entry, or grows
    /// the previous variation when the new position continues an insertion
    /// or deletion run.
    ///
    /// `read_index` and `ref_position` are 1-based. Within one entry,
    /// `read_index` must never decrease. An insertion directly followed by a
    /// deletion at the same read index stays two separate variations.
    pub fn add_sequence_variation(
        &mut self,
        read_index: u32,
        ref_position: u32,
        ref_char: u8,
        read_char: u8,
        quality: Option<u8>,
    ) -> GobyResult<()> {
        if let Some(last) = self.last_seq_var_read_index {
            if read_index < last {
                return Err(GobyError::NonMonotonicReadIndex {
                    last,
                    current: read_index,
                });
            }
        }

        let adjusted = quality.map(|q| self.adjust_quality(q));
        let last_index = self.last_seq_var_read_index;
        let entry = self.current.as_mut().ok_or(GobyError::NoActiveEntry)?;

        if let (Some(last), Some(var)) = (last_index, entry.sequence_variations.last_mut()) {
            // An insertion run grows along the read.
            if ref_char == b'-' && var.from.ends_with('-') && read_index == last + 1 {
                var.from.push('-');
                var.to.push(read_char as char);
                if let Some(q) = adjusted {
                    var.to_quality.get_or_insert_with(Vec::new).push(q);
                }
                self.last_seq_var_read_index = Some(read_index);
                return Ok(());
            }
            // A deletion run grows along the reference while the read
            // cursor stands still; it may be visited in either direction.
            if read_char == b'-' && var.to.ends_with('-') && read_index == last {
                let run_start = var.position;
                let run_end = run_start + var.from.len() as u32 - 1;
                if ref_position == run_end + 1 {
                    var.from.push(ref_char as char);
                    var.to.push('-');
                    return Ok(());
                }
                if run_start > 1 && ref_position == run_start - 1 {
                    var.position = ref_position;
                    var.from.insert(0, ref_char as char);
                    var.to.push('-');
                    return Ok(());
                }
            }
        }

        entry.sequence_variations.push(SequenceVariation {
            position: ref_position,
            from: (ref_char as char).to_string(),
            to: (read_char as char).to_string(),
            read_index,
            to_quality: adjusted.map(|q| vec![q]),
        });
        self.last_seq_var_read_index = Some(read_index);
        Ok(())
    }

    /// Walks the aligned `reference`/`query`/`quality` strings over
    /// `query_start..query_end` in lock step, emits a variation wherever
    /// they disagree, and tallies matches, substitutions, insertions, and
    /// deletions.
    ///
    /// On the reverse strand the span is walked right to left, so that
    /// `read_index` values (computed against the original, un-reversed
    /// read) come out non-decreasing; the entry's query length must be set
    /// first.
    pub fn output_sequence_variations(
        &mut self,
        reference: &[u8],
        query: &[u8],
        quality: Option<&[u8]>,
        query_start: usize,
        query_end: usize,
        reverse_strand: bool,
    ) -> GobyResult<VariationCounts> {
        if reference.len() != query.len() {
            return Err(GobyError::UnevenAlignedStrings {
                reference: reference.len(),
                query: query.len(),
            });
        }
        if query_start > query_end || query_end > query.len() {
            return Err(GobyError::BadQuerySpan {
                start: query_start,
                end: query_end,
                len: query.len(),
            });
        }
        let query_length = match reverse_strand {
            true => Some(
                self.current
                    .as_ref()
                    .ok_or(GobyError::NoActiveEntry)?
                    .query_length
                    .ok_or(GobyError::MissingQueryLength)?,
            ),
            false => None,
        };

        let mut counts = VariationCounts::default();
        let mut ref_position: u32 = 0;
        let mut query_position: u32 = 0;
        // (ref position, query position, ref char, query char, quality)
        let mut differences: Vec<(u32, u32, u8, u8, Option<u8>)> = Vec::new();

        for i in query_start..query_end {
            let ref_char = reference[i].to_ascii_uppercase();
            let query_char = query[i].to_ascii_uppercase();
            if ref_char != b'-' {
                ref_position += 1;
            }
            if query_char != b'-' {
                query_position += 1;
            }
            if ref_char == query_char {
                counts.matches += 1;
                continue;
            }
            if ref_char == b'-' {
                counts.insertions += 1;
            } else if query_char == b'-' {
                counts.deletions += 1;
            } else {
                counts.substitutions += 1;
            }
            let quality_char = match query_char {
                b'-' => None,
                _ => quality
                    .and_then(|q| q.get(i))
                    .copied()
                    .filter(|&q| q != NO_QUAL),
            };
            differences.push((ref_position, query_position, ref_char, query_char, quality_char));
        }

        if reverse_strand {
            let query_length = query_length.expect("resolved above for the reverse strand");
            for (ref_pos, query_pos, ref_char, query_char, quality) in
                differences.into_iter().rev()
            {
                if query_pos > query_length {
                    return Err(GobyError::BadAlignedLength {
                        aligned: query_pos,
                        length: query_length,
                    });
                }
                let read_index = query_length - query_pos + 1;
                self.add_sequence_variation(read_index, ref_pos, ref_char, query_char, quality)?;
            }
        } else {
            for (ref_pos, query_pos, ref_char, query_char, quality) in differences {
                self.add_sequence_variation(query_pos, ref_pos, ref_char, query_char, quality)?;
            }
        }

        Ok(counts)
    }

    /// Records a query whose hit count exceeded the aligner's reporting
    /// threshold in the `.tmh` sidecar stream.
    pub fn append_too_many_hits(
        &mut self,
        query_index: u32,
        aligned_length: u32,
        number_of_hits: u32,
    ) -> GobyResult<()> {
        *self.tmh.append_record()? = TooManyHit {
            query_index,
            aligned_length,
            number_of_hits,
        };
        Ok(())
    }

    /// Commits the trailing entry, terminates the chunked streams, and
    /// writes the `.header` and (when statistics were added) `.stats`
    /// sidecars. Subsequent calls are no-ops.
    pub fn finished(&mut self, number_of_reads: u32) -> GobyResult<()> {
        if self.finished {
            return Ok(());
        }
        self.commit_entry()?;
        self.entries.close()?;
        self.tmh.close()?;

        self.header.quality_adjustment = Some(self.quality_adjustment);
        self.header.query_index_occurrences_stored_in_entries = Some(self.store_occurrences);
        self.header.smallest_query_index = self.smallest_query_index;
        self.header.largest_query_index = self.largest_query_index;
        self.header.number_of_aligned_reads = Some(self.number_of_aligned_reads);
        self.header.number_of_reads = Some(number_of_reads);

        let header_file = File::create(sidecar_path(&self.basename, HEADER_EXTENSION))?;
        let mut encoder = GzEncoder::new(BufWriter::new(header_file), Compression::default());
        encoder.write_all(&self.header.encode_to_vec())?;
        encoder.finish()?.flush()?;

        if !self.header.statistics.is_empty() {
            let stats_file = File::create(sidecar_path(&self.basename, STATS_EXTENSION))?;
            let mut stats = BufWriter::new(stats_file);
            for statistic in &self.header.statistics {
                writeln!(stats, "{}={}", statistic.description, statistic.value)?;
            }
            stats.flush()?;
        }

        self.finished = true;
        Ok(())
    }
}

/// Reads one alignment dataset: the `.header` sidecar up front, the chunked
/// streams on demand.
pub struct AlignmentReader {
    basename: PathBuf,
    header: AlignmentHeader,
}

impl AlignmentReader {
    pub fn open<P: AsRef<Path>>(basename: P) -> GobyResult<Self> {
        let name = basename.as_ref().as_os_str().to_string_lossy();
        let basename = PathBuf::from(crate::basename(&name));

        let header_file = File::open(sidecar_path(&basename, HEADER_EXTENSION))?;
        let mut serialized = Vec::new();
        GzDecoder::new(header_file)
            .read_to_end(&mut serialized)
            .map_err(|source| GobyError::BadCompression { offset: 0, source })?;
        let header = AlignmentHeader::decode(&serialized[..])
            .map_err(|source| GobyError::BadHeader { source })?;

        Ok(Self { basename, header })
    }

    pub fn header(&self) -> &AlignmentHeader {
        &self.header
    }

    /// Iterates the alignment entries of the `.entries` stream.
    pub fn entries(&self) -> GobyResult<EntryIterator<AlignmentCollection>> {
        EntryIterator::open(sidecar_path(&self.basename, ENTRIES_EXTENSION))
    }

    /// Iterates the `.tmh` sidecar records.
    pub fn too_many_hits(&self) -> GobyResult<EntryIterator<TooManyHitsCollection>> {
        EntryIterator::open(sidecar_path(&self.basename, TMH_EXTENSION))
    }
}
