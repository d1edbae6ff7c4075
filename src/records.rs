//! The protobuf messages carried by the chunked streams.
//!
//! These are hand-maintained [`prost`] messages with proto2 presence
//! semantics: required fields are plain values, optional fields are
//! `Option`, and field presence survives a round trip. The generic codec in
//! [`read`](crate::read) and [`write`](crate::write) works against the
//! [`Collection`] trait rather than any concrete message.

use prost::Message;

/// A collection message that a chunk stream can carry.
///
/// One chunk holds exactly one serialized collection; the trait gives the
/// codec a uniform way to count, append, and drain its records.
pub trait Collection: Message + Default {
    type Record: Message + Default;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a record to the collection.
    fn push(&mut self, record: Self::Record);

    fn last_mut(&mut self) -> Option<&mut Self::Record>;

    /// Consumes the collection, yielding its records in order.
    fn into_records(self) -> Vec<Self::Record>;
}

macro_rules! collection {
    ($collection:ty, $record:ty, $field:ident) => {
        impl Collection for $collection {
            type Record = $record;

            fn len(&self) -> usize {
                self.$field.len()
            }

            fn push(&mut self, record: Self::Record) {
                self.$field.push(record);
            }

            fn last_mut(&mut self) -> Option<&mut Self::Record> {
                self.$field.last_mut()
            }

            fn into_records(self) -> Vec<Self::Record> {
                self.$field
            }
        }
    };
}

collection!(ReadCollection, ReadEntry, reads);
collection!(AlignmentCollection, AlignmentEntry, alignment_entries);
collection!(TooManyHitsCollection, TooManyHit, hits);

/// An ordered, bounded batch of sequencing reads; one per chunk of a
/// `.compact-reads` stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadCollection {
    #[prost(message, repeated, tag = "1")]
    pub reads: Vec<ReadEntry>,
}

/// A single sequencing read.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadEntry {
    #[prost(uint32, required, tag = "1")]
    pub read_index: u32,
    #[prost(uint32, required, tag = "2")]
    pub read_length: u32,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub sequence: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub quality_scores: Option<Vec<u8>>,
    #[prost(string, optional, tag = "5")]
    pub read_identifier: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub description: Option<String>,
}

/// An ordered, bounded batch of alignment entries; one per chunk of an
/// `.entries` stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AlignmentCollection {
    #[prost(message, repeated, tag = "1")]
    pub alignment_entries: Vec<AlignmentEntry>,
}

/// One mapping of a read onto a target reference sequence.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AlignmentEntry {
    #[prost(uint32, required, tag = "1")]
    pub query_index: u32,
    #[prost(uint32, required, tag = "2")]
    pub target_index: u32,
    #[prost(uint32, required, tag = "3")]
    pub position: u32,
    #[prost(float, optional, tag = "4")]
    pub score: Option<f32>,
    #[prost(uint32, optional, tag = "5")]
    pub query_position: Option<u32>,
    #[prost(bool, optional, tag = "6")]
    pub matching_reverse_strand: Option<bool>,
    #[prost(uint32, optional, tag = "7")]
    pub multiplicity: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub number_of_mismatches: Option<u32>,
    #[prost(uint32, optional, tag = "9")]
    pub number_of_indels: Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub query_length: Option<u32>,
    #[prost(uint32, optional, tag = "11")]
    pub query_aligned_length: Option<u32>,
    #[prost(uint32, optional, tag = "12")]
    pub target_aligned_length: Option<u32>,
    #[prost(message, repeated, tag = "13")]
    pub sequence_variations: Vec<SequenceVariation>,
    #[prost(uint32, optional, tag = "14")]
    pub mapping_quality: Option<u32>,
    #[prost(uint32, optional, tag = "15")]
    pub fragment_index: Option<u32>,
    #[prost(uint32, optional, tag = "16")]
    pub insert_size: Option<u32>,
    #[prost(uint32, optional, tag = "17")]
    pub pair_flags: Option<u32>,
    #[prost(message, optional, tag = "18")]
    pub pair_alignment_link: Option<RelatedAlignmentEntry>,
    #[prost(uint32, optional, tag = "19")]
    pub spliced_flags: Option<u32>,
    #[prost(message, optional, tag = "20")]
    pub spliced_forward_link: Option<RelatedAlignmentEntry>,
    #[prost(message, optional, tag = "21")]
    pub spliced_backward_link: Option<RelatedAlignmentEntry>,
    #[prost(uint32, optional, tag = "22")]
    pub ambiguity: Option<u32>,
    #[prost(uint32, optional, tag = "23")]
    pub query_index_occurrences: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "24")]
    pub soft_clipped_bases_left: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "25")]
    pub soft_clipped_quality_left: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "26")]
    pub soft_clipped_bases_right: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "27")]
    pub soft_clipped_quality_right: Option<Vec<u8>>,
    #[prost(message, optional, tag = "28")]
    pub placed_unmapped: Option<PlacedUnmapped>,
}

/// A difference between the read and the reference within one entry.
///
/// `position` is the offset of the variation in the reference span of the
/// alignment, `read_index` its offset in the original (un-reversed) read;
/// both are 1-based. Runs of inserted or deleted bases share a single
/// variation whose `from`/`to` strings grow with the run.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SequenceVariation {
    #[prost(uint32, required, tag = "1")]
    pub position: u32,
    #[prost(string, required, tag = "2")]
    pub from: String,
    #[prost(string, required, tag = "3")]
    pub to: String,
    #[prost(uint32, required, tag = "4")]
    pub read_index: u32,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub to_quality: Option<Vec<u8>>,
}

/// Position of a linked entry (the pair mate, or a splice fragment).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RelatedAlignmentEntry {
    #[prost(uint32, optional, tag = "1")]
    pub target_index: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub position: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub fragment_index: Option<u32>,
}

/// Read and qualities of an entry that was placed but never mapped.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlacedUnmapped {
    #[prost(bytes = "vec", required, tag = "1")]
    pub sequence: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub quality_scores: Option<Vec<u8>>,
}

/// The `.header` sidecar written when an alignment is finalized.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AlignmentHeader {
    #[prost(string, optional, tag = "1")]
    pub aligner_name: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub aligner_version: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub sorted: Option<bool>,
    #[prost(bool, optional, tag = "4")]
    pub indexed: Option<bool>,
    #[prost(sint32, optional, tag = "5")]
    pub quality_adjustment: Option<i32>,
    #[prost(bool, optional, tag = "6")]
    pub query_index_occurrences_stored_in_entries: Option<bool>,
    #[prost(uint32, optional, tag = "7")]
    pub smallest_query_index: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub largest_query_index: Option<u32>,
    #[prost(uint32, optional, tag = "9")]
    pub number_of_aligned_reads: Option<u32>,
    #[prost(uint32, optional, tag = "10")]
    pub number_of_reads: Option<u32>,
    #[prost(message, repeated, tag = "11")]
    pub targets: Vec<TargetEntry>,
    #[prost(message, repeated, tag = "12")]
    pub query_identifiers: Vec<IdentifierEntry>,
    #[prost(message, repeated, tag = "13")]
    pub statistics: Vec<Statistic>,
}

/// One target reference sequence known to the aligner.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TargetEntry {
    #[prost(uint32, required, tag = "1")]
    pub index: u32,
    #[prost(string, required, tag = "2")]
    pub name: String,
    #[prost(uint32, required, tag = "3")]
    pub length: u32,
    /// Index the aligner itself used for this target, when it differs.
    #[prost(uint32, optional, tag = "4")]
    pub aligner_index: Option<u32>,
}

/// A registered query identifier and the index assigned to it.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IdentifierEntry {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(uint32, required, tag = "2")]
    pub index: u32,
}

/// A free-form statistic; numeric values are formatted to text on add.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Statistic {
    #[prost(string, required, tag = "1")]
    pub description: String,
    #[prost(string, required, tag = "2")]
    pub value: String,
}

/// An ordered batch of too-many-hits records; one per chunk of a `.tmh`
/// stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TooManyHitsCollection {
    #[prost(message, repeated, tag = "1")]
    pub hits: Vec<TooManyHit>,
}

/// A query whose hit count exceeded the aligner's reporting threshold.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TooManyHit {
    #[prost(uint32, required, tag = "1")]
    pub query_index: u32,
    #[prost(uint32, required, tag = "2")]
    pub aligned_length: u32,
    #[prost(uint32, required, tag = "3")]
    pub number_of_hits: u32,
}
