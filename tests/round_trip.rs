//! End-to-end scenarios over real files.

use anyhow::Result;
use tempfile::TempDir;

use goby::{
    records::ReadCollection, AlignmentReader, AlignmentWriter, ChunkIterator, GobyError,
    ReadsReader, ReadsWriter, SamHelper, CHUNK_FRAME_LENGTH,
};

fn file_size(path: &std::path::Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}

#[test]
fn reads_round_trip_preserves_fields_and_presence() -> Result<()> {
    let dir = TempDir::new()?;
    let basename = dir.path().join("sample");

    let mut writer = ReadsWriter::with_entries_per_chunk(&basename, 2)?;
    writer.set_sequence(b"ACGT");
    writer.set_quality_scores(b"IIII");
    writer.append_entry()?;
    writer.set_sequence(b"TTT");
    writer.append_entry()?;
    writer.set_sequence(b"NNNNN");
    writer.set_quality_scores(b"!!!!!");
    writer.append_entry()?;
    writer.close()?;

    let reader = ReadsReader::open(&basename);

    // two data chunks plus the terminator, and the frame accounting of the
    // whole file adds up
    let chunks = ChunkIterator::<ReadCollection>::open(reader.path())?;
    assert_eq!(chunks.chunks().len(), 2);
    let payload_bytes: usize = chunks.chunks().iter().map(|c| c.length).sum();
    assert_eq!(
        file_size(reader.path()),
        (payload_bytes + 3 * CHUNK_FRAME_LENGTH) as u64
    );

    let entries: Vec<_> = reader.entries()?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].read_index, 0);
    assert_eq!(entries[0].sequence.as_deref(), Some(&b"ACGT"[..]));
    assert_eq!(entries[0].quality_scores.as_deref(), Some(&b"IIII"[..]));

    assert_eq!(entries[1].read_index, 1);
    assert_eq!(entries[1].read_length, 3);
    assert_eq!(entries[1].sequence.as_deref(), Some(&b"TTT"[..]));
    assert_eq!(entries[1].quality_scores, None);

    assert_eq!(entries[2].read_index, 2);
    assert_eq!(entries[2].quality_scores.as_deref(), Some(&b"!!!!!"[..]));
    Ok(())
}

#[test]
fn sam_reconstruction_drives_variation_emission() -> Result<()> {
    let dir = TempDir::new()?;
    let mut writer = AlignmentWriter::create(dir.path().join("aligned"))?;

    let mut helper = SamHelper::new();
    helper.set_cigar("4M1I3M")?;
    helper.set_md("3C3");
    helper.set_query(b"ACGTAAGTT", Some(b"IIIIIIIII"), false);
    helper.construct_ref_and_query()?;
    assert_eq!(helper.constructed_ref(), b"ACGC-AGT");

    writer.append_entry()?;
    writer.set_query_index(0)?;
    writer.set_target_index(0)?;
    writer.set_position(100)?;
    let counts = writer.output_sequence_variations(
        helper.constructed_ref(),
        helper.constructed_query(),
        Some(helper.constructed_qual()),
        0,
        helper.constructed_ref().len(),
        false,
    )?;
    assert_eq!(counts.matches, 6);
    assert_eq!(counts.substitutions, 1);
    assert_eq!(counts.insertions, 1);
    assert_eq!(counts.deletions, 0);
    writer.set_number_of_mismatches(counts.substitutions)?;
    writer.set_number_of_indels(counts.insertions + counts.deletions)?;
    writer.finished(1)?;

    let reader = AlignmentReader::open(dir.path().join("aligned"))?;
    let entries: Vec<_> = reader.entries()?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);

    let variations = &entries[0].sequence_variations;
    assert_eq!(variations.len(), 2);
    assert_eq!(variations[0].read_index, 4);
    assert_eq!(variations[0].from, "C");
    assert_eq!(variations[0].to, "T");
    assert_eq!(variations[1].read_index, 5);
    assert_eq!(variations[1].from, "-");
    assert_eq!(variations[1].to, "A");
    Ok(())
}

#[test]
fn reverse_strand_variations_count_from_the_original_read() -> Result<()> {
    let dir = TempDir::new()?;
    let mut writer = AlignmentWriter::create(dir.path().join("reverse"))?;

    // original read ACGG, stored reverse-complemented; aligned as CCGT
    let mut helper = SamHelper::new();
    helper.set_cigar("4M")?;
    helper.set_md("2A1");
    helper.set_query(b"ACGG", None, true);
    helper.construct_ref_and_query()?;
    assert_eq!(helper.constructed_query(), b"CCGT");
    assert_eq!(helper.constructed_ref(), b"CCAT");

    writer.append_entry()?;
    writer.set_query_index(0)?;
    writer.set_target_index(0)?;
    writer.set_position(0)?;
    writer.set_query_length(4)?;
    writer.set_matching_reverse_strand(true)?;
    let counts = writer.output_sequence_variations(
        helper.constructed_ref(),
        helper.constructed_query(),
        None,
        0,
        4,
        true,
    )?;
    assert_eq!(counts.substitutions, 1);
    writer.finished(1)?;

    let reader = AlignmentReader::open(dir.path().join("reverse"))?;
    let entries: Vec<_> = reader.entries()?.collect::<Result<_, _>>()?;
    let variations = &entries[0].sequence_variations;
    assert_eq!(variations.len(), 1);
    // aligned position 3 of CCGT maps to base 2 of the original read
    assert_eq!(variations[0].read_index, 2);
    assert_eq!(variations[0].from, "A");
    assert_eq!(variations[0].to, "G");
    Ok(())
}

#[test]
fn truncated_final_chunk_reports_corruption_after_good_chunks() -> Result<()> {
    let dir = TempDir::new()?;
    let basename = dir.path().join("cut");

    let mut writer = ReadsWriter::with_entries_per_chunk(&basename, 1)?;
    for sequence in [&b"ACGTACGT"[..], &b"GGGGTTTT"[..]] {
        writer.set_sequence(sequence);
        writer.append_entry()?;
    }
    writer.close()?;

    let reader = ReadsReader::open(&basename);
    let full = file_size(reader.path());
    // drop the terminator and cut 5 bytes out of the second chunk's payload
    let file = std::fs::OpenOptions::new().write(true).open(reader.path())?;
    file.set_len(full - CHUNK_FRAME_LENGTH as u64 - 5)?;

    let mut entries = reader.entries()?;
    let first = entries.next().expect("first record should survive")?;
    assert_eq!(first.sequence.as_deref(), Some(&b"ACGTACGT"[..]));

    match entries.next() {
        Some(Err(GobyError::TruncatedChunk { offset })) => {
            let chunks = ChunkIterator::<ReadCollection>::open(reader.path())?;
            assert_eq!(offset, chunks.chunks()[1].position);
        }
        other => panic!("expected TruncatedChunk, got {other:?}"),
    }
    assert!(entries.next().is_none());
    Ok(())
}

#[test]
fn finished_without_entries_writes_terminator_and_header() -> Result<()> {
    let dir = TempDir::new()?;
    let basename = dir.path().join("empty");

    let mut writer = AlignmentWriter::create(&basename)?;
    writer.finished(0)?;

    // the entries stream is exactly one zero-length frame
    let entries_path = dir.path().join("empty.entries");
    assert_eq!(file_size(&entries_path), CHUNK_FRAME_LENGTH as u64);

    let reader = AlignmentReader::open(&basename)?;
    assert_eq!(reader.header().number_of_aligned_reads, Some(0));
    assert_eq!(reader.header().number_of_reads, Some(0));
    assert_eq!(reader.entries()?.count(), 0);
    assert_eq!(reader.too_many_hits()?.count(), 0);
    Ok(())
}

#[test]
fn alignment_sidecars_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let basename = dir.path().join("full");

    let mut writer = AlignmentWriter::with_entries_per_chunk(&basename, 2)?;
    writer.set_aligner_name("tester");
    writer.set_aligner_version("1.2");
    writer.set_sorted(true);
    writer.set_quality_adjustment(33);
    writer.add_target(0, "chr1", 1000);
    writer.add_target_with_translation(1, 7, "chr2", 2000);
    writer.add_statistic("run.date", "2011-03-01");
    writer.add_statistic_int("min.score", -4);
    assert_eq!(writer.add_query_identifier("q0"), 0);
    assert_eq!(writer.add_query_identifier("q1"), 1);
    assert_eq!(writer.add_query_identifier("q0"), 0);

    for query_index in 0..5u32 {
        writer.append_entry()?;
        writer.set_query_index(query_index)?;
        writer.set_target_index(query_index % 2)?;
        writer.set_position(10 * query_index)?;
        writer.set_score(query_index as f32)?;
        writer.set_mapping_quality(40)?;
    }
    writer.append_too_many_hits(99, 35, 12)?;
    writer.finished(5)?;

    let reader = AlignmentReader::open(&basename)?;
    let header = reader.header();
    assert_eq!(header.aligner_name.as_deref(), Some("tester"));
    assert_eq!(header.aligner_version.as_deref(), Some("1.2"));
    assert_eq!(header.sorted, Some(true));
    assert_eq!(header.quality_adjustment, Some(33));
    assert_eq!(header.smallest_query_index, Some(0));
    assert_eq!(header.largest_query_index, Some(4));
    assert_eq!(header.number_of_aligned_reads, Some(5));
    assert_eq!(header.number_of_reads, Some(5));
    assert_eq!(header.targets.len(), 2);
    assert_eq!(header.targets[1].aligner_index, Some(7));
    assert_eq!(header.query_identifiers.len(), 2);

    // entries land in chunks of two, in append order
    let entries: Vec<_> = reader.entries()?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 5);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.query_index, i as u32);
        assert_eq!(entry.position, 10 * i as u32);
    }

    let hits: Vec<_> = reader.too_many_hits()?.collect::<Result<_, _>>()?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].query_index, 99);
    assert_eq!(hits[0].aligned_length, 35);
    assert_eq!(hits[0].number_of_hits, 12);

    let stats = std::fs::read_to_string(dir.path().join("full.stats"))?;
    assert_eq!(stats, "run.date=2011-03-01\nmin.score=-4\n");
    Ok(())
}

#[test]
fn iteration_resumes_from_a_chunk_boundary() -> Result<()> {
    let dir = TempDir::new()?;
    let basename = dir.path().join("resume");

    let mut writer = ReadsWriter::with_entries_per_chunk(&basename, 2)?;
    for i in 0..6u8 {
        writer.set_sequence(&[b'A' + i]);
        writer.append_entry()?;
    }
    writer.close()?;

    let reader = ReadsReader::open(&basename);
    let chunks = ChunkIterator::<ReadCollection>::open(reader.path())?;
    assert_eq!(chunks.chunks().len(), 3);

    // restart at the second chunk's frame
    let second_frame = chunks.chunks()[1].position - CHUNK_FRAME_LENGTH as u64;
    let resumed: Vec<_> = reader
        .entries_at(std::io::SeekFrom::Start(second_frame))?
        .collect::<Result<_, _>>()?;
    assert_eq!(resumed.len(), 4);
    assert_eq!(resumed[0].read_index, 2);

    // an end-positioned iterator is immediately exhausted
    assert_eq!(reader.entries_at(std::io::SeekFrom::End(0))?.count(), 0);
    Ok(())
}
