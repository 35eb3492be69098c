//! Tests for LogReplayer
//!
//! These tests verify:
//! - Reading records back in file order
//! - Missing and empty logs replay as empty
//! - Content length is authoritative (embedded delimiters, all byte values)
//! - Malformed and truncated records fail with ParseError
//! - The iterator stops after an error
//! - verify() statistics

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use logvec::config::SyncStrategy;
use logvec::log::{self, replay_with, LogAppender, LogReplayer, MutationRecord, ReplayStats};
use logvec::{LogVecError, Result};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("log");
    (temp_dir, log_path)
}

fn write_raw(path: &PathBuf, bytes: &[u8]) {
    let mut file = File::create(path).unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
}

fn replay_bytes(bytes: &[u8]) -> Vec<Result<MutationRecord>> {
    LogReplayer::from_reader(bytes).collect()
}

fn assert_parse_error(bytes: &[u8], expected_offset: u64) {
    let results = replay_bytes(bytes);
    let last = results.last().expect("replay yielded nothing");
    match last {
        Err(LogVecError::ParseError { offset, .. }) => {
            assert_eq!(*offset, expected_offset, "input {:?}", String::from_utf8_lossy(bytes));
        }
        other => panic!(
            "expected ParseError for {:?}, got {:?}",
            String::from_utf8_lossy(bytes),
            other
        ),
    }
}

fn all_bytes() -> Vec<u8> {
    (0..=255u8).collect()
}

// =============================================================================
// Basic Reading Tests
// =============================================================================

#[test]
fn test_missing_file_is_empty_log() {
    let (_temp, log_path) = setup_temp_log();

    let mut replayer = LogReplayer::start(&log_path).unwrap();

    assert!(replayer.next_record().unwrap().is_none());
    assert!(!log_path.exists());
}

#[test]
fn test_empty_file() {
    let (_temp, log_path) = setup_temp_log();
    File::create(&log_path).unwrap();

    let records: Vec<_> = LogReplayer::start(&log_path).unwrap().collect();

    assert!(records.is_empty());
}

#[test]
fn test_read_records_in_order() {
    let (_temp, log_path) = setup_temp_log();
    write_raw(&log_path, b"1,3,foo\n1,3,bar\n0,0\n1,0,\n");

    let records: Vec<_> = LogReplayer::start(&log_path)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(
        records,
        vec![
            MutationRecord::push("foo"),
            MutationRecord::push("bar"),
            MutationRecord::erase(0),
            MutationRecord::push(""),
        ]
    );
}

#[test]
fn test_reads_what_appender_wrote() {
    let (_temp, log_path) = setup_temp_log();

    let written = vec![
        MutationRecord::push("first"),
        MutationRecord::erase(0),
        MutationRecord::push("second"),
        MutationRecord::push(all_bytes()),
        MutationRecord::erase(1),
    ];

    {
        let mut appender = LogAppender::open(&log_path, SyncStrategy::Data).unwrap();
        for record in &written {
            appender.append(record).unwrap();
        }
    }

    let read: Vec<_> = LogReplayer::start(&log_path)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(read, written);
}

#[test]
fn test_multi_digit_fields() {
    let content = vec![b'q'; 1234];
    let mut bytes = b"1,1234,".to_vec();
    bytes.extend_from_slice(&content);
    bytes.extend_from_slice(b"\n0,98765\n");

    let records: Vec<_> = replay_bytes(&bytes).into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(
        records,
        vec![MutationRecord::Push { content }, MutationRecord::erase(98765)]
    );
}

// =============================================================================
// Content Length Tests
// =============================================================================

#[test]
fn test_content_with_separators_and_newlines() {
    let records = replay_bytes(b"1,7,a,\n0,1\n\n");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].as_ref().unwrap(), &MutationRecord::push("a,\n0,1\n"));
}

#[test]
fn test_content_with_every_byte_value() {
    let mut bytes = b"1,256,".to_vec();
    bytes.extend_from_slice(&all_bytes());
    bytes.push(b'\n');

    let records = replay_bytes(&bytes);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].as_ref().unwrap(), &MutationRecord::push(all_bytes()));
}

// =============================================================================
// Malformed Record Tests
// =============================================================================

#[test]
fn test_unknown_tag() {
    assert_parse_error(b"2,3,foo\n", 0);
}

#[test]
fn test_unknown_tag_after_valid_record() {
    assert_parse_error(b"1,3,foo\nx", 8);
}

#[test]
fn test_missing_separator() {
    assert_parse_error(b"1;3,foo\n", 0);
    assert_parse_error(b"0 5\n", 0);
}

#[test]
fn test_non_digit_in_length() {
    assert_parse_error(b"1,3a,foo\n", 0);
}

#[test]
fn test_non_digit_in_index() {
    assert_parse_error(b"0,-1\n", 0);
}

#[test]
fn test_empty_numeric_fields() {
    assert_parse_error(b"1,,foo\n", 0);
    assert_parse_error(b"0,\n", 0);
}

#[test]
fn test_length_wider_than_limit() {
    assert_parse_error(b"1,1234567890,x\n", 0);
}

#[test]
fn test_index_wider_than_limit() {
    assert_parse_error(b"0,0000000001\n", 0);
}

#[test]
fn test_content_shorter_than_length() {
    assert_parse_error(b"1,10,short\n", 0);
}

#[test]
fn test_missing_terminator_after_content() {
    assert_parse_error(b"1,3,foo", 0);
    assert_parse_error(b"1,3,fooX1,1,a\n", 0);
}

#[test]
fn test_truncated_tail() {
    assert_parse_error(b"1,3,foo\n0,", 8);
    assert_parse_error(b"1,3,foo\n0,12", 8);
    assert_parse_error(b"1,3,foo\n1", 8);
    assert_parse_error(b"1,3,foo\n1,3", 8);
}

#[test]
fn test_iterator_stops_after_error() {
    let mut replayer = LogReplayer::from_reader(&b"1,1,a\n9\n1,1,b\n"[..]);

    assert!(replayer.next().unwrap().is_ok());
    assert!(replayer.next().unwrap().is_err());
    assert!(replayer.next().is_none());
    assert!(replayer.next().is_none());
}

#[test]
fn test_iterator_stays_finished() {
    let mut replayer = LogReplayer::from_reader(&b"0,0\n"[..]);

    assert!(replayer.next().is_some());
    assert!(replayer.next().is_none());
    assert!(replayer.next_record().unwrap().is_none());
}

// =============================================================================
// Replay Validation Tests
// =============================================================================

#[test]
fn test_replay_with_applies_records_in_order() {
    let mut replayer = LogReplayer::from_reader(&b"1,1,a\n1,1,b\n0,0\n"[..]);
    let mut applied = Vec::new();

    let stats = replay_with(&mut replayer, |record| applied.push(record)).unwrap();

    assert_eq!(
        applied,
        vec![
            MutationRecord::push("a"),
            MutationRecord::push("b"),
            MutationRecord::erase(0),
        ]
    );
    assert_eq!(stats.records, 3);
    assert_eq!(stats.log_bytes, 16);
}

#[test]
fn test_replay_with_rejects_erase_past_end() {
    let mut replayer = LogReplayer::from_reader(&b"1,1,a\n0,1\n"[..]);
    let mut applied = Vec::new();

    let err = replay_with(&mut replayer, |record| applied.push(record)).unwrap_err();

    match err {
        LogVecError::ParseError { offset, reason } => {
            assert_eq!(offset, 6);
            assert!(reason.contains("out of range"), "reason: {}", reason);
        }
        other => panic!("expected ParseError, got {:?}", other),
    }
    // The bad erase is never handed to the caller
    assert_eq!(applied, vec![MutationRecord::push("a")]);
}

#[test]
fn test_replay_with_rejects_erase_on_empty_log() {
    let mut replayer = LogReplayer::from_reader(&b"0,0\n"[..]);

    let err = replay_with(&mut replayer, |_| {}).unwrap_err();

    assert!(matches!(err, LogVecError::ParseError { offset: 0, .. }));
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_missing_log() {
    let (_temp, log_path) = setup_temp_log();

    let stats = log::verify(&log_path).unwrap();

    assert_eq!(stats, ReplayStats::default());
}

#[test]
fn test_verify_counts_records() {
    let (_temp, log_path) = setup_temp_log();
    write_raw(&log_path, b"1,3,foo\n1,5,a,b,c\n0,1\n");

    let stats = log::verify(&log_path).unwrap();

    assert_eq!(stats.records, 3);
    assert_eq!(stats.pushes, 2);
    assert_eq!(stats.erases, 1);
    assert_eq!(stats.content_bytes, 8);
    assert_eq!(stats.log_bytes, fs::metadata(&log_path).unwrap().len());
}

#[test]
fn test_verify_reports_corruption() {
    let (_temp, log_path) = setup_temp_log();
    write_raw(&log_path, b"1,3,foo\n1,99,bar\n");

    let err = log::verify(&log_path).unwrap_err();

    assert!(matches!(err, LogVecError::ParseError { offset: 8, .. }));
}

#[test]
fn test_verify_rejects_erase_past_end() {
    let (_temp, log_path) = setup_temp_log();
    write_raw(&log_path, b"1,1,a\n0,0\n0,0\n");

    let err = log::verify(&log_path).unwrap_err();

    assert!(matches!(err, LogVecError::ParseError { offset: 10, .. }));
}
