//! Round-trip tests through the full stack
//!
//! Covers:
//! - read() after write(x) returns x for every payload shape
//! - repeated reads return the same value
//! - the on-disk form is base64 text only
//! - shared use behind a caller-owned mutex

use stackfile::pipeline::{Pipeline, PipelineBuilder, StageSpec};
use stackfile::stage::{Alphabet, StorageStage};
use std::fs;
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn standard_pipeline(temp: &TempDir) -> Pipeline {
    Pipeline::standard(temp.path().join("data.txt"))
}

fn assert_roundtrip(text: &str) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let pipeline = standard_pipeline(&temp);

    pipeline.write_text(text).unwrap();
    assert_eq!(pipeline.read_text().unwrap(), text);
}

fn long_text(min_chars: usize) -> String {
    let mut text = String::new();
    let mut i = 0u64;
    while text.chars().count() < min_chars {
        text.push_str(&format!(
            "line {} value {} mix {:x}\n",
            i,
            i * i,
            i.wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ));
        i += 1;
    }
    text
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='
}

// =============================================================================
// Round-trip law
// =============================================================================

#[test]
fn test_empty_string() {
    assert_roundtrip("");
}

#[test]
fn test_short_ascii() {
    assert_roundtrip("hello, pipeline");
}

#[test]
fn test_text_longer_than_any_fixed_buffer() {
    let text = long_text(10_000);
    assert!(text.len() > 10_000);
    assert_roundtrip(&text);
}

#[test]
fn test_highly_compressible_megabyte() {
    assert_roundtrip(&"a".repeat(1_000_000));
}

#[test]
fn test_multibyte_unicode() {
    assert_roundtrip("héllo wörld, 日本語のテキスト, emoji 🚀🦀, math ∑∫√");
}

#[test]
fn test_raw_binary_blob() {
    let temp = TempDir::new().unwrap();
    let pipeline = standard_pipeline(&temp);
    let blob: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8 ^ 0xa5).collect();

    pipeline.write_bytes(&blob).unwrap();
    assert_eq!(pipeline.read_bytes().unwrap(), blob);
}

#[test]
fn test_every_level_roundtrips() {
    let text = long_text(2_000);
    for level in 0..=9 {
        let temp = TempDir::new().unwrap();
        let pipeline = PipelineBuilder::new(StorageStage::new(temp.path().join("data.txt")))
            .with(StageSpec::encoding())
            .with(StageSpec::Compression { level })
            .build();

        pipeline.write_text(&text).unwrap();
        assert_eq!(pipeline.read_text().unwrap(), text, "level {}", level);
    }
}

#[test]
fn test_url_safe_alphabet_roundtrips() {
    let temp = TempDir::new().unwrap();
    let pipeline = PipelineBuilder::new(StorageStage::new(temp.path().join("data.txt")))
        .with(StageSpec::Encoding {
            alphabet: Alphabet::UrlSafe,
        })
        .with(StageSpec::compression())
        .build();

    let text = long_text(3_000);
    pipeline.write_text(&text).unwrap();
    assert_eq!(pipeline.read_text().unwrap(), text);

    let on_disk = fs::read_to_string(temp.path().join("data.txt")).unwrap();
    assert!(!on_disk.contains('+') && !on_disk.contains('/'));
}

#[test]
fn test_overwrite_with_shorter_payload() {
    let temp = TempDir::new().unwrap();
    let pipeline = standard_pipeline(&temp);

    pipeline.write_text(&long_text(5_000)).unwrap();
    pipeline.write_text("short").unwrap();
    assert_eq!(pipeline.read_text().unwrap(), "short");
}

// =============================================================================
// Idempotent reads
// =============================================================================

#[test]
fn test_repeated_reads_return_same_value() {
    let temp = TempDir::new().unwrap();
    let pipeline = standard_pipeline(&temp);

    pipeline.write_text("read me twice").unwrap();
    let first = pipeline.read_text().unwrap();
    let second = pipeline.read_text().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "read me twice");
}

#[test]
fn test_fresh_pipeline_reads_existing_file() {
    let temp = TempDir::new().unwrap();
    standard_pipeline(&temp).write_text("persisted").unwrap();

    assert_eq!(standard_pipeline(&temp).read_text().unwrap(), "persisted");
}

// =============================================================================
// Concrete scenario
// =============================================================================

#[test]
fn test_sensitive_data_scenario() {
    let temp = TempDir::new().unwrap();
    let pipeline = standard_pipeline(&temp);

    pipeline.write_text("Sensitive data here").unwrap();
    assert_eq!(pipeline.read_text().unwrap(), "Sensitive data here");

    let on_disk = fs::read_to_string(temp.path().join("data.txt")).unwrap();
    assert!(!on_disk.is_empty());
    assert!(
        on_disk.chars().all(is_base64_char),
        "on-disk content must be base64 only, got: {:?}",
        on_disk
    );
    assert!(!on_disk.contains("Sensitive"));
}

// =============================================================================
// Shared use
// =============================================================================

#[test]
fn test_writers_serialized_by_caller_mutex() {
    let temp = TempDir::new().unwrap();
    let pipeline = Arc::new(Mutex::new(standard_pipeline(&temp)));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || {
                let guard = pipeline.lock().unwrap();
                let text = format!("writer {}", i);
                guard.write_text(&text).unwrap();
                assert_eq!(guard.read_text().unwrap(), text);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let last = pipeline.lock().unwrap().read_text().unwrap();
    assert!(last.starts_with("writer "));
}
