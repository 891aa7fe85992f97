mod common;

use common::*;
use file_squeeze::{CompressorRegistry, Config, Dispatcher, FileEnumerator, Logger};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

fn config(workers: usize, replace_original: bool) -> Config {
    Config {
        workers,
        replace_original,
        verbose: false,
        show_progress: false,
    }
}

fn dispatcher(compressor: impl file_squeeze::Compressor + 'static, cfg: Config) -> Dispatcher {
    let mut registry = CompressorRegistry::new();
    registry.register(compressor);
    Dispatcher::new(registry, cfg, Logger::silent()).with_classifier(FixedClassifier("text/plain"))
}

#[test]
fn test_enumerator_yields_exactly_the_files() {
    let temp_dir = create_temp_directory();
    let expected: HashSet<PathBuf> = create_plain_tree(temp_dir.path()).into_iter().collect();

    let found: HashSet<PathBuf> = FileEnumerator::new(&[temp_dir.path()], Logger::silent())
        .map(|item| item.unwrap())
        .collect();

    assert_eq!(found, expected);
    assert!(found.iter().all(|path| !path.is_dir()));
}

#[test]
fn test_end_to_end_halving() {
    let temp_dir = create_temp_directory();
    create_plain_tree(temp_dir.path());

    let summary = dispatcher(HalvingCompressor, config(2, false))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.positive_savings, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.total_compressed * 2, summary.total_original);
    assert_eq!(
        format!("{:.2}", summary.savings_percent.unwrap()),
        "50.00"
    );
    assert!(summary.to_string().contains("(50.00%)"));
}

#[test]
fn test_replace_with_positive_savings() {
    let temp_dir = create_temp_directory();
    let files = create_plain_tree(temp_dir.path());
    let originals: Vec<Vec<u8>> = files.iter().map(|f| fs::read(f).unwrap()).collect();

    let summary = dispatcher(TruncatingCompressor, config(2, true))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.replaced, 4);
    assert!(summary.replace_failures.is_empty());
    for (file, original) in files.iter().zip(&originals) {
        assert_eq!(fs::read(file).unwrap(), &original[..original.len() / 2]);

        let artifact = file.with_file_name(format!(
            "compressed_{}",
            file.file_name().unwrap().to_string_lossy()
        ));
        assert!(!artifact.exists());
    }
}

#[test]
fn test_replace_without_savings_keeps_original() {
    let temp_dir = create_temp_directory();
    let file = temp_dir.path().join("notes.txt");
    fs::write(&file, b"short").unwrap();

    let summary = dispatcher(GrowingCompressor, config(1, true))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.positive_savings, 0);
    assert_eq!(summary.replaced, 0);
    assert_eq!(fs::read(&file).unwrap(), b"short");
    assert!(!temp_dir.path().join("compressed_notes.txt").exists());
    assert!(summary.to_string().contains("No space savings achieved."));
}

#[test]
fn test_without_replace_artifacts_stay() {
    let temp_dir = create_temp_directory();
    let file = temp_dir.path().join("notes.txt");
    fs::write(&file, b"0123456789").unwrap();

    dispatcher(TruncatingCompressor, config(1, false))
        .run(&[file.as_path()])
        .unwrap();

    assert_eq!(fs::read(&file).unwrap(), b"0123456789");
    assert_eq!(
        fs::read(temp_dir.path().join("compressed_notes.txt")).unwrap(),
        b"01234"
    );
}

#[test]
fn test_failures_do_not_abort_the_run() {
    let temp_dir = create_temp_directory();
    for name in ["good1.txt", "bad.txt", "good2.txt", "bad_too.txt"] {
        fs::write(temp_dir.path().join(name), b"some content").unwrap();
    }

    let summary = dispatcher(PickyCompressor, config(2, false))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.failed, 2);
}

#[test]
fn test_panicking_compressor_does_not_abort_the_run() {
    let temp_dir = create_temp_directory();
    for name in ["good1.txt", "bad.txt", "good2.txt"] {
        fs::write(temp_dir.path().join(name), b"some content").unwrap();
    }

    // A single worker has to survive the panic to reach the remaining files.
    let summary = dispatcher(PanickingCompressor, config(1, true))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.replaced, 2);
    assert_eq!(fs::read(temp_dir.path().join("good1.txt")).unwrap(), b"some c");
    assert_eq!(fs::read(temp_dir.path().join("bad.txt")).unwrap(), b"some content");
    assert!(summary.to_string().contains("Failed: 1"));
}

#[test]
fn test_unregistered_types_are_skipped() {
    let temp_dir = create_temp_directory();
    create_plain_tree(temp_dir.path());

    let mut registry = CompressorRegistry::new();
    registry.register(HalvingCompressor);
    let summary = Dispatcher::new(registry, config(2, false), Logger::silent())
        .with_classifier(FixedClassifier("application/x-unknown"))
        .run(&[temp_dir.path()])
        .unwrap();

    assert!(summary.is_empty());
    assert_eq!(summary.skipped, 4);
    assert_eq!(summary.to_string().lines().next(), Some("No files were compressed."));
}

#[test]
fn test_content_type_parameters_are_ignored() {
    let temp_dir = create_temp_directory();
    create_plain_tree(temp_dir.path());

    let mut registry = CompressorRegistry::new();
    registry.register(HalvingCompressor);
    let summary = Dispatcher::new(registry, config(2, false), Logger::silent())
        .with_classifier(FixedClassifier("Text/Plain; charset=utf-8"))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, 4);
}

#[test]
fn test_many_files_through_a_small_queue() {
    let temp_dir = create_temp_directory();
    for i in 0..250 {
        fs::write(temp_dir.path().join(format!("file{}.txt", i)), b"abcdefgh").unwrap();
    }

    let summary = dispatcher(HalvingCompressor, config(4, false))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, 250);
    assert_eq!(summary.positive_savings, 250);
}

#[test]
fn test_missing_and_present_roots() {
    let temp_dir = create_temp_directory();
    create_plain_tree(temp_dir.path());
    let missing = temp_dir.path().join("does-not-exist");

    let summary = dispatcher(HalvingCompressor, config(2, false))
        .run(&[missing, temp_dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 4);
}

#[test]
fn test_artifacts_are_not_recompressed() {
    let temp_dir = create_temp_directory();
    let files = create_plain_tree(temp_dir.path());

    let summary = dispatcher(TruncatingCompressor, config(2, false))
        .run(&[temp_dir.path()])
        .unwrap();

    assert_eq!(summary.total_files, files.len());
    for file in &files {
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file.with_file_name(format!("compressed_{}", name)).exists());
        assert!(!file
            .with_file_name(format!("compressed_compressed_{}", name))
            .exists());
    }
}
