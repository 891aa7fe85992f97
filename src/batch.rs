use crate::classify::{normalize_content_type, Classifier, ContentSniffer};
use crate::compressor::CompressionResult;
use crate::config::Config;
use crate::constants::QUEUE_CAPACITY;
use crate::enumerate::FileEnumerator;
use crate::error::{CompressionError, Result};
use crate::logger::Logger;
use crate::registry::CompressorRegistry;
use crate::summary::{ResultAggregator, RunSummary};
use crate::utils::{compressed_output_path, create_progress_spinner, format_file_size};
use crossbeam::channel::bounded;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::fs;
use std::any::Any;
use std::io::ErrorKind;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// What the replace step did with a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The compressed file now lives at the original path.
    Replaced,
    /// Savings were not positive; the original is untouched and the
    /// compressed artifact was deleted.
    Discarded,
}

/// Moves the compressed artifact onto the original path when it is smaller,
/// otherwise deletes the artifact.
///
/// The original is removed before the rename, so a failed rename leaves
/// neither file at the original path. That case is reported as
/// [`CompressionError::RenameCompressed`].
///
/// # Arguments
/// * `result` - A successful compression whose artifact is still on disk
///
/// # Returns
/// * `Ok(ReplaceOutcome::Replaced)` - The artifact was renamed over the original
/// * `Ok(ReplaceOutcome::Discarded)` - Savings were not positive and the
///   artifact is gone (or was never written)
/// * `Err(CompressionError)` - Removing the original, renaming the artifact or
///   deleting it failed
pub fn replace_original(result: &CompressionResult) -> Result<ReplaceOutcome> {
    let original = result.original_path();
    let compressed = result.compressed_path();

    if result.is_positive_savings() {
        fs::remove_file(original).map_err(|source| CompressionError::RemoveOriginal {
            path: original.to_path_buf(),
            source,
        })?;
        fs::rename(compressed, original).map_err(|source| CompressionError::RenameCompressed {
            from: compressed.to_path_buf(),
            to: original.to_path_buf(),
            source,
        })?;
        return Ok(ReplaceOutcome::Replaced);
    }

    match fs::remove_file(compressed) {
        Ok(()) => Ok(ReplaceOutcome::Discarded),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ReplaceOutcome::Discarded),
        Err(source) => Err(CompressionError::DiscardArtifact {
            path: compressed.to_path_buf(),
            source,
        }),
    }
}

/// Shared by all workers of one run.
#[derive(Default)]
struct RunState {
    aggregator: ResultAggregator,
    written: Mutex<HashSet<PathBuf>>,
}

impl RunState {
    fn mark_written(&self, path: &Path) {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf());
    }

    fn was_written(&self, path: &Path) -> bool {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// Feeds enumerated files through a fixed pool of workers, each of which
/// classifies, compresses and optionally replaces one file at a time.
pub struct Dispatcher {
    registry: CompressorRegistry,
    classifier: Arc<dyn Classifier>,
    config: Config,
    logger: Logger,
}

impl Dispatcher {
    pub fn new(registry: CompressorRegistry, config: Config, logger: Logger) -> Self {
        Self {
            registry,
            classifier: Arc::new(ContentSniffer::new()),
            config,
            logger,
        }
    }

    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    /// Processes every file under `roots` and blocks until all workers are
    /// done. Per-file problems are logged and counted; only a failure to
    /// start the worker threads aborts the run.
    ///
    /// # Arguments
    /// * `roots` - Files, directories or glob patterns to compress
    ///
    /// # Returns
    /// * `Ok(RunSummary)` - Totals over every file that was handled, including
    ///   ones whose compressor failed or panicked
    /// * `Err(CompressionError::WorkerPool)` - A worker thread could not be spawned
    pub fn run<P: AsRef<Path>>(&self, roots: &[P]) -> Result<RunSummary> {
        let workers = self.config.workers.max(1);
        let start_time = Instant::now();

        self.logger
            .verbose(format!("Registered compressors: {:?}", self.registry));
        self.logger.verbose(format!(
            "Processing {} input paths with {} workers",
            roots.len(),
            workers
        ));

        let state = RunState::default();
        let progress = self.progress_bar();
        let enumerator = FileEnumerator::new(roots, self.logger.named("enumerate"));

        thread::scope(|scope| -> Result<()> {
            let (sender, receiver) = bounded::<PathBuf>(QUEUE_CAPACITY);

            for index in 0..workers {
                let receiver = receiver.clone();
                let state = &state;
                let progress = &progress;
                thread::Builder::new()
                    .name(format!("worker-{}", index))
                    .spawn_scoped(scope, move || {
                        for path in receiver {
                            self.process_isolated(&path, state);
                            progress.inc(1);
                        }
                    })
                    .map_err(CompressionError::WorkerPool)?;
            }
            drop(receiver);

            let logger = self.logger;
            thread::Builder::new()
                .name("enumerator".to_string())
                .spawn_scoped(scope, move || {
                    for item in enumerator {
                        match item {
                            Ok(path) => {
                                if sender.send(path).is_err() {
                                    break;
                                }
                            }
                            Err(e) => logger.error(e.to_string()),
                        }
                    }
                })
                .map_err(CompressionError::WorkerPool)?;

            Ok(())
        })?;

        progress.finish_and_clear();

        let summary = state.aggregator.summary();
        self.logger.verbose(format!(
            "Processed {} files in {:.2?}",
            summary.total_files,
            start_time.elapsed()
        ));
        Ok(summary)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress || self.config.verbose {
            return ProgressBar::hidden();
        }
        let progress = create_progress_spinner("compressing");
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }

    /// A panicking transform only costs its own file.
    fn process_isolated(&self, path: &Path, state: &RunState) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.process_file(path, state)));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            self.logger.error(format!(
                "Compressor panicked on {}: {}",
                path.display(),
                message
            ));
            state
                .aggregator
                .record_failure(path, format!("panicked: {}", message));
        }
    }

    fn process_file(&self, path: &Path, state: &RunState) {
        if state.was_written(path) {
            self.logger
                .verbose(format!("Skipping compressed artifact: {}", path.display()));
            return;
        }

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                self.logger
                    .error(format!("Error getting file info for {}: {}", path.display(), e));
                state.aggregator.record_failure(path, e);
                return;
            }
        };
        if !metadata.is_file() {
            self.logger
                .verbose(format!("Not a regular file: {}", path.display()));
            return;
        }

        let content_type = normalize_content_type(&self.classifier.classify(path));
        self.logger.verbose(format!(
            "Processing file: {} ({}, {})",
            path.display(),
            content_type,
            format_file_size(metadata.len())
        ));

        let Some(compressor) = self.registry.lookup(&content_type) else {
            self.logger
                .verbose(format!("No compressor found for file: {}", path.display()));
            state.aggregator.record_skip();
            return;
        };

        let output = match compressed_output_path(path) {
            Ok(output) => output,
            Err(e) => {
                self.logger.error(e.to_string());
                state.aggregator.record_failure(path, e);
                return;
            }
        };
        let planned = compressor.output_path(path, &output);
        state.mark_written(&output);
        state.mark_written(&planned);

        let result = match compressor.compress(path, &output) {
            Ok(result) => result,
            Err(e) => {
                self.logger.error(format!(
                    "Error compressing file {} with {}: {}",
                    path.display(),
                    compressor.name(),
                    e
                ));
                state.aggregator.record_failure(path, e);
                return;
            }
        };
        state.mark_written(result.compressed_path());

        self.logger.verbose(format!(
            "Compressed {} -> {} ({:.2}% savings)",
            path.display(),
            result.compressed_path().display(),
            result.savings_percent()
        ));

        if self.config.replace_original {
            match replace_original(&result) {
                Ok(ReplaceOutcome::Replaced) => {
                    self.logger
                        .info(format!("Replaced original file: {}", path.display()));
                    state.aggregator.record_replaced();
                }
                Ok(ReplaceOutcome::Discarded) => {
                    self.logger.verbose(format!(
                        "No savings for {}, kept original",
                        path.display()
                    ));
                }
                Err(e) => {
                    self.logger.error(e.to_string());
                    state.aggregator.record_replace_failure(path, e);
                }
            }
        }

        state.aggregator.record_result(result);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
