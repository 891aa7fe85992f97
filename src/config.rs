use std::fmt;

/// Run settings, fixed before the dispatcher starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workers: usize,
    pub replace_original: bool,
    pub verbose: bool,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            replace_original: false,
            verbose: false,
            show_progress: true,
        }
    }
}

impl Config {
    /// Applies a user-requested worker count, clamped to `[1, num_cpus]`.
    /// Returns the adjustment made, if any, so the caller can warn about it.
    pub fn set_workers(&mut self, requested: i64) -> Option<WorkerClamp> {
        let (workers, clamp) = clamp_workers(requested, num_cpus::get());
        self.workers = workers;
        clamp
    }
}

/// Half the logical CPUs, at least one.
pub fn default_workers() -> usize {
    (num_cpus::get() / 2).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerClamp {
    Raised { requested: i64 },
    Lowered { requested: i64, to: usize },
}

impl fmt::Display for WorkerClamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerClamp::Raised { requested } => write!(
                f,
                "Number of workers must be at least 1, got {}. Using 1 worker",
                requested
            ),
            WorkerClamp::Lowered { requested, to } => write!(
                f,
                "Number of workers ({}) exceeds the number of CPUs. Using {} workers",
                requested, to
            ),
        }
    }
}

pub fn clamp_workers(requested: i64, available: usize) -> (usize, Option<WorkerClamp>) {
    let available = available.max(1);
    if requested < 1 {
        return (1, Some(WorkerClamp::Raised { requested }));
    }
    match usize::try_from(requested) {
        Ok(workers) if workers <= available => (workers, None),
        _ => (
            available,
            Some(WorkerClamp::Lowered {
                requested,
                to: available,
            }),
        ),
    }
}
