//! Explicit logging handle.
//!
//! Every component that reports progress receives a [`Logger`] through its
//! constructor. The handle only decides whether verbose output is wanted; the
//! actual sink is whatever `tracing` subscriber the binary installed.

const DEFAULT_COMPONENT: &str = "app";

#[derive(Debug, Clone, Copy)]
pub struct Logger {
    verbose: bool,
    component: &'static str,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            component: DEFAULT_COMPONENT,
        }
    }

    /// A handle that never emits verbose output.
    pub fn silent() -> Self {
        Self::new(false)
    }

    /// Derives a handle for a sub-component, keeping the verbosity.
    pub fn named(&self, component: &'static str) -> Self {
        Self {
            verbose: self.verbose,
            component,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn info(&self, message: impl AsRef<str>) {
        tracing::info!(component = self.component, "{}", message.as_ref());
    }

    pub fn verbose(&self, message: impl AsRef<str>) {
        if self.verbose {
            tracing::debug!(component = self.component, "{}", message.as_ref());
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        tracing::warn!(component = self.component, "{}", message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        tracing::error!(component = self.component, "{}", message.as_ref());
    }
}
