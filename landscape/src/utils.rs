use web_time::Instant;

/// Scope guard that logs `begin`/`end` lines around an operation, with elapsed time.
///
/// - logs at `debug` level so release builds stay quiet by default
/// - supports sequential spans (`span()` ends the previous span)
/// - uses `web_time::Instant`, which also works in the browser
pub struct LogStopwatch {
    name: &'static str,
    started: Instant,
    span: Option<(String, Instant)>,
}

impl LogStopwatch {
    pub fn new(name: &'static str) -> Self {
        log::debug!("--------- {name} begin ---------");
        Self {
            name,
            started: Instant::now(),
            span: None,
        }
    }

    /// Starts a new span within the operation, ending any previous span.
    pub fn span(&mut self, section_name: impl Into<String>) {
        self.end_span();
        self.span = Some((section_name.into(), Instant::now()));
    }

    /// Ends the current span, if any.
    pub fn end_span(&mut self) {
        if let Some((section, started)) = self.span.take() {
            log::debug!("{}::{section} took {:?}", self.name, started.elapsed());
        }
    }

    /// Time since the stopwatch was created.
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

impl Drop for LogStopwatch {
    fn drop(&mut self) {
        // Close any open span first.
        self.end_span();
        log::debug!(
            "---------- {} end ({:?}) ----------",
            self.name,
            self.started.elapsed()
        );
    }
}
