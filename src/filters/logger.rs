//! Typed loggers handed to filters as collaborators.

use std::sync::Arc;

/// Destination for filter log lines.
pub trait FilterLog: Send + Sync {
    fn info(&self, category: &str, message: &str);
}

/// Writes filter log lines as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl FilterLog for TracingLog {
    fn info(&self, category: &str, message: &str) {
        tracing::info!(category = %category, "{}", message);
    }
}

/// Logger bound to the category of the type that owns it.
#[derive(Clone)]
pub struct Logger {
    category: &'static str,
    sink: Arc<dyn FilterLog>,
}

impl Logger {
    pub fn new(category: &'static str, sink: Arc<dyn FilterLog>) -> Self {
        Self { category, sink }
    }

    /// Logger whose category is the last path segment of `T`'s type name.
    pub fn for_type<T: ?Sized>(sink: Arc<dyn FilterLog>) -> Self {
        let full = std::any::type_name::<T>();
        let category = full.rsplit("::").next().unwrap_or(full);
        Self::new(category, sink)
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn info(&self, message: &str) {
        self.sink.info(self.category, message);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingLog;
    use super::*;

    struct Widget;

    #[test]
    fn test_category_from_type() {
        let sink = Arc::new(RecordingLog::default());
        let logger = Logger::for_type::<Widget>(sink.clone());
        assert_eq!(logger.category(), "Widget");

        logger.info("hello");
        assert_eq!(sink.lines(), vec![("Widget".to_string(), "hello".to_string())]);
    }
}
