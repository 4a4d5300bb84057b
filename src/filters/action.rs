//! Action filters: run around the handler, never decide anything.

use crate::filters::context::FilterContext;
use crate::filters::logger::Logger;

/// Hooks before and after endpoint execution.
pub trait ActionFilter: Send + Sync {
    fn on_action_executing(&self, ctx: &FilterContext);
    fn on_action_executed(&self, ctx: &FilterContext);
}

/// Writes one line when an action starts and one when it completes.
pub struct LoggingActionFilter {
    logger: Logger,
}

impl LoggingActionFilter {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl ActionFilter for LoggingActionFilter {
    fn on_action_executing(&self, ctx: &FilterContext) {
        self.logger
            .info(&format!("Action '{}' is starting.", ctx.handler_name()));
    }

    fn on_action_executed(&self, ctx: &FilterContext) {
        self.logger
            .info(&format!("Action '{}' has completed.", ctx.handler_name()));
    }
}
