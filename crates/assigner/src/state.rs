use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::AssignerConfig,
    lifecycle::{OpContext, ReviewService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AssignerConfig,
    reviews: Arc<ReviewService>,
}

impl AppState {
    pub fn new(config: AssignerConfig, reviews: Arc<ReviewService>) -> Self {
        Self { config, reviews }
    }

    pub fn reviews(&self) -> &ReviewService {
        &self.reviews
    }

    /// Fresh cancellation scope for one request, bounded by the configured timeout.
    pub fn op_context(&self) -> OpContext {
        let ctx = OpContext::new(CancellationToken::new());
        match self.config.operation_timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}
