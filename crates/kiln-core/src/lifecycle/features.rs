//! Feature contributions hooked into boot and shutdown.
//!
//! Every registered feature starts concurrently once the worker is up; the
//! first failure aborts the launch. Stop hooks run one by one in
//! registration order.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use kiln_common::{HostError, StartupError};

#[async_trait]
pub trait Feature: Send + Sync {
    fn name(&self) -> &str;

    async fn start(&self) -> Result<(), HostError>;

    /// Must not fail. A failing stop hook aborts the process.
    fn stop(&self) -> Result<(), HostError>;
}

#[derive(Default, Clone)]
pub struct FeatureSet {
    features: Vec<Arc<dyn Feature>>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, feature: Arc<dyn Feature>) {
        tracing::debug!(feature = feature.name(), "feature registered");
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Run every start hook concurrently; the first error wins.
    pub async fn start_all(&self) -> Result<(), StartupError> {
        let starts = self.features.iter().map(|feature| async move {
            feature.start().await.map_err(|e| StartupError::Feature {
                name: feature.name().to_string(),
                reason: e.to_string(),
            })
        });
        try_join_all(starts).await?;
        tracing::info!(count = self.features.len(), "features started");
        Ok(())
    }

    /// Run every stop hook in registration order.
    ///
    /// # Panics
    ///
    /// When a stop hook fails.
    pub fn stop_all(&self) {
        for feature in &self.features {
            if let Err(e) = feature.stop() {
                panic!("feature '{}' failed to stop: {e}", feature.name());
            }
            tracing::debug!(feature = feature.name(), "feature stopped");
        }
    }
}
