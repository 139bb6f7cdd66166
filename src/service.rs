//! Cached article digests: cache lookup, pipeline run, cache store.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::cache::{CacheConfig, ResultCache};
use crate::config::{Credentials, Settings};
use crate::drivers::BackendSet;
use crate::operation::Operation;
use crate::pipeline::{DocumentPipeline, PipelineOptions};
use crate::resilience::{Orchestrator, RetryPolicy};
use crate::types::{BackendId, GenerationConfig};
use crate::Result;

/// What a digest produced, as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub operation: Operation,
    pub content: String,
    /// Backend that answered each call, in call order.
    pub backend_order: Vec<BackendId>,
    pub chunks: usize,
}

/// Entry point tying the cache to the document pipeline.
///
/// Only successful artifacts are cached; a failed run leaves the cache
/// untouched so the next request tries the backends again.
#[derive(Debug)]
pub struct ArticleDigester {
    pipeline: DocumentPipeline,
    cache: Arc<ResultCache>,
    config: GenerationConfig,
}

impl ArticleDigester {
    pub fn new(pipeline: DocumentPipeline, cache: Arc<ResultCache>, config: GenerationConfig) -> Self {
        Self {
            pipeline,
            cache,
            config,
        }
    }

    /// Wire every component from settings. Starts the cache sweeper, so this
    /// must run inside a Tokio runtime.
    pub fn from_settings(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        settings.validate()?;
        let backends = BackendSet::from_settings(settings, credentials)?;
        let orchestrator = Orchestrator::new(
            backends,
            RetryPolicy::linear(settings.retry_base_delay()),
        );
        let pipeline =
            DocumentPipeline::new(Arc::new(orchestrator), PipelineOptions::from_settings(settings));
        let cache = ResultCache::start(CacheConfig::from_settings(settings));
        Ok(Self::new(pipeline, Arc::new(cache), settings.generation_config()))
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        &self.config
    }

    pub async fn digest(
        &self,
        resource_id: &str,
        text: &str,
        operation: Operation,
    ) -> Result<Artifact> {
        let span = info_span!(
            "digest",
            request_id = %Uuid::new_v4(),
            operation = %operation,
            resource = resource_id
        );
        self.digest_inner(resource_id, text, operation)
            .instrument(span)
            .await
    }

    async fn digest_inner(
        &self,
        resource_id: &str,
        text: &str,
        operation: Operation,
    ) -> Result<Artifact> {
        if let Some(cached) = self
            .cache
            .get_as::<Artifact>(resource_id, operation.as_str())
            .await?
        {
            debug!("serving cached artifact");
            return Ok(cached);
        }

        let output = self
            .pipeline
            .process_with(
                text,
                operation.system_prompt(),
                operation.user_template(),
                &self.config,
                &operation.reduce_strategy(),
            )
            .await?;

        let artifact = Artifact {
            operation,
            content: output.content,
            backend_order: output.backends,
            chunks: output.chunk_count,
        };
        self.cache
            .set_as(resource_id, operation.as_str(), &artifact)
            .await?;
        info!(chunks = artifact.chunks, "digest stored");
        Ok(artifact)
    }

    /// Stop background work. Cached entries stay readable.
    pub fn shutdown(&self) {
        self.cache.shutdown();
    }
}
