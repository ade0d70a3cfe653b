//! Pipeline: one producer fanned out to its consumers

use super::consumer::{self, Consumer};
use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::metrics::LoggerMetrics;
use super::producer::{Producer, Rendered};
use std::sync::Arc;

/// A producer bound to one or more consumers.
///
/// Each entry is rendered once; every consumer then receives the same text
/// inside its own failure boundary.
#[derive(Clone)]
pub struct Pipeline {
    producer: Arc<Producer>,
    consumers: Vec<Arc<dyn Consumer>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Pipeline with a single consumer
    pub fn new(producer: Producer, consumer: impl Consumer + 'static) -> Self {
        Self {
            producer: Arc::new(producer),
            consumers: vec![Arc::new(consumer)],
        }
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn consumers(&self) -> &[Arc<dyn Consumer>] {
        &self.consumers
    }

    /// Render the entry and deliver it to every consumer in order
    pub fn dispatch(&self, entry: &LogEntry, metrics: &LoggerMetrics) -> Rendered {
        let rendered = self.producer.render(entry);
        match &rendered {
            Rendered::Text(text) => {
                for consumer in &self.consumers {
                    if consumer::accept(consumer.as_ref(), entry, text) {
                        metrics.record_delivered();
                    } else {
                        metrics.record_consumer_failure();
                    }
                }
            }
            Rendered::Failed => metrics.record_formatter_failure(),
            Rendered::Skipped | Rendered::EvaluationFailed(_) => {}
        }
        rendered
    }

    pub fn flush(&self) {
        for consumer in &self.consumers {
            consumer::flush(consumer.as_ref());
        }
    }
}

/// Builder for [`Pipeline`]; a producer and at least one consumer are required
#[derive(Default)]
pub struct PipelineBuilder {
    producer: Option<Arc<Producer>>,
    consumers: Vec<Arc<dyn Consumer>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn producer(mut self, producer: Producer) -> Self {
        self.producer = Some(Arc::new(producer));
        self
    }

    /// Share one producer between several pipelines
    #[must_use = "builder methods return a new value"]
    pub fn shared_producer(mut self, producer: Arc<Producer>) -> Self {
        self.producer = Some(producer);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn consumer<C: Consumer + 'static>(mut self, consumer: C) -> Self {
        self.consumers.push(Arc::new(consumer));
        self
    }

    /// Add a consumer the caller keeps a handle to
    #[must_use = "builder methods return a new value"]
    pub fn shared_consumer(mut self, consumer: Arc<dyn Consumer>) -> Self {
        self.consumers.push(consumer);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let mut missing = Vec::new();
        if self.producer.is_none() {
            missing.push("producer");
        }
        if self.consumers.is_empty() {
            missing.push("consumers");
        }

        match self.producer {
            Some(producer) if missing.is_empty() => Ok(Pipeline {
                producer,
                consumers: self.consumers,
            }),
            _ => Err(LoggerError::missing(missing)),
        }
    }
}
