//! Destinations for build outputs.
//!
//! The walk hands every [`OutputFile`] to an [`Outputs`] sink. Two backends
//! exist and can be combined:
//!
//! - **Cache**: a plain `Vec<OutputFile>`, kept in walk order. Batch builds
//!   write it after the walk completes.
//! - **Stream**: [`Stream`] forwards each output over a bounded channel to
//!   writers running concurrently with the walk.
//!
//! [`BuildSink`] is what the walk actually holds. It caches, forwards, or
//! both, so batch and streaming builds share the same call sites and
//! produce the same outputs in the same order.

use crate::types::OutputFile;
use std::sync::mpsc::SyncSender;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SinkError {
    #[error("output stream closed before {0} could be sent")]
    Closed(String),
}

pub trait Outputs {
    fn add(&mut self, output: OutputFile) -> Result<(), SinkError>;

    fn add_all(&mut self, outputs: Vec<OutputFile>) -> Result<(), SinkError> {
        outputs.into_iter().try_for_each(|o| self.add(o))
    }
}

impl Outputs for Vec<OutputFile> {
    fn add(&mut self, output: OutputFile) -> Result<(), SinkError> {
        self.push(output);
        Ok(())
    }
}

/// Forwards outputs into a bounded channel. Sending blocks while the
/// channel is full, which throttles the walk to the writers' pace.
#[derive(Debug, Clone)]
pub struct Stream {
    tx: SyncSender<OutputFile>,
}

impl Stream {
    pub fn new(tx: SyncSender<OutputFile>) -> Self {
        Self { tx }
    }
}

impl Outputs for Stream {
    fn add(&mut self, output: OutputFile) -> Result<(), SinkError> {
        self.tx.send(output).map_err(|e| {
            SinkError::Closed(e.0.target().display().to_string())
        })
    }
}

/// Cache and/or forward, as configured for one build.
pub struct BuildSink<'a> {
    cache: Option<Vec<OutputFile>>,
    forward: Option<&'a mut dyn Outputs>,
}

impl<'a> BuildSink<'a> {
    pub fn new(caching: bool, forward: Option<&'a mut dyn Outputs>) -> Self {
        Self {
            cache: caching.then(Vec::new),
            forward,
        }
    }

    /// Cached outputs; empty when caching is off.
    pub fn into_cache(self) -> Vec<OutputFile> {
        self.cache.unwrap_or_default()
    }
}

impl Outputs for BuildSink<'_> {
    fn add(&mut self, output: OutputFile) -> Result<(), SinkError> {
        match (&mut self.cache, &mut self.forward) {
            (Some(cache), Some(forward)) => {
                cache.push(output.clone());
                forward.add(output)
            }
            (Some(cache), None) => {
                cache.push(output);
                Ok(())
            }
            (None, Some(forward)) => forward.add(output),
            (None, None) => Ok(()),
        }
    }
}
