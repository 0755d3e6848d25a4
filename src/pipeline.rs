//! Per-file middleware run before core processing.
//!
//! Each visited file passes through the registered stages in order. A
//! stage receives the file as a [`Visit`] and returns a [`Flow`] saying what
//! happens next:
//!
//! | Flow | Remaining stages | Core processing |
//! |---|---|---|
//! | [`Flow::Continue`] | run | runs on the final visit |
//! | [`Flow::BreakChain`] | skipped | runs on this visit |
//! | [`Flow::SkipCore`] | skipped | skipped, no output |
//! | `Err(_)` | skipped | skipped, walk aborts |
//!
//! Stages may rewrite the path, the data, or the directory flag, and they
//! get the build's sink so they can emit extra outputs of their own.

use crate::sink::Outputs;
use std::path::PathBuf;
use thiserror::Error;

pub type StageError = Box<dyn std::error::Error + Send + Sync>;

pub type Stage =
    Box<dyn FnMut(Visit, &mut dyn Outputs) -> Result<Flow, StageError> + Send>;

/// A file as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Visit),
    BreakChain(Visit),
    SkipCore,
}

/// What the walk should do with a file after the pipeline ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Core(Visit),
    SkipCore,
}

#[derive(Error, Debug)]
#[error("[pipeline {index}] error when processing {}: {source}", .path.display())]
pub struct PipelineError {
    pub index: usize,
    pub path: PathBuf,
    #[source]
    pub source: StageError,
}

#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage over `visit`, honoring control signals.
    pub fn run(
        &mut self,
        mut visit: Visit,
        outputs: &mut dyn Outputs,
    ) -> Result<Outcome, PipelineError> {
        for (index, stage) in self.stages.iter_mut().enumerate() {
            let path = visit.path.clone();
            match stage(visit, outputs) {
                Ok(Flow::Continue(next)) => visit = next,
                Ok(Flow::BreakChain(next)) => return Ok(Outcome::Core(next)),
                Ok(Flow::SkipCore) => return Ok(Outcome::SkipCore),
                Err(source) => {
                    return Err(PipelineError {
                        index,
                        path,
                        source,
                    });
                }
            }
        }
        Ok(Outcome::Core(visit))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}
