//! Concurrent output writing.
//!
//! Writing is the only parallel stage of a build. A dedicated rayon pool
//! of `W` threads drains either a finished slice of outputs (batch builds)
//! or a channel still being fed by the walk (streaming builds). For each
//! output the worker creates the parent directories, writes the payload
//! with the output's permission bits and logs the path.
//!
//! A failed write does not stop the others. Failures are collected over a
//! channel and reported together once every worker is done; on success the
//! caller gets the written files' metadata, without payloads.

use crate::config::effective_writers;
use crate::types::OutputFile;
use rayon::prelude::*;
use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("failed to write {} (from {}): {source}", .target.display(), originator_display(.originator))]
pub struct FileWriteError {
    pub target: PathBuf,
    pub originator: Option<PathBuf>,
    #[source]
    pub source: io::Error,
}

fn originator_display(originator: &Option<PathBuf>) -> String {
    originator
        .as_ref()
        .map_or_else(|| "-".to_string(), |p| p.display().to_string())
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to start writers: {0}")]
    Pool(#[from] ThreadPoolBuildError),
    #[error("{}", join_lines(.0))]
    Files(Vec<FileWriteError>),
}

fn join_lines(errors: &[FileWriteError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write everything received on `rx` until the channel closes.
pub fn write_out(rx: Receiver<OutputFile>, writers: usize) -> Result<Vec<OutputFile>, WriteError> {
    drain(writers, |written, errors| {
        rx.into_iter()
            .par_bridge()
            .for_each_with(errors, |errors, output| {
                write_one(&output, written, errors)
            });
    })
}

/// Write a finished list of outputs.
pub fn write_out_slice(
    outputs: &[OutputFile],
    writers: usize,
) -> Result<Vec<OutputFile>, WriteError> {
    drain(writers, |written, errors| {
        outputs
            .par_iter()
            .for_each_with(errors, |errors, output| write_one(output, written, errors));
    })
}

fn drain<F>(writers: usize, feed: F) -> Result<Vec<OutputFile>, WriteError>
where
    F: FnOnce(&Mutex<Vec<OutputFile>>, Sender<FileWriteError>) + Send,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(effective_writers(writers))
        .thread_name(|i| format!("ssg-writer-{i}"))
        .build()?;

    let written = Mutex::new(Vec::new());
    let (err_tx, err_rx) = mpsc::channel();
    pool.install(|| feed(&written, err_tx));

    // Every sender is gone once `feed` returns.
    let errors: Vec<FileWriteError> = err_rx.into_iter().collect();
    if !errors.is_empty() {
        return Err(WriteError::Files(errors));
    }
    Ok(written.into_inner().unwrap_or_else(PoisonError::into_inner))
}

fn write_one(
    output: &OutputFile,
    written: &Mutex<Vec<OutputFile>>,
    errors: &mut Sender<FileWriteError>,
) {
    match write_file(output) {
        Ok(()) => {
            info!(path = %output.target().display(), "wrote");
            written
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(output.meta());
        }
        Err(source) => {
            warn!(path = %output.target().display(), error = %source, "write failed");
            // The receiver outlives every worker.
            let _ = errors.send(FileWriteError {
                target: output.target().to_path_buf(),
                originator: output.originator().map(|p| p.to_path_buf()),
                source,
            });
        }
    }
}

fn write_file(output: &OutputFile) -> io::Result<()> {
    if let Some(parent) = output.target().parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(output.perm());
    }
    let mut file = options.open(output.target())?;
    file.write_all(output.data())
}
