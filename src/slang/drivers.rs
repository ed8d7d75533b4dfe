//! Drivers around the transpiler
//!
//! These consume the forward transform and hand the Python text to the host
//! interpreter. The engine itself never runs anything.
//!
//! - [`runner`]: run a program or byte-compile it
//! - [`evaluate`]: the [`Evaluator`] seam used by the REPL
//! - [`repl`]: line-buffered interactive session

pub mod evaluate;
pub mod repl;
pub mod runner;

pub use evaluate::{Evaluator, ProcessEvaluator};
pub use repl::{BlockAccumulator, Feed, ReplSession};
pub use runner::{CompiledArtifact, PythonRunner, RunOutcome};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to create a temporary script: {0}")]
    TempFile(#[source] io::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start {interpreter}: {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: io::Error,
    },
    #[error("byte-compiling {} failed:\n{stderr}", .path.display())]
    Compile { path: PathBuf, stderr: String },
    #[error("refusing to overwrite the input file {}; pass -o to choose another target", .path.display())]
    WouldOverwrite { path: PathBuf },
    #[error("line editor failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
