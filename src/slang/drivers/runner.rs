//! Running and byte-compiling canonical text with the host Python.

use crate::slang::drivers::DriverError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// `py_compile` invocation; argv[1] is the source, argv[2] the bytecode target
const PY_COMPILE: &str =
    "import py_compile, sys; py_compile.compile(sys.argv[1], cfile=sys.argv[2], doraise=True)";

/// Captured result of one program run. A failing program is still an `Ok` run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Files written by [`PythonRunner::compile`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub source: PathBuf,
    pub bytecode: PathBuf,
}

/// Spawns the configured interpreter
#[derive(Debug, Clone)]
pub struct PythonRunner {
    interpreter: String,
}

impl PythonRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Run `canonical` from a temporary script and capture its output
    pub fn run(&self, canonical: &str) -> Result<RunOutcome, DriverError> {
        let script = self.write_temp_script(canonical)?;
        let output = self
            .command()
            .arg(script.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| self.spawn_error(source))?;

        Ok(RunOutcome {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run `canonical` attached to this process's stdio
    pub fn run_attached(&self, canonical: &str) -> Result<ExitStatus, DriverError> {
        let script = self.write_temp_script(canonical)?;
        self.command()
            .arg(script.path())
            .status()
            .map_err(|source| self.spawn_error(source))
    }

    /// Persist `canonical` as `<target>.py` and byte-compile it to `<target>.pyc`
    pub fn compile(&self, canonical: &str, target: &Path) -> Result<CompiledArtifact, DriverError> {
        let source = target.with_extension("py");
        let bytecode = target.with_extension("pyc");
        fs::write(&source, canonical).map_err(|e| DriverError::Write {
            path: source.clone(),
            source: e,
        })?;

        let output = self
            .command()
            .arg("-c")
            .arg(PY_COMPILE)
            .arg(&source)
            .arg(&bytecode)
            .output()
            .map_err(|source| self.spawn_error(source))?;

        if !output.status.success() {
            return Err(DriverError::Compile {
                path: source,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(source = %source.display(), bytecode = %bytecode.display(), "compiled");
        Ok(CompiledArtifact { source, bytecode })
    }

    /// [`compile`](Self::compile) the translation of `input`, refusing a target
    /// whose `.py` or `.pyc` path is `input` itself
    pub fn compile_from(
        &self,
        input: &Path,
        canonical: &str,
        target: &Path,
    ) -> Result<CompiledArtifact, DriverError> {
        for output in [target.with_extension("py"), target.with_extension("pyc")] {
            if same_file(input, &output) {
                return Err(DriverError::WouldOverwrite { path: output });
            }
        }
        self.compile(canonical, target)
    }

    fn command(&self) -> Command {
        Command::new(&self.interpreter)
    }

    fn write_temp_script(&self, canonical: &str) -> Result<tempfile::NamedTempFile, DriverError> {
        let mut script = tempfile::Builder::new()
            .prefix("slang-")
            .suffix(".py")
            .tempfile()
            .map_err(DriverError::TempFile)?;
        script
            .write_all(canonical.as_bytes())
            .and_then(|_| script.flush())
            .map_err(DriverError::TempFile)?;
        Ok(script)
    }

    fn spawn_error(&self, source: std::io::Error) -> DriverError {
        DriverError::Spawn {
            interpreter: self.interpreter.clone(),
            source,
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
