//! Evaluation of REPL blocks
//!
//! The REPL does not evaluate anything itself. It hands each translated block
//! to an [`Evaluator`] and prints whatever comes back.
//!
//! [`ProcessEvaluator`] spawns the interpreter once per block. To make earlier
//! definitions visible it replays every previously successful block into a
//! shared namespace, with their output discarded, before running the new one.
//! Replayed blocks do run again, so their side effects (files, network) repeat.

use crate::slang::drivers::{DriverError, PythonRunner};

/// Something that can run one block of canonical text
pub trait Evaluator {
    /// `Ok(output)` when the block ran, `Err(message)` when it raised or failed to start
    fn evaluate(&mut self, canonical: &str) -> Result<String, String>;
}

pub struct ProcessEvaluator {
    runner: PythonRunner,
    accepted: Vec<String>,
}

impl ProcessEvaluator {
    pub fn new(runner: PythonRunner) -> Self {
        Self {
            runner,
            accepted: Vec::new(),
        }
    }

    /// Blocks that ran successfully so far
    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    /// The wrapper script for `block`: replay, then run `block` and echo the
    /// value of a bare expression like the Python prompt does.
    pub fn script(&self, block: &str) -> String {
        // JSON string and array literals are valid Python literals
        let replay = serde_json::to_string(&self.accepted).unwrap_or_else(|_| "[]".to_string());
        let source = serde_json::to_string(block).unwrap_or_else(|_| "\"\"".to_string());
        format!(
            "import contextlib as __slang_ctx, io as __slang_io\n\
             __slang_ns = {{\"__name__\": \"__main__\"}}\n\
             with __slang_ctx.redirect_stdout(__slang_io.StringIO()), \
             __slang_ctx.redirect_stderr(__slang_io.StringIO()):\n\
             \x20   for __slang_block in {replay}:\n\
             \x20       exec(compile(__slang_block, \"<slang>\", \"exec\"), __slang_ns)\n\
             __slang_src = {source}\n\
             try:\n\
             \x20   __slang_code = compile(__slang_src, \"<slang>\", \"eval\")\n\
             except SyntaxError:\n\
             \x20   exec(compile(__slang_src, \"<slang>\", \"exec\"), __slang_ns)\n\
             else:\n\
             \x20   __slang_value = eval(__slang_code, __slang_ns)\n\
             \x20   if __slang_value is not None:\n\
             \x20       print(repr(__slang_value))\n"
        )
    }
}

impl Evaluator for ProcessEvaluator {
    fn evaluate(&mut self, canonical: &str) -> Result<String, String> {
        let outcome = self
            .runner
            .run(&self.script(canonical))
            .map_err(|e: DriverError| e.to_string())?;
        if outcome.success() {
            self.accepted.push(canonical.to_string());
            Ok(outcome.stdout)
        } else {
            let mut message = outcome.stdout;
            message.push_str(&outcome.stderr);
            Err(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_embeds_block_as_literal() {
        let evaluator = ProcessEvaluator::new(PythonRunner::new("python3"));
        let script = evaluator.script("print(\"hi\")\n");
        assert!(script.contains("__slang_src = \"print(\\\"hi\\\")\\n\"\n"));
        assert!(script.contains("for __slang_block in []:"));
    }

    #[test]
    fn test_script_replays_accepted_blocks() {
        let mut evaluator = ProcessEvaluator::new(PythonRunner::new("python3"));
        evaluator.accepted.push("x = 1".to_string());
        let script = evaluator.script("x");
        assert!(script.contains("for __slang_block in [\"x = 1\"]:"));
    }

    fn python3() -> Option<PythonRunner> {
        let available = std::process::Command::new("python3")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        available.then(|| PythonRunner::new("python3"))
    }

    #[test]
    fn test_definitions_persist_between_blocks() {
        let Some(runner) = python3() else {
            return;
        };
        let mut evaluator = ProcessEvaluator::new(runner);
        assert_eq!(evaluator.evaluate("print('setup')\nx = 2\n"), Ok("setup\n".to_string()));
        assert_eq!(
            evaluator.evaluate("def f(y):\n    return x * y\n"),
            Ok(String::new())
        );
        assert_eq!(evaluator.evaluate("f(21)\n"), Ok("42\n".to_string()));
        assert_eq!(evaluator.accepted().len(), 3);
    }

    #[test]
    fn test_raising_block_is_error_and_not_accepted() {
        let Some(runner) = python3() else {
            return;
        };
        let mut evaluator = ProcessEvaluator::new(runner);
        let err = evaluator.evaluate("1 / 0\n").unwrap_err();
        assert!(err.contains("ZeroDivisionError"));
        assert!(evaluator.accepted().is_empty());
    }

    #[test]
    fn test_spawn_failure_is_error_and_not_accepted() {
        let mut evaluator = ProcessEvaluator::new(PythonRunner::new("definitely-not-python"));
        let err = evaluator.evaluate("x = 1").unwrap_err();
        assert!(err.starts_with("failed to start definitely-not-python"));
        assert!(evaluator.accepted().is_empty());
    }
}
