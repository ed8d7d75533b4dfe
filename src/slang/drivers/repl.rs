//! Interactive session
//!
//! Lines are collected into blocks by [`BlockAccumulator`]:
//!
//! - a line ending in `:` opens a block and raises the depth
//! - a blank line while inside a block lowers the depth by one
//! - a block is complete when the depth is back to zero
//!
//! So a one-line statement runs immediately, `vibe f():` waits for its body
//! and a blank line, and each nested block needs one more blank line to close.
//!
//! [`ReplSession`] owns the line editor and its history. History is loaded
//! when the session starts and saved when it is dropped, so it is written on
//! every way out of [`ReplSession::run`], including Ctrl-D, `exit` and errors.

use crate::slang::drivers::{DriverError, Evaluator};
use crate::slang::engine::Transpiler;
use crate::slang::settings::ReplSettings;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::PathBuf;

/// What feeding one line produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// A full block, lines joined with `\n` and a trailing newline
    Complete(String),
    /// More lines are needed
    Pending,
    /// A blank line outside any block
    Empty,
}

#[derive(Debug, Default)]
pub struct BlockAccumulator {
    lines: Vec<String>,
    depth: usize,
}

impl BlockAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, line: &str) -> Feed {
        let line = line.trim_end();

        if line.trim().is_empty() {
            if self.depth == 0 {
                return Feed::Empty;
            }
            self.depth -= 1;
            if self.depth == 0 {
                return Feed::Complete(self.take());
            }
            return Feed::Pending;
        }

        self.lines.push(line.to_string());
        if line.ends_with(':') {
            self.depth += 1;
            return Feed::Pending;
        }
        if self.depth == 0 {
            Feed::Complete(self.take())
        } else {
            Feed::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Drop a half-entered block
    pub fn reset(&mut self) {
        self.lines.clear();
        self.depth = 0;
    }

    fn take(&mut self) -> String {
        let mut block = self.lines.join("\n");
        block.push('\n');
        self.reset();
        block
    }
}

/// Translate a block and evaluate it
pub fn evaluate_block<E: Evaluator>(
    transpiler: &Transpiler,
    evaluator: &mut E,
    block: &str,
) -> Result<String, String> {
    let canonical = transpiler.to_canonical(block);
    tracing::debug!(canonical = canonical.as_str(), "evaluating block");
    evaluator.evaluate(&canonical)
}

/// A line-editing session with persistent history
pub struct ReplSession<'a, E: Evaluator> {
    editor: DefaultEditor,
    history_path: PathBuf,
    prompt: String,
    continuation_prompt: String,
    transpiler: &'a Transpiler,
    evaluator: E,
    accumulator: BlockAccumulator,
}

impl<'a, E: Evaluator> ReplSession<'a, E> {
    pub fn new(
        transpiler: &'a Transpiler,
        evaluator: E,
        settings: &ReplSettings,
    ) -> Result<Self, DriverError> {
        let config = Config::builder()
            .max_history_size(settings.history_limit)?
            .auto_add_history(false)
            .build();
        let mut editor = DefaultEditor::with_config(config)?;

        let history_path = settings.history_path();
        if history_path.exists() {
            if let Err(e) = editor.load_history(&history_path) {
                tracing::warn!(path = %history_path.display(), "could not load history: {}", e);
            }
        }

        Ok(Self {
            editor,
            history_path,
            prompt: settings.prompt.clone(),
            continuation_prompt: settings.continuation_prompt.clone(),
            transpiler,
            evaluator,
            accumulator: BlockAccumulator::new(),
        })
    }

    /// Read, translate and evaluate until `exit`, `quit` or end of input
    pub fn run(&mut self) -> Result<(), DriverError> {
        let language = self.transpiler.document().language_info.name.clone();
        println!("{} REPL. Type exit or quit to leave.", language);

        loop {
            let prompt = if self.accumulator.is_pending() {
                &self.continuation_prompt
            } else {
                &self.prompt
            };

            let line = match self.editor.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    self.accumulator.reset();
                    println!("KeyboardInterrupt");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            if !self.accumulator.is_pending() && matches!(line.trim(), "exit" | "quit") {
                break;
            }
            if !line.trim().is_empty() {
                self.editor.add_history_entry(line.as_str())?;
            }

            if let Feed::Complete(block) = self.accumulator.feed(&line) {
                match evaluate_block(self.transpiler, &mut self.evaluator, &block) {
                    Ok(output) => print!("{}", output),
                    Err(message) => eprint!("{}", message),
                }
            }
        }

        Ok(())
    }
}

impl<E: Evaluator> Drop for ReplSession<'_, E> {
    fn drop(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        if let Err(e) = self.editor.save_history(&self.history_path) {
            tracing::warn!(path = %self.history_path.display(), "could not save history: {}", e);
        }
    }
}
