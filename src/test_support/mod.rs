//! Test utilities and mocks for unit tests.
//!
//! [`MockRunner`] stands in for real child processes: it records every
//! command it is asked to run and replies with scripted outcomes, optionally
//! running a side effect (such as writing the file a compiler would have
//! produced).
//!
//! # Example
//!
//! ```rust,ignore
//! use comp::test_support::{MockOutcome, MockRunner};
//!
//! let mut runner = MockRunner::new();
//! runner.expect_prefix("gcc", MockOutcome::Exit(1));
//! ```

pub mod fixtures;

use std::sync::Mutex;

use crate::util::process::{Cmd, ExecError, Runner};

pub use fixtures::*;

/// Scripted result of a mocked command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    /// Normal exit with the given status.
    Exit(i32),
    /// The child was killed by a signal.
    Signal(i32),
    /// The child could not be spawned.
    SpawnError,
}

/// Pattern for matching commands in [`MockRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Match if the command line starts with a prefix.
    StartsWith(String),
    /// Match if the command line contains a substring.
    Contains(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

type Effect = Box<dyn Fn(&[String]) + Send>;

struct Expectation {
    pattern: CommandPattern,
    outcome: MockOutcome,
    effect: Option<Effect>,
    times: Option<usize>,
    used: usize,
}

impl Expectation {
    fn available(&self) -> bool {
        self.times.map_or(true, |n| self.used < n)
    }
}

/// Mock process runner for testing command execution.
///
/// Commands that match no expectation exit with status 0.
#[derive(Default)]
pub struct MockRunner {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        pattern: CommandPattern,
        outcome: MockOutcome,
        effect: Option<Effect>,
        times: Option<usize>,
    ) -> &mut Self {
        self.expectations
            .get_mut()
            .expect("mock poisoned")
            .push(Expectation {
                pattern,
                outcome,
                effect,
                times,
                used: 0,
            });
        self
    }

    /// Reply with `outcome` to commands starting with `prefix`.
    pub fn expect_prefix(&mut self, prefix: &str, outcome: MockOutcome) -> &mut Self {
        self.push(
            CommandPattern::StartsWith(prefix.to_string()),
            outcome,
            None,
            None,
        )
    }

    /// Reply with `outcome` to the first `times` commands containing `substring`.
    pub fn expect_contains_times(
        &mut self,
        substring: &str,
        outcome: MockOutcome,
        times: usize,
    ) -> &mut Self {
        self.push(
            CommandPattern::Contains(substring.to_string()),
            outcome,
            None,
            Some(times),
        )
    }

    /// Reply with `outcome` to commands starting with `prefix`, running
    /// `effect` with the command's tokens first.
    pub fn expect_with(
        &mut self,
        prefix: &str,
        outcome: MockOutcome,
        effect: impl Fn(&[String]) + Send + 'static,
    ) -> &mut Self {
        self.push(
            CommandPattern::StartsWith(prefix.to_string()),
            outcome,
            Some(Box::new(effect)),
            None,
        )
    }

    /// Every command run so far, space-joined.
    pub fn calls(&self) -> Vec<String> {
        self.call_tokens().iter().map(|c| c.join(" ")).collect()
    }

    /// Every command run so far, as token lists.
    pub fn call_tokens(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("mock poisoned").clone()
    }
}

impl Runner for MockRunner {
    fn execute(&self, cmd: &Cmd<'_>) -> Result<i32, ExecError> {
        let program = cmd.program().ok_or(ExecError::Empty)?.to_string();
        let tokens: Vec<String> = cmd.tokens().iter().map(|t| t.to_string()).collect();
        let line = tokens.join(" ");
        self.calls.lock().expect("mock poisoned").push(tokens.clone());

        let mut expectations = self.expectations.lock().expect("mock poisoned");
        let outcome = match expectations
            .iter_mut()
            .find(|e| e.available() && e.pattern.matches(&line))
        {
            Some(exp) => {
                exp.used += 1;
                if let Some(effect) = &exp.effect {
                    effect(&tokens);
                }
                exp.outcome
            }
            None => MockOutcome::Exit(0),
        };

        match outcome {
            MockOutcome::Exit(code) => Ok(code),
            MockOutcome::Signal(signal) => Err(ExecError::Signaled { program, signal }),
            MockOutcome::SpawnError => Err(ExecError::Spawn {
                program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_records_and_replies() {
        let mut runner = MockRunner::new();
        runner.expect_prefix("gcc", MockOutcome::Exit(3));

        let mut cmd = Cmd::new("gcc");
        cmd.arg("-c");
        assert_eq!(runner.execute(&cmd).unwrap(), 3);
        assert_eq!(runner.execute(&Cmd::new("ar")).unwrap(), 0);
        assert_eq!(runner.calls(), ["gcc -c", "ar"]);
    }

    #[test]
    fn test_mock_runner_limited_times() {
        let mut runner = MockRunner::new();
        runner.expect_contains_times("x", MockOutcome::Exit(1), 1);

        let cmd = Cmd::new("x");
        assert_eq!(runner.execute(&cmd).unwrap(), 1);
        assert_eq!(runner.execute(&cmd).unwrap(), 0);
    }
}
