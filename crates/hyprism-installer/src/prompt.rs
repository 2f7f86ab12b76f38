// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Interactive prompts

use crate::error::Result;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Source of operator answers
pub trait Prompter {
    /// Ask a yes/no question. Only `y`/`yes` (any case) count as yes.
    fn confirm(&mut self, message: &str) -> Result<bool>;

    /// Ask for a path. The raw answer is returned; expansion is up to the caller.
    fn read_path(&mut self, message: &str) -> Result<String>;
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}

/// Prompts on a line-based reader/writer pair, normally stdin/stdout
#[derive(Debug)]
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        // EOF reads as an empty answer
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_owned())
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let answer = self.ask(&format!("{message} [y/N]: "))?;
        Ok(is_affirmative(&answer))
    }

    fn read_path(&mut self, message: &str) -> Result<String> {
        self.ask(&format!("{message}: "))
    }
}

/// Pre-recorded answers, consumed in order. Running out reads as "no" / "".
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Every prompt shown so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next_answer(&mut self, message: &str) -> String {
        self.asked.push(message.to_owned());
        self.answers.pop_front().unwrap_or_default()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        Ok(is_affirmative(&self.next_answer(message)))
    }

    fn read_path(&mut self, message: &str) -> Result<String> {
        Ok(self.next_answer(message).trim().to_owned())
    }
}
