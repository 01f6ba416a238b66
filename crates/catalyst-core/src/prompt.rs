//! The question-and-answer seam between workflow decisions and the operator.
//!
//! Workflow steps decide *what* to ask; a [`Prompter`] decides *how*. The
//! binary supplies a terminal implementation; tests and scripted runs use
//! [`ScriptedPrompter`].

use crate::error::{CatalystError, Result};
use std::collections::VecDeque;

pub trait Prompter {
    /// Yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    /// Free-text question. An empty answer selects `default` when given.
    fn input(&mut self, question: &str, default: Option<&str>) -> Result<String>;

    /// Pick one of `options`, returning its index.
    fn select(&mut self, question: &str, options: &[&str], default: usize) -> Result<usize>;

    /// Informational line for the operator; never blocks.
    fn say(&mut self, message: &str);
}

/// A canned answer consumed by [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Text(String),
    Choice(usize),
    /// Accept whatever default the question offers.
    Default,
}

impl Answer {
    pub fn text(s: impl Into<String>) -> Self {
        Answer::Text(s.into())
    }
}

/// Replays answers in order and records every question and message.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    pub asked: Vec<String>,
    pub said: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
            said: Vec::new(),
        }
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, question: &str) -> Result<Answer> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| CatalystError::Prompt(format!("no scripted answer for: {question}")))
    }

    fn mismatch(question: &str, answer: &Answer) -> CatalystError {
        CatalystError::Prompt(format!("unexpected answer {answer:?} for: {question}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        match self.next(question)? {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            Answer::Default => Ok(default),
            other => Err(Self::mismatch(question, &other)),
        }
    }

    fn input(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next(question)?;
        let text = match answer {
            Answer::Text(t) => t,
            Answer::Default => String::new(),
            other => return Err(Self::mismatch(question, &other)),
        };
        match (text.trim().is_empty(), default) {
            (true, Some(d)) => Ok(d.to_string()),
            _ => Ok(text.trim().to_string()),
        }
    }

    fn select(&mut self, question: &str, options: &[&str], default: usize) -> Result<usize> {
        match self.next(question)? {
            Answer::Choice(i) if i < options.len() => Ok(i),
            Answer::Default => Ok(default),
            other => Err(Self::mismatch(question, &other)),
        }
    }

    fn say(&mut self, message: &str) {
        self.said.push(message.to_string());
    }
}
