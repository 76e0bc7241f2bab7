use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

/// Answer to a prompt. Cancelling is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured<T> {
    Value(T),
    Cancelled,
}

/// Asks the user for a line of text
#[async_trait]
pub trait InputCapture: Send + Sync {
    async fn ask(&self, prompt: &str) -> Captured<String>;
}

/// Replays queued answers in order, then cancels
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: Mutex<VecDeque<Captured<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, text: impl Into<String>) -> Self {
        self.push(Captured::Value(text.into()));
        self
    }

    pub fn cancel(self) -> Self {
        self.push(Captured::Cancelled);
        self
    }

    fn push(&self, answer: Captured<String>) {
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(answer);
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl InputCapture for ScriptedInput {
    async fn ask(&self, prompt: &str) -> Captured<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Captured::Cancelled)
    }
}
