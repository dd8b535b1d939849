use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};

use docqa_core::traits::Generator;

enum Reply {
    Echo,
    Fixed(String),
    Fail(String),
}

/// Scripted generator for tests and offline runs. Records every prompt it
/// receives; by default it answers with a short summary of the prompt.
pub struct FakeGenerator {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    fn with_reply(reply: Reply) -> Self {
        Self { reply, calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) }
    }

    pub fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    pub fn answering(reply: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fixed(reply.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().ok().and_then(|p| p.last().cloned())
    }
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self::echo()
    }
}

/// One line naming the question and how many sources the prompt carried.
fn summarize(prompt: &str) -> String {
    let sources = prompt.lines().filter(|l| l.starts_with("Source ") && l.ends_with(':')).count();
    let question = prompt
        .split("Question:")
        .nth(1)
        .and_then(|rest| rest.lines().map(str::trim).find(|l| !l.is_empty()))
        .unwrap_or_else(|| prompt.trim());
    let question: String = question.chars().take(120).collect();
    format!("Stub answer to \"{question}\" drawn from {sources} source(s).")
}

impl Generator for FakeGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.reply {
            Reply::Echo => Ok(summarize(prompt)),
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Fail(message) => bail!("{}", message),
        }
    }
}
