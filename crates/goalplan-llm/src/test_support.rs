//! Scripted in-process backend for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use goalplan_utils::error::LlmError;

use crate::types::{LlmBackend, LlmInvocation, LlmResult};

/// One scripted answer.
#[derive(Debug)]
pub enum ScriptedReply {
    Text(String),
    Fail(LlmError),
}

/// Backend that replays queued replies in order and records every
/// invocation it receives.
///
/// Once the queue is empty every call fails with `LlmError::Transport`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    calls: Arc<Mutex<Vec<LlmInvocation>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend answering each call with the next text, in order.
    #[must_use]
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        for text in texts {
            backend.push_text(text);
        }
        backend
    }

    pub fn push_text(&self, text: impl Into<String>) {
        lock(&self.replies).push_back(ScriptedReply::Text(text.into()));
    }

    pub fn push_error(&self, error: LlmError) {
        lock(&self.replies).push_back(ScriptedReply::Fail(error));
    }

    /// Invocations received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<LlmInvocation> {
        lock(&self.calls).clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        let model = inv.model.clone();
        lock(&self.calls).push(inv);

        match lock(&self.replies).pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(LlmResult::new(text, "scripted", model)),
            Some(ScriptedReply::Fail(error)) => Err(error),
            None => Err(LlmError::Transport("scripted backend exhausted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use goalplan_utils::types::ArtifactKind;
    use std::time::Duration;

    fn inv() -> LlmInvocation {
        LlmInvocation::new(
            ArtifactKind::Questions,
            "m",
            Duration::from_secs(1),
            vec![Message::user("hi")],
        )
    }

    #[tokio::test]
    async fn replays_in_order_then_exhausts() {
        let backend = ScriptedBackend::with_texts(["one"]);
        backend.push_error(LlmError::ProviderOutage("down".to_string()));

        assert_eq!(backend.invoke(inv()).await.unwrap().raw_response, "one");
        assert!(matches!(
            backend.invoke(inv()).await,
            Err(LlmError::ProviderOutage(_))
        ));
        assert!(matches!(
            backend.invoke(inv()).await,
            Err(LlmError::Transport(_))
        ));
        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.calls()[0].messages[0].content, "hi");
    }
}
