//! Decides what the robot says back.
//!
//! The generative provider is preferred. Whenever it is missing, slow,
//! failing or returns something unusable, the keyword rules answer instead,
//! so `resolve` always produces a reply.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::ProviderError;
use crate::model::retry::RetryPolicy;
use crate::model::{build_prompt, Provider};
use crate::rules::picker::ReplyPicker;
use crate::rules::RuleTable;
use crate::web::models::{ConversationTurn, Utterance};

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplySource {
    Generative,
    FallbackNoApi,
    FallbackAfterError,
    Validation,
    FallbackStatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverResult {
    pub reply_text: String,
    pub source: ReplySource,
}

pub struct ResponseResolver {
    provider: Option<Arc<dyn Provider>>,
    rules: RuleTable,
    picker: Arc<dyn ReplyPicker>,
    retry: RetryPolicy,
    timeout: Duration,
    min_reply_chars: usize,
}

impl ResponseResolver {
    pub fn new(
        provider: Option<Arc<dyn Provider>>,
        rules: RuleTable,
        picker: Arc<dyn ReplyPicker>,
    ) -> Self {
        Self {
            provider,
            rules,
            picker,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(15),
            min_reply_chars: 5,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_reply_chars(mut self, min_reply_chars: usize) -> Self {
        self.min_reply_chars = min_reply_chars;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn resolve(
        &self,
        utterance: &Utterance,
        history: &[ConversationTurn],
    ) -> ResolverResult {
        let Some(provider) = &self.provider else {
            return self.from_rules(utterance, history, ReplySource::FallbackNoApi);
        };

        let prompt = build_prompt(utterance, history);
        match self.generate_with_retry(provider.as_ref(), &prompt).await {
            Ok(reply_text) => ResolverResult {
                reply_text,
                source: ReplySource::Generative,
            },
            Err(e) => {
                warn!("{} failed, answering from rules: {}", provider.name(), e);
                self.from_rules(utterance, history, ReplySource::FallbackAfterError)
            }
        }
    }

    fn from_rules(
        &self,
        utterance: &Utterance,
        history: &[ConversationTurn],
        source: ReplySource,
    ) -> ResolverResult {
        ResolverResult {
            reply_text: self.rules.reply(utterance, history, self.picker.as_ref()),
            source,
        }
    }

    /// Attempts share one deadline of `self.timeout`; neither an attempt nor
    /// a back-off sleep may run past it.
    async fn generate_with_retry(
        &self,
        provider: &dyn Provider,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let deadline = Instant::now() + self.timeout;
        let mut attempt = 1;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ProviderError::Timeout(self.timeout));
            }

            match self.generate_once(provider, prompt, remaining).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    if delay >= deadline.saturating_duration_since(Instant::now()) {
                        info!("Attempt {} failed ({}), no time left to retry", attempt, e);
                        return Err(e);
                    }
                    info!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, self.retry.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn generate_once(
        &self,
        provider: &dyn Provider,
        prompt: &str,
        budget: Duration,
    ) -> Result<String, ProviderError> {
        let text = tokio::time::timeout(budget, provider.generate(prompt))
            .await
            .map_err(|_| ProviderError::Timeout(budget))??;

        let trimmed = text.trim();
        let length = trimmed.chars().count();
        if length < self.min_reply_chars {
            return Err(ProviderError::TooShort(length));
        }
        Ok(trimmed.to_string())
    }
}
