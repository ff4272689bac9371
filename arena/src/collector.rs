//! Answer collection: concurrent fan-out with per-contestant isolation.
//!
//! ```text
//! question ──► JoinSet::spawn(invoke(contestant_i)) × (N-1)
//!                 │ each bounded by tokio::time::timeout
//!                 ▼
//!          slots[i] = Ok(answer) | Failed(sentinel)
//! ```
//!
//! Results are written into the slot of the contestant's position, so the
//! returned order never depends on completion order. A failed, timed-out
//! or panicked task only ever affects its own slot.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::participant::Participant;
use crate::prompts::{self, Locale};
use crate::provider::{InvokeOptions, ProviderInvoker};
use crate::question::Question;
use crate::round::AnswerAttempt;

/// Run `invoker.invoke` under a time budget, mapping expiry to a provider error.
pub async fn invoke_with_timeout(
    invoker: &dyn ProviderInvoker,
    participant: &Participant,
    prompt: &str,
    options: &InvokeOptions,
    timeout: Duration,
) -> Result<String, ProviderError> {
    match tokio::time::timeout(timeout, invoker.invoke(participant, prompt, options)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timeout(timeout)),
    }
}

/// Fans a question out to every contestant of a round.
pub struct AnswerCollector {
    invoker: Arc<dyn ProviderInvoker>,
    options: InvokeOptions,
    timeout: Duration,
    locale: Locale,
}

impl AnswerCollector {
    pub fn new(
        invoker: Arc<dyn ProviderInvoker>,
        options: InvokeOptions,
        timeout: Duration,
        locale: Locale,
    ) -> Self {
        Self {
            invoker,
            options,
            timeout,
            locale,
        }
    }

    /// Exactly one attempt per contestant, in contestant order.
    pub async fn collect(
        &self,
        question: &Question,
        contestants: &[Arc<Participant>],
    ) -> Vec<AnswerAttempt> {
        info!(
            question_id = question.id,
            contestants = contestants.len(),
            "Collecting answers"
        );

        let prompt: Arc<str> = Arc::from(prompts::answer_prompt(self.locale, question));
        let sentinel = prompts::failure_sentinel(self.locale);
        let mut join_set: JoinSet<(usize, AnswerAttempt)> = JoinSet::new();

        for (index, contestant) in contestants.iter().enumerate() {
            let invoker = self.invoker.clone();
            let contestant = contestant.clone();
            let prompt = prompt.clone();
            let options = self.options;
            let timeout = self.timeout;

            join_set.spawn(async move {
                let result =
                    invoke_with_timeout(invoker.as_ref(), &contestant, &prompt, &options, timeout)
                        .await;
                let attempt = match result {
                    Ok(content) => AnswerAttempt::ok(&contestant.name, content),
                    Err(e) => {
                        warn!(participant = %contestant.name, error = %e, "Answer failed");
                        AnswerAttempt::failed(&contestant.name, e.to_string(), sentinel)
                    }
                };
                (index, attempt)
            });
        }

        let mut slots: Vec<Option<AnswerAttempt>> = vec![None; contestants.len()];
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok((index, attempt)) => {
                    debug!(participant = %attempt.participant, failed = attempt.is_failed(), "Answer slot filled");
                    slots[index] = Some(attempt);
                }
                Err(e) => {
                    // Slot stays empty and is filled below.
                    warn!(error = %e, "Answer task panicked");
                }
            }
        }

        slots
            .into_iter()
            .zip(contestants)
            .map(|(slot, contestant)| {
                slot.unwrap_or_else(|| {
                    AnswerAttempt::failed(&contestant.name, "answer task aborted", sentinel)
                })
            })
            .collect()
    }
}
