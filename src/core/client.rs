//! Async translation client with retry and backoff

use std::fmt;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::core::backend::{CompletionBackend, GeminiBackend};
use crate::core::config::{EchoCheck, TranslatorConfig};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{CompletionRequest, RequestBatch, TranslationRecord};
use crate::core::prompt::{build_prompt, SYSTEM_INSTRUCTION};
use crate::core::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::core::schema::record_schema;

/// Translates a batch of Korean strings into every export language.
///
/// Each [`translate`](Self::translate) call owns its own retry state, so one
/// client can serve overlapping calls without coordination.
#[derive(Clone)]
pub struct TranslationClient<B = GeminiBackend> {
    backend: B,
    api_key: Option<String>,
    model: String,
    policy: RetryPolicy,
    echo_check: EchoCheck,
}

impl<B> fmt::Debug for TranslationClient<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("policy", &self.policy)
            .field("echo_check", &self.echo_check)
            .finish()
    }
}

impl TranslationClient<GeminiBackend> {
    /// Create a client talking to Gemini
    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        config.validate().map_err(|e| TranslationError::Configuration {
            message: e.to_string(),
        })?;
        let backend = GeminiBackend::from_config(config)?;
        Ok(Self::new(config, backend))
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::from_env().map_err(|e| TranslationError::Configuration {
            message: e.to_string(),
        })?;
        Self::from_config(&config)
    }
}

impl<B: CompletionBackend> TranslationClient<B> {
    pub fn new(config: &TranslatorConfig, backend: B) -> Self {
        Self {
            backend,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            policy: config.retry_policy(),
            echo_check: config.echo_check,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Request sent upstream for a batch
    pub fn build_request(&self, batch: &RequestBatch) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: build_prompt(batch.items()),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            response_schema: record_schema().clone(),
        }
    }

    /// Translate `items`, returning one record per non-blank item in order.
    ///
    /// Blank entries are dropped; an all-blank input returns an empty list
    /// without contacting the service.
    pub async fn translate<I, S>(&self, items: I) -> Result<Vec<TranslationRecord>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| TranslationError::Configuration {
                message: TranslatorConfig::missing_key_message(),
            })?;

        let batch = RequestBatch::from_items(items);
        if batch.is_empty() {
            debug!("Nothing to translate");
            return Ok(Vec::new());
        }
        batch.validate()?;

        let request = self.build_request(&batch);
        let mut state = RetryState::new();

        info!(
            "Translating {} items with {} via {}",
            batch.len(),
            self.model,
            self.backend.name()
        );

        loop {
            match self.attempt(api_key, &request, &batch).await {
                Ok(records) => {
                    if state.attempt() > 1 {
                        info!(
                            "Successfully translated after {} attempts ({:?} waited)",
                            state.attempt(),
                            state.total_waited()
                        );
                    }
                    return Ok(records);
                }
                Err(e) => {
                    warn!("Translation attempt {} failed: {}", state.attempt(), e);

                    match state.on_failure(e, &self.policy) {
                        RetryDecision::RetryAfter(wait) => {
                            info!("Retrying in {}ms...", wait.as_millis());
                            sleep(wait).await;
                            state.advance();
                        }
                        RetryDecision::GiveUp => break,
                    }
                }
            }
        }

        let err = state.into_error();
        error!("Final translation error: {}", err);
        Err(err)
    }

    /// One network round trip plus decoding
    async fn attempt(
        &self,
        api_key: &str,
        request: &CompletionRequest,
        batch: &RequestBatch,
    ) -> Result<Vec<TranslationRecord>> {
        let text = self
            .backend
            .complete(api_key, request)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| TranslationError::MalformedResponse {
                message: "no response received from the service".to_string(),
            })?;

        let records: Vec<TranslationRecord> =
            serde_json::from_str(&text).map_err(|e| TranslationError::MalformedResponse {
                message: format!("response does not match the record schema: {}", e),
            })?;

        for record in records.iter().filter(|r| !r.has_conventional_key()) {
            debug!("Key '{}' is not snake_case", record.key);
        }

        check_echo(records, batch, self.echo_check)
    }
}

/// Enforce the one-record-per-item and Korean echo contract
fn check_echo(
    mut records: Vec<TranslationRecord>,
    batch: &RequestBatch,
    mode: EchoCheck,
) -> Result<Vec<TranslationRecord>> {
    if mode == EchoCheck::Trust {
        return Ok(records);
    }

    if records.len() != batch.len() {
        return Err(TranslationError::MalformedResponse {
            message: format!(
                "expected {} records, received {}",
                batch.len(),
                records.len()
            ),
        });
    }

    for (index, (record, source)) in records.iter_mut().zip(batch.items()).enumerate() {
        if record.korean == *source {
            continue;
        }
        match mode {
            EchoCheck::Reject => {
                return Err(TranslationError::MalformedResponse {
                    message: format!(
                        "record {} echoes {:?} instead of {:?}",
                        index + 1,
                        record.korean,
                        source
                    ),
                });
            }
            _ => {
                warn!(
                    "Record {} echoed {:?}, restoring source text {:?}",
                    index + 1,
                    record.korean,
                    source
                );
                record.korean = source.clone();
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::language::Language;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    type Reply = Result<Option<String>>;

    /// Backend answering from a fixed script, counting calls
    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
        seen: Mutex<Vec<(String, CompletionRequest)>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((api_key.to_string(), request.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TranslationError::Service {
                    status: None,
                    message: "script exhausted".to_string(),
                }))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn config() -> TranslatorConfig {
        TranslatorConfig::default().with_api_key("test-key")
    }

    fn client(replies: Vec<Reply>) -> TranslationClient<ScriptedBackend> {
        TranslationClient::new(&config(), ScriptedBackend::new(replies))
    }

    /// A well-formed service answer echoing `items`
    fn answer_for(items: &[&str]) -> Reply {
        let records: Vec<TranslationRecord> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let mut record = TranslationRecord::empty(format!("item_{}", i));
                for lang in Language::ALL {
                    record.set(lang, format!("{} ({})", item, lang.field_name()));
                }
                record.with(Language::Korean, *item)
            })
            .collect();
        Ok(Some(serde_json::to_string(&records).unwrap()))
    }

    fn rate_limited() -> Reply {
        Err(TranslationError::RateLimited { message: "429 RESOURCE_EXHAUSTED".to_string() })
    }

    fn overloaded() -> Reply {
        Err(TranslationError::Overloaded { message: "503 UNAVAILABLE".to_string() })
    }

    #[tokio::test]
    async fn test_blank_entries_are_removed_before_batching() {
        let client = client(vec![answer_for(&["안녕하세요"])]);

        let records = assert_ok!(client.translate(["안녕하세요", "", "  "]).await);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].korean, "안녕하세요");
        assert!(!records[0].key.is_empty());
        for (lang, text) in records[0].translations() {
            assert!(!text.is_empty(), "{} is empty", lang);
        }
        assert_eq!(client.backend().calls(), 1);

        let seen = client.backend().seen.lock().unwrap();
        assert_eq!(seen[0].0, "test-key");
        assert!(seen[0].1.prompt.contains(r#"["안녕하세요"]"#));
    }

    #[tokio::test]
    async fn test_all_blank_input_makes_no_call() {
        let client = client(vec![]);
        let records = assert_ok!(client.translate(vec!["", "   ", "\n"]).await);
        assert!(records.is_empty());
        assert_eq!(client.backend().calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_call() {
        let client = TranslationClient::new(&TranslatorConfig::default(), ScriptedBackend::new(vec![]));
        let err = assert_err!(client.translate(["안녕하세요"]).await);
        assert!(matches!(err, TranslationError::Configuration { .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert_eq!(client.backend().calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_batch_fails_without_call() {
        let client = client(vec![]);
        let items: Vec<String> = (0..16).map(|i| format!("문장 {}", i)).collect();
        let err = assert_err!(client.translate(items).await);
        assert!(matches!(err, TranslationError::InvalidInput { .. }));
        assert_eq!(client.backend().calls(), 0);
    }

    #[tokio::test]
    async fn test_request_carries_schema_and_instruction() {
        let client = client(vec![answer_for(&["확인"])]);
        assert_ok!(client.translate(["확인"]).await);

        let seen = client.backend().seen.lock().unwrap();
        let request = &seen[0].1;
        assert_eq!(request.model, client.model());
        assert_eq!(request.system_instruction, SYSTEM_INSTRUCTION);
        assert_eq!(&request.response_schema, record_schema());
    }

    #[tokio::test]
    async fn test_success_preserves_length_and_echo() {
        let items = ["저장", "취소", "다시 시도"];
        let client = client(vec![answer_for(&items)]);
        let records = assert_ok!(client.translate(items).await);

        assert_eq!(records.len(), items.len());
        for (record, item) in records.iter().zip(items) {
            assert_eq!(record.source_text(), item);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_transient_failures_then_success() {
        let client = client(vec![
            rate_limited(),
            overloaded(),
            rate_limited(),
            overloaded(),
            answer_for(&["안녕하세요"]),
        ]);

        let start = Instant::now();
        let records = assert_ok!(client.translate(["안녕하세요"]).await);
        let elapsed = start.elapsed();

        assert_eq!(records.len(), 1);
        assert_eq!(client.backend().calls(), 5);
        assert!(elapsed >= Duration::from_millis(45_000), "waited {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(45_100), "waited {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion() {
        let client = client((0..5).map(|_| rate_limited()).collect());

        let start = Instant::now();
        let err = assert_err!(client.translate(["안녕하세요"]).await);

        assert_eq!(client.backend().calls(), 5);
        // no wait after the final attempt
        assert!(start.elapsed() < Duration::from_millis(45_100));
        assert!(matches!(err, TranslationError::RateLimited { .. }));
        assert!(err.to_string().contains("retry in about a minute"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overload_exhaustion() {
        let client = client((0..5).map(|_| overloaded()).collect());
        let err = assert_err!(client.translate(["안녕하세요"]).await);

        assert_eq!(client.backend().calls(), 5);
        assert!(matches!(err, TranslationError::Overloaded { .. }));
        assert!(err.to_string().contains("temporarily unstable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_is_not_retried() {
        let client = client(vec![
            Err(TranslationError::Service {
                status: Some(400),
                message: "API key not valid. Please pass a valid API key.".to_string(),
            }),
            answer_for(&["안녕하세요"]),
        ]);

        let start = Instant::now();
        let err = assert_err!(client.translate(["안녕하세요"]).await);

        assert_eq!(client.backend().calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(err.to_string(), "API key not valid. Please pass a valid API key.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_by_message_text_is_retried() {
        let client = client(vec![
            Err(TranslationError::Service {
                status: None,
                message: "got 503 from upstream".to_string(),
            }),
            answer_for(&["안녕하세요"]),
        ]);

        assert_ok!(client.translate(["안녕하세요"]).await);
        assert_eq!(client.backend().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_by_message_text_exhaustion_reports_kind() {
        let service = |message: &str| -> Reply {
            Err(TranslationError::Service { status: None, message: message.to_string() })
        };

        let client = client((0..5).map(|_| service("got 503 from upstream")).collect());
        let err = assert_err!(client.translate(["안녕하세요"]).await);
        assert_eq!(client.backend().calls(), 5);
        assert!(matches!(err, TranslationError::Overloaded { .. }));
        assert!(err.to_string().contains("temporarily unstable"));
        assert!(err.user_message().contains("불안정"));

        let client = self::client((0..5).map(|_| service("HTTP 429 from proxy")).collect());
        let err = assert_err!(client.translate(["안녕하세요"]).await);
        assert_eq!(client.backend().calls(), 5);
        assert!(err.to_string().contains("retry in about a minute"));
    }

    #[test]
    fn test_client_is_clone() {
        let client = TranslationClient::from_config(&config()).unwrap();
        let copy = client.clone();
        assert_eq!(copy.model(), client.model());
        assert_eq!(copy.policy(), client.policy());
    }

    #[tokio::test]
    async fn test_empty_body_is_terminal_malformed() {
        let client = client(vec![Ok(None), answer_for(&["안녕하세요"])]);
        let err = assert_err!(client.translate(["안녕하세요"]).await);
        assert!(matches!(err, TranslationError::MalformedResponse { .. }));
        assert_eq!(client.backend().calls(), 1);

        let client = self::client(vec![Ok(Some("   ".to_string()))]);
        let err = assert_err!(client.translate(["안녕하세요"]).await);
        assert!(matches!(err, TranslationError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_terminal_malformed() {
        let client = client(vec![
            Ok(Some(r#"[{"key": "hello", "Korean": "안녕하세요"}]"#.to_string())),
            answer_for(&["안녕하세요"]),
        ]);
        let err = assert_err!(client.translate(["안녕하세요"]).await);
        assert!(matches!(err, TranslationError::MalformedResponse { .. }));
        assert_eq!(client.backend().calls(), 1);
    }

    #[tokio::test]
    async fn test_echo_repair_restores_source() {
        let Ok(Some(body)) = answer_for(&["안녕 하세요"]) else { unreachable!() };
        let client = client(vec![Ok(Some(body))]);

        let records = assert_ok!(client.translate(["안녕하세요"]).await);
        assert_eq!(records[0].korean, "안녕하세요");
    }

    #[tokio::test]
    async fn test_echo_reject_and_count_mismatch() {
        let config = TranslatorConfig {
            echo_check: EchoCheck::Reject,
            ..config()
        };
        let client = TranslationClient::new(&config, ScriptedBackend::new(vec![answer_for(&["안녕"])]));
        let err = assert_err!(client.translate(["안녕하세요"]).await);
        assert!(matches!(err, TranslationError::MalformedResponse { .. }));

        let client = self::client(vec![answer_for(&["하나", "둘"])]);
        let err = assert_err!(client.translate(["하나"]).await);
        assert!(err.to_string().contains("expected 1 records, received 2"));
    }

    #[tokio::test]
    async fn test_echo_trust_returns_as_is() {
        let config = TranslatorConfig {
            echo_check: EchoCheck::Trust,
            ..config()
        };
        let client = TranslationClient::new(&config, ScriptedBackend::new(vec![answer_for(&["하나", "둘"])]));
        let records = assert_ok!(client.translate(["하나"]).await);
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_calls_are_independent() {
        let client = client(vec![answer_for(&["하나"]), answer_for(&["하나"])]);
        let (a, b) = tokio::join!(client.translate(["하나"]), client.translate(["하나"]));
        assert_ok!(a);
        assert_ok!(b);
        assert_eq!(client.backend().calls(), 2);
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = client(vec![]);
        let printed = format!("{:?}", client);
        assert!(!printed.contains("test-key"));
        assert!(printed.contains("<redacted>"));
    }
}
