//! Tests for the tool loop and the agent entry point.

#[cfg(test)]
mod tests {
    use crate::agent::agent_loop::run_tool_loop;
    use crate::agent::progress::{
        ProgressNotification, STEP_ANALYZING_RESULTS, STEP_GENERATING_RESPONSE,
        STEP_PROCESSING_QUESTION, STEP_STARTING,
    };
    use crate::agent::{
        Agent, AgentRequest, InMemoryMessageStore, InMemoryProgress, ProgressTracker,
    };
    use crate::config::{AgentLimits, AppConfig};
    use crate::domain::{RepositoryContext, RepositoryMetadata};
    use crate::github::{GitHubClient, RetryPolicy};
    use crate::llm::{ModelTurn, ProviderError, ProviderSession};
    use crate::response::ResponseKind;
    use crate::tools::{
        all_declarations, ToolDeclaration, ToolExecutor, ToolInvocation, ToolRegistry, ToolResult,
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn invocation(id: &str, name: &str) -> ToolInvocation {
        ToolInvocation {
            id: id.to_string(),
            name: name.to_string(),
            arguments: json!({"owner": "acme", "repo": "widgets"}),
        }
    }

    /// Replays scripted turns; once the script runs out, repeats `fallback`.
    struct ScriptedSession {
        turns: VecDeque<ModelTurn>,
        fallback: ModelTurn,
        opening_calls: usize,
        continue_calls: usize,
        fed_back: Vec<Vec<String>>,
    }

    impl ScriptedSession {
        fn new(turns: Vec<ModelTurn>, fallback: ModelTurn) -> Self {
            Self {
                turns: turns.into(),
                fallback,
                opening_calls: 0,
                continue_calls: 0,
                fed_back: Vec::new(),
            }
        }

        fn next_turn(&mut self) -> ModelTurn {
            self.turns
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone())
        }
    }

    #[async_trait]
    impl ProviderSession for ScriptedSession {
        async fn converse_turn(&mut self, _user_message: &str) -> Result<ModelTurn, ProviderError> {
            self.opening_calls += 1;
            Ok(self.next_turn())
        }

        async fn continue_with_tool_results(
            &mut self,
            results: &[ToolResult],
        ) -> Result<ModelTurn, ProviderError> {
            self.continue_calls += 1;
            self.fed_back
                .push(results.iter().map(|r| r.call_id.clone()).collect());
            Ok(self.next_turn())
        }
    }

    /// Echoes the tool name back after a per-tool delay.
    struct DelayedExecutor {
        delays: Vec<(&'static str, Duration)>,
        finished: Mutex<Vec<String>>,
    }

    impl DelayedExecutor {
        fn new(delays: Vec<(&'static str, Duration)>) -> Self {
            Self {
                delays,
                finished: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolExecutor for DelayedExecutor {
        fn declarations(&self) -> &[ToolDeclaration] {
            all_declarations()
        }

        async fn execute(&self, name: &str, _arguments: &Value) -> Value {
            let delay = self
                .delays
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, d)| *d)
                .unwrap_or_default();
            tokio::time::sleep(delay).await;
            self.finished.lock().unwrap().push(name.to_string());
            if name == "getIssues" {
                json!({"error": "Tool error: boom"})
            } else {
                json!({"tool": name})
            }
        }
    }

    /// Keeps every notification and every clear, in order.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<Option<String>>>,
    }

    impl RecordingProgress {
        fn steps(&self) -> Vec<Option<String>> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProgressTracker for RecordingProgress {
        async fn update(&self, _session_id: &str, notification: ProgressNotification) {
            self.events
                .lock()
                .unwrap()
                .push(Some(notification.current_step));
        }

        async fn clear(&self, _session_id: &str) {
            self.events.lock().unwrap().push(None);
        }

        async fn current(&self, _session_id: &str) -> Option<ProgressNotification> {
            self.events
                .lock()
                .unwrap()
                .last()
                .cloned()
                .flatten()
                .map(ProgressNotification::analyzing)
        }
    }

    #[tokio::test]
    async fn test_loop_stops_at_iteration_ceiling() {
        let always_tools = ModelTurn {
            assistant_text: "still working".to_string(),
            tool_invocations: vec![invocation("c1", "getContributors")],
        };
        let mut session = ScriptedSession::new(Vec::new(), always_tools);
        let tools = DelayedExecutor::new(Vec::new());
        let progress = InMemoryProgress::new();

        let outcome = run_tool_loop(&mut session, &tools, &progress, "s1", "hi", 10)
            .await
            .unwrap();

        assert!(outcome.hit_ceiling);
        assert_eq!(outcome.iterations, 10);
        assert_eq!(outcome.tool_calls.len(), 10);
        assert_eq!(outcome.final_text, "still working");
        assert_eq!(session.opening_calls, 1);
        assert_eq!(session.continue_calls, 10);
        assert_eq!(tools.finished.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_batch_results_keep_invocation_order() {
        let batch = ModelTurn {
            assistant_text: String::new(),
            tool_invocations: vec![
                invocation("a", "getContributors"),
                invocation("b", "getIssues"),
                invocation("c", "getLanguages"),
            ],
        };
        let done = ModelTurn {
            assistant_text: "done".to_string(),
            tool_invocations: Vec::new(),
        };
        let mut session = ScriptedSession::new(vec![batch], done.clone());
        let tools = DelayedExecutor::new(vec![("getIssues", Duration::from_millis(50))]);
        let progress = RecordingProgress::default();

        let outcome = run_tool_loop(&mut session, &tools, &progress, "s1", "hi", 10)
            .await
            .unwrap();

        assert!(!outcome.hit_ceiling);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.final_text, "done");
        assert_eq!(session.fed_back, vec![vec!["a", "b", "c"]]);

        // The slow tool finished last, but the audit log follows invocation order.
        assert_eq!(tools.finished.lock().unwrap().last().unwrap(), "getIssues");
        let names: Vec<_> = outcome.tool_calls.iter().map(|c| c.tool_name.as_str()).collect();
        assert_eq!(names, ["getContributors", "getIssues", "getLanguages"]);
        assert_eq!(outcome.tool_calls[0].result_summary, json!("success"));
        assert_eq!(
            outcome.tool_calls[1].result_summary,
            json!({"error": "Tool error: boom"})
        );

        let steps = progress.steps();
        assert_eq!(steps[0].as_deref(), Some(STEP_PROCESSING_QUESTION));
        assert_eq!(steps.len(), 5);
        assert!(steps[1].as_deref().unwrap().contains("contributors"));
        assert_eq!(steps[4].as_deref(), Some(STEP_ANALYZING_RESULTS));
    }

    #[tokio::test]
    async fn test_no_tool_requests_means_single_call() {
        let answer = ModelTurn {
            assistant_text: "plain answer".to_string(),
            tool_invocations: Vec::new(),
        };
        let mut session = ScriptedSession::new(vec![answer.clone()], answer);
        let tools = DelayedExecutor::new(Vec::new());
        let progress = InMemoryProgress::new();

        let outcome = run_tool_loop(&mut session, &tools, &progress, "s1", "hi", 10)
            .await
            .unwrap();

        assert_eq!(outcome.final_text, "plain answer");
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.tool_calls.is_empty());
        assert_eq!(session.continue_calls, 0);
    }

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            gemini_api_key: Some("gemini-test".to_string()),
            gemini_base_url: server.uri(),
            groq_base_url: server.uri(),
            github_api_url: server.uri(),
            ..AppConfig::default()
        }
    }

    fn agent_for(
        server: &MockServer,
        config: AppConfig,
        progress: Arc<dyn ProgressTracker>,
        store: Arc<InMemoryMessageStore>,
    ) -> Agent {
        let github = GitHubClient::new(&server.uri(), None, AgentLimits::default())
            .unwrap()
            .with_retry_policy(RetryPolicy::none());
        Agent::new(config, Arc::new(ToolRegistry::new(github)), progress, store)
    }

    fn request(model_id: Option<&str>) -> AgentRequest {
        AgentRequest {
            session_id: "session-1".to_string(),
            query: "Who are the top contributors?".to_string(),
            repository: RepositoryContext::new("acme", "widgets").with_metadata(
                RepositoryMetadata {
                    stars: 420,
                    forks: 17,
                    language: Some("Rust".to_string()),
                    open_issues: 5,
                    contributor_count: 2,
                },
            ),
            focus_contributors: Vec::new(),
            model_id: model_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_contributor_table_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [
                    {"functionCall": {"id": "call-1", "name": "getContributors",
                                      "args": {"owner": "acme", "repo": "widgets", "limit": 2}}}
                ]}}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        let table = r#"{"type":"table","data":{"title":"Top Contributors","headers":["Login","Contributions"],"rows":[["alice",120],["bob",75]]}}"#;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": table}]}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/contributors"))
            .and(query_param("per_page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"login": "alice", "contributions": 120, "type": "User"},
                {"login": "bob", "contributions": 75, "type": "User"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let progress = Arc::new(RecordingProgress::default());
        let store = Arc::new(InMemoryMessageStore::new());
        let agent = agent_for(&server, config_for(&server), progress.clone(), store.clone());

        let response = agent.run(request(None)).await.unwrap();

        assert_eq!(response.response.kind, ResponseKind::Table);
        assert_eq!(response.response.data["rows"], json!([["alice", 120], ["bob", 75]]));
        assert_eq!(response.tool_invocations.len(), 1);
        assert_eq!(response.tool_invocations[0].tool_name, "getContributors");
        assert_eq!(response.tool_invocations[0].result_summary, json!("success"));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "table");
        assert_eq!(value["toolInvocations"][0]["toolName"], "getContributors");

        let messages = store.messages("session-1").await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Table: Top Contributors");
        assert_eq!(messages[0].tool_calls.as_ref().map(Vec::len), Some(1));

        let steps = progress.steps();
        assert_eq!(steps.first().cloned().flatten().as_deref(), Some(STEP_STARTING));
        assert!(steps.contains(&Some(STEP_GENERATING_RESPONSE.to_string())));
        assert_eq!(steps.last(), Some(&None));

        let opening = &server.received_requests().await.unwrap()[0];
        let body: Value = serde_json::from_slice(&opening.body).unwrap();
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Repository: acme/widgets (owner: acme, repo: widgets)"));
        assert!(text.ends_with("User question: Who are the top contributors?"));
    }

    #[tokio::test]
    async fn test_missing_groq_key_short_circuits() {
        let server = MockServer::start().await;
        let progress = Arc::new(RecordingProgress::default());
        let store = Arc::new(InMemoryMessageStore::new());
        let agent = agent_for(&server, config_for(&server), progress.clone(), store.clone());

        let response = agent
            .run(request(Some("llama-3.3-70b-versatile")))
            .await
            .unwrap();

        assert_eq!(response.response.kind, ResponseKind::Text);
        let content = response.response.data["content"].as_str().unwrap();
        assert!(content.contains("GROQ_API_KEY"));
        assert!(response.tool_invocations.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(progress.steps().is_empty());
        assert_eq!(store.messages("session-1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_becomes_friendly_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "code": 429,
                    "message": "Quota exceeded for metric: generate_content_free_tier_requests, model: gemini-2.5-flash",
                    "status": "RESOURCE_EXHAUSTED",
                    "details": [{
                        "@type": "type.googleapis.com/google.rpc.RetryInfo",
                        "retryDelay": "90s"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let progress = Arc::new(InMemoryProgress::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let agent = agent_for(&server, config_for(&server), progress.clone(), store.clone());

        let response = agent.run(request(None)).await.unwrap();

        assert_eq!(response.response.kind, ResponseKind::Text);
        let content = response.response.data["content"].as_str().unwrap();
        assert!(content.contains("Rate Limit Reached"));
        assert!(content.contains("about 2 minutes"));
        assert!(content.contains("gemini-2.5-flash"));
        assert!(progress.current("session-1").await.is_none());
        assert_eq!(store.messages("session-1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_model_not_found_names_selected_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-0-nope:generateContent"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "models/gemini-0-nope is not found"}
            })))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryMessageStore::new());
        let agent = agent_for(
            &server,
            config_for(&server),
            Arc::new(InMemoryProgress::new()),
            store,
        );

        let response = agent.run(request(Some("gemini-0-nope"))).await.unwrap();
        let content = response.response.data["content"].as_str().unwrap();
        assert!(content.contains("Model Not Found"));
        assert!(content.contains("(gemini-0-nope)"));
    }
}
