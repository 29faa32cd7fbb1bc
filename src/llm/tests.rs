//! Wire-level tests for the provider adapters.

#[cfg(test)]
mod tests {
    use crate::llm::{open_session, ProviderKind, SessionSettings};
    use crate::tools::{all_declarations, ToolResult};
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn settings<'a>(server_uri: &'a str, model: &'a str) -> SessionSettings<'a> {
        SessionSettings {
            model,
            api_key: "test-key",
            base_url: server_uri,
            system_prompt: "You are a repository analyst.",
            declarations: all_declarations(),
        }
    }

    async fn request_bodies(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    #[test]
    fn test_provider_routing_is_total() {
        use ProviderKind::*;
        let cases = [
            ("gemini-2.5-flash", NativeFunctionCalling),
            ("gemini-2.5-flash-lite", NativeFunctionCalling),
            ("llama-3.3-70b-versatile", ChatCompletions),
            ("openai/gpt-oss-120b", ChatCompletions),
            ("meta-llama/llama-4-scout-17b-16e-instruct", ChatCompletions),
            ("moonshotai/kimi-k2-instruct", ChatCompletions),
            ("qwen/qwen3-32b", ChatCompletions),
            ("Mixtral-8x7b", ChatCompletions),
            ("", NativeFunctionCalling),
            ("something-else", NativeFunctionCalling),
        ];
        for (model, expected) in cases {
            assert_eq!(ProviderKind::for_model(model), expected, "{}", model);
        }
        assert_eq!(ChatCompletions.credential_env(), "GROQ_API_KEY");
        assert_eq!(NativeFunctionCalling.credential_env(), "GEMINI_API_KEY");
    }

    #[tokio::test]
    async fn test_gemini_function_calling_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            {"functionCall": {"name": "getContributors", "args": {"owner": "acme", "repo": "widgets", "limit": 30}}},
                            {"functionCall": {"name": "getLanguages", "args": {"owner": "acme", "repo": "widgets"}}}
                        ]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "Alice leads."}
                    ]}
                }]
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let mut session =
            open_session(ProviderKind::NativeFunctionCalling, &settings(&uri, "gemini-2.5-flash"))
                .unwrap();

        let turn = session.converse_turn("Who are the top contributors?").await.unwrap();
        assert_eq!(turn.tool_invocations.len(), 2);
        assert_eq!(turn.tool_invocations[0].name, "getContributors");
        assert_eq!(turn.tool_invocations[0].arguments["limit"], 30);
        assert_ne!(turn.tool_invocations[0].id, turn.tool_invocations[1].id);

        let results = vec![
            ToolResult {
                call_id: turn.tool_invocations[0].id.clone(),
                tool_name: "getContributors".to_string(),
                payload: json!([{"login": "alice", "contributions": 120}]),
            },
            ToolResult {
                call_id: turn.tool_invocations[1].id.clone(),
                tool_name: "getLanguages".to_string(),
                payload: json!({"languages": []}),
            },
        ];
        let turn = session.continue_with_tool_results(&results).await.unwrap();
        assert_eq!(turn.assistant_text, "Alice leads.");
        assert!(turn.tool_invocations.is_empty());

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies.len(), 2);

        let first = &bodies[0];
        assert_eq!(
            first["systemInstruction"]["parts"][0]["text"],
            "You are a repository analyst."
        );
        assert_eq!(
            first["tools"][0]["functionDeclarations"].as_array().unwrap().len(),
            13
        );

        // user, model, user(function responses)
        let contents = bodies[1]["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        let parts = contents[2]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["functionResponse"]["name"], "getContributors");
        assert_eq!(
            parts[0]["functionResponse"]["response"],
            json!({"items": [{"login": "alice", "contributions": 120}]})
        );
        assert_eq!(
            parts[1]["functionResponse"]["response"],
            json!({"languages": []})
        );
    }

    #[tokio::test]
    async fn test_gemini_rate_limit_error_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "code": 429,
                    "message": "You exceeded your current quota, model: gemini-2.5-flash",
                    "status": "RESOURCE_EXHAUSTED",
                    "details": [{"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "90s"}]
                }
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let mut session =
            open_session(ProviderKind::NativeFunctionCalling, &settings(&uri, "gemini-2.5-flash"))
                .unwrap();
        let err = session.converse_turn("hi").await.unwrap_err();

        assert_eq!(err.status, Some(429));
        assert_eq!(err.retry_after, Some(Duration::from_secs(90)));
        assert!(err.message.contains("quota"));
    }

    #[tokio::test]
    async fn test_gemini_without_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let mut session =
            open_session(ProviderKind::NativeFunctionCalling, &settings(&uri, "gemini-2.5-flash"))
                .unwrap();
        let err = session.converse_turn("hi").await.unwrap_err();

        assert_eq!(err.status, None);
        assert!(err.message.contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_chat_completions_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [
                            {"id": "call_a", "type": "function",
                             "function": {"name": "getContributors", "arguments": "{\"owner\":\"acme\",\"repo\":\"widgets\",\"limit\":30}"}},
                            {"id": "call_b", "type": "function",
                             "function": {"name": "getBranches", "arguments": "not json"}}
                        ]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Done."}, "finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let mut session = open_session(
            ProviderKind::ChatCompletions,
            &settings(&uri, "llama-3.3-70b-versatile"),
        )
        .unwrap();

        let turn = session.converse_turn("Who are the top contributors?").await.unwrap();
        assert_eq!(turn.assistant_text, "");
        assert_eq!(turn.tool_invocations.len(), 2);
        assert_eq!(turn.tool_invocations[0].id, "call_a");
        assert_eq!(turn.tool_invocations[0].arguments["owner"], "acme");
        assert_eq!(turn.tool_invocations[1].arguments, json!({}));

        let results = vec![
            ToolResult {
                call_id: "call_a".to_string(),
                tool_name: "getContributors".to_string(),
                payload: json!([{"login": "alice"}]),
            },
            ToolResult {
                call_id: "call_b".to_string(),
                tool_name: "getBranches".to_string(),
                payload: json!({"error": "Tool error: invalid arguments"}),
            },
        ];
        let turn = session.continue_with_tool_results(&results).await.unwrap();
        assert_eq!(turn.assistant_text, "Done.");

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies[0]["model"], "llama-3.3-70b-versatile");
        assert_eq!(bodies[0]["tool_choice"], "auto");
        assert_eq!(bodies[0]["tools"].as_array().unwrap().len(), 13);

        let messages = bodies[1]["messages"].as_array().unwrap();
        let roles: Vec<_> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "tool", "tool"]);
        assert_eq!(messages[2]["tool_calls"][0]["id"], "call_a");
        assert_eq!(messages[3]["tool_call_id"], "call_a");
        assert_eq!(messages[4]["tool_call_id"], "call_b");
        let fed_back: Value =
            serde_json::from_str(messages[3]["content"].as_str().unwrap()).unwrap();
        assert_eq!(fed_back, json!([{"login": "alice"}]));
    }

    #[tokio::test]
    async fn test_chat_completions_retry_after_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "90")
                    .set_body_json(json!({"error": {"message": "Rate limit reached for model `llama-3.3-70b-versatile`", "type": "tokens"}})),
            )
            .mount(&server)
            .await;

        let base = format!("{}/openai/v1", server.uri());
        let mut session = open_session(
            ProviderKind::ChatCompletions,
            &settings(&base, "llama-3.3-70b-versatile"),
        )
        .unwrap();
        let err = session.converse_turn("hi").await.unwrap_err();

        assert_eq!(err.status, Some(429));
        assert_eq!(err.retry_after, Some(Duration::from_secs(90)));
    }

    #[tokio::test]
    async fn test_gemini_base_url_path_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/proxy{}", GEMINI_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "hello"}]}}]
            })))
            .mount(&server)
            .await;

        let base = format!("{}/proxy", server.uri());
        let mut session =
            open_session(ProviderKind::NativeFunctionCalling, &settings(&base, "gemini-2.5-flash"))
                .unwrap();
        let turn = session.converse_turn("hi").await.unwrap();
        assert_eq!(turn.assistant_text, "hello");
    }

    #[tokio::test]
    async fn test_chat_completions_sends_model_without_routing_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "done", "tool_calls": null}}]
            })))
            .mount(&server)
            .await;

        let uri = server.uri();
        let model = "groq/llama-3.3-70b-versatile";
        assert_eq!(ProviderKind::for_model(model), ProviderKind::ChatCompletions);
        let mut session =
            open_session(ProviderKind::ChatCompletions, &settings(&uri, model)).unwrap();
        let turn = session.converse_turn("hi").await.unwrap();
        assert_eq!(turn.assistant_text, "done");
        assert!(turn.tool_invocations.is_empty());

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies[0]["model"], "llama-3.3-70b-versatile");
    }

    #[tokio::test]
    async fn test_chat_completions_without_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let uri = server.uri();
        let mut session =
            open_session(ProviderKind::ChatCompletions, &settings(&uri, "qwen/qwen3-32b")).unwrap();
        let err = session.converse_turn("hi").await.unwrap_err();
        assert_eq!(err.status, None);
    }
}
