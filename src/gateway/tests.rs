//! 翻译层单元测试与属性测试
//!
//! 载荷构造与内容提取均为纯函数，直接测试；
//! 校验路径测试使用不可达的后端地址，证明校验失败时不触网。

use proptest::prelude::*;

use super::*;
use crate::models::openai::{ChatMessage, ChatRole, GenerationOverrides};

fn test_gateway() -> LlmGateway {
    LlmGateway::new(GatewayConfig::default()).unwrap()
}

/// 指向不可路由地址的网关，任何触网行为都会立刻失败
fn unreachable_gateway() -> LlmGateway {
    let config = GatewayConfig {
        llm_base_url: "http://127.0.0.1:1".to_string(),
        request_timeout_ms: 1000,
        ..Default::default()
    };
    LlmGateway::new(config).unwrap()
}

#[test]
fn test_completion_request_uses_config_defaults() {
    let gateway = test_gateway();
    let req = gateway
        .build_completion_request("hello", GenerationOverrides::default())
        .unwrap();
    assert_eq!(req.model, "llama3.2:1b");
    assert_eq!(req.prompt, "hello");
    assert_eq!(req.max_tokens, 100);
    assert!((req.temperature - 0.7).abs() < f32::EPSILON);
}

#[test]
fn test_completion_request_overrides_win() {
    let gateway = test_gateway();
    let overrides = GenerationOverrides {
        max_tokens: Some(512),
        temperature: Some(0.2),
    };
    let req = gateway.build_completion_request("hello", overrides).unwrap();
    assert_eq!(req.max_tokens, 512);
    assert!((req.temperature - 0.2).abs() < f32::EPSILON);
}

#[test]
fn test_chat_request_seeds_system_prompt_on_empty_history() {
    let gateway = test_gateway();
    let req = gateway
        .build_chat_request(vec![], GenerationOverrides::default())
        .unwrap();
    assert_eq!(req.messages.len(), 1);
    assert_eq!(req.messages[0].role, ChatRole::System);
    assert_eq!(req.messages[0].content, gateway.config().system_prompt);
}

#[test]
fn test_chat_request_preserves_message_order() {
    let gateway = test_gateway();
    let history = vec![
        ChatMessage::system("s"),
        ChatMessage::user("u1"),
        ChatMessage::assistant("a1"),
        ChatMessage::user("u2"),
    ];
    let req = gateway
        .build_chat_request(history.clone(), GenerationOverrides::default())
        .unwrap();
    assert_eq!(req.messages, history);
}

#[test]
fn test_out_of_range_overrides_are_rejected() {
    let gateway = test_gateway();

    // max_tokens = 0 与越界温度都必须在触网前被拒绝
    let overrides = GenerationOverrides {
        max_tokens: Some(0),
        temperature: Some(9.9),
    };
    let err = gateway
        .build_completion_request("hi", overrides)
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));

    let overrides = GenerationOverrides {
        max_tokens: None,
        temperature: Some(-0.5),
    };
    let err = gateway
        .build_chat_request(vec![ChatMessage::user("hi")], overrides)
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));

    // 合法的边界值不受影响
    let overrides = GenerationOverrides {
        max_tokens: Some(1),
        temperature: Some(2.0),
    };
    assert!(gateway.build_completion_request("hi", overrides).is_ok());
}

#[test]
fn test_seed_conversation() {
    let gateway = test_gateway();

    let seed = gateway.seed_conversation(None);
    assert_eq!(seed.len(), 1);
    assert_eq!(seed[0].role, ChatRole::System);

    let seed = gateway.seed_conversation(Some("Explain caching"));
    assert_eq!(seed.len(), 2);
    assert_eq!(seed[1].role, ChatRole::User);
    assert_eq!(seed[1].content, "Explain caching");
}

#[test]
fn test_extract_completion_text() {
    // 正常提取
    let resp: CompletionResponse =
        serde_json::from_str(r#"{"choices":[{"text":"hello"}]}"#).unwrap();
    assert_eq!(extract_completion_text(&resp, NO_RESPONSE_SENTINEL), "hello");

    // choices 为空：哨兵兜底，不报错
    let resp: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    assert_eq!(
        extract_completion_text(&resp, NO_RESPONSE_SENTINEL),
        NO_RESPONSE_SENTINEL
    );

    // text 字段缺失：同样哨兵兜底
    let resp: CompletionResponse = serde_json::from_str(r#"{"choices":[{}]}"#).unwrap();
    assert_eq!(
        extract_completion_text(&resp, NO_RESPONSE_SENTINEL),
        NO_RESPONSE_SENTINEL
    );
}

#[test]
fn test_extract_chat_content() {
    let resp: ChatCompletionResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"content":"Caching stores..."}}]}"#)
            .unwrap();
    assert_eq!(
        extract_chat_content(&resp, NO_RESPONSE_SENTINEL),
        "Caching stores..."
    );

    let resp: ChatCompletionResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(
        extract_chat_content(&resp, NO_ANSWER_SENTINEL),
        NO_ANSWER_SENTINEL
    );

    let resp: ChatCompletionResponse =
        serde_json::from_str(r#"{"choices":[{"message":{}}]}"#).unwrap();
    assert_eq!(
        extract_chat_content(&resp, NO_ANSWER_SENTINEL),
        NO_ANSWER_SENTINEL
    );
}

#[tokio::test]
async fn test_blank_message_fails_validation_without_backend_call() {
    // 后端地址不可达：只要触网就会返回 Transport 而非 Validation
    let gateway = unreachable_gateway();

    for message in ["", "   ", "\t\n"] {
        let err = gateway.chat_with_user_message(message).await.unwrap_err();
        assert!(
            matches!(err, GatewayError::Validation(_)),
            "空白消息应返回校验错误: {:?}",
            err
        );
        assert_eq!(err.to_string(), "message required");
    }
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_transport_error() {
    let gateway = unreachable_gateway();
    let err = gateway.list_models().await.unwrap_err();
    assert!(
        matches!(err, GatewayError::Transport(_) | GatewayError::Timeout { .. }),
        "不可达后端应映射为传输失败: {:?}",
        err
    );
    assert!((502..=504).contains(&err.status_code()));
}

/// 生成任意对话历史（角色与内容均随机）
fn arb_history() -> impl Strategy<Value = Vec<ChatMessage>> {
    prop::collection::vec(
        (0usize..3, "[a-z ]{0,20}").prop_map(|(role, content)| {
            let role = match role {
                0 => ChatRole::System,
                1 => ChatRole::User,
                _ => ChatRole::Assistant,
            };
            ChatMessage { role, content }
        }),
        1..8,
    )
}

proptest! {
    /// N 条历史追加一条用户消息后，出站 messages 长度为 N+1 且顺序不变
    #[test]
    fn prop_appended_turn_keeps_order(history in arb_history(), content in "[a-z ]{1,20}") {
        let gateway = test_gateway();

        let mut messages = history.clone();
        messages.push(ChatMessage::user(content.clone()));
        let req = gateway
            .build_chat_request(messages, GenerationOverrides::default())
            .unwrap();

        prop_assert_eq!(req.messages.len(), history.len() + 1);
        prop_assert_eq!(&req.messages[..history.len()], &history[..]);
        prop_assert_eq!(req.messages.last().unwrap().content.clone(), content);

        // 序列化后的数组顺序与内存顺序一致
        let wire = serde_json::to_value(&req).unwrap();
        prop_assert_eq!(wire["messages"].as_array().unwrap().len(), history.len() + 1);
    }

    /// 任意覆盖项组合（含越界值）下，要么出站请求满足契约，
    /// 要么越界覆盖项被校验拒绝，二者必居其一
    #[test]
    fn prop_outbound_params_always_present(
        max_tokens in prop::option::of(0u32..8192),
        temperature in prop::option::of(-1.0f32..3.0),
        prompt in "[a-zA-Z0-9 ]{1,40}",
    ) {
        let gateway = test_gateway();
        let overrides = GenerationOverrides { max_tokens, temperature };
        let invalid = max_tokens == Some(0)
            || temperature.is_some_and(|t| !(0.0..=2.0).contains(&t));

        match gateway.build_completion_request(&prompt, overrides) {
            Ok(req) => {
                prop_assert!(!invalid, "越界覆盖项不应通过校验");
                prop_assert!(!req.model.is_empty());
                prop_assert!(req.max_tokens > 0);
                prop_assert!((0.0..=2.0).contains(&req.temperature));
                prop_assert_eq!(req.max_tokens, max_tokens.unwrap_or(100));
            }
            Err(err) => {
                prop_assert!(invalid, "合法覆盖项不应被拒绝: {:?}", err);
                prop_assert!(matches!(err, GatewayError::Validation(_)));
            }
        }
    }
}
