//! Integration tests for the extraction client

#[cfg(test)]
mod tests {
    use crate::{ExtractorConfig, ExtractorError, MenuExtractionClient};
    use chrono::NaiveDate;
    use lunchbox_domain::{ExtractionMode, ExtractionOutcome, MenuExtractor};
    use lunchbox_llm::{ChatReply, MockProvider, Role, ToolCall, ToolChoice};
    use serde_json::json;

    const URL: &str = "https://r.example/menu";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 19).unwrap()
    }

    fn menu_json(items: serde_json::Value) -> String {
        json!({
            "restaurant_name": "Bistro",
            "date": "1999-01-01",
            "day_of_week": "Someday",
            "menu_items": items,
            "daily_menu": true,
            "source_url": "https://elsewhere.example"
        })
        .to_string()
    }

    fn client(llm: &MockProvider) -> MenuExtractionClient<MockProvider> {
        MenuExtractionClient::new(llm.clone(), ExtractorConfig::default()).unwrap()
    }

    fn extract(llm: &MockProvider, mode: ExtractionMode) -> ExtractionOutcome {
        client(llm)
            .extract(URL, "STŘEDA 19.11.2025\nKulajda 55,-", date(), mode)
            .unwrap()
    }

    #[test]
    fn test_direct_answer_is_stamped() {
        let llm = MockProvider::new(menu_json(json!([{"name": "Kulajda", "price": 55}])));

        let outcome = extract(&llm, ExtractionMode::Strict);
        let menu = outcome.menu().expect("menu");

        assert_eq!(menu.date, "2025-11-19");
        assert_eq!(menu.day_of_week, "Wednesday");
        assert_eq!(menu.source_url, URL);
        assert_eq!(menu.restaurant_name.as_deref(), Some("Bistro"));
        assert_eq!(menu.menu_items[0].price, Some(55.0));
        assert_eq!(llm.call_count(), 1);
    }

    #[test]
    fn test_first_request_shape() {
        let llm = MockProvider::new(menu_json(json!([])));
        extract(&llm, ExtractionMode::Strict);

        let request = &llm.requests()[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.tools[0].name, "normalize_prices");
        assert_eq!(request.tool_choice, Some(ToolChoice::Auto));

        let user = request.messages[1].content.as_deref().unwrap();
        assert!(user.contains("STRICT MODE"));
        assert!(user.contains("Kulajda 55,-"));
    }

    #[test]
    fn test_tool_call_round_trip() {
        let llm = MockProvider::new(menu_json(json!([
            {"category": "soup", "name": "Kulajda", "price": 55.0}
        ])));
        llm.push_reply(ChatReply::tool_calls(vec![ToolCall::new(
            "call_1",
            "normalize_prices",
            r#"{"prices": ["55,-"]}"#,
        )]));

        let outcome = extract(&llm, ExtractionMode::Strict);
        assert!(outcome.has_items());
        assert_eq!(llm.call_count(), 2);

        let second = &llm.requests()[1];
        assert!(second.tools.is_empty());
        assert_eq!(second.tool_choice, None);
        assert_eq!(second.messages.len(), 4);
        assert_eq!(second.messages[2].role, Role::Assistant);
        assert_eq!(second.messages[3].role, Role::Tool);
        assert_eq!(second.messages[3].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(second.messages[3].content.as_deref(), Some(r#"{"normalized":[55.0]}"#));
    }

    #[test]
    fn test_unknown_tool_still_gets_an_answer() {
        let llm = MockProvider::new(menu_json(json!([{"name": "Guláš"}])));
        llm.push_reply(ChatReply::tool_calls(vec![ToolCall::new("c9", "translate", "{}")]));

        let outcome = extract(&llm, ExtractionMode::Strict);
        assert!(outcome.has_items());

        let second = &llm.requests()[1];
        assert_eq!(
            second.messages[3].content.as_deref(),
            Some(r#"{"error":"Unknown tool translate"}"#)
        );
    }

    #[test]
    fn test_fenced_output_is_accepted() {
        let llm = MockProvider::new(format!("```json\n{}\n```", menu_json(json!([{"name": "Řízek"}]))));
        assert!(extract(&llm, ExtractionMode::Strict).has_items());
    }

    #[test]
    fn test_invalid_json_is_rejected_with_cleaned_text() {
        let llm = MockProvider::new("```json\n{\"menu_items\": [oops]}\n```");

        match extract(&llm, ExtractionMode::Strict) {
            ExtractionOutcome::Rejected(failure) => {
                assert_eq!(failure.error, "Model did not return valid JSON.");
                assert_eq!(failure.raw_response, json!("{\"menu_items\": [oops]}"));
            }
            other => panic!("Expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_content_is_invalid_json() {
        let llm = MockProvider::default();
        llm.push_reply(ChatReply::default());

        match extract(&llm, ExtractionMode::Strict) {
            ExtractionOutcome::Rejected(failure) => {
                assert_eq!(failure.raw_response, json!(""));
            }
            other => panic!("Expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_item_name_is_schema_mismatch() {
        let llm = MockProvider::new(menu_json(json!([{"price": 55}])));

        match extract(&llm, ExtractionMode::Strict) {
            ExtractionOutcome::Rejected(failure) => {
                assert_eq!(failure.error, "Model JSON does not match expected schema.");
                assert_eq!(failure.validation_errors[0].path(), "menu_items.0.name");
                // Raw output is reported as the model wrote it, unstamped
                assert_eq!(failure.raw_response["source_url"], "https://elsewhere.example");
            }
            other => panic!("Expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_menu_is_a_successful_outcome() {
        let llm = MockProvider::new(menu_json(json!([])));
        let outcome = extract(&llm, ExtractionMode::Loose);
        assert!(outcome.is_empty_menu());
        assert!(!outcome.has_items());
    }

    #[test]
    fn test_loose_mode_prompt() {
        let llm = MockProvider::new(menu_json(json!([])));
        extract(&llm, ExtractionMode::Loose);

        let user = llm.requests()[0].messages[1].content.clone().unwrap();
        assert!(user.contains("LOOSE MODE"));
        assert!(!user.contains("Requested date"));
    }

    #[test]
    fn test_provider_failure_is_an_error() {
        let llm = MockProvider::default();
        llm.push_error("connection reset");

        let result = client(&llm).extract(URL, "text", date(), ExtractionMode::Strict);
        match result {
            Err(ExtractorError::Llm(msg)) => assert!(msg.contains("connection reset")),
            other => panic!("Expected Llm error, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_on_second_turn_is_an_error() {
        let llm = MockProvider::default();
        llm.push_reply(ChatReply::tool_calls(vec![ToolCall::new("c1", "normalize_prices", "{}")]));
        llm.push_error("timeout");

        let result = client(&llm).extract(URL, "text", date(), ExtractionMode::Strict);
        assert!(matches!(result, Err(ExtractorError::Llm(_))));
        assert_eq!(llm.call_count(), 2);
    }

    #[test]
    fn test_page_text_is_bounded() {
        let llm = MockProvider::new(menu_json(json!([])));
        let config = ExtractorConfig {
            max_page_chars: 5,
        };
        let client = MenuExtractionClient::new(llm.clone(), config).unwrap();

        client
            .extract(URL, "ŘÍZEK S BRAMBOREM", date(), ExtractionMode::Strict)
            .unwrap();

        let user = llm.requests()[0].messages[1].content.clone().unwrap();
        assert!(user.contains("---\nŘÍZEK\n---"));
        assert!(!user.contains("BRAMBOREM"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ExtractorConfig { max_page_chars: 0 };
        let result = MenuExtractionClient::new(MockProvider::default(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }
}
