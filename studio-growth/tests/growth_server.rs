mod common;

use common::{Harness, error_text};
use serde_json::json;
use studio_telemetry::LogLevel;

#[tokio::test]
async fn schedule_prefers_highest_mean_engagement() {
    let harness = Harness::without_key("unused");
    let payload = harness
        .call(
            "optimize_posting_schedule",
            json!({
                "historical_data": [
                    {"hour": 9, "views": 100, "engagement": 50},
                    {"hour": 9, "views": 300, "engagement": 70},
                    {"hour": 14, "views": 50, "engagement": 90}
                ]
            }),
        )
        .await
        .payload()
        .unwrap();

    assert_eq!(payload["source"], "historical");
    assert_eq!(payload["recommended_times"][0], "14:00");
    assert_eq!(payload["recommended_times"][1], "09:00");
    assert_eq!(payload["timezone"], "UTC");
    assert_eq!(payload["hourly_performance"][0]["avg_engagement"], 60.0);
    assert_eq!(payload["hourly_performance"][1]["avg_engagement"], 90.0);
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn schedule_without_history_uses_platform_defaults() {
    let harness = Harness::without_key("unused");
    let payload = harness
        .call(
            "optimize_posting_schedule",
            json!({"platform": "youtube", "timezone": "Europe/Berlin"}),
        )
        .await
        .payload()
        .unwrap();
    assert_eq!(payload["source"], "platform_default");
    assert_eq!(payload["recommended_times"], json!(["14:00", "16:00", "20:00"]));
    assert_eq!(payload["best_days"], json!(["Thursday", "Friday", "Saturday"]));
    assert_eq!(payload["timezone"], "Europe/Berlin");
    assert!(payload.get("hourly_performance").is_none());
}

#[tokio::test]
async fn schedule_skips_unusable_samples_with_a_warning() {
    let harness = Harness::without_key("unused");
    let payload = harness
        .call(
            "optimize_posting_schedule",
            json!({"historical_data": [{"views": 10}, {"timestamp": "2024-05-01T08:15:00Z", "engagement": 3}]}),
        )
        .await
        .payload()
        .unwrap();
    assert_eq!(payload["recommended_times"], json!(["08:00"]));
    assert_eq!(payload["best_days"], json!(["Wednesday"]));
    let warnings = harness.log.at_level(LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("historical_data[0]"));
}

#[tokio::test]
async fn schedule_rejects_out_of_range_hours() {
    let harness = Harness::without_key("unused");
    let envelope = harness
        .call(
            "optimize_posting_schedule",
            json!({"historical_data": [{"hour": 24}]}),
        )
        .await;
    assert!(error_text(&envelope).contains("historical_data[0].hour"));
}

#[tokio::test]
async fn seo_returns_model_object() {
    let harness = Harness::new(
        r#"Sure: {"optimized_title": "Espresso at Home in 60 Seconds", "tags": ["espresso"], "seo_score": 88}"#,
    );
    let payload = harness
        .call(
            "optimize_seo",
            json!({"title": "espresso video", "keywords": ["espresso", "barista"]}),
        )
        .await
        .payload()
        .unwrap();
    assert_eq!(payload["seo_score"], 88);
    let prompt = harness.last_prompt();
    assert!(prompt.contains("espresso, barista"));
    assert!(prompt.contains("Title limit: 100"));
}

#[tokio::test]
async fn seo_without_json_is_empty_object() {
    let harness = Harness::new("Your title is fine as it is.");
    let envelope = harness
        .call("optimize_seo", json!({"title": "espresso video"}))
        .await;
    assert!(!envelope.is_error());
    assert_eq!(envelope.payload().unwrap(), json!({}));
    assert_eq!(harness.log.at_level(LogLevel::Warn).len(), 1);
}

#[tokio::test]
async fn seo_needs_gemini_key() {
    let harness = Harness::without_key("{}");
    let envelope = harness.call("optimize_seo", json!({"title": "x"})).await;
    assert!(error_text(&envelope).contains("GEMINI_API_KEY"));
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn thumbnails_are_filtered_and_truncated() {
    let harness = Harness::new(
        r##"{"concepts": [
            {"concept": "Shocked face next to crema", "text_overlay": "60s?!", "colors": ["#000", "#f90"]},
            {"concept": "", "text_overlay": "blank"},
            {"concept": "Split screen before/after"},
            {"concept": "Macro pour shot"}
        ]}"##,
    );
    let payload = harness
        .call(
            "generate_thumbnail_concepts",
            json!({"title": "Espresso in 60s", "count": 2, "platform": "tiktok"}),
        )
        .await
        .payload()
        .unwrap();
    assert_eq!(payload["count"], 2);
    assert_eq!(payload["concepts"][1]["concept"], "Split screen before/after");
    assert!(harness.last_prompt().contains("9:16"));
}

#[tokio::test]
async fn repurpose_requires_targets() {
    let harness = Harness::new("{}");
    let envelope = harness
        .call(
            "repurpose_content",
            json!({"content": "x", "source_platform": "youtube", "target_platforms": []}),
        )
        .await;
    assert!(error_text(&envelope).contains("target_platforms"));
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn repurpose_returns_per_platform_object() {
    let harness = Harness::new(
        r##"{"tiktok": {"format": "short", "content": "hook first", "hashtags": ["#coffee"], "notes": ""}}"##,
    );
    let payload = harness
        .call(
            "repurpose_content",
            json!({"content": "Long tutorial", "source_platform": "youtube", "target_platforms": ["tiktok"]}),
        )
        .await
        .payload()
        .unwrap();
    assert_eq!(payload["tiktok"]["format"], "short");
    assert!(harness.last_prompt().contains("Adapt it for each of these platforms: tiktok"));
}

#[tokio::test]
async fn ab_test_keeps_valid_variants() {
    let harness = Harness::new(
        r#"[
            {"variant": "I tried espresso for 30 days", "hypothesis": "Challenge framing lifts CTR"},
            {"variant": "Espresso hacks", "hypothesis": ""},
            {"variant": "Why your espresso is sour", "hypothesis": "Problem framing", "changed_element": "title"}
        ]"#,
    );
    let payload = harness
        .call(
            "create_ab_test",
            json!({"content_type": "title", "original": "Espresso tips"}),
        )
        .await
        .payload()
        .unwrap();
    assert_eq!(payload["count"], 2);
    assert_eq!(payload["variants"][1]["changed_element"], "title");
}

#[tokio::test]
async fn ab_test_validates_bounds() {
    let harness = Harness::new("[]");
    for args in [
        json!({"content_type": "title", "original": "x", "variant_count": 1}),
        json!({"content_type": "title", "original": "x", "variant_count": 6}),
        json!({"content_type": "intro", "original": "x"}),
    ] {
        let envelope = harness.call("create_ab_test", args).await;
        assert!(error_text(&envelope).contains("invalid arguments"));
    }
    assert_eq!(harness.model_calls(), 0);
}

#[tokio::test]
async fn discovery_order() {
    let harness = Harness::new("");
    let names: Vec<&str> = harness
        .dispatcher
        .descriptors()
        .map(|descriptor| descriptor.name())
        .collect();
    assert_eq!(
        names,
        [
            "optimize_seo",
            "generate_thumbnail_concepts",
            "optimize_posting_schedule",
            "repurpose_content",
            "create_ab_test"
        ]
    );
}
