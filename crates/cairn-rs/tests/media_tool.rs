use cairn_rs_config::{CairnConfig, MediaConfig};
use cairn_rs_media::{MediaFormat, MediaSource};
use cairn_rs_test_utils::{StubBackends, StubConverse, base_tool_context};
use cairn_rs_tools::builtin_tool_registry;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn object_video_is_analyzed_by_reference() {
    let backends = Arc::new(StubBackends::new().with_converse(StubConverse::new("A dog on a beach.")));
    let ctx = base_tool_context(backends.clone(), CairnConfig::default());

    let response = builtin_tool_registry()
        .call_enveloped(
            &ctx,
            "video_reader",
            json!({ "video_path": "s3://clips/2025/video.MP4" }),
        )
        .await;

    assert_eq!(response["status"], json!("success"));
    assert_eq!(response["text"], json!("A dog on a beach."));
    assert_eq!(response["format"], json!("mp4"));
    assert_eq!(response["inline_bytes"], json!(null));
    let requests = backends.converse.requests();
    assert_eq!(requests[0].prompt, "Describe what you see in this video");
    assert_eq!(requests[0].attachment.format, MediaFormat::Mp4);
    assert_eq!(
        requests[0].attachment.source,
        MediaSource::ObjectUri("s3://clips/2025/video.MP4".to_string())
    );
}

#[tokio::test]
async fn object_document_is_fetched_inline() {
    let backends = Arc::new(StubBackends::new());
    backends
        .objects
        .insert("docs", "reports/q1 summary.docx", vec![7u8; 2048]);
    let ctx = base_tool_context(backends.clone(), CairnConfig::default());

    let response = builtin_tool_registry()
        .call_enveloped(
            &ctx,
            "media_reader",
            json!({ "s3object": "s3://docs/reports/q1 summary.docx", "text_prompt": "Summarize" }),
        )
        .await;

    assert_eq!(response["status"], json!("success"));
    assert_eq!(response["inline_bytes"], json!(2048));
    let report = response["report"].as_str().unwrap_or_default();
    assert!(report.starts_with("📄 Document Analysis Results:"));
    assert!(report.contains("- Document Path: s3://docs/reports/q1 summary.docx"));
    assert_eq!(
        backends.objects.fetched(),
        vec![("docs".to_string(), "reports/q1 summary.docx".to_string())]
    );
    let attachment = &backends.converse.requests()[0].attachment;
    assert_eq!(attachment.format, MediaFormat::Docx);
    assert_eq!(attachment.name, "q1 summary");
    assert_eq!(attachment.source, MediaSource::Bytes(vec![7u8; 2048]));
}

#[tokio::test]
async fn oversized_object_is_never_downloaded() {
    let backends = Arc::new(StubBackends::new());
    backends.objects.insert("docs", "archive/big.pdf", vec![1u8; 16]);
    backends
        .objects
        .report_size("docs", "archive/big.pdf", 4 * 1024 * 1024 * 1024);
    let ctx = base_tool_context(backends.clone(), CairnConfig::default());

    let response = builtin_tool_registry()
        .call_enveloped(
            &ctx,
            "media_reader",
            json!({ "s3object": "s3://docs/archive/big.pdf", "text_prompt": "Summarize" }),
        )
        .await;

    assert_eq!(response["status"], json!("error"));
    assert!(
        response["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("File too large: 4096.00MB")
    );
    assert!(backends.objects.fetched().is_empty());
    assert!(backends.converse.requests().is_empty());
}

#[tokio::test]
async fn video_reader_rejects_other_media() {
    let backends = Arc::new(StubBackends::new());
    let ctx = base_tool_context(backends.clone(), CairnConfig::default());
    let registry = builtin_tool_registry();

    let image = registry
        .call_enveloped(&ctx, "video_reader", json!({ "video_path": "s3://b/photo.png" }))
        .await;
    assert_eq!(image["status"], json!("error"));
    assert!(
        image["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("Unsupported video format: png")
    );

    let unknown = registry
        .call_enveloped(&ctx, "media_reader", json!({ "video_path": "s3://b/archive.zip" }))
        .await;
    assert_eq!(unknown["status"], json!("error"));

    let missing = registry
        .call_enveloped(&ctx, "media_reader", json!({ "text_prompt": "Describe" }))
        .await;
    assert_eq!(missing["message"], json!("video_path is required"));

    let scheme = registry
        .call_enveloped(&ctx, "media_reader", json!({ "video_path": "gs://b/clip.mp4" }))
        .await;
    assert_eq!(scheme["status"], json!("error"));

    assert!(backends.converse.requests().is_empty());
}

#[tokio::test]
async fn nova_models_refuse_to_identify_people() {
    let backends = Arc::new(StubBackends::new());
    let ctx = base_tool_context(backends.clone(), CairnConfig::default());

    let response = builtin_tool_registry()
        .call_enveloped(
            &ctx,
            "video_reader",
            json!({ "video_path": "s3://b/party.mp4", "text_prompt": "Who is the man on the left?" }),
        )
        .await;

    assert_eq!(
        response,
        json!({ "status": "error", "message": "Nova models cannot identify or name people in media" })
    );
    assert!(backends.converse.requests().is_empty());
}

#[tokio::test]
async fn explicit_settings_win_over_config() {
    let config = CairnConfig::builder()
        .media(MediaConfig {
            region: Some("us-west-2".to_string()),
            system_prompt: Some("Answer briefly.".to_string()),
            ..MediaConfig::default()
        })
        .build();
    let backends = Arc::new(StubBackends::new());
    let ctx = base_tool_context(backends.clone(), config);

    let response = builtin_tool_registry()
        .call_enveloped(
            &ctx,
            "media_reader",
            json!({
                "video_path": "s3://b/clip.webm",
                "model_id": "anthropic.claude-3-5-sonnet-20240620-v1:0",
            }),
        )
        .await;

    assert_eq!(response["status"], json!("success"));
    assert_eq!(response["region"], json!("us-west-2"));
    assert_eq!(
        response["model_id"],
        json!("anthropic.claude-3-5-sonnet-20240620-v1:0")
    );
    assert_eq!(backends.regions(), vec!["us-west-2", "us-west-2"]);
    assert_eq!(backends.converse.requests()[0].system_prompt, "Answer briefly.");
}

#[tokio::test]
async fn unknown_tool_is_reported() {
    let ctx = base_tool_context(Arc::new(StubBackends::new()), CairnConfig::default());

    let response = builtin_tool_registry()
        .call_enveloped(&ctx, "image_reader", json!({}))
        .await;

    assert_eq!(
        response,
        json!({ "status": "error", "message": "tool not found: image_reader" })
    );
}
