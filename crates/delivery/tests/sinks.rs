use std::{sync::Arc, time::Duration};

use base64::Engine;
use chrono::{NaiveDate, NaiveTime};
use delivery::{DeliveryError, Dispatcher, EmailSink, GcsSink, Sink, render};
use engine::{AggregateRow, HistoryEntry, LedgerKey, LedgerSnapshot, TOTAL_ROW_NAME};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn snapshot() -> LedgerSnapshot {
    let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    LedgerSnapshot {
        key: LedgerKey::new("ana", "north"),
        operator: "ana".to_string(),
        route: "north".to_string(),
        aggregate: vec![
            AggregateRow {
                category: "Autos".to_string(),
                accumulated_count: 2,
                last_date: Some(date),
                last_route: Some("north".to_string()),
                is_total: false,
            },
            AggregateRow {
                category: TOTAL_ROW_NAME.to_string(),
                accumulated_count: 2,
                last_date: Some(date),
                last_route: Some("north".to_string()),
                is_total: true,
            },
        ],
        history: vec![HistoryEntry {
            date,
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            route: "north".to_string(),
            operator: "ana".to_string(),
            category: "Autos".to_string(),
            quantity: 2,
            running_total_at_commit: 2,
        }],
    }
}

#[tokio::test]
async fn email_posts_both_attachments() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = EmailSink::new(
        "re_test",
        "Registro <onboarding@resend.dev>",
        vec!["ops@example.com".to_string()],
        &server.uri(),
    )
    .unwrap();
    let rendered = render(&snapshot()).unwrap();
    sink.deliver(&rendered).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["subject"], "Registro de vehículos");
    assert_eq!(body["to"], json!(["ops@example.com"]));

    let attachments = body["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 2);
    assert_eq!(attachments[0]["filename"], "registro_ana_north_conteo.csv");
    assert_eq!(attachments[1]["filename"], "registro_ana_north_historial.csv");

    let decoded = base64::prelude::BASE64_STANDARD
        .decode(attachments[0]["content"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, rendered.attachments[0].bytes);
}

#[tokio::test]
async fn email_body_escapes_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail-2" })))
        .mount(&server)
        .await;

    let sink = EmailSink::new(
        "re_test",
        "Registro <onboarding@resend.dev>",
        vec!["ops@example.com".to_string()],
        &server.uri(),
    )
    .unwrap();
    let mut snapshot = snapshot();
    snapshot.operator = "<script>ana</script>".to_string();
    snapshot.route = "north & south".to_string();
    sink.deliver(&render(&snapshot).unwrap()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    let html = body["html"].as_str().unwrap();
    assert!(html.contains("&lt;script&gt;ana&lt;/script&gt;"));
    assert!(html.contains("north &amp; south"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn email_rejection_keeps_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "invalid from address" })),
        )
        .mount(&server)
        .await;

    let sink = EmailSink::new(
        "re_test",
        "nobody",
        vec!["ops@example.com".to_string()],
        &server.uri(),
    )
    .unwrap();
    let err = sink
        .deliver(&render(&snapshot()).unwrap())
        .await
        .unwrap_err();

    match err {
        DeliveryError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "invalid from address");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn gcs_uploads_each_file_under_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/ledgers/o"))
        .and(query_param("uploadType", "media"))
        .and(query_param("name", "aforo/registro_ana_north_conteo.csv"))
        .and(header("content-type", "text/csv"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/ledgers/o"))
        .and(query_param("name", "aforo/registro_ana_north_historial.csv"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let sink = GcsSink::new(
        "ledgers",
        "ya29.test",
        Some("/aforo/".to_string()),
        &server.uri(),
    )
    .unwrap();
    sink.deliver(&render(&snapshot()).unwrap()).await.unwrap();

    server.verify().await;
}

#[tokio::test]
async fn dispatcher_retries_failed_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sink = GcsSink::new("ledgers", "ya29.test", None, &server.uri()).unwrap();
    let dispatcher = Dispatcher::builder()
        .sink(Arc::new(sink))
        .retries(1)
        .backoff(Duration::from_millis(10))
        .build()
        .unwrap();

    dispatcher.deliver(&snapshot()).await.unwrap();

    // First attempt: one rejected upload. Second attempt: both files.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}
