use std::sync::{Arc, Mutex};

use deskhand_client::{
    decode_frame, ApiClient, ClientSettings, EventRelay, EventSink, FrameParser, RelayEvent,
    RelaySettings, SseFrame,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<RelayEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take(&self) -> Vec<RelayEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: RelayEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[test]
fn parser_dispatches_frames_on_blank_lines() {
    let mut parser = FrameParser::new();
    let frames = parser.push(
        b"event: progress_update\r\ndata: {\"step\":\"transcribe\"}\r\n\r\n",
    );
    assert_eq!(
        frames,
        vec![SseFrame {
            event: Some("progress_update".to_string()),
            data: "{\"step\":\"transcribe\"}".to_string(),
        }]
    );
}

#[test]
fn parser_joins_multi_line_data() {
    let mut parser = FrameParser::new();
    let frames = parser.push(b"data: first\ndata: second\n\n");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].data, "first\nsecond");
}

#[test]
fn parser_survives_chunks_split_mid_line() {
    let mut parser = FrameParser::new();
    assert!(parser.push(b"event: email_stat").is_empty());
    assert!(parser.push(b"us_update\ndata: {\"status\"").is_empty());
    let frames = parser.push(b":\"sent\"}\n\n");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event.as_deref(), Some("email_status_update"));
}

#[test]
fn parser_reassembles_multibyte_text_split_across_chunks() {
    let bytes = "event: progress_update\ndata: {\"step\":\"transcribe\",\"message\":\"議事録を生成中\"}\n\n"
        .as_bytes();
    // Split one byte into the first multibyte character.
    let split = bytes.iter().position(|&b| b >= 0x80).unwrap() + 1;
    let (head, tail) = bytes.split_at(split);

    let mut parser = FrameParser::new();
    assert!(parser.push(head).is_empty());
    let frames = parser.push(tail);
    assert_eq!(frames.len(), 1);

    match decode_frame(&frames[0]) {
        Some(RelayEvent::Progress(update)) => assert_eq!(update.message, "議事録を生成中"),
        other => panic!("expected progress event, got {other:?}"),
    }
}

#[test]
fn comment_heartbeats_produce_no_frames() {
    let mut parser = FrameParser::new();
    assert!(parser.push(b": heartbeat\n\n: heartbeat\n\n").is_empty());
}

#[test]
fn progress_frames_decode_with_details() {
    let frame = SseFrame {
        event: Some("progress_update".to_string()),
        data: r#"{"step":"complete","message":"done","progress_percent":100,"data":{"filename":"minutes.md"}}"#
            .to_string(),
    };
    match decode_frame(&frame) {
        Some(RelayEvent::Progress(update)) => {
            assert_eq!(update.step, "complete");
            assert_eq!(update.progress_percent, Some(100.0));
            let data = update.data.unwrap();
            assert_eq!(data["filename"], serde_json::json!("minutes.md"));
        }
        other => panic!("expected progress event, got {other:?}"),
    }
}

#[test]
fn unknown_events_and_malformed_payloads_are_dropped() {
    let unknown = SseFrame {
        event: Some("queue_depth".to_string()),
        data: "{}".to_string(),
    };
    assert_eq!(decode_frame(&unknown), None);

    let malformed = SseFrame {
        event: Some("progress_update".to_string()),
        data: "not json".to_string(),
    };
    assert_eq!(decode_frame(&malformed), None);
}

#[tokio::test]
async fn relay_emits_connect_events_and_terminal_disconnect() {
    let server = MockServer::start().await;
    let body = concat!(
        "event: progress_update\n",
        "data: {\"step\":\"transcribe\",\"message\":\"working\",\"progress_percent\":40}\n",
        "\n",
        "event: email_status_update\n",
        "data: {\"status\":\"sent\"}\n",
        "\n",
    );
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(query_param("channel", "default"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = ApiClient::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client");
    let relay = EventRelay::new(&client, &RelaySettings::default()).expect("relay");
    let sink = TestSink::new();
    relay.run(&sink).await;

    let events = sink.take();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], RelayEvent::Connected);
    assert!(matches!(&events[1], RelayEvent::Progress(p) if p.step == "transcribe"));
    assert!(matches!(&events[2], RelayEvent::DeliveryStatus(s) if s.status == "sent"));
    assert!(matches!(&events[3], RelayEvent::Disconnected { .. }));
}

#[tokio::test]
async fn failed_subscription_reports_a_disconnect_without_connecting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ApiClient::new(ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client");
    let relay = EventRelay::new(&client, &RelaySettings::default()).expect("relay");
    let sink = TestSink::new();
    relay.run(&sink).await;

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        RelayEvent::Disconnected { reason } if reason.contains("503")
    ));
}
