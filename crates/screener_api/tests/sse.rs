use screener_api::{SseFrame, SseFrameParser};

const FEED: &str = concat!(
    ": connected\n\n",
    "id: 1\nevent: token\ndata: {\"text\":\"hi\"}\n\n",
    "event: done\ndata:\n\n",
);

#[test]
fn sse_frame_sequence_is_split_invariant() {
    let one_shot = SseFrameParser::parse_frames(FEED);

    let mut byte_at_a_time = SseFrameParser::default();
    let mut reassembled = Vec::new();
    for byte in FEED.as_bytes() {
        reassembled.extend(byte_at_a_time.feed(std::slice::from_ref(byte)));
    }

    let mut uneven = SseFrameParser::default();
    let mut uneven_frames = Vec::new();
    for chunk in [&FEED[..7], &FEED[7..9], &FEED[9..40], &FEED[40..]] {
        uneven_frames.extend(uneven.feed(chunk.as_bytes()));
    }

    assert_eq!(one_shot, reassembled);
    assert_eq!(one_shot, uneven_frames);
    assert!(byte_at_a_time.is_empty_buffer());
}

#[test]
fn sse_frames_preserve_event_data_and_id_fields() {
    let frames = SseFrameParser::parse_frames(FEED);
    assert_eq!(frames.len(), 3);

    assert_eq!(
        frames[1],
        SseFrame {
            event: "token".to_string(),
            data: "{\"text\":\"hi\"}".to_string(),
            id: Some("1".to_string()),
        }
    );
}

#[test]
fn sse_frame_without_data_is_still_emitted() {
    let frames = SseFrameParser::parse_frames("event: done\n\n");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event, "done");
    assert_eq!(frames[0].data, "");
}

#[test]
fn sse_repeated_event_lines_last_wins() {
    let frames = SseFrameParser::parse_frames("event: token\nevent: final\ndata: {}\n\n");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event, "final");
}

#[test]
fn sse_multiple_data_lines_concatenate_in_order() {
    let frames = SseFrameParser::parse_frames("event: token\ndata: {\"text\":\ndata: \"ab\"}\n\n");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].data, "{\"text\":\"ab\"}");
}

#[test]
fn sse_unrecognized_lines_are_ignored() {
    let frames =
        SseFrameParser::parse_frames(": heartbeat\nretry: 3000\nevent: done\ndata: {}\n\n");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event, "done");
    assert_eq!(frames[0].data, "{}");
    assert_eq!(frames[0].id, None);
}

#[test]
fn sse_partial_tail_is_never_emitted() {
    let mut parser = SseFrameParser::default();
    let frames = parser.feed(b"event: done\ndata: {}\n\nevent: token\ndata: {\"text\":\"tr");

    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event, "done");
    assert!(!parser.is_empty_buffer());
}
