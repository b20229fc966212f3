/// One blank-line delimited protocol unit from the event feed.
///
/// Frames are pre-semantic: the event name is the discriminant for callers,
/// not the presence of data, so a frame with no `data:` line is still
/// produced with an empty data value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

/// Incremental parser for the blank-line delimited event feed.
///
/// Chunks arrive at unpredictable granularity, not aligned to frame or line
/// boundaries; the parser buffers and drains complete frames, so the frame
/// sequence is identical for any split of the same underlying text.
#[derive(Debug, Default)]
pub struct SseFrameParser {
    buffer: String,
}

impl SseFrameParser {
    /// Feed arbitrary bytes into the parser and drain complete frames.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut frames = Vec::new();

        while let Some(split) = self.buffer.find("\n\n") {
            let block = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);
            frames.push(parse_frame_block(&block));
        }

        frames
    }

    /// Parse a complete feed payload in one shot.
    pub fn parse_frames(input: &str) -> Vec<SseFrame> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    /// True when no partial frame is buffered.
    ///
    /// Leftover buffer content at end of stream is discarded, never emitted
    /// as a partial frame; this is the hook for asserting that discard.
    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

/// Parse one frame block line by line.
///
/// `event:` sets the event name (last wins), `data:` appends its trimmed
/// value, `id:` sets the frame id. Anything else, including `:` comment
/// lines used as heartbeats, is ignored.
fn parse_frame_block(block: &str) -> SseFrame {
    let mut frame = SseFrame::default();

    for line in block.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("event:") {
            frame.event = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            frame.data.push_str(value.trim());
        } else if let Some(value) = line.strip_prefix("id:") {
            frame.id = Some(value.trim().to_string());
        }
    }

    frame
}
