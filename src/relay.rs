//! Frame relay for the streaming socket
//!
//! Binary frames (audio chunks) are counted and echoed with the running count.
//! Text frames carry JSON control messages and are acknowledged.

use serde_json::{Value as JsonValue, json};
use tracing::trace;

/// One frame received from the client
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
   Binary(Vec<u8>),
   Text(String),
}

/// Text reply sent back for each frame
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
   /// Binary frame counted; `frames` includes it
   Echo { frames: u64 },
   /// Text frame parsed as JSON
   Ack { received: JsonValue },
   /// Text frame that is not JSON
   InvalidJson,
}

impl Reply {
   pub fn to_json(&self) -> JsonValue {
      match self {
         Reply::Echo { frames } => json!({ "type": "echo", "frames": frames }),
         Reply::Ack { received } => json!({ "type": "ack", "received": received }),
         Reply::InvalidJson => json!({ "type": "error", "reason": "invalid_json" }),
      }
   }
}

impl std::fmt::Display for Reply {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      write!(f, "{}", self.to_json())
   }
}

/// Per-connection relay state: the number of binary frames seen so far.
#[derive(Debug, Default)]
pub struct FrameRelay {
   frames: u64,
}

impl FrameRelay {
   pub fn new() -> Self {
      Self::default()
   }

   pub fn frames(&self) -> u64 {
      self.frames
   }

   /// Handle one frame. Only binary frames advance the counter.
   pub fn handle(&mut self, frame: Frame) -> Reply {
      match frame {
         Frame::Binary(bytes) => {
            self.frames += 1;
            trace!("Binary frame {} ({} bytes)", self.frames, bytes.len());
            Reply::Echo {
               frames: self.frames,
            }
         }
         Frame::Text(text) => match serde_json::from_str(&text) {
            Ok(received) => Reply::Ack { received },
            Err(_) => Reply::InvalidJson,
         },
      }
   }
}
