//! Batch encoding for transmission.
//!
//! A batch goes out as the base64 text of the gzip-compressed JSON array of
//! event objects, paired with the `gzip=1` form flag by the transport layer.

use crate::error::Result;
use crate::event::Event;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Serialize, compress and base64-encode a batch of events.
///
/// The output contains no embedded line breaks.
pub fn encode(events: &[Event]) -> Result<String> {
    let json = serde_json::to_vec(events)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(STANDARD.encode(compressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EventBuilder;
    use crate::event::{EventType, Properties};
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn sample_events() -> Vec<Event> {
        (0..3)
            .map(|i| {
                EventBuilder::new(EventType::Track, "abcdefg")
                    .event_name("DemoStart")
                    .properties(Properties::new().with("sort", i))
                    .build()
                    .unwrap()
            })
            .collect()
    }

    fn decode(data: &str) -> serde_json::Value {
        let compressed = STANDARD.decode(data).unwrap();
        let mut json = String::new();
        GzDecoder::new(compressed.as_slice()).read_to_string(&mut json).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let events = sample_events();
        let encoded = encode(&events).unwrap();

        assert_eq!(decode(&encoded), serde_json::to_value(&events).unwrap());
    }

    #[test]
    fn test_output_has_no_line_breaks() {
        let events = sample_events();
        let encoded = encode(&events).unwrap();

        assert!(!encoded.contains('\n'));
        assert!(!encoded.contains('\r'));
    }

    #[test]
    fn test_order_preserved() {
        let events = sample_events();
        let decoded = decode(&encode(&events).unwrap());

        let sorts: Vec<i64> =
            decoded.as_array().unwrap().iter().map(|e| e["properties"]["sort"].as_i64().unwrap()).collect();
        assert_eq!(sorts, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_batch() {
        let encoded = encode(&[]).unwrap();
        assert_eq!(decode(&encoded), serde_json::json!([]));
    }
}
