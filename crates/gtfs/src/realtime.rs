//! Turns a raw GTFS-realtime payload into the generated
//! [`proto::FeedMessage`], applying the freshness filter before anything
//! downstream sees the message.

use prost::Message;

pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/protobuf/transit_realtime.rs"));
}

pub use proto::{
    alert::{Cause as AlertCause, Effect as AlertEffect, SeverityLevel},
    trip_descriptor::ScheduleRelationship as TripScheduleRelationship,
    trip_update::stop_time_update::ScheduleRelationship as StopTimeScheduleRelationship,
    Alert, EntitySelector, FeedEntity, FeedHeader, FeedMessage, Position, TimeRange,
    TranslatedString, TripDescriptor, TripUpdate, VehicleDescriptor, VehiclePosition,
};

#[derive(Debug, thiserror::Error)]
#[error("malformed GTFS-realtime payload: {0}")]
pub struct DecodeError(#[from] pub prost::DecodeError);

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("feed message is older than the configured freshness window")]
pub struct StaleFeed;

/// Parses a raw protobuf payload into a [`FeedMessage`]. Corresponds to
/// `DecodeError` in the error taxonomy: the caller logs at info level and
/// discards the payload.
pub fn decode(bytes: &[u8]) -> Result<FeedMessage, DecodeError> {
    FeedMessage::decode(bytes).map_err(DecodeError)
}

/// Rejects an entire feed message if its header timestamp is older than
/// `max_age_seconds`. A message with no header timestamp is always fresh.
pub fn check_freshness(
    message: &FeedMessage,
    now_unix: i64,
    max_age_seconds: i64,
) -> Result<(), StaleFeed> {
    match message.header.timestamp {
        Some(ts) if now_unix - ts as i64 > max_age_seconds => Err(StaleFeed),
        _ => Ok(()),
    }
}

/// Extracts the first translation matching `language`, falling back to the
/// first translation matching only the primary subtag (e.g. `de` for
/// `de-DE`), then the first available translation. `language` is
/// configurable (`app.translation_language`) rather than a hard-coded
/// `de-DE`, so this works for any deployment's locale.
pub fn extract_translation<'a>(
    translated: Option<&'a TranslatedString>,
    language: &str,
) -> Option<&'a str> {
    let translations = &translated?.translation;
    let primary = language.split('-').next().unwrap_or(language);
    translations
        .iter()
        .find(|t| t.language.as_deref() == Some(language))
        .or_else(|| {
            translations
                .iter()
                .find(|t| t.language.as_deref().map(|l| l.split('-').next().unwrap_or(l)) == Some(primary))
        })
        .or_else(|| translations.first())
        .map(|t| t.text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_with_timestamp(ts: Option<u64>) -> FeedMessage {
        FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_owned(),
                incrementality: None,
                timestamp: ts,
            },
            entity: vec![],
        }
    }

    #[test]
    fn fresh_feed_within_window_passes() {
        let message = feed_with_timestamp(Some(1000));
        assert!(check_freshness(&message, 1000 + 7199, 7200).is_ok());
    }

    #[test]
    fn stale_feed_past_window_is_rejected() {
        let message = feed_with_timestamp(Some(1000));
        assert!(check_freshness(&message, 1000 + 7201, 7200).is_err());
    }

    #[test]
    fn missing_timestamp_is_always_fresh() {
        let message = feed_with_timestamp(None);
        assert!(check_freshness(&message, i64::MAX / 2, 7200).is_ok());
    }

    #[test]
    fn translation_prefers_exact_language_match() {
        let translated = TranslatedString {
            translation: vec![
                proto::translated_string::Translation {
                    text: "hello".to_owned(),
                    language: Some("en".to_owned()),
                },
                proto::translated_string::Translation {
                    text: "hallo".to_owned(),
                    language: Some("de-DE".to_owned()),
                },
            ],
        };
        assert_eq!(extract_translation(Some(&translated), "de-DE"), Some("hallo"));
    }

    #[test]
    fn translation_falls_back_to_primary_subtag() {
        let translated = TranslatedString {
            translation: vec![proto::translated_string::Translation {
                text: "hallo".to_owned(),
                language: Some("de".to_owned()),
            }],
        };
        assert_eq!(extract_translation(Some(&translated), "de-DE"), Some("hallo"));
    }

    #[test]
    fn translation_falls_back_to_first_available() {
        let translated = TranslatedString {
            translation: vec![proto::translated_string::Translation {
                text: "only".to_owned(),
                language: None,
            }],
        };
        assert_eq!(extract_translation(Some(&translated), "de-DE"), Some("only"));
    }
}
