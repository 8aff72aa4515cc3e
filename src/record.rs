use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// One episode as returned by the lookup API.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodcastRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub media: Media,
    #[serde(default)]
    pub start_at: Value,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub media_url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub media_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(rename = "poster", default, deserialize_with = "lenient")]
    pub poster_url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Rating,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default, deserialize_with = "lenient")]
    pub rating: i64,
    #[serde(default)]
    pub user_rating: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeQuality {
    Clean,
    /// The body was not a JSON document, or nothing in it populated the record.
    Degraded,
}

// A mistyped field keeps its zero value instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Decodes a lookup body. Never fails: whatever could not be parsed stays zero-valued.
///
/// Only the first JSON value is read; anything after it is ignored.
pub fn decode(body: &[u8]) -> (PodcastRecord, DecodeQuality) {
    let first = serde_json::Deserializer::from_slice(body)
        .into_iter::<PodcastRecord>()
        .next();
    match first {
        Some(Ok(record)) if record == PodcastRecord::default() => {
            (record, DecodeQuality::Degraded)
        }
        Some(Ok(record)) => (record, DecodeQuality::Clean),
        Some(Err(err)) => {
            tracing::debug!(error = %err, "undecodable episode body");
            (PodcastRecord::default(), DecodeQuality::Degraded)
        }
        None => (PodcastRecord::default(), DecodeQuality::Degraded),
    }
}

impl PodcastRecord {
    /// Indented JSON with a one-space indent, as stored next to the assets.
    pub fn to_pretty_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
        self.serialize(&mut serializer)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_body() {
        let body = json!({
            "media": {
                "title": "Pilot",
                "mediaUrl": "https://cdn.example.com/pilot.mp3",
                "mediaType": "audio/mpeg",
                "description": "First one",
                "poster": "https://cdn.example.com/pilot.jpg",
                "id": 42,
                "rating": { "rating": 4, "userRating": 5 }
            },
            "startAt": "00:01:00"
        });
        let (record, quality) = decode(body.to_string().as_bytes());

        assert_eq!(quality, DecodeQuality::Clean);
        assert_eq!(record.media.title, "Pilot");
        assert_eq!(record.media.poster_url, "https://cdn.example.com/pilot.jpg");
        assert_eq!(record.media.id, 42);
        assert_eq!(record.media.rating.rating, 4);
        assert_eq!(record.media.rating.user_rating, json!(5));
        assert_eq!(record.start_at, json!("00:01:00"));
    }

    #[test]
    fn test_decode_keeps_fields_around_a_mistyped_one() {
        let body = br#"{"media":{"title":"Pilot","id":"not-a-number","rating":{"rating":3}}}"#;
        let (record, quality) = decode(body);

        assert_eq!(quality, DecodeQuality::Clean);
        assert_eq!(record.media.title, "Pilot");
        assert_eq!(record.media.id, 0);
        assert_eq!(record.media.rating.rating, 3);
    }

    #[test]
    fn test_decode_garbage_yields_zero_record() {
        let (record, quality) = decode(b"<html>maintenance</html>");
        assert_eq!(record, PodcastRecord::default());
        assert_eq!(quality, DecodeQuality::Degraded);

        let (record, quality) = decode(b"{}");
        assert_eq!(record, PodcastRecord::default());
        assert_eq!(quality, DecodeQuality::Degraded);
    }

    #[test]
    fn test_decode_ignores_data_after_first_value() {
        let (record, quality) = decode(b"{\"media\":{\"title\":\"Pilot\"}}\ngarbage");
        assert_eq!(quality, DecodeQuality::Clean);
        assert_eq!(record.media.title, "Pilot");

        let (record, _) = decode(b"{\"media\":{\"id\":3}} {\"media\":{\"id\":4}}");
        assert_eq!(record.media.id, 3);
    }

    #[test]
    fn test_decode_empty_body_yields_zero_record() {
        let (record, quality) = decode(b"  \n");
        assert_eq!(record, PodcastRecord::default());
        assert_eq!(quality, DecodeQuality::Degraded);
    }

    #[test]
    fn test_pretty_json_uses_one_space_indent() {
        let mut record = PodcastRecord::default();
        record.media.title = "Pilot".to_string();

        let json = String::from_utf8(record.to_pretty_json().unwrap()).unwrap();
        assert!(json.starts_with("{\n \"media\": {\n  \"title\": \"Pilot\","));
        assert!(json.contains("\"userRating\": null"));
        assert!(json.ends_with("\n \"startAt\": null\n}"));
    }
}
