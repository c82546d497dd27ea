use encoding_rs::{Encoding, UTF_8};
use serde_json::Value;

/// Stage at which an error body stopped making sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Bytes are not valid text in the declared (or default UTF-8) charset.
    Text,
    /// Text is not a JSON document.
    Json,
}

/// Outcome of interpreting a backend error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// A usable human-readable message.
    Detail(String),
    /// Valid JSON, but without a usable `detail` field.
    MissingDetail,
    /// Could not interpret the body at all.
    Unreadable { stage: DecodeStage, reason: String },
}

impl ErrorBody {
    pub fn into_detail(self) -> Option<String> {
        match self {
            ErrorBody::Detail(detail) => Some(detail),
            ErrorBody::MissingDetail | ErrorBody::Unreadable { .. } => None,
        }
    }
}

/// Decode an error response body in two stages: bytes to text, then text to
/// JSON with a `detail` field.
///
/// Works the same whether the server labelled the body as JSON or as an
/// opaque binary type. `content_type` is only consulted for its charset.
pub fn decode_error_body(body: &[u8], content_type: Option<&str>) -> ErrorBody {
    let text = match decode_text(body, content_type) {
        Ok(text) => text,
        Err(reason) => {
            return ErrorBody::Unreadable {
                stage: DecodeStage::Text,
                reason,
            }
        }
    };

    let json: Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(err) => {
            return ErrorBody::Unreadable {
                stage: DecodeStage::Json,
                reason: err.to_string(),
            }
        }
    };

    match detail_text(&json) {
        Some(detail) => ErrorBody::Detail(detail),
        None => ErrorBody::MissingDetail,
    }
}

fn decode_text(body: &[u8], content_type: Option<&str>) -> Result<String, String> {
    let encoding = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        return Err(format!("body is not valid {}", used.name()));
    }
    Ok(text.into_owned())
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

// Plain string detail, or the `msg` fields of a validation error list.
fn detail_text(json: &Value) -> Option<String> {
    match json.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_detail_from_binary_json() {
        let body = br#"{"detail":"bad section"}"#;
        assert_eq!(
            decode_error_body(body, Some("application/octet-stream")),
            ErrorBody::Detail("bad section".to_string())
        );
    }

    #[test]
    fn non_json_body_is_unreadable_at_json_stage() {
        let decoded = decode_error_body(b"<html>502 Bad Gateway</html>", Some("text/html"));
        assert!(matches!(
            decoded,
            ErrorBody::Unreadable {
                stage: DecodeStage::Json,
                ..
            }
        ));
        assert_eq!(decoded.into_detail(), None);
    }

    #[test]
    fn invalid_utf8_is_unreadable_at_text_stage() {
        let decoded = decode_error_body(&[0x7b, 0xc3, 0x28, 0x7d], None);
        assert!(matches!(
            decoded,
            ErrorBody::Unreadable {
                stage: DecodeStage::Text,
                ..
            }
        ));
    }

    #[test]
    fn honours_declared_charset() {
        // "détail refusé" in latin-1.
        let mut body = br#"{"detail":"d"#.to_vec();
        body.push(0xe9);
        body.extend_from_slice(b"tail refus");
        body.push(0xe9);
        body.extend_from_slice(br#""}"#);
        assert_eq!(
            decode_error_body(&body, Some("application/json; charset=ISO-8859-1")),
            ErrorBody::Detail("d\u{e9}tail refus\u{e9}".to_string())
        );
    }

    #[test]
    fn missing_or_blank_detail() {
        assert_eq!(decode_error_body(br#"{"error":"x"}"#, None), ErrorBody::MissingDetail);
        assert_eq!(decode_error_body(br#"{"detail":"  "}"#, None), ErrorBody::MissingDetail);
        assert_eq!(decode_error_body(br#"[1,2]"#, None), ErrorBody::MissingDetail);
    }

    #[test]
    fn validation_error_list_joins_messages() {
        let body = br#"{"detail":[{"loc":["body","query"],"msg":"field required","type":"value_error.missing"}]}"#;
        assert_eq!(
            decode_error_body(body, Some("application/json")),
            ErrorBody::Detail("field required".to_string())
        );
    }
}
