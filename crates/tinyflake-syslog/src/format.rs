use serde::Serialize;

/// Level attached to messages that arrive as plain text.
pub const DEFAULT_LEVEL: &str = "INFO";

/// Service name attached to messages that arrive as plain text.
pub const DEFAULT_SERVICE: &str = "default";

#[derive(Serialize)]
struct PlainRecord<'a> {
    address: &'a str,
    level: &'a str,
    service: &'a str,
    msg: &'a str,
}

/// Formats one message from `source` as a JSON-shaped log line.
///
/// A message whose first character is `"` is taken to be pre-formatted JSON
/// object members and is spliced in verbatim after the address:
/// `{"address":"0000002a",<msg>}`. Anything else is plain text and is
/// wrapped, with the text JSON-escaped:
/// `{"address":"0000002a","level":"INFO","service":"default","msg":"..."}`.
///
/// ```
/// use tinyflake_syslog::format_record;
///
/// assert_eq!(
///     format_record(42, r#""level":"WARN","msg":"slow""#),
///     r#"{"address":"0000002a","level":"WARN","msg":"slow"}"#,
/// );
/// assert_eq!(
///     format_record(42, "started"),
///     r#"{"address":"0000002a","level":"INFO","service":"default","msg":"started"}"#,
/// );
/// ```
pub fn format_record(source: u32, msg: &str) -> String {
    let address = format!("{source:08x}");
    if msg.starts_with('"') {
        return format!("{{\"address\":\"{address}\",{msg}}}");
    }

    let record = PlainRecord {
        address: &address,
        level: DEFAULT_LEVEL,
        service: DEFAULT_SERVICE,
        msg,
    };
    // Serializing a struct of string slices cannot fail.
    serde_json::to_string(&record).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn plain_text_is_wrapped_and_escaped() {
        let line = format_record(0x00ab_cdef, "say \"hi\"\n\tbye\\");
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["address"], "00abcdef");
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["service"], "default");
        assert_eq!(value["msg"], "say \"hi\"\n\tbye\\");
    }

    #[test]
    fn preformatted_members_are_spliced() {
        let line = format_record(7, r#""level":"ERROR","service":"db","msg":"down""#);
        assert_eq!(
            line,
            r#"{"address":"00000007","level":"ERROR","service":"db","msg":"down"}"#
        );
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["service"], "db");
    }

    #[test]
    fn address_is_eight_hex_digits() {
        let line = format_record(u32::MAX, "x");
        assert!(line.starts_with(r#"{"address":"ffffffff","#));
        let line = format_record(0, "x");
        assert!(line.starts_with(r#"{"address":"00000000","#));
    }

    #[test]
    fn empty_message_is_plain() {
        let value: Value = serde_json::from_str(&format_record(1, "")).unwrap();
        assert_eq!(value["msg"], "");
    }
}
