// Literal decoding for scalar attribute values
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Leading quoted numeric token of an RDF literal, e.g. `"42.5"^^xsd:double`.
static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"([+-]?\d+(?:\.\d+)?)""#).expect("invalid numeric literal regex")
});

/// Bracketed unit annotation anywhere in the text, e.g. `[kg]`.
static BRACKETED_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]").expect("invalid unit regex"));

/// A decoded scalar: display value plus unit (`""` when absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLiteral {
    pub value: String,
    pub unit: String,
}

/// Decode a raw JSON scalar into a display value and unit.
///
/// Never fails: text that does not look like an encoded literal is kept verbatim.
/// A bracketed unit found in the text overrides `fallback_unit`.
pub fn decode_literal(raw: &Value, fallback_unit: &str) -> DecodedLiteral {
    match raw {
        Value::String(text) => decode_text(text, fallback_unit),
        Value::Null => DecodedLiteral {
            value: String::new(),
            unit: fallback_unit.to_string(),
        },
        Value::Array(items) => {
            let value = items
                .iter()
                .map(|item| decode_literal(item, "").value)
                .collect::<Vec<_>>()
                .join(", ");
            DecodedLiteral {
                value,
                unit: fallback_unit.to_string(),
            }
        }
        other => DecodedLiteral {
            value: other.to_string(),
            unit: fallback_unit.to_string(),
        },
    }
}

fn decode_text(text: &str, fallback_unit: &str) -> DecodedLiteral {
    let value = if text.starts_with('"') {
        NUMERIC_LITERAL
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| text.to_string())
    } else {
        text.to_string()
    };

    let unit = BRACKETED_UNIT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| fallback_unit.to_string());

    DecodedLiteral { value, unit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_typed_literal_with_unit() {
        let decoded = decode_literal(&json!("\"42.5\"^^type [kg]"), "");
        assert_eq!(decoded.value, "42.5");
        assert_eq!(decoded.unit, "kg");
    }

    #[test]
    fn test_decode_signed_literal_keeps_fallback_unit() {
        let decoded = decode_literal(
            &json!("\"-3\"^^<http://www.w3.org/2001/XMLSchema#integer>"),
            "m",
        );
        assert_eq!(decoded.value, "-3");
        assert_eq!(decoded.unit, "m");
    }

    #[test]
    fn test_unparsable_quoted_text_passes_through() {
        let decoded = decode_literal(&json!("\"Main Street\"@en"), "");
        assert_eq!(decoded.value, "\"Main Street\"@en");
        assert_eq!(decoded.unit, "");
    }

    #[test]
    fn test_plain_text_unit_is_extracted() {
        let decoded = decode_literal(&json!("roughly ten [m/s]"), "km/h");
        assert_eq!(decoded.value, "roughly ten [m/s]");
        assert_eq!(decoded.unit, "m/s");
    }

    #[test]
    fn test_non_string_scalars() {
        assert_eq!(decode_literal(&json!(0), "").value, "0");
        assert_eq!(decode_literal(&json!(1.5), "").value, "1.5");
        assert_eq!(decode_literal(&json!(true), "").value, "true");
        assert_eq!(decode_literal(&json!(0), "m").unit, "m");
        assert_eq!(decode_literal(&Value::Null, "").value, "");
        assert_eq!(decode_literal(&json!(["a", 2]), "").value, "a, 2");
    }

    #[test]
    fn test_decoding_plain_values_is_idempotent() {
        for raw in [json!("plain text"), json!(17), json!("12.25"), json!(false)] {
            let once = decode_literal(&raw, "");
            let twice = decode_literal(&Value::String(once.value.clone()), &once.unit);
            assert_eq!(once, twice);
        }
    }
}
