//! Custom serde helpers for persisted order documents.

/// Deserializes a monetary field that older documents store either as a JSON
/// number or as a string (`"120.50"`, `"$1,020"`, `""`).
///
/// Blank, `null` and unparsable values read as `0.0`. Validation of new input
/// happens at the mutation boundary, not here: stored documents must always load.
pub mod lenient_money {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Repr>::deserialize(deserializer)?;
        Ok(match value {
            Some(Repr::Number(n)) if n.is_finite() => n,
            Some(Repr::Text(s)) => parse(&s).unwrap_or(0.0),
            _ => 0.0,
        })
    }

    /// Parse a money string, tolerating currency symbols and thousands separators
    pub fn parse(raw: &str) -> Option<f64> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | ' '))
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Non-blank text that [`parse`] rejects, i.e. a value that reads as `0.0`
    pub fn is_unparsable(raw: &str) -> bool {
        !raw.trim().is_empty() && parse(raw).is_none()
    }
}

/// Number or numeric text; any other text is a decode error.
///
/// Used inside untagged enums, where the error moves decoding on to the next
/// variant instead of reading the value as `0.0`.
pub mod numeric_money {
    use serde::{Deserialize, Deserializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Number(n)) if n.is_finite() => Ok(n),
            Some(Repr::Number(n)) => Err(de::Error::custom(format!("amount {n} is not finite"))),
            Some(Repr::Text(s)) if s.trim().is_empty() => Ok(0.0),
            Some(Repr::Text(s)) => super::lenient_money::parse(&s)
                .ok_or_else(|| de::Error::custom(format!("amount {s:?} is not a number"))),
            None => Ok(0.0),
        }
    }
}

/// Same as [`lenient_money`] for optional fields: blank or unparsable reads as `None`.
pub mod lenient_money_opt {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Repr>::deserialize(deserializer)?;
        Ok(match value {
            Some(Repr::Number(n)) if n.is_finite() => Some(n),
            Some(Repr::Text(s)) => super::lenient_money::parse(&s),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Doc {
        #[serde(default, deserialize_with = "super::lenient_money::deserialize")]
        price: f64,
        #[serde(default, deserialize_with = "super::lenient_money_opt::deserialize")]
        credit: Option<f64>,
    }

    #[test]
    fn test_number_and_string_forms() {
        let doc: Doc = serde_json::from_str(r#"{"price": 12.5, "credit": "40"}"#).unwrap();
        assert_eq!(doc.price, 12.5);
        assert_eq!(doc.credit, Some(40.0));

        let doc: Doc = serde_json::from_str(r#"{"price": "$1,020.75"}"#).unwrap();
        assert_eq!(doc.price, 1020.75);
        assert_eq!(doc.credit, None);
    }

    #[test]
    fn test_blank_and_garbage_read_as_zero() {
        let doc: Doc = serde_json::from_str(r#"{"price": "", "credit": "n/a"}"#).unwrap();
        assert_eq!(doc.price, 0.0);
        assert_eq!(doc.credit, None);

        let doc: Doc = serde_json::from_str(r#"{"price": null}"#).unwrap();
        assert_eq!(doc.price, 0.0);
    }

    #[test]
    fn test_unparsable_text_is_detected() {
        assert!(super::lenient_money::is_unparsable("eighty"));
        assert!(super::lenient_money::is_unparsable("$"));
        assert!(!super::lenient_money::is_unparsable(" $1,020 "));
        assert!(!super::lenient_money::is_unparsable("   "));
    }

    #[test]
    fn test_numeric_money_rejects_words() {
        #[derive(Deserialize)]
        struct Cost {
            #[serde(default, deserialize_with = "super::numeric_money::deserialize")]
            amount: f64,
        }

        let cost: Cost = serde_json::from_str(r#"{"amount": "15"}"#).unwrap();
        assert_eq!(cost.amount, 15.0);
        let cost: Cost = serde_json::from_str(r#"{"amount": ""}"#).unwrap();
        assert_eq!(cost.amount, 0.0);
        let cost: Cost = serde_json::from_str("{}").unwrap();
        assert_eq!(cost.amount, 0.0);
        assert!(serde_json::from_str::<Cost>(r#"{"amount": "call yard"}"#).is_err());
    }
}
