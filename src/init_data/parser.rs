// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Untrusted init-data parsing.
//!
//! Nothing returned here has been authenticated. Use it for optimistic
//! display; trust decisions go through [`super::InitDataVerifier`].

use crate::models::WebAppUser;

/// Field carrying the signature.
pub const HASH_FIELD: &str = "hash";

/// Init data split into its known fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInitData {
    pub user: WebAppUser,
    /// Unix timestamp of issuance
    pub auth_date: i64,
    pub hash: String,
    pub query_id: Option<String>,
    pub chat_instance: Option<String>,
    pub chat_type: Option<String>,
    pub start_param: Option<String>,
    /// Every other field, in arrival order
    pub extra: Vec<(String, String)>,
}

/// Decode an `application/x-www-form-urlencoded` string into ordered pairs.
///
/// Returns `None` for empty input or when a component is not valid UTF-8.
pub fn parse_pairs(raw: &str) -> Option<Vec<(String, String)>> {
    if raw.is_empty() {
        return None;
    }

    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Some((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(component: &str) -> Option<String> {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|c| c.into_owned())
}

/// Build the data-check string the platform signs.
///
/// Returns the first `hash` value and the remaining pairs sorted by key,
/// joined as `key=value` lines. `None` when there is no `hash`.
pub fn data_check_string(pairs: &[(String, String)]) -> Option<(String, String)> {
    let hash = pairs
        .iter()
        .find(|(key, _)| key == HASH_FIELD)
        .map(|(_, value)| value.clone())?;

    let mut fields: Vec<&(String, String)> =
        pairs.iter().filter(|(key, _)| key != HASH_FIELD).collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let check = fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n");

    Some((hash, check))
}

/// Parse init data into its fields.
///
/// Requires `hash`, a numeric `auth_date` and a JSON `user` object;
/// anything less yields `None`. Never panics.
pub fn parse(raw: &str) -> Option<ParsedInitData> {
    let pairs = parse_pairs(raw)?;

    let first = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    };

    let hash = first(HASH_FIELD).filter(|h| !h.is_empty())?;
    let auth_date = first("auth_date")?.trim().parse::<i64>().ok()?;
    let user: WebAppUser = serde_json::from_str(&first("user")?).ok()?;

    const KNOWN: [&str; 7] = [
        HASH_FIELD,
        "auth_date",
        "user",
        "query_id",
        "chat_instance",
        "chat_type",
        "start_param",
    ];
    let extra = pairs
        .iter()
        .filter(|(key, _)| !KNOWN.contains(&key.as_str()))
        .cloned()
        .collect();

    Some(ParsedInitData {
        user,
        auth_date,
        hash,
        query_id: first("query_id"),
        chat_instance: first("chat_instance"),
        chat_type: first("chat_type"),
        start_param: first("start_param"),
        extra,
    })
}

/// Best-effort user for showing a name before the server has answered.
pub fn optimistic_user(raw: &str) -> Option<WebAppUser> {
    parse(raw).map(|data| data.user)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_data_check_string_sorted_without_hash() {
        let input = pairs(&[("b", "2"), ("a", "1"), ("hash", "abc")]);
        let (hash, check) = data_check_string(&input).unwrap();
        assert_eq!(hash, "abc");
        assert_eq!(check, "a=1\nb=2");
    }

    #[test]
    fn test_data_check_string_requires_hash() {
        assert_eq!(data_check_string(&pairs(&[("a", "1")])), None);
    }

    #[test]
    fn test_data_check_string_drops_every_hash() {
        let input = pairs(&[("hash", "first"), ("a", "1"), ("hash", "second")]);
        let (hash, check) = data_check_string(&input).unwrap();
        assert_eq!(hash, "first");
        assert_eq!(check, "a=1");
    }

    #[test]
    fn test_parse_pairs_decodes_form_encoding() {
        let decoded = parse_pairs("user=%7B%22id%22%3A1%7D&name=a+b&empty=").unwrap();
        assert_eq!(
            decoded,
            pairs(&[("user", r#"{"id":1}"#), ("name", "a b"), ("empty", "")])
        );
    }

    #[test]
    fn test_parse_pairs_rejects_empty_and_bad_utf8() {
        assert_eq!(parse_pairs(""), None);
        assert_eq!(parse_pairs("a=%FF%FE"), None);
    }

    #[test]
    fn test_parse_full_init_data() {
        let raw = "query_id=AAE&user=%7B%22id%22%3A42%2C%22first_name%22%3A%22A%22%7D\
                   &auth_date=1700000000&start_param=promo&signature=sig&hash=deadbeef";
        let parsed = parse(raw).unwrap();
        assert_eq!(parsed.user.id, 42);
        assert_eq!(parsed.user.first_name, "A");
        assert_eq!(parsed.auth_date, 1700000000);
        assert_eq!(parsed.hash, "deadbeef");
        assert_eq!(parsed.query_id.as_deref(), Some("AAE"));
        assert_eq!(parsed.start_param.as_deref(), Some("promo"));
        assert_eq!(parsed.extra, pairs(&[("signature", "sig")]));
    }

    #[test]
    fn test_parse_rejects_incomplete() {
        assert_eq!(parse(""), None);
        // no user
        assert_eq!(parse("auth_date=1&hash=x"), None);
        // non-numeric auth_date
        assert_eq!(
            parse("user=%7B%22id%22%3A1%2C%22first_name%22%3A%22A%22%7D&auth_date=soon&hash=x"),
            None
        );
        // user is not JSON
        assert_eq!(parse("user=bob&auth_date=1&hash=x"), None);
        // no hash
        assert_eq!(
            parse("user=%7B%22id%22%3A1%2C%22first_name%22%3A%22A%22%7D&auth_date=1"),
            None
        );
    }

    #[test]
    fn test_parse_garbage_does_not_panic() {
        for raw in ["&&&", "=", "==&=", "%", "hash", "user=%7B", "\u{0}"] {
            assert_eq!(parse(raw), None, "input {:?}", raw);
        }
    }
}
