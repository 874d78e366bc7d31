use twilight_model::id::{
    Id,
    marker::{ChannelMarker, RoleMarker, UserMarker},
};

/// Parse a target user from a raw argument (`<@id>`, `<@!id>`, or raw ID).
pub fn parse_target_user_id(raw: &str) -> Option<Id<UserMarker>> {
    let trimmed = raw.trim();

    let numeric = if trimmed.starts_with("<@") && trimmed.ends_with('>') {
        let without_wrappers = trimmed.strip_prefix("<@")?.strip_suffix('>')?;
        without_wrappers
            .strip_prefix('!')
            .unwrap_or(without_wrappers)
    } else {
        trimmed
    };

    parse_snowflake(numeric).map(Id::new)
}

/// Parse a channel from `<#id>` markup or a raw ID.
pub fn parse_channel_id(raw: &str) -> Option<Id<ChannelMarker>> {
    let trimmed = raw.trim();
    let numeric = trimmed
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(trimmed);

    parse_snowflake(numeric).map(Id::new)
}

/// Every `<#id>` mention in a message body, deduplicated, in order.
pub fn parse_channel_mentions(content: &str) -> Vec<Id<ChannelMarker>> {
    scan_mentions(content, "<#").into_iter().map(Id::new).collect()
}

/// Every `<@&id>` mention in a message body, deduplicated, in order.
pub fn parse_role_mentions(content: &str) -> Vec<Id<RoleMarker>> {
    scan_mentions(content, "<@&").into_iter().map(Id::new).collect()
}

fn scan_mentions(content: &str, opener: &str) -> Vec<u64> {
    let mut found = Vec::new();

    for (start, _) in content.match_indices(opener) {
        let rest = &content[start + opener.len()..];
        let Some(end) = rest.find('>') else {
            continue;
        };

        if let Some(id) = parse_snowflake(&rest[..end])
            && !found.contains(&id)
        {
            found.push(id);
        }
    }

    found
}

fn parse_snowflake(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    raw.parse::<u64>().ok().filter(|id| *id != 0)
}

/// Case-insensitive match of a reply against a set of control tokens.
pub fn matches_token(raw: &str, tokens: &[&str]) -> bool {
    let value = raw.trim();
    tokens.iter().any(|token| value.eq_ignore_ascii_case(token))
}

/// Loose yes/no reading used by inline-field questions.
pub fn is_affirmative(raw: &str) -> bool {
    matches_token(raw, &["y", "ye", "yes", "true", "t"])
}

/// Parse a compact duration token like `30s`, `10m`, `2h`, `1d`, or plain seconds.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let mut chars = value.chars();
    let unit = chars.next_back();

    let (number_raw, multiplier) = match unit {
        Some('s') | Some('S') => (chars.as_str(), 1_u64),
        Some('m') | Some('M') => (chars.as_str(), 60_u64),
        Some('h') | Some('H') => (chars.as_str(), 60_u64 * 60),
        Some('d') | Some('D') => (chars.as_str(), 60_u64 * 60 * 24),
        Some(last) if last.is_ascii_digit() => (value, 1_u64),
        _ => return None,
    };

    let number = number_raw.parse::<u64>().ok()?;
    if number == 0 {
        return None;
    }

    number.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_mentions_keep_order_and_drop_duplicates() {
        let ids: Vec<u64> = parse_channel_mentions("post in <#30> and <#10>, also <#30>")
            .into_iter()
            .map(Id::get)
            .collect();
        assert_eq!(ids, vec![30, 10]);
    }

    #[test]
    fn malformed_mentions_are_ignored() {
        assert!(parse_channel_mentions("<#abc> <# 12> <#>").is_empty());
        assert!(parse_role_mentions("<@12> <#12>").is_empty());
        assert_eq!(parse_role_mentions("<@&77>")[0].get(), 77);
    }

    #[test]
    fn channel_id_accepts_markup_or_raw() {
        assert_eq!(parse_channel_id("<#5>").map(Id::get), Some(5));
        assert_eq!(parse_channel_id(" 6 ").map(Id::get), Some(6));
        assert_eq!(parse_channel_id("0"), None);
    }

    #[test]
    fn affirmative_variants() {
        for raw in ["y", "YES", " ye ", "True", "t"] {
            assert!(is_affirmative(raw), "{raw}");
        }
        for raw in ["no", "n", "nope", ""] {
            assert!(!is_affirmative(raw), "{raw}");
        }
    }

    #[test]
    fn duration_units() {
        assert_eq!(parse_duration_seconds("3m"), Some(180));
        assert_eq!(parse_duration_seconds("45"), Some(45));
        assert_eq!(parse_duration_seconds("0s"), None);
        assert_eq!(parse_duration_seconds("soon"), None);
    }
}
