//! `Key: value` extraction for free-text tool output (smartctl, ipmitool,
//! ethtool, lspci).

/// Value of the first line shaped like `<key> : <value>`.
///
/// The key must start the line (leading whitespace allowed) and be followed
/// directly by optional whitespace and a colon, so `IP Address` does not match
/// `IP Address Source`. Empty values count as absent.
pub fn field(text: &str, key: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix(key)?;
        let value = rest.trim_start().strip_prefix(':')?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Like [`field`] but keeps only the last whitespace-separated token.
pub fn field_token(text: &str, key: &str) -> Option<String> {
    field(text, key).and_then(|v| v.split_whitespace().last().map(|s| s.to_string()))
}

/// First match among several candidate keys, in order.
pub fn first_field(text: &str, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| field(text, k))
}
