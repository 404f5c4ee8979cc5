//! Dotted-path lookup into a fact document.

use serde_json::Value;

/// Resolves `path` against `doc`.
///
/// Segments are separated by `.`. A segment selects a key of an object, or
/// an element of an array when it parses as an index. An empty path returns
/// the whole document.
pub fn extract<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(doc);
    }
    path.split('.').try_fold(doc, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Formats a resolved value for terminal output: strings raw, anything else
/// as pretty JSON.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "System": {
                "Hostname": "host1",
                "Uptime": 12345,
                "Network": {"Interfaces": {"eth0": {"IPAddresses": ["192.168.1.10/24"]}}}
            },
            "EC2": {"SecurityGroups": ["default", "web"]}
        })
    }

    #[test]
    fn test_extract_nested_key() {
        let doc = doc();
        assert_eq!(extract(&doc, "System.Hostname"), Some(&json!("host1")));
        assert_eq!(
            extract(&doc, "System.Network.Interfaces.eth0.IPAddresses.0"),
            Some(&json!("192.168.1.10/24"))
        );
    }

    #[test]
    fn test_extract_array_index() {
        let doc = doc();
        assert_eq!(extract(&doc, "EC2.SecurityGroups.1"), Some(&json!("web")));
        assert_eq!(extract(&doc, "EC2.SecurityGroups.2"), None);
        assert_eq!(extract(&doc, "EC2.SecurityGroups.first"), None);
    }

    #[test]
    fn test_extract_missing() {
        let doc = doc();
        assert_eq!(extract(&doc, "System.Missing"), None);
        assert_eq!(extract(&doc, "System.Hostname.Deeper"), None);
        assert_eq!(extract(&doc, "Nope"), None);
    }

    #[test]
    fn test_extract_empty_path_is_whole_document() {
        let doc = doc();
        assert_eq!(extract(&doc, ""), Some(&doc));
    }

    #[test]
    fn test_display() {
        assert_eq!(display(&json!("host1")), "host1");
        assert_eq!(display(&json!(12345)), "12345");
        assert_eq!(display(&json!(["a"])), "[\n  \"a\"\n]");
    }
}
