use chrono::DateTime;
use chrono::Utc;

use crate::types::Entry;

/// Case-insensitive substring filter over a snapshot, order preserved.
pub fn search(entries: &[Entry], term: &str) -> Vec<Entry> {
    let needle = term.to_lowercase();
    entries
        .iter()
        .filter(|e| needle.is_empty() || e.text.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Relative capture time for list views.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - created_at;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{days}d ago")
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entries(texts: &[&str]) -> Vec<Entry> {
        texts
            .iter()
            .map(|t| Entry::new((*t).to_string(), Utc::now()))
            .collect()
    }

    #[test]
    fn search_is_case_insensitive_and_ordered() {
        let all = entries(&["Hello World", "goodbye", "say HELLO"]);
        let found: Vec<_> = search(&all, "hello").into_iter().map(|e| e.text).collect();
        assert_eq!(found, vec!["Hello World", "say HELLO"]);
        assert_eq!(search(&all, "").len(), 3);
        assert!(search(&all, "absent").is_empty());
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(30), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
        // Clock skew never shows a negative age.
        assert_eq!(time_ago(now + Duration::minutes(5), now), "Just now");
    }

    #[test]
    fn preview_counts_characters() {
        assert_eq!(preview("short", 150), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ééééé", 2), "éé...");
    }
}
