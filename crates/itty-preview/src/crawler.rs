//! User-agent classification.
//!
//! Both checks are case-sensitive substring matches against lists supplied
//! by [`Config`](crate::Config) at startup.

/// Crawlers that fetch a link once to build a preview card.
pub const DEFAULT_METADATA_BOTS: &[&str] = &[
    "Twitterbot",
    "curl",
    "facebookexternalhit",
    "Slackbot-LinkExpanding",
    "Discordbot",
    "snapchat",
    "Googlebot",
];

/// Decide whether a request should get the server-rendered preview.
///
/// Only document paths qualify: the path must end with `/` and must not be
/// the root. The user agent must contain one of `bots`.
pub fn is_metadata_request(path: &str, user_agent: &str, bots: &[String]) -> bool {
    if path == "/" || !path.ends_with('/') {
        return false;
    }
    matches_any(user_agent, bots)
}

/// Decide whether a user agent is refused outright.
pub fn is_blocked_agent(user_agent: &str, blocked: &[String]) -> bool {
    matches_any(user_agent, blocked)
}

fn matches_any(user_agent: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| !needle.is_empty() && user_agent.contains(needle.as_str()))
}
