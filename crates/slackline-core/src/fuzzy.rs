//! Tiered name matching for channel and user pickers.
//!
//! Scores are coarse buckets rather than edit distances so a numbered
//! candidate list reads predictably. Results are ordered by score, highest
//! first; equal scores keep their input order.

use slackline_api::{ChannelRecord, UserRecord};

pub const EXACT: u32 = 100;
pub const EXACT_REAL_NAME: u32 = 95;
pub const PREFIX: u32 = 90;
pub const SUBSTRING: u32 = 70;
pub const SCATTERED: u32 = 50;

const TOPIC_WIDTH: usize = 60;

pub fn match_channels<'a>(query: &str, channels: &'a [ChannelRecord]) -> Vec<(&'a ChannelRecord, u32)> {
    let query = query.trim_start_matches('#').to_lowercase();

    let matches = channels
        .iter()
        .filter_map(|channel| channel_score(&query, &channel.name.to_lowercase()).map(|score| (channel, score)))
        .collect();
    ranked(matches)
}

/// Deleted users never match.
pub fn match_users<'a>(query: &str, users: &'a [UserRecord]) -> Vec<(&'a UserRecord, u32)> {
    let query = query.trim_start_matches('@').to_lowercase();

    let matches = users
        .iter()
        .filter(|user| !user.deleted)
        .filter_map(|user| {
            user_score(&query, &user.name.to_lowercase(), &user.real_name.to_lowercase())
                .map(|score| (user, score))
        })
        .collect();
    ranked(matches)
}

fn channel_score(query: &str, name: &str) -> Option<u32> {
    if name == query {
        Some(EXACT)
    } else if name.starts_with(query) {
        Some(PREFIX)
    } else if name.contains(query) {
        Some(SUBSTRING)
    } else if query.chars().all(|c| name.contains(c)) {
        Some(SCATTERED)
    } else {
        None
    }
}

fn user_score(query: &str, username: &str, real_name: &str) -> Option<u32> {
    if username == query {
        Some(EXACT)
    } else if real_name == query {
        Some(EXACT_REAL_NAME)
    } else if username.starts_with(query) {
        Some(PREFIX)
    } else if username.contains(query) || real_name.contains(query) {
        Some(SUBSTRING)
    } else {
        None
    }
}

fn ranked<T>(mut matches: Vec<(T, u32)>) -> Vec<(T, u32)> {
    // sort_by is stable
    matches.sort_by(|a, b| b.1.cmp(&a.1));
    matches
}

// ===== CANDIDATE LISTS =====

pub fn render_channel_matches(matches: &[(&ChannelRecord, u32)]) -> String {
    if matches.is_empty() {
        return "No channels found.".to_string();
    }

    let mut out = format!("Found {} channel(s):\n\n", matches.len());
    for (idx, (channel, _)) in matches.iter().enumerate() {
        let topic = if channel.topic.trim().is_empty() {
            "No topic".to_string()
        } else {
            channel.topic.chars().take(TOPIC_WIDTH).collect()
        };
        out.push_str(&format!("  {}. #{}\n     {}\n\n", idx + 1, channel.name, topic));
    }
    out
}

pub fn render_user_matches(matches: &[(&UserRecord, u32)]) -> String {
    if matches.is_empty() {
        return "No users found.".to_string();
    }

    let mut out = format!("Found {} user(s):\n\n", matches.len());
    for (idx, (user, _)) in matches.iter().enumerate() {
        out.push_str(&format!("  {}. @{} ({})\n", idx + 1, user.name, user.real_name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(names: &[&str]) -> Vec<ChannelRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ChannelRecord::new(format!("C{}", i), *name))
            .collect()
    }

    fn names<'a>(matches: &[(&'a ChannelRecord, u32)]) -> Vec<(&'a str, u32)> {
        matches.iter().map(|(c, s)| (c.name.as_str(), *s)).collect()
    }

    #[test]
    fn test_exact_outranks_prefix_and_excludes_unrelated() {
        let listing = channels(&["general-eng", "random", "general"]);
        let matches = match_channels("general", &listing);
        assert_eq!(names(&matches), vec![("general", 100), ("general-eng", 90)]);
    }

    #[test]
    fn test_channel_tiers() {
        let listing = channels(&["dev-ops", "ops", "opsec", "pots"]);
        let matches = match_channels("#OPS", &listing);
        assert_eq!(
            names(&matches),
            vec![("ops", 100), ("opsec", 90), ("dev-ops", 70), ("pots", 50)]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let listing = channels(&["team-b", "team-a", "team-c"]);
        let matches = match_channels("team", &listing);
        assert_eq!(
            names(&matches),
            vec![("team-b", 90), ("team-a", 90), ("team-c", 90)]
        );
    }

    #[test]
    fn test_user_tiers_skip_deleted() {
        let users = vec![
            UserRecord::new("U1", "adam").with_real_name("Adam Smith"),
            UserRecord::new("U2", "ada").with_real_name("Ada Lovelace"),
            UserRecord::new("U3", "countess").with_real_name("ada"),
            UserRecord::new("U4", "ada.old").deleted(true),
            UserRecord::new("U5", "bob").with_real_name("Bob Adams"),
        ];

        let matches: Vec<(&str, u32)> = match_users("@Ada", &users)
            .into_iter()
            .map(|(u, s)| (u.id.as_str(), s))
            .collect();
        assert_eq!(matches, vec![("U2", 100), ("U3", 95), ("U1", 90), ("U5", 70)]);
    }

    #[test]
    fn test_render_channels() {
        let listing = vec![
            ChannelRecord::new("C1", "general").with_topic("a".repeat(80)),
            ChannelRecord::new("C2", "general-eng"),
        ];
        let matches = match_channels("general", &listing);
        let text = render_channel_matches(&matches);

        assert!(text.starts_with("Found 2 channel(s):"));
        assert!(text.contains(&format!("  1. #general\n     {}\n", "a".repeat(60))));
        assert!(text.contains("  2. #general-eng\n     No topic\n"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_channel_matches(&[]), "No channels found.");
        assert_eq!(render_user_matches(&[]), "No users found.");
    }

    #[test]
    fn test_render_users() {
        let users = vec![UserRecord::new("U1", "ada").with_real_name("Ada Lovelace")];
        let text = render_user_matches(&match_users("ada", &users));
        assert!(text.contains("  1. @ada (Ada Lovelace)"));
    }
}
