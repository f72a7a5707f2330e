//! Built-in rule sets for the creators and videos tables

use super::{ColumnRule, Predicate, RuleSet};

use super::LogicalType::{Integer, String as Text};

/// Non-negative integer count with a zero default.
fn count_rule(column: &str, label: &str) -> ColumnRule {
    ColumnRule::new(column, Integer)
        .fill(0i64)
        .warn(Predicate::NotInteger, &format!("{label} is not an integer."))
        .assert(
            Predicate::Negative,
            &format!("{label} cannot be negative"),
            true,
        )
}

fn text_rule(column: &str, label: &str) -> ColumnRule {
    ColumnRule::new(column, Text)
        .fill("")
        .assert(Predicate::NotString, &format!("{label} is not a string."), false)
}

/// Rules for `creators`: creator_id, username, follower_count, avg_views,
/// category, bio.
pub fn creator_rules() -> RuleSet {
    RuleSet::new(vec![
        ColumnRule::new("creator_id", Integer)
            .warn(Predicate::NotInteger, "Creator ID is not an integer.")
            .warn(Predicate::Duplicate, "Creator ID is duplicated; first row wins.")
            .assert(Predicate::Negative, "Creator ID cannot be negative", true),
        ColumnRule::new("username", Text)
            .assert(Predicate::NotString, "Username is not a string.", false)
            .assert(Predicate::EmptyString, "Username cannot be empty", true),
        count_rule("follower_count", "Follower count"),
        count_rule("avg_views", "Average views"),
        text_rule("category", "Category"),
        text_rule("bio", "Bio"),
    ])
}

/// Rules for `videos`: video_id, creator_id, views, likes, comments, shares,
/// caption.
pub fn video_rules() -> RuleSet {
    RuleSet::new(vec![
        ColumnRule::new("video_id", Text).assert(
            Predicate::NotString,
            "Video ID is not a string.",
            true,
        ),
        ColumnRule::new("creator_id", Integer)
            .warn(Predicate::NotInteger, "Creator ID is not an integer.")
            .assert(Predicate::Negative, "Creator ID cannot be negative", true),
        count_rule("views", "Views"),
        count_rule("likes", "Likes"),
        count_rule("comments", "Comments"),
        count_rule("shares", "Shares"),
        text_rule("caption", "Caption"),
    ])
}
