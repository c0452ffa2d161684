use std::fmt::Write as _;

use crate::html::escape;
use crate::{CommentMap, CommitEntry};

/// Render the commit log as cards with an editable comment per commit.
pub fn render_history_cards(history: &[CommitEntry], comments: &CommentMap) -> String {
    if history.is_empty() {
        return r#"<div class="jira-card">No git history found.</div>"#.to_string();
    }

    let mut html = String::new();
    for commit in history {
        let hash = escape(&commit.hash);
        let initial = commit
            .author
            .chars()
            .next()
            .map(|c| escape(&c.to_string()))
            .unwrap_or_default();
        let comment = comments
            .get(&commit.hash)
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");
        let _ = write!(
            html,
            concat!(
                r#"<div class="jira-card" id="card-{hash}">"#,
                r#"<div class="card-header"><p class="commit-msg">{message}</p><span class="commit-hash-tag">{short}</span></div>"#,
                r#"<div class="card-meta"><div class="author-avatar">{initial}</div><span>{author}</span><span>{date}</span></div>"#,
                r#"<div class="card-feedback"><textarea class="comment-input" data-hash="{hash}">{comment}</textarea></div>"#,
                "</div>"
            ),
            hash = hash,
            message = escape(&commit.message),
            short = escape(commit.short_hash()),
            initial = initial,
            author = escape(&commit.author),
            date = escape(&commit.date),
            comment = escape(comment),
        );
    }
    html
}
