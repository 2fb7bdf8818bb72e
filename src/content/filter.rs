use crate::constants::{
    COMMENT_DISPLAY_CHARS, COMMENT_MAX_CHARS, COMMENT_MIN_CHARS, MAX_COMMENTS_PER_ROUND,
};
use crate::content::RawComment;
use crate::game::models::Comment;

/// Quality-filter raw comments down to the handful worth showing.
///
/// Keeps at most [`MAX_COMMENTS_PER_ROUND`] comments whose text is strictly
/// between the length bounds, carries no deletion marker or link, and has a
/// positive score. Retained text is cut to the display length.
pub fn filter_comments(raw: &[RawComment]) -> Vec<Comment> {
    raw.iter()
        .filter(|c| usable(c))
        .take(MAX_COMMENTS_PER_ROUND)
        .map(|c| Comment {
            author: c.author.clone(),
            score: c.score,
            text: truncate_display(&c.body),
        })
        .collect()
}

fn usable(comment: &RawComment) -> bool {
    let len = comment.body.chars().count();
    if len <= COMMENT_MIN_CHARS || len >= COMMENT_MAX_CHARS {
        return false;
    }

    let lowered = comment.body.to_lowercase();
    if lowered.contains("[deleted]") || lowered.contains("[removed]") || lowered.contains("http") {
        return false;
    }

    comment.score >= 1
}

fn truncate_display(text: &str) -> String {
    if text.chars().count() > COMMENT_DISPLAY_CHARS {
        text.chars().take(COMMENT_DISPLAY_CHARS).collect()
    } else {
        String::from(text)
    }
}
