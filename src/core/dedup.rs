use crate::models::ReportDate;
use crate::plugins::traits::PublishedPost;

/// Literal every announcement carries; see `MessageComposer`.
pub const ANNOUNCEMENT_MARKER: &str = "EXPORT SALES";

/// Latest report date already announced in `posts`, or `ReportDate::NEVER`.
///
/// The publisher's own timeline is the only record of what went out, so a
/// post that was deleted will be announced again.
pub fn last_announced_date(posts: &[PublishedPost]) -> ReportDate {
    let mut last = ReportDate::NEVER;

    for post in posts {
        if !post.text.contains(ANNOUNCEMENT_MARKER) {
            continue;
        }

        match ReportDate::find_announced(&post.text) {
            Some(Ok(date)) => last = last.max(date),
            Some(Err(e)) => {
                tracing::warn!(post_id = %post.id, error = %e, "Ignoring announcement with unreadable date");
            }
            None => {}
        }
    }

    last
}
