//! Message captions

use crate::catalog::{QueueItem, Series};
use std::fmt::Write;

/// Telegram's caption limit for media messages
pub const CAPTION_LIMIT: usize = 1024;

pub const ADDED_CAPTION: &str = "Series added!";
pub const UPDATED_CAPTION: &str = "Series updated!";
pub const REMOVED_CAPTION: &str = "Series removed!";
pub const FAILURE_CAPTION: &str = "Seems like something went wrong...";
pub const EMPTY_QUEUE_CAPTION: &str = "The download queue is empty.";

/// Caption for a series: title, year, runtime, status and overview
pub fn caption(series: &Series) -> String {
    let mut text = format!("{} ", series.title);
    if series.year != 0 && !series.title.contains(&series.year.to_string()) {
        let _ = write!(text, "({}) ", series.year);
    }
    if series.runtime != 0 {
        let _ = write!(text, "{}min ", series.runtime);
    }
    let _ = write!(
        text,
        "- {}\n\n{}",
        title_case(&series.status),
        series.overview.as_deref().unwrap_or_default()
    );

    truncate_chars(&text, CAPTION_LIMIT)
}

/// Reply after an add or update has been submitted
pub fn submit_outcome_caption(is_update: bool, succeeded: bool) -> &'static str {
    match (succeeded, is_update) {
        (false, _) => FAILURE_CAPTION,
        (true, true) => UPDATED_CAPTION,
        (true, false) => ADDED_CAPTION,
    }
}

/// Summary of the download queue, one line per entry
pub fn queue_caption(items: &[QueueItem]) -> String {
    if items.is_empty() {
        return EMPTY_QUEUE_CAPTION.to_string();
    }

    let mut text = String::from("Download queue:\n");
    for item in items {
        let _ = write!(
            text,
            "\n{} - {} ({}%)",
            item.title,
            title_case(&item.status),
            item.progress_percent()
        );
        if let Some(left) = item.timeleft.as_deref() {
            let _ = write!(text, " {left} left");
        }
    }

    truncate_chars(&text, CAPTION_LIMIT)
}

/// Upper-case the first letter of every word
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text.get(..end).unwrap_or(text).to_string(),
        None => text.to_string(),
    }
}
