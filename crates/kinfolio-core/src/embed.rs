use regex::Regex;
use std::sync::OnceLock;

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";

fn youtube_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/)|youtu\.be/)([A-Za-z0-9_-]{11})",
        )
        .expect("youtube regex is valid")
    })
}

/// Embeddable player URL for a YouTube watch, short or embed link.
///
/// Returns `None` for anything that is not a recognisable YouTube video link.
pub fn youtube_embed_url(url: &str) -> Option<String> {
    youtube_id_regex()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|id| format!("{}{}", YOUTUBE_EMBED_BASE, id.as_str()))
}
