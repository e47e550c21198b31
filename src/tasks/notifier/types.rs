use crate::feed::FeedSnapshot;

/// Outcome of one broadcast across all chats.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub attempted: usize,
    pub delivered: usize,
}

/// How the announced link is derived from a feed URL.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LinkRule {
    /// Drop the file extension of the last path segment:
    /// `https://example.com/feed.xml` gives `https://example.com/feed`.
    #[default]
    StripExtension,
    /// Drop a fixed number of trailing characters.
    StripChars(usize),
}

impl LinkRule {
    /// URLs the rule cannot shorten are returned unchanged.
    pub fn apply<'a>(&self, feed_url: &'a str) -> &'a str {
        match *self {
            LinkRule::StripExtension => strip_extension(feed_url),
            LinkRule::StripChars(n) => strip_chars(feed_url, n),
        }
    }
}

fn strip_extension(feed_url: &str) -> &str {
    if feed_url.contains(|c: char| c == '?' || c == '#') {
        return feed_url;
    }
    // Never cut into the host of a bare `https://example.com`
    let path_start = match feed_url.find("://") {
        Some(scheme_end) => match feed_url[scheme_end + 3..].find('/') {
            Some(slash) => scheme_end + 3 + slash,
            None => return feed_url,
        },
        None => 0,
    };
    let segment_start = feed_url
        .rfind('/')
        .map(|idx| idx + 1)
        .unwrap_or(0)
        .max(path_start);
    match feed_url[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => &feed_url[..segment_start + dot],
        _ => feed_url,
    }
}

fn strip_chars(feed_url: &str, suffix_len: usize) -> &str {
    let char_count = feed_url.chars().count();
    if suffix_len == 0 || char_count <= suffix_len {
        return feed_url;
    }
    let cut = feed_url
        .char_indices()
        .nth(char_count - suffix_len)
        .map(|(idx, _)| idx)
        .unwrap_or(feed_url.len());
    &feed_url[..cut]
}

pub fn format_release_message(snapshot: &FeedSnapshot, link: &str) -> String {
    format!(
        "{}: {} published! Let's see what's new! \n{}",
        snapshot.title, snapshot.latest_title, link
    )
}

/// Reply to a user asking what the bot watches: banner, then one URL per line.
pub fn format_subscription_list(banner: &str, feed_urls: &[String]) -> String {
    let mut content = format!("{banner}\n");
    for url in feed_urls {
        content.push_str(url);
        content.push('\n');
    }
    content
}
