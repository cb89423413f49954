#![forbid(unsafe_code)]

//! Deterministic feed entries.

use serde::Serialize;

/// A feed entry: avatar, headline, and body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub name: String,
    pub description: String,
    pub url: String,
}

const FIRST: [&str; 8] = [
    "Ada", "Grace", "Linus", "Barbara", "Ken", "Margaret", "Dennis", "Frances",
];

const LAST: [&str; 6] = ["Lovelace", "Hopper", "Liskov", "Thompson", "Hamilton", "Allen"];

const WORDS: [&str; 12] = [
    "scrolling",
    "recycled",
    "nodes",
    "<stay>",
    "cheap",
    "while",
    "pages",
    "arrive",
    "from",
    "R&D",
    "offline",
    "caches",
];

/// Entry `index`. Description length varies with the index so rendered
/// heights differ between neighbours.
#[must_use]
pub fn feed_item(index: usize) -> FeedItem {
    let first = FIRST[index % FIRST.len()];
    let last = LAST[(index / FIRST.len()) % LAST.len()];
    let words = 6 + (index * 7) % 29;
    let description = (0..words)
        .map(|n| WORDS[(index + n * 5) % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ");
    FeedItem {
        name: format!("{first} {last} #{index}"),
        description,
        url: format!("https://avatars.example.com/u/{index}.png"),
    }
}
