use rand::seq::SliceRandom;

pub const QUOTES: [&str; 6] = [
    "The way to get started is to quit talking and begin doing. - Walt Disney",
    "Don't watch the clock; do what it does. Keep going. - Sam Levenson",
    "A goal is a dream with a deadline. - Napoleon Hill",
    "Success is not final, failure is not fatal: it is the courage to continue that counts. - Winston Churchill",
    "The future depends on what you do today. - Mahatma Gandhi",
    "You don't have to be great to get started, but you have to get started to be great. - Les Brown",
];

pub fn random_quote() -> &'static str {
    QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(QUOTES[0])
}

/// Wraps around, so any index is valid.
pub fn quote_at(index: usize) -> &'static str {
    QUOTES[index % QUOTES.len()]
}
