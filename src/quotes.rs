//! Motivational quotes shown in the menu.

use rand::seq::IndexedRandom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

const fn quote(text: &'static str, author: &'static str) -> Quote {
    Quote { text, author }
}

pub const QUOTES: [Quote; 15] = [
    quote("The secret of getting ahead is getting started.", "Mark Twain"),
    quote("Focus on being productive instead of busy.", "Tim Ferriss"),
    quote("It's not about having time, it's about making time.", "Unknown"),
    quote("Don't watch the clock; do what it does. Keep going.", "Sam Levenson"),
    quote("The only way to do great work is to love what you do.", "Steve Jobs"),
    quote(
        "Success is the sum of small efforts repeated day in and day out.",
        "Robert Collier",
    ),
    quote(
        "Amateurs sit and wait for inspiration. The rest of us just get up and go to work.",
        "Stephen King",
    ),
    quote(
        "Your future is created by what you do today, not tomorrow.",
        "Robert Kiyosaki",
    ),
    quote(
        "The way to get started is to quit talking and begin doing.",
        "Walt Disney",
    ),
    quote(
        "Productivity is never an accident. It is always the result of a commitment to excellence.",
        "Paul J. Meyer",
    ),
    quote("Action is the foundational key to all success.", "Pablo Picasso"),
    quote("Either you run the day, or the day runs you.", "Jim Rohn"),
    quote(
        "The key is not to prioritize what's on your schedule, but to schedule your priorities.",
        "Stephen Covey",
    ),
    quote(
        "Discipline is the bridge between goals and accomplishment.",
        "Jim Rohn",
    ),
    quote(
        "Start where you are. Use what you have. Do what you can.",
        "Arthur Ashe",
    ),
];

/// Picks a quote at random.
pub fn random_quote() -> Quote {
    *QUOTES.choose(&mut rand::rng()).unwrap_or(&QUOTES[0])
}

impl Quote {
    /// Formats the quote for a single menu line.
    pub fn display(&self) -> String {
        format!("\u{201c}{}\u{201d} \u{2014} {}", self.text, self.author)
    }
}
