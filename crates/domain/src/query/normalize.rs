//! Lexical normalizer: edit-distance correction of a closed set of time words.

/// Words the range resolver understands, in tie-break order.
pub const TIME_VOCABULARY: [&str; 15] = [
    "yesterday",
    "today",
    "tomorrow",
    "last",
    "past",
    "week",
    "month",
    "year",
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Largest edit distance still treated as a misspelling.
const MAX_CORRECTION_DISTANCE: usize = 2;

/// Result of [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Lower-cased text with corrected tokens substituted in place.
    pub text: String,
    /// The first correction made, e.g. `Interpreted "yesterdy" as "yesterday".`
    pub note: Option<String>,
}

/// Classic Levenshtein distance with unit insert/delete/substitute costs.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Lower-case `text` and replace near-miss time words with their vocabulary
/// spelling.
#[must_use]
pub fn normalize(text: &str) -> Normalized {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut note = None;

    for token in word_boundary_tokens(&lowered) {
        match correction_for(token) {
            Some(word) => {
                if note.is_none() {
                    note = Some(format!("Interpreted \"{token}\" as \"{word}\"."));
                }
                out.push_str(word);
            }
            None => out.push_str(token),
        }
    }

    Normalized { text: out, note }
}

fn correction_for(token: &str) -> Option<&'static str> {
    if !token.chars().any(|c| c.is_ascii_lowercase()) {
        return None;
    }
    let mut best: Option<(&'static str, usize)> = None;
    for word in TIME_VOCABULARY {
        let distance = levenshtein(token, word);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((word, distance));
        }
    }
    best.filter(|&(word, distance)| {
        distance > 0 && distance <= MAX_CORRECTION_DISTANCE && word != token
    })
    .map(|(word, _)| word)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split on `\b`: alternating runs of word and non-word characters, so that
/// concatenating the tokens reproduces the input.
fn word_boundary_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (idx, c) in text.char_indices() {
        let word = is_word_char(c);
        if current.is_some_and(|w| w != word) {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        current = Some(word);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
