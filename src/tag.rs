use once_cell::sync::Lazy;
use regex::Regex;

/// Marks a token as a tag literal.
pub const SIGIL: char = '#';

static NON_ALPHANUMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("Failed to compile tag regex"));

/// Canonical form of a tag.
///
/// Lower-cases the input, collapses every run of non-alphanumeric
/// characters into a single hyphen, trims leading and trailing hyphens and
/// prefixes the sigil. `#Two_Words` becomes `#two-words`.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let spaced = NON_ALPHANUMS.replace_all(&lowered, " ");
    let words: Vec<&str> = spaced.split_whitespace().collect();
    format!("{SIGIL}{}", words.join("-"))
}

/// Split a comma or whitespace separated list of tags and normalize each.
/// Entries that normalize to nothing are dropped.
pub fn parse_list(tags: &str) -> Vec<String> {
    tags.split(',')
        .flat_map(|value| value.split_whitespace())
        .map(normalize)
        .filter(|t| t.len() > SIGIL.len_utf8())
        .collect::<Vec<_>>()
}

/// Turns a raw tag literal into its normalized form.
///
/// Returning `None` means the literal normalizes to nothing usable, which
/// the selector parser reports as an invalid tag.
pub trait Normalizer {
    fn normalize(&self, raw: &str) -> Option<String>;
}

/// The `#hashtag` scheme used by glossary sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashtagNormalizer;

impl Normalizer for HashtagNormalizer {
    fn normalize(&self, raw: &str) -> Option<String> {
        let tag = normalize(raw);
        if tag.len() == SIGIL.len_utf8() {
            None
        } else {
            Some(tag)
        }
    }
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> Option<String>,
{
    fn normalize(&self, raw: &str) -> Option<String> {
        self(raw)
    }
}

fn fold(tag: &str) -> Vec<char> {
    tag.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Levenshtein distance between two tags, ignoring case, the sigil and
/// punctuation. `hello-world` and `HelloWorld` are the same tag.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a = fold(a);
    let b = fold(b);

    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known tag to `tag`, if any lies within two edits.
pub fn suggest<'a, I>(tag: &str, known: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    const MAX_DISTANCE: usize = 2;

    let mut best: Option<(usize, &'a str)> = None;
    for candidate in known {
        let distance = edit_distance(tag, candidate);
        if distance > MAX_DISTANCE {
            continue;
        }
        match best {
            Some((d, _)) if d <= distance => {}
            _ => best = Some((distance, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate)
}
