//! Naming conventions used to derive association and table defaults.
//!
//! The rules cover regular English nouns plus a short list of irregular and
//! uncountable words. They only ever look at the trailing word of a
//! `snake_case` or `CamelCase` name, so `BallPlayers` singularizes to
//! `BallPlayer`.

use convert_case::{Case, Casing};

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

/// `snake_case` (or already camel) name to `CamelCase`: `"ball_player"` → `"BallPlayer"`.
pub fn camelize(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// Default table for a model type: lower-cased then pluralized.
///
/// `"Player"` → `"players"`, `"Person"` → `"people"`.
pub fn table_name_for(type_name: &str) -> String {
    pluralize(&type_name.to_lowercase())
}

/// Default has-many foreign key: `"Manager"` → `"manager_id"`.
pub fn foreign_key_for(type_name: &str) -> String {
    format!("{}_id", type_name).to_lowercase()
}

/// Plural form of the trailing word of `word`.
pub fn pluralize(word: &str) -> String {
    let (prefix, last) = split_last_word(word);
    let lower = last.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == lower) {
        return format!("{}{}", prefix, match_case(last, plural));
    }
    if IRREGULAR.iter().any(|(_, p)| *p == lower) {
        return word.to_string();
    }

    let replaced = if ends_with_any(&lower, &["x", "ch", "ss", "sh", "s", "z"]) {
        format!("{}es", last)
    } else if consonant_y(&lower) {
        format!("{}ies", &last[..last.len() - 1])
    } else if lower.ends_with("fe") && !lower.ends_with("ffe") {
        format!("{}ves", &last[..last.len() - 2])
    } else if lower.ends_with("lf") || lower.ends_with("rf") {
        format!("{}ves", &last[..last.len() - 1])
    } else if lower.ends_with("tomato") || lower.ends_with("buffalo") {
        format!("{}es", last)
    } else {
        format!("{}s", last)
    };
    format!("{}{}", prefix, replaced)
}

/// Singular form of the trailing word of `word`.
pub fn singularize(word: &str) -> String {
    let (prefix, last) = split_last_word(word);
    let lower = last.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == lower) {
        return format!("{}{}", prefix, match_case(last, singular));
    }
    if IRREGULAR.iter().any(|(s, _)| *s == lower) {
        return word.to_string();
    }

    let keep = if ends_with_any(&lower, &["statuses", "aliases", "buses"])
        || (ends_with_any(&lower, &["xes", "ches", "sses", "shes", "oes"])
            && !lower.ends_with("shoes"))
    {
        last.len() - 2
    } else if lower.len() > 3
        && lower.ends_with("ies")
        && consonant_y(&format!("{}y", &lower[..lower.len() - 3]))
    {
        return format!("{}{}y", prefix, &last[..last.len() - 3]);
    } else if lower.ends_with("lves") || lower.ends_with("rves") {
        return format!("{}{}f", prefix, &last[..last.len() - 3]);
    } else if lower.ends_with("ives") {
        return format!("{}{}fe", prefix, &last[..last.len() - 3]);
    } else if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        last.len()
    } else if lower.ends_with('s') {
        last.len() - 1
    } else {
        last.len()
    };
    format!("{}{}", prefix, &last[..keep])
}

/// Split into everything before the trailing word and the trailing word.
fn split_last_word(word: &str) -> (&str, &str) {
    let boundary = word
        .char_indices()
        .rev()
        .find(|(idx, c)| *c == '_' || (*idx > 0 && c.is_uppercase()))
        .map_or(0, |(idx, c)| if c == '_' { idx + 1 } else { idx });
    word.split_at(boundary)
}

fn ends_with_any(word: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| word.ends_with(s))
}

/// Ends in `y` preceded by a consonant (or `qu`).
fn consonant_y(lower: &str) -> bool {
    let mut chars = lower.chars().rev();
    if chars.next() != Some('y') {
        return false;
    }
    match chars.next() {
        Some('u') => chars.next() == Some('q'),
        Some(c) => !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'),
        None => false,
    }
}

/// Apply the capitalization of `template`'s first letter to `word`.
fn match_case(template: &str, word: &str) -> String {
    if template.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = word.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    } else {
        word.to_string()
    }
}
