//! Text cleanup for chart rows: title casing, artist casing and dance
//! abbreviation expansion.

use crate::types::{NormalizedRecord, RawRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Words kept lowercase inside a title unless they open it
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "in", "on", "at", "to", "for", "of", "from", "by", "and", "or", "but",
];

/// Chart shorthand (uppercased) to canonical dance name
pub static DANCE_ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("2STEP", "Texas Two Step"),
        ("TWOSTEP", "Texas Two Step"),
        ("JITT", "Jitterbug"),
        ("JITTBUG", "Jitterbug"),
        ("WLTZ", "Waltz"),
        ("SWING", "Swing"),
        ("SWNG", "Swing"),
        ("FXTRT", "Foxtrot"),
        ("FOXTROT", "Foxtrot"),
        ("SLOW DANCE", "Slow Dance"),
        ("SLOW D", "Slow Dance"),
        ("WALTZ", "Waltz"),
        ("WHIP", "Whip"),
        ("POLKA", "Polka"),
        ("SLOW POLKA", "Slow Polka"),
        ("FAST POLKA", "Fast Polka"),
        ("FASTEST POLKA", "Fastest Polka"),
        ("MAMBO", "Mambo"),
        ("RUMBA", "Rumba"),
        ("CHA CHA", "Cha Cha"),
        ("CHACHA", "Cha Cha"),
        ("SAMBA", "Samba"),
        ("TANGO", "Tango"),
        ("MERENGUE", "Merengue"),
        ("LINDY", "Lindy Hop"),
        ("JITTERBUG", "Jitterbug"),
        ("VIENNESE WLTZ", "Viennese Waltz"),
        ("WEST WALTZ", "Western Waltz"),
        ("SLO TWOSTEP", "Slow Two Step"),
        ("FAST SWING", "Fast Swing"),
    ])
});

static DANCE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,/]").unwrap());

/// First character uppercased, the rest lowercased
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

pub fn normalize_title(text: &str) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            if i > 0 && is_stop_word(word) {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Capitalize every letter that follows a non-letter and lowercase the rest,
/// so "o'brien" becomes "O'Brien".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

pub fn normalize_artist(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Split a dance cell on `,` and `/`, expand known abbreviations and drop
/// repeats. Unknown entries are kept as written.
pub fn parse_dances(text: &str) -> Vec<String> {
    let mut dances: Vec<String> = Vec::new();
    for part in DANCE_SEPARATOR.split(text) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let dance = match DANCE_ABBREVIATIONS.get(part.to_uppercase().as_str()) {
            Some(canonical) => (*canonical).to_string(),
            None => {
                debug!(segment = part, "Unknown dance abbreviation, keeping as is");
                part.to_string()
            }
        };
        if !dances.contains(&dance) {
            dances.push(dance);
        }
    }
    dances
}

pub fn normalize_record(record: &RawRecord) -> NormalizedRecord {
    NormalizedRecord {
        title: normalize_title(&record.title),
        artist: normalize_artist(&record.artist),
        tempo: record.tempo.clone(),
        dances: parse_dances(&record.dance_text),
    }
}

pub fn normalize_all(records: &[RawRecord]) -> Vec<NormalizedRecord> {
    let normalized: Vec<NormalizedRecord> = records.iter().map(normalize_record).collect();
    info!("Normalized {} records", normalized.len());
    normalized
}
