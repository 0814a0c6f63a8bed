// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::{LexiconError, ModelError};
use crate::sentiment::SentimentModel;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const BOOSTER_INCREMENT: f64 = 0.293;
const BOOSTER_DECREMENT: f64 = -0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_WEIGHT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_WEIGHT: f64 = 0.18;
const QUESTION_CAP: f64 = 0.96;
const NORMALISATION_ALPHA: f64 = 15.0;
const WINDOW_DAMPING: [f64; 3] = [1.0, 0.95, 0.9];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "dont", "hadnt",
    "hasnt", "havent", "isnt", "mightnt", "mustnt", "neither", "neednt", "never", "none", "nope",
    "nor", "not", "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "wasnt", "werent",
    "without", "wont", "wouldnt", "rarely", "seldom", "despite",
];

const INTENSIFIERS: &[&str] = &[
    "absolutely", "amazingly", "awfully", "completely", "considerably", "decidedly", "deeply",
    "enormously", "entirely", "especially", "exceptionally", "extremely", "fabulously", "fully",
    "greatly", "highly", "hugely", "incredibly", "intensely", "majorly", "more", "most",
    "particularly", "purely", "quite", "really", "remarkably", "so", "substantially",
    "thoroughly", "totally", "tremendously", "unbelievably", "unusually", "utterly", "very",
];

const DAMPENERS: &[&str] = &[
    "almost", "barely", "hardly", "kinda", "less", "little", "marginally", "occasionally",
    "partly", "scarcely", "slightly", "somewhat", "sorta",
];

const BUILTIN_LEXICON: &[(&str, f64)] = &[
    ("abandon", -1.9),
    ("abuse", -3.2),
    ("accept", 1.6),
    ("accurate", 1.7),
    ("admire", 2.1),
    ("afraid", -2.2),
    ("aggressive", -0.6),
    ("agree", 1.5),
    ("alarm", -1.4),
    ("alone", -1.0),
    ("amazing", 2.8),
    ("anger", -2.7),
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("anxious", -1.0),
    ("apologize", 0.4),
    ("appreciate", 2.3),
    ("appreciated", 2.3),
    ("approve", 1.9),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("beautiful", 2.9),
    ("benefit", 2.0),
    ("best", 3.2),
    ("better", 1.9),
    ("blame", -1.4),
    ("bored", -1.1),
    ("boring", -1.3),
    ("brilliant", 2.8),
    ("broken", -2.1),
    ("calm", 1.3),
    ("care", 2.2),
    ("careful", 0.6),
    ("celebrate", 2.7),
    ("charming", 2.8),
    ("cheer", 2.3),
    ("clear", 1.6),
    ("clever", 2.0),
    ("comfort", 1.5),
    ("comfortable", 2.3),
    ("confident", 2.2),
    ("confused", -1.3),
    ("confusing", -0.9),
    ("cool", 1.3),
    ("crap", -1.6),
    ("crazy", -1.4),
    ("creative", 1.9),
    ("crisis", -3.1),
    ("cruel", -2.8),
    ("cry", -2.1),
    ("crying", -2.1),
    ("damage", -2.2),
    ("danger", -2.4),
    ("dangerous", -2.1),
    ("dead", -3.3),
    ("death", -2.9),
    ("delight", 2.9),
    ("delighted", 2.8),
    ("depressed", -2.3),
    ("desperate", -1.3),
    ("destroy", -2.5),
    ("die", -2.9),
    ("difficult", -1.5),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disaster", -3.1),
    ("disgusting", -2.4),
    ("dislike", -1.6),
    ("doubt", -1.5),
    ("dumb", -2.3),
    ("easy", 1.9),
    ("effective", 2.1),
    ("embarrassed", -1.5),
    ("encourage", 2.3),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("error", -1.4),
    ("evil", -3.4),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("fair", 1.3),
    ("fake", -2.1),
    ("fantastic", 2.6),
    ("fault", -2.1),
    ("fear", -2.2),
    ("fine", 0.8),
    ("fool", -1.9),
    ("free", 2.3),
    ("friend", 2.2),
    ("friendly", 2.2),
    ("frustrated", -2.4),
    ("frustrating", -1.9),
    ("fun", 2.3),
    ("funny", 1.9),
    ("generous", 2.3),
    ("gentle", 1.9),
    ("glad", 2.0),
    ("good", 1.9),
    ("gorgeous", 3.0),
    ("grateful", 2.0),
    ("great", 3.1),
    ("grief", -2.2),
    ("guilty", -1.8),
    ("happy", 2.7),
    ("harm", -2.5),
    ("hate", -2.7),
    ("hated", -3.2),
    ("healthy", 1.7),
    ("heartbroken", -3.3),
    ("help", 1.7),
    ("helpful", 1.8),
    ("hope", 1.9),
    ("hopeful", 1.6),
    ("hopeless", -2.0),
    ("horrible", -2.5),
    ("hostile", -1.6),
    ("hurt", -2.4),
    ("ideal", 2.4),
    ("ignore", -1.5),
    ("ill", -1.8),
    ("important", 0.8),
    ("impressive", 2.3),
    ("improve", 1.9),
    ("inspiring", 2.6),
    ("interesting", 1.7),
    ("joy", 2.8),
    ("kill", -3.7),
    ("kind", 2.4),
    ("laugh", 2.6),
    ("lazy", -1.5),
    ("like", 2.0),
    ("liked", 1.8),
    ("lol", 2.9),
    ("lonely", -2.0),
    ("lose", -1.8),
    ("loss", -1.3),
    ("lost", -1.3),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("lucky", 1.8),
    ("mad", -2.2),
    ("mess", -1.5),
    ("miserable", -2.2),
    ("miss", -0.6),
    ("mistake", -1.4),
    ("nasty", -2.6),
    ("nervous", -1.1),
    ("nice", 1.8),
    ("no", -1.2),
    ("ok", 1.2),
    ("okay", 0.9),
    ("pain", -2.3),
    ("painful", -1.9),
    ("panic", -2.3),
    ("perfect", 2.7),
    ("pleasant", 2.3),
    ("please", 1.3),
    ("pleased", 1.9),
    ("poor", -2.1),
    ("positive", 2.6),
    ("pretty", 2.2),
    ("problem", -1.7),
    ("problems", -1.7),
    ("proud", 2.1),
    ("rage", -2.6),
    ("relax", 1.9),
    ("relief", 2.1),
    ("reliable", 1.7),
    ("respect", 2.1),
    ("rich", 2.6),
    ("ridiculous", -1.5),
    ("risk", -1.1),
    ("rude", -2.0),
    ("sad", -2.1),
    ("safe", 1.9),
    ("scared", -1.9),
    ("selfish", -2.1),
    ("shame", -2.1),
    ("shock", -1.6),
    ("sick", -2.3),
    ("smart", 1.7),
    ("smile", 1.5),
    ("sorry", -0.3),
    ("stress", -1.8),
    ("stressed", -1.4),
    ("strong", 2.3),
    ("stupid", -2.4),
    ("success", 2.7),
    ("successful", 2.8),
    ("suffer", -2.5),
    ("super", 2.9),
    ("support", 1.7),
    ("sure", 1.3),
    ("sweet", 2.0),
    ("terrible", -2.1),
    ("terrific", 2.1),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("threat", -2.4),
    ("tired", -1.9),
    ("tragic", -3.4),
    ("trouble", -1.7),
    ("trust", 2.3),
    ("ugly", -2.3),
    ("unfair", -2.1),
    ("unfortunately", -1.5),
    ("unhappy", -1.8),
    ("upset", -1.6),
    ("useful", 1.9),
    ("useless", -1.8),
    ("warm", 0.9),
    ("weak", -1.9),
    ("welcome", 2.0),
    ("win", 2.8),
    ("wise", 1.8),
    ("wonderful", 2.7),
    ("worried", -1.2),
    ("worry", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("worthless", -1.9),
    ("wow", 2.8),
    ("wrong", -2.1),
    ("yes", 1.7),
];

/// Rule-based lexical polarity in the VADER family: per-token valence with
/// booster, negation, contrast and emphasis rules, normalised to a compound
/// score in [-1, 1].
#[derive(Debug, Clone)]
pub struct LexiconModel {
    valences: HashMap<String, f64>,
}

impl LexiconModel {
    pub fn new() -> Self {
        let valences = BUILTIN_LEXICON
            .iter()
            .map(|(word, valence)| ((*word).to_string(), *valence))
            .collect();
        Self { valences }
    }

    pub fn from_file(path: &Path) -> Result<Self, LexiconError> {
        let mut model = Self::new();
        let merged = model.merge_file(path)?;
        debug!(path = %path.display(), merged, "external lexicon merged");
        Ok(model)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<usize, LexiconError> {
        let content = fs::read_to_string(path).map_err(|source| LexiconError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.merge_str(&content)
    }

    /// Accepts `token<TAB>valence[<TAB>...]` lines; blank lines and lines
    /// starting with `#` are skipped.
    pub fn merge_str(&mut self, content: &str) -> Result<usize, LexiconError> {
        let mut merged = 0;
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            let token = fields.next().map(str::trim).unwrap_or_default();
            let valence = fields
                .next()
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite());
            match (token.is_empty(), valence) {
                (false, Some(valence)) => {
                    self.valences.insert(token.to_lowercase(), valence);
                    merged += 1;
                }
                _ => {
                    return Err(LexiconError::MalformedEntry {
                        line: idx + 1,
                        content: line.to_string(),
                    })
                }
            }
        }
        Ok(merged)
    }

    pub fn valence(&self, word: &str) -> Option<f64> {
        self.valences.get(&word.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.valences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valences.is_empty()
    }

    pub fn compound(&self, text: &str) -> f64 {
        let words: Vec<&str> = text
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| token.chars().count() > 1)
            .collect();
        if words.is_empty() {
            return 0.0;
        }
        let cap_differential = has_cap_differential(&words);

        let mut sentiments: Vec<f64> = words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let lower = word.to_lowercase();
                if booster_scalar(&lower).is_some() {
                    return 0.0;
                }
                // "no good": the "no" negates its neighbour instead of scoring.
                if lower == "no"
                    && words
                        .get(i + 1)
                        .is_some_and(|next| self.valences.contains_key(&next.to_lowercase()))
                {
                    return 0.0;
                }
                self.valences
                    .get(&lower)
                    .map_or(0.0, |&base| self.contextual_valence(&words, i, base, cap_differential))
            })
            .collect();

        if let Some(pivot) = words.iter().position(|w| w.eq_ignore_ascii_case("but")) {
            for (i, sentiment) in sentiments.iter_mut().enumerate() {
                if i < pivot {
                    *sentiment *= 0.5;
                } else if i > pivot {
                    *sentiment *= 1.5;
                }
            }
        }

        let mut sum: f64 = sentiments.iter().sum();
        let emphasis = punctuation_emphasis(text);
        if sum > 0.0 {
            sum += emphasis;
        } else if sum < 0.0 {
            sum -= emphasis;
        }
        normalise(sum)
    }

    fn contextual_valence(&self, words: &[&str], i: usize, base: f64, cap_differential: bool) -> f64 {
        let mut valence = base;
        if cap_differential && is_all_caps(words[i]) {
            valence += CAPS_INCREMENT.copysign(valence);
        }
        for (distance, damping) in (1..=3).zip(WINDOW_DAMPING) {
            if i < distance {
                break;
            }
            let prior = words[i - distance];
            let prior_lower = prior.to_lowercase();
            // Boosters only count when they carry no valence of their own.
            if !self.valences.contains_key(&prior_lower) {
                if let Some(mut scalar) = booster_scalar(&prior_lower) {
                    if valence < 0.0 {
                        scalar = -scalar;
                    }
                    if cap_differential && is_all_caps(prior) {
                        scalar += CAPS_INCREMENT.copysign(valence);
                    }
                    valence += scalar * damping;
                }
            }
            if is_negation(&prior_lower) || (prior_lower == "no" && distance <= 2) {
                valence *= NEGATION_SCALAR;
            }
        }
        valence
    }
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentModel for LexiconModel {
    fn polarity(&self, text: &str) -> Result<f64, ModelError> {
        let score = self.compound(text);
        if score.is_finite() {
            Ok(score)
        } else {
            Err(ModelError::NonFinite { len: text.len() })
        }
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

fn booster_scalar(word: &str) -> Option<f64> {
    if INTENSIFIERS.contains(&word) {
        Some(BOOSTER_INCREMENT)
    } else if DAMPENERS.contains(&word) {
        Some(BOOSTER_DECREMENT)
    } else {
        None
    }
}

fn is_negation(word: &str) -> bool {
    let folded: String = word.chars().filter(|c| *c != '\'' && *c != '\u{2019}').collect();
    NEGATIONS.contains(&folded.as_str()) || word.contains("n't") || word.contains("n\u{2019}t")
}

fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
        && word
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

fn has_cap_differential(words: &[&str]) -> bool {
    let caps = words.iter().filter(|w| is_all_caps(w)).count();
    caps > 0 && caps < words.len()
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    let questions = text.matches('?').count();
    let question_emphasis = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_WEIGHT,
        _ => QUESTION_CAP,
    };
    exclamations as f64 * EXCLAMATION_WEIGHT + question_emphasis
}

fn normalise(sum: f64) -> f64 {
    (sum / (sum * sum + NORMALISATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}
