//! Token Counting and Budget Management
//!
//! Word-based budgeting for outbound prompts.
//!
//! ## Strategy
//! - Count whitespace-delimited words of the raw input, never model tokens
//! - Estimate tokens as words × 1.5, a conservative figure for code and prose
//! - Cut from the tail so the head of every section survives
//! - When several sections compete, fixed sections are reserved first and the
//!   rest is shared by weight (primary 60%, secondary 25%, tertiary 15%)
//!
//! The budget is headroom, not an exact limit on what the model will count.

use tracing::debug;

use crate::constants::budget::{
    FIXED_SECTION_DIVISOR, MAX_INPUT_WORDS, PRIMARY_WEIGHT, SECONDARY_WEIGHT, TERTIARY_WEIGHT,
    TOKENS_PER_WORD, TRUNCATION_MARKER,
};

/// How a section competes for budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    /// Small metadata reserved before weighted sharing (branch name)
    Fixed,
    /// Highest value signal (diff, log)
    Primary,
    /// Supporting context (file list)
    Secondary,
    /// Background context (recent commits)
    Tertiary,
}

impl SectionRole {
    fn weight(self) -> f64 {
        match self {
            Self::Fixed => 0.0,
            Self::Primary => PRIMARY_WEIGHT,
            Self::Secondary => SECONDARY_WEIGHT,
            Self::Tertiary => TERTIARY_WEIGHT,
        }
    }
}

/// One labelled block of prompt input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSection {
    pub label: &'static str,
    pub text: String,
    pub word_count: usize,
    pub role: SectionRole,
}

impl PromptSection {
    pub fn new(label: &'static str, text: impl Into<String>, role: SectionRole) -> Self {
        let text = text.into();
        let word_count = TokenCounter::count_words(&text);
        Self {
            label,
            text,
            word_count,
            role,
        }
    }
}

/// Result of cutting one text down to a word limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub text: String,
    /// Words of original content kept (the marker is not counted)
    pub words_kept: usize,
    pub truncated: bool,
}

/// Sections after budgeting
#[derive(Debug, Clone)]
pub struct BudgetSplit {
    pub sections: Vec<PromptSection>,
    /// Words of original content across all sections after truncation
    pub words_used: usize,
    pub words_original: usize,
    pub truncated: bool,
}

impl BudgetSplit {
    /// Budgeted text of the section with this label, empty when absent
    pub fn text(&self, label: &str) -> &str {
        self.sections
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.text.as_str())
            .unwrap_or("")
    }
}

/// Word counter bound to a configured budget
#[derive(Debug, Clone, Copy)]
pub struct TokenCounter {
    max_words: usize,
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new(MAX_INPUT_WORDS)
    }
}

impl TokenCounter {
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn count_words(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Approximate token count (words × 1.5, rounded down)
    pub fn estimate_tokens(text: &str) -> usize {
        (Self::count_words(text) as f64 * TOKENS_PER_WORD) as usize
    }

    /// Keep the first `max_words` words and append the truncation marker.
    ///
    /// The cut happens right after the last kept word, so the original
    /// whitespace and line structure of the head are preserved.
    pub fn truncate_to_word_limit(text: &str, max_words: usize) -> Truncation {
        let total = Self::count_words(text);
        if total <= max_words {
            return Truncation {
                text: text.to_string(),
                words_kept: total,
                truncated: false,
            };
        }

        let end = word_end_offset(text, max_words);
        let mut kept = text[..end].to_string();
        kept.push_str(TRUNCATION_MARKER);

        Truncation {
            text: kept,
            words_kept: max_words,
            truncated: true,
        }
    }

    /// Truncate a single text to the configured budget
    pub fn truncate_content(&self, text: &str) -> Truncation {
        let result = Self::truncate_to_word_limit(text, self.max_words);
        if result.truncated {
            debug!(
                "Truncated content to {} words (limit {})",
                result.words_kept, self.max_words
            );
        }
        result
    }

    /// Fit several sections into the configured budget.
    ///
    /// Sections are returned unchanged when their combined size fits.
    /// Otherwise fixed sections are capped at a quarter of what is left,
    /// and the remainder is shared by role weight. Sections needing less than
    /// their share keep everything and release the surplus to the others.
    pub fn split_budget(&self, sections: Vec<PromptSection>) -> BudgetSplit {
        let words_original: usize = sections.iter().map(|s| s.word_count).sum();

        if words_original <= self.max_words {
            return BudgetSplit {
                sections,
                words_used: words_original,
                words_original,
                truncated: false,
            };
        }

        let mut allocation = vec![0usize; sections.len()];
        let mut remaining = self.max_words;

        for (i, section) in sections.iter().enumerate() {
            if section.role == SectionRole::Fixed {
                let cap = remaining / FIXED_SECTION_DIVISOR;
                allocation[i] = section.word_count.min(cap);
                remaining -= allocation[i];
            }
        }

        let mut open: Vec<usize> = sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.role != SectionRole::Fixed)
            .map(|(i, _)| i)
            .collect();

        while !open.is_empty() {
            let shares = weighted_shares(&open, &sections, remaining);
            let settled: Vec<usize> = open
                .iter()
                .zip(&shares)
                .filter(|&(&i, &share)| sections[i].word_count <= share)
                .map(|(&i, _)| i)
                .collect();

            if settled.is_empty() {
                for (&i, &share) in open.iter().zip(&shares) {
                    allocation[i] = share;
                }
                break;
            }

            for i in &settled {
                allocation[*i] = sections[*i].word_count;
                remaining -= sections[*i].word_count;
            }
            open.retain(|i| !settled.contains(i));
        }

        let mut words_used = 0;
        let sections: Vec<PromptSection> = sections
            .into_iter()
            .zip(allocation)
            .map(|(section, limit)| {
                let cut = Self::truncate_to_word_limit(&section.text, limit);
                words_used += cut.words_kept;
                if cut.truncated {
                    debug!(
                        "Section '{}' truncated from {} to {} words",
                        section.label, section.word_count, cut.words_kept
                    );
                }
                PromptSection {
                    label: section.label,
                    word_count: cut.words_kept,
                    text: cut.text,
                    role: section.role,
                }
            })
            .collect();

        BudgetSplit {
            sections,
            words_used,
            words_original,
            truncated: true,
        }
    }
}

/// Byte offset just past the `n`th word
fn word_end_offset(text: &str, n: usize) -> usize {
    if n == 0 {
        return 0;
    }

    let mut count = 0;
    let mut in_word = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if in_word && count == n {
                return i;
            }
            in_word = false;
        } else if !in_word {
            in_word = true;
            count += 1;
        }
    }
    text.len()
}

/// Split `remaining` across `open` sections by role weight. Rounding
/// leftovers go to the heaviest section so the shares sum to `remaining`.
fn weighted_shares(open: &[usize], sections: &[PromptSection], remaining: usize) -> Vec<usize> {
    let weight_sum: f64 = open.iter().map(|&i| sections[i].role.weight()).sum();
    let mut given = 0;
    let mut shares: Vec<usize> = open
        .iter()
        .map(|&i| {
            let raw = (remaining as f64 * sections[i].role.weight() / weight_sum) as usize;
            let share = raw.min(remaining - given);
            given += share;
            share
        })
        .collect();

    let heaviest = (0..open.len()).fold(0, |best, pos| {
        if sections[open[pos]].role.weight() > sections[open[best]].role.weight() {
            pos
        } else {
            best
        }
    });
    if let Some(share) = shares.get_mut(heaviest) {
        *share += remaining - given;
    }
    shares
}
