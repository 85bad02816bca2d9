use std::collections::{BTreeMap, HashMap};

use crate::error::FractalResult;
use crate::limits::Limits;

/// Symbol → replacement table. Symbols without an entry rewrite to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: BTreeMap<char, String>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: char, replacement: impl Into<String>) -> Option<String> {
        self.rules.insert(symbol, replacement.into())
    }

    pub fn get(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.rules.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(char, S)> for RuleTable {
    fn from_iter<I: IntoIterator<Item = (char, S)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (symbol, replacement) in iter {
            table.insert(symbol, replacement);
        }
        table
    }
}

/// Length of the string after each pass, index 0 being the axiom. Computed
/// from per-symbol counts so nothing is materialized; saturates at `u64::MAX`.
pub fn pass_lengths(axiom: &str, rules: &RuleTable, iterations: usize) -> Vec<u64> {
    let mut counts: HashMap<char, u64> = HashMap::new();
    for ch in axiom.chars() {
        *counts.entry(ch).or_default() += 1;
    }

    let mut lengths = Vec::new();
    lengths.push(total(&counts));
    for _ in 0..iterations {
        let mut next: HashMap<char, u64> = HashMap::with_capacity(counts.len());
        for (&symbol, &n) in &counts {
            match rules.get(symbol) {
                Some(replacement) => {
                    for ch in replacement.chars() {
                        let slot = next.entry(ch).or_default();
                        *slot = slot.saturating_add(n);
                    }
                }
                None => {
                    let slot = next.entry(symbol).or_default();
                    *slot = slot.saturating_add(n);
                }
            }
        }
        counts = next;
        lengths.push(total(&counts));
    }
    lengths
}

fn total(counts: &HashMap<char, u64>) -> u64 {
    counts.values().fold(0u64, |acc, n| acc.saturating_add(*n))
}

pub fn expanded_len(axiom: &str, rules: &RuleTable, iterations: usize) -> u64 {
    pass_lengths(axiom, rules, iterations)
        .last()
        .copied()
        .unwrap_or_default()
}

/// Rewrites `axiom` `iterations` times, each pass over the previous result.
///
/// The pass count is checked against `limits.max_passes` and every
/// intermediate pass against `limits.max_instructions` before any string is
/// built.
pub fn expand(
    axiom: &str,
    rules: &RuleTable,
    iterations: usize,
    limits: &Limits,
) -> FractalResult<String> {
    limits.check_passes(u64::try_from(iterations).unwrap_or(u64::MAX))?;
    let lengths = pass_lengths(axiom, rules, iterations);
    let peak = lengths.iter().copied().max().unwrap_or_default();
    limits.check_instructions(peak)?;

    let mut current = axiom.to_string();
    for pass in 1..=iterations {
        let mut next = String::with_capacity(usize::try_from(lengths[pass]).unwrap_or(0));
        for ch in current.chars() {
            match rules.get(ch) {
                Some(replacement) => next.push_str(replacement),
                None => next.push(ch),
            }
        }
        current = next;
    }

    tracing::debug!(
        axiom,
        iterations,
        symbols = current.chars().count(),
        "grammar expanded"
    );
    Ok(current)
}
