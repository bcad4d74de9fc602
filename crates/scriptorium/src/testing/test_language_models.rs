//! # Test Language Models

use crate::{
    lattice::LanguageModel,
    types::{CharId, LanguageId},
};

/// Every character is equally likely; no languages.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformLanguageModel {
    alphabet: Vec<String>,
    languages: Vec<String>,
}

impl UniformLanguageModel {
    /// Create a model over `alphabet`.
    pub fn new<I, S>(alphabet: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            alphabet: alphabet.into_iter().map(Into::into).collect(),
            languages: Vec::new(),
        }
    }

    /// Sets the language names; switching languages is free.
    pub fn with_languages<I, S>(
        self,
        languages: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            ..self
        }
    }
}

impl LanguageModel for UniformLanguageModel {
    fn order(&self) -> usize {
        1
    }

    fn alphabet(&self) -> Vec<String> {
        self.alphabet.clone()
    }

    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn score_next(
        &self,
        _context: &[CharId],
        _lm_char: CharId,
        _language: Option<LanguageId>,
    ) -> f64 {
        -(self.alphabet.len() as f64).ln()
    }
}

/// A per-language character bigram model with add-one smoothing.
///
/// The empty context is the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct BigramLanguageModel {
    alphabet: Vec<String>,
    languages: Vec<String>,

    /// ``[language][prev + 1][next]``; row 0 is the line start.
    counts: Vec<Vec<Vec<f64>>>,
    switch_score: f64,
}

impl BigramLanguageModel {
    /// Train on one text per language.
    ///
    /// ## Arguments
    /// * `alphabet` - the characters; text characters outside it are skipped.
    /// * `corpora` - ``(language name, text)`` pairs.
    /// * `switch_score` - the log score of changing language mid-line.
    pub fn train<I, S>(
        alphabet: I,
        corpora: &[(&str, &str)],
        switch_score: f64,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alphabet: Vec<String> = alphabet.into_iter().map(Into::into).collect();
        let size = alphabet.len();

        let mut counts = Vec::with_capacity(corpora.len());
        for (_, text) in corpora {
            let mut table = vec![vec![0.0; size]; size + 1];
            let mut prev = 0;
            for ch in text.chars() {
                let symbol = ch.to_string();
                let Some(next) = alphabet.iter().position(|a| *a == symbol) else {
                    continue;
                };
                table[prev][next] += 1.0;
                prev = next + 1;
            }
            counts.push(table);
        }

        Self {
            alphabet,
            languages: corpora.iter().map(|(name, _)| name.to_string()).collect(),
            counts,
            switch_score,
        }
    }
}

impl LanguageModel for BigramLanguageModel {
    fn order(&self) -> usize {
        2
    }

    fn alphabet(&self) -> Vec<String> {
        self.alphabet.clone()
    }

    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn score_next(
        &self,
        context: &[CharId],
        lm_char: CharId,
        language: Option<LanguageId>,
    ) -> f64 {
        let size = self.alphabet.len() as f64;
        let Some(table) = language.and_then(|l| self.counts.get(l)) else {
            return -size.ln();
        };
        let row = context.last().map(|&c| c + 1).unwrap_or(0);
        let Some(row) = table.get(row) else {
            return f64::NEG_INFINITY;
        };
        let total: f64 = row.iter().sum();
        let count = row.get(lm_char).copied().unwrap_or(0.0);
        ((count + 1.0) / (total + size)).ln()
    }

    fn language_switch_score(
        &self,
        from: Option<LanguageId>,
        to: Option<LanguageId>,
    ) -> f64 {
        match from {
            Some(from) if Some(from) != to => self.switch_score,
            _ => 0.0,
        }
    }
}
