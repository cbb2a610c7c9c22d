use std::{fs, path::Path};

use crate::{errors::Error, types::Content};

/// Decides whether a message breaks the content policy.
pub trait Dictionary {
    fn is_flagged(&self, content: &Content) -> bool;
}

/// Used when no word list is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverFlagged;

impl Dictionary for NeverFlagged {
    fn is_flagged(&self, _: &Content) -> bool {
        false
    }
}

/// Flags any text or caption containing one of the words, ignoring case.
#[derive(Debug, Default, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Self { words }
    }

    /// One word per line, blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;

        let words = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'));

        Ok(Self::new(words))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn is_flagged(&self, content: &Content) -> bool {
        content.readable().any(|part| {
            let part = part.to_lowercase();

            self.words.iter().any(|word| part.contains(word.as_str()))
        })
    }
}
