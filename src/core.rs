use crate::{
    constants::DEFAULT_MIN_LINE_LENGTH,
    dictionary::Dictionary,
    types::{Patterns, SessionFlags, TranslationMap},
};
use log::debug;
use smallvec::SmallVec;
use std::ops::Range;

/// Per-call options of [`Translator::translate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Cut leading whitespace off before matching, and put it back afterwards.
    pub preserve_leading_whitespace: bool,
    /// Maximum count of substring replacements in each literal segment.
    pub max_replacements: usize,
    /// Allow remembering substring matching results, if the session allows it too.
    pub allow_caching: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            preserve_leading_whitespace: true,
            max_replacements: usize::MAX,
            allow_caching: true,
        }
    }
}

impl TranslateOptions {
    /// Options with at most `max_replacements` substring replacements.
    #[must_use]
    pub fn capped(max_replacements: usize) -> Self {
        Self {
            max_replacements,
            ..Default::default()
        }
    }
}

/// Translation session. Owns the dictionary and translates arbitrary strings with it.
///
/// Matching tiers, first match wins:
///
/// 1. Empty strings and strings that are already translations are returned as is.
/// 2. Exact dictionary match.
/// 3. Multiline strings are translated line by line.
/// 4. Exact match of the string without leading whitespace.
/// 5. String is split by escape sequences, which are kept verbatim. Each literal segment is matched exactly, and then
///    dictionary keys shorter than the segment, longest first, are replaced in it.
///
/// Substring replacement works on the progressively rewritten segment, so a key may match text, introduced by a
/// previous replacement in the same segment.
///
/// Translator mutates its dictionary while caching, so one instance must not be shared between threads without
/// external locking.
#[derive(Debug, Clone)]
pub struct Translator {
    dictionary: Dictionary,
    patterns: Patterns,
    flags: SessionFlags,
}

impl Translator {
    /// Creates a translator with default [`SessionFlags`], patterns and minimum line length.
    #[must_use]
    pub fn new(entries: TranslationMap) -> Self {
        Self::with_config(
            entries,
            SessionFlags::default(),
            DEFAULT_MIN_LINE_LENGTH,
            Patterns::default(),
        )
    }

    /// Creates a translator and enriches its dictionary according to `flags`.
    ///
    /// # Parameters
    ///
    /// - `entries` - Source → translation entries.
    /// - `flags` - [`SessionFlags`] of the session.
    /// - `min_line_length` - Lines of multiline entries must be longer than this to become entries of their own.
    /// - `patterns` - [`Patterns`] used for matching.
    #[must_use]
    pub fn with_config(
        entries: TranslationMap,
        flags: SessionFlags,
        min_line_length: usize,
        patterns: Patterns,
    ) -> Self {
        let mut dictionary = Dictionary::new(entries);

        if flags.contains(SessionFlags::SplitLines) {
            dictionary.split_lines(min_line_length);
        }

        if flags.contains(SessionFlags::SplitSpeakers) {
            dictionary.split_speakers(&patterns.speaker);
        }

        debug!("Dictionary holds {} entries.", dictionary.len());

        Self {
            dictionary,
            patterns,
            flags,
        }
    }

    #[must_use]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    #[must_use]
    pub fn patterns(&self) -> &Patterns {
        &self.patterns
    }

    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    /// Translates `text` with default [`TranslateOptions`].
    pub fn translate(&mut self, text: &str) -> String {
        self.translate_with(text, TranslateOptions::default())
    }

    /// Translates `text`. Returns it unchanged, if nothing matches.
    pub fn translate_with(
        &mut self,
        text: &str,
        options: TranslateOptions,
    ) -> String {
        if text.is_empty() || self.dictionary.is_translated(text) {
            return text.to_owned();
        }

        if let Some(translated) = self.dictionary.get(text) {
            return translated.to_owned();
        }

        if text.contains('\n') {
            return text
                .split('\n')
                .map(|line| self.translate_with(line, options))
                .collect::<Vec<String>>()
                .join("\n");
        }

        let (leading, body) = if options.preserve_leading_whitespace {
            split_leading_whitespace(text)
        } else {
            ("", text)
        };

        if !leading.is_empty() {
            if self.dictionary.is_translated(body) {
                return text.to_owned();
            }

            if let Some(translated) = self.dictionary.get(body) {
                return format!("{leading}{translated}");
            }
        }

        let mut result = String::with_capacity(leading.len() + body.len());
        result.push_str(leading);

        let escapes: SmallVec<[Range<usize>; 4]> = self
            .patterns
            .escape
            .find_iter(body)
            .map(|m| m.range())
            .collect();

        let mut literal_start = 0;

        for escape in escapes {
            let literal = &body[literal_start..escape.start];
            result.push_str(&self.translate_literal(literal, options));
            result.push_str(&body[escape.start..escape.end]);
            literal_start = escape.end;
        }

        result.push_str(&self.translate_literal(&body[literal_start..], options));
        result
    }

    /// Translates a segment that holds no escape sequences.
    fn translate_literal(
        &mut self,
        segment: &str,
        options: TranslateOptions,
    ) -> String {
        if segment.is_empty() || self.dictionary.is_translated(segment) {
            return segment.to_owned();
        }

        if let Some(translated) = self.dictionary.get(segment) {
            return translated.to_owned();
        }

        let translated = self.replace_substrings(segment, options.max_replacements);

        if translated != segment {
            // Capped results are partial and never cached
            if options.allow_caching
                && options.max_replacements == usize::MAX
                && self.flags.contains(SessionFlags::Cache)
            {
                self.dictionary
                    .insert(segment.to_owned(), translated.clone());
            } else {
                self.dictionary.mark_translated(&translated);
            }
        }

        translated
    }

    /// Replaces dictionary keys, shorter than `segment`, with their translations, longest keys first.
    ///
    /// Every occurrence of a key is replaced at once, and counts as a single replacement.
    fn replace_substrings(
        &self,
        segment: &str,
        max_replacements: usize,
    ) -> String {
        let mut translated = segment.to_owned();

        if max_replacements == 0 {
            return translated;
        }

        let mut count = 0;

        for (_, keys) in self
            .dictionary
            .length_index()
            .shorter_than(segment.chars().count())
        {
            for key in keys {
                if !translated.contains(key.as_str()) {
                    continue;
                }

                let Some(value) = self.dictionary.get(key) else {
                    continue;
                };

                translated = translated.replace(key.as_str(), value);
                count += 1;

                if count >= max_replacements {
                    return translated;
                }
            }
        }

        translated
    }
}

fn split_leading_whitespace(text: &str) -> (&str, &str) {
    let body = text.trim_start();
    (&text[..text.len() - body.len()], body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_leading_whitespace() {
        assert_eq!(split_leading_whitespace("  a b"), ("  ", "a b"));
        assert_eq!(split_leading_whitespace("\u{3000}あ"), ("\u{3000}", "あ"));
        assert_eq!(split_leading_whitespace("a "), ("", "a "));
        assert_eq!(split_leading_whitespace(""), ("", ""));
    }

    #[test]
    fn capped_options() {
        let options = TranslateOptions::capped(1);
        assert_eq!(options.max_replacements, 1);
        assert!(options.preserve_leading_whitespace);
        assert!(options.allow_caching);
    }
}
