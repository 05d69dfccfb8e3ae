use crate::{
    functions::line_count,
    types::{IndexSetXxh, TranslationMap, Xxh3Builder},
};
use log::debug;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

/// Dictionary keys grouped by their length in characters.
///
/// Empty key isn't indexed, because it's contained in any string.
#[derive(Debug, Default, Clone)]
pub struct LengthIndex {
    buckets: BTreeMap<usize, IndexSetXxh<String>>,
}

impl LengthIndex {
    /// Indexes `key`. Returns `false` if it's empty or already indexed.
    pub fn insert(&mut self, key: &str) -> bool {
        let length = key.chars().count();

        if length == 0 {
            return false;
        }

        self.buckets
            .entry(length)
            .or_default()
            .insert(key.to_owned())
    }

    /// Keys of exactly `length` characters.
    #[must_use]
    pub fn get(&self, length: usize) -> Option<&IndexSetXxh<String>> {
        self.buckets.get(&length)
    }

    /// Buckets of keys shorter than `length`, longest first.
    pub fn shorter_than(
        &self,
        length: usize,
    ) -> impl Iterator<Item = (usize, &IndexSetXxh<String>)> {
        self.buckets
            .range(1..length.max(1))
            .rev()
            .map(|(&length, keys)| (length, keys))
    }

    /// Total count of indexed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(IndexSetXxh::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Translation dictionary of one session, with its [`LengthIndex`] and the set of translated strings.
///
/// Dictionary only grows: entries derived on construction and entries cached by the matcher are added, but never
/// removed or overwritten.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: TranslationMap,
    length_index: LengthIndex,
    translated: HashSet<String, Xxh3Builder>,
}

impl Dictionary {
    /// Creates a dictionary from `entries`, ensures that the empty string maps to itself, and indexes all keys.
    #[must_use]
    pub fn new(mut entries: TranslationMap) -> Self {
        entries.insert(String::new(), String::new());

        let mut length_index = LengthIndex::default();
        let mut translated: HashSet<String, Xxh3Builder> =
            HashSet::with_capacity_and_hasher(
                entries.len(),
                Xxh3Builder::default(),
            );

        for (key, value) in &entries {
            length_index.insert(key);
            translated.insert(value.clone());
        }

        Self {
            entries,
            length_index,
            translated,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether `text` is a translation this session knows about.
    #[must_use]
    pub fn is_translated(&self, text: &str) -> bool {
        self.translated.contains(text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Dictionary always holds at least the empty string entry, so this is `true` only if it holds nothing else.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    #[must_use]
    pub fn entries(&self) -> &TranslationMap {
        &self.entries
    }

    #[must_use]
    pub fn length_index(&self) -> &LengthIndex {
        &self.length_index
    }

    /// Inserts an entry, if `key` isn't present yet, and indexes it.
    ///
    /// Returns whether the entry was inserted.
    pub fn insert(&mut self, key: String, value: String) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }

        self.length_index.insert(&key);
        self.translated.insert(value.clone());
        self.entries.insert(key, value);
        true
    }

    /// Remembers `text` as translated, so it's never translated again.
    pub fn mark_translated(&mut self, text: &str) {
        if !self.translated.contains(text) {
            self.translated.insert(text.to_owned());
        }
    }

    /// Adds each line of multiline entries as a separate entry, if source and translation have the same line count.
    ///
    /// Only lines longer than `min_length` characters are added. Returns count of added entries.
    pub fn split_lines(&mut self, min_length: usize) -> usize {
        let derived: Vec<(String, String)> = self
            .entries
            .iter()
            .filter(|(key, value)| {
                key.contains('\n') && line_count(key) == line_count(value)
            })
            .flat_map(|(key, value)| key.split('\n').zip(value.split('\n')))
            .filter(|(line, _)| line.chars().count() > min_length)
            .map(|(line, translated)| (line.to_owned(), translated.to_owned()))
            .collect();

        let mut added = 0;

        for (key, value) in derived {
            added += usize::from(self.insert(key, value));
        }

        debug!("Added {added} entries from multiline dictionary entries.");
        added
    }

    /// Adds speaker names, matched by `speaker_re`, as separate entries, if source and translation have the same
    /// speaker count.
    ///
    /// Speaker name is captured either by the first or the second group of `speaker_re`. Names that translate to
    /// themselves are skipped. Returns count of added entries.
    pub fn split_speakers(&mut self, speaker_re: &Regex) -> usize {
        let speakers = |string: &str| -> Vec<String> {
            speaker_re
                .captures_iter(string)
                .filter_map(|captures| captures.get(1).or_else(|| captures.get(2)))
                .map(|name| name.as_str().to_owned())
                .collect()
        };

        let mut derived: Vec<(String, String)> = Vec::new();

        for (key, value) in &self.entries {
            let source_names = speakers(key);

            if source_names.is_empty() {
                continue;
            }

            let translated_names = speakers(value);

            if source_names.len() != translated_names.len() {
                continue;
            }

            derived.extend(
                source_names
                    .into_iter()
                    .zip(translated_names)
                    .filter(|(name, translated)| {
                        !name.trim().is_empty() && name != translated
                    }),
            );
        }

        let mut added = 0;

        for (key, value) in derived {
            added += usize::from(self.insert(key, value));
        }

        debug!("Added {added} entries from speaker names.");
        added
    }
}

impl From<TranslationMap> for Dictionary {
    fn from(entries: TranslationMap) -> Self {
        Self::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPEAKER_PATTERN;

    fn map(entries: &[(&str, &str)]) -> TranslationMap {
        entries
            .iter()
            .map(|&(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    #[test]
    fn empty_string_maps_to_itself() {
        let dictionary = Dictionary::new(map(&[("a", "b")]));
        assert_eq!(dictionary.get(""), Some(""));
        assert!(dictionary.is_translated(""));
        assert!(!dictionary.is_empty());
        assert!(Dictionary::new(TranslationMap::default()).is_empty());
    }

    #[test]
    fn indexes_keys_by_char_length() {
        let dictionary = Dictionary::new(map(&[
            ("ab", "X"),
            ("abc", "Y"),
            ("ポーション", "Potion"),
        ]));
        let index = dictionary.length_index();

        assert_eq!(index.len(), 3);
        assert!(index.get(2).unwrap().contains("ab"));
        assert!(index.get(3).unwrap().contains("abc"));
        assert!(index.get(5).unwrap().contains("ポーション"));
        assert!(index.get(0).is_none());

        let lengths: Vec<usize> =
            index.shorter_than(5).map(|(length, _)| length).collect();
        assert_eq!(lengths, [3, 2]);
    }

    #[test]
    fn splits_lines_of_equal_count() {
        let mut dictionary = Dictionary::new(map(&[
            ("Hello\nWorld", "Bonjour\nMonde"),
            ("One\nTwo\nThree", "Un\nDeux"),
            ("Hi\nLonger line", "Salut\nLigne plus longue"),
        ]));

        assert_eq!(dictionary.split_lines(3), 3);
        assert_eq!(dictionary.get("Hello"), Some("Bonjour"));
        assert_eq!(dictionary.get("World"), Some("Monde"));
        assert_eq!(dictionary.get("Longer line"), Some("Ligne plus longue"));
        // Too short
        assert_eq!(dictionary.get("Hi"), None);
        // Mismatched line count
        assert_eq!(dictionary.get("Three"), None);
        assert!(dictionary.length_index().get(5).unwrap().contains("Hello"));
        assert!(dictionary.is_translated("Monde"));
    }

    #[test]
    fn split_lines_keeps_existing_entries() {
        let mut dictionary = Dictionary::new(map(&[
            ("Hello", "Salut"),
            ("Hello\nWorld", "Bonjour\nMonde"),
        ]));

        assert_eq!(dictionary.split_lines(3), 1);
        assert_eq!(dictionary.get("Hello"), Some("Salut"));
        assert_eq!(dictionary.length_index().get(5).unwrap().len(), 2);
    }

    #[test]
    fn splits_speakers() {
        let speaker_re = Regex::new(SPEAKER_PATTERN).unwrap();
        let mut dictionary = Dictionary::new(map(&[
            ("【アリス】こんにちは", "【Alice】Hello"),
            ("<ボブ>やあ", "<Bob>Hi"),
            ("<a><b>", "<c>"),
        ]));

        assert_eq!(dictionary.split_speakers(&speaker_re), 2);
        assert_eq!(dictionary.get("アリス"), Some("Alice"));
        assert_eq!(dictionary.get("ボブ"), Some("Bob"));
        assert_eq!(dictionary.get("a"), None);
    }

    #[test]
    fn insert_never_overwrites() {
        let mut dictionary = Dictionary::new(map(&[("a", "b")]));
        assert!(!dictionary.insert("a".into(), "c".into()));
        assert!(dictionary.insert("abc".into(), "d".into()));
        assert_eq!(dictionary.get("a"), Some("b"));
        assert_eq!(dictionary.length_index().len(), 2);
    }
}
