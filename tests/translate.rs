use rpgm_translator_lib::{
    SessionFlags, TranslateOptions, TranslationMap, Translator,
    constants::DEFAULT_MIN_LINE_LENGTH, types::Patterns,
};

fn map(entries: &[(&str, &str)]) -> TranslationMap {
    entries
        .iter()
        .map(|&(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

fn translator_with_flags(
    entries: &[(&str, &str)],
    flags: SessionFlags,
) -> Translator {
    Translator::with_config(
        map(entries),
        flags,
        DEFAULT_MIN_LINE_LENGTH,
        Patterns::default(),
    )
}

#[test]
fn empty_string_is_never_translated() {
    let mut translator = Translator::new(map(&[("a", "b"), ("", "x")]));
    assert_eq!(translator.translate(""), "");

    let mut translator = Translator::new(TranslationMap::default());
    assert_eq!(translator.translate(""), "");
    assert_eq!(translator.translate("text"), "text");
}

#[test]
fn exact_match() {
    let mut translator = Translator::new(map(&[("ポーション", "Potion")]));
    assert_eq!(translator.translate("ポーション"), "Potion");
}

#[test]
fn unmatched_text_is_returned_unchanged() {
    let mut translator = Translator::new(map(&[("a", "b")]));
    assert_eq!(translator.translate("xyz"), "xyz");
    assert_eq!(translator.translate("12"), "12");
}

#[test]
fn translated_text_is_returned_unchanged() {
    let mut translator = Translator::new(map(&[
        ("Potion", "Potion_FR"),
        ("Potion_FR", "Something else"),
    ]));

    assert_eq!(translator.translate("Potion_FR"), "Potion_FR");
    assert_eq!(translator.translate("Potion"), "Potion_FR");
}

#[test]
fn longest_key_is_replaced_first() {
    let mut translator = Translator::new(map(&[("ab", "X"), ("abc", "Y")]));
    assert_eq!(translator.translate("abcd"), "Yd");
}

#[test]
fn substring_replacement_works_with_multibyte_text() {
    let mut translator = Translator::new(map(&[("ポーション", "Potion")]));
    assert_eq!(translator.translate("ポーションを使った"), "Potionを使った");
}

#[test]
fn multiline_entries_are_split_into_lines() {
    let mut translator =
        Translator::new(map(&[("Hello\nWorld", "Bonjour\nMonde")]));

    assert_eq!(translator.translate("Hello"), "Bonjour");
    assert_eq!(translator.translate("World"), "Monde");
    assert_eq!(translator.translate("Hello\nWorld"), "Bonjour\nMonde");
    assert_eq!(translator.translate("World\nHello"), "Monde\nBonjour");
}

#[test]
fn multiline_entries_are_not_split_without_flag() {
    let mut translator = translator_with_flags(
        &[("Hello\nWorld", "Bonjour\nMonde")],
        SessionFlags::empty(),
    );

    assert_eq!(translator.translate("Hello"), "Hello");
}

#[test]
fn escape_sequences_are_preserved() {
    let mut translator =
        Translator::new(map(&[("C", "Z"), ("V", "W"), ("Hello", "Bonjour")]));

    assert_eq!(
        translator.translate(r"\C[2]Hello\C[0]"),
        r"\C[2]Bonjour\C[0]"
    );

    let translated = translator.translate(r"\V[3] Hello \{big\}");
    assert!(translated.contains(r"\V[3]"));
    assert!(translated.contains(r"\{big\}"));
    assert!(translated.contains("Bonjour"));
}

#[test]
fn escape_sequences_are_preserved_with_empty_dictionary() {
    let mut translator = Translator::new(TranslationMap::default());
    let text = r"\N[1]は\I[45]ポーションを手に入れた！\.\|";
    assert_eq!(translator.translate(text), text);
}

#[test]
fn leading_whitespace_is_preserved() {
    let mut translator = Translator::new(map(&[("Hello", "Bonjour")]));
    assert_eq!(translator.translate("  Hello"), "  Bonjour");
    assert_eq!(translator.translate("\u{3000}Hello"), "\u{3000}Bonjour");
}

#[test]
fn substring_results_are_cached() {
    let mut translator = Translator::new(map(&[("ab", "X")]));

    assert_eq!(translator.translate("abc"), "Xc");
    assert_eq!(translator.dictionary().get("abc"), Some("Xc"));
    assert!(translator.dictionary().length_index().get(3).is_some());
    assert_eq!(translator.translate("Xc"), "Xc");
}

#[test]
fn substring_results_are_not_cached_without_flag() {
    let mut translator =
        translator_with_flags(&[("ab", "X")], SessionFlags::SplitLines);

    assert_eq!(translator.translate("abc"), "Xc");
    assert_eq!(translator.dictionary().get("abc"), None);
    assert!(translator.dictionary().is_translated("Xc"));
}

#[test]
fn caching_can_be_disabled_per_call() {
    let mut translator = Translator::new(map(&[("ab", "X")]));
    let options = TranslateOptions {
        allow_caching: false,
        ..Default::default()
    };

    assert_eq!(translator.translate_with("abc", options), "Xc");
    assert_eq!(translator.dictionary().get("abc"), None);
}

#[test]
fn replacements_are_capped() {
    let mut translator = Translator::new(map(&[("a", "1"), ("b", "2")]));

    assert_eq!(
        translator.translate_with("ab", TranslateOptions::capped(1)),
        "1b"
    );
    assert_eq!(translator.dictionary().get("ab"), None);
    assert_eq!(
        translator.translate_with("ab", TranslateOptions::capped(0)),
        "ab"
    );
    assert_eq!(translator.translate("ab"), "12");
}

#[test]
fn every_occurrence_of_key_is_replaced() {
    let mut translator = Translator::new(map(&[("ab", "X")]));
    assert_eq!(translator.translate("ab ab"), "X X");

    let mut translator = Translator::new(map(&[("スライム", "Slime")]));
    assert_eq!(
        translator.translate("スライムとスライムが現れた"),
        "SlimeとSlimeが現れた"
    );
}

#[test]
fn capped_replacement_covers_every_occurrence_of_one_key() {
    let mut translator = Translator::new(map(&[("a", "1"), ("b", "2")]));

    assert_eq!(
        translator.translate_with("abab", TranslateOptions::capped(1)),
        "1b1b"
    );
}

#[test]
fn speaker_names_are_split() {
    let mut translator = translator_with_flags(
        &[("【アリス】こんにちは", "【Alice】Hello")],
        SessionFlags::SplitSpeakers,
    );

    assert_eq!(translator.translate("アリス"), "Alice");
}

// Replacement runs on the progressively rewritten segment, so a shorter key may match text that a longer key has
// just produced. Only the longest key being applied first is stable.
#[test]
fn replacement_is_order_sensitive() {
    let mut translator = Translator::new(map(&[("xyz", "ab"), ("ab", "Q")]));
    let translated = translator.translate("xyz!");

    assert!(!translated.contains("xyz"));
    assert!(translated.ends_with('!'));
    assert_ne!(translated, "xyz!");
}
