use rpgm_translator_lib::{DataTranslator, TranslationMap};
use serde_json::{Value, json};

fn map(entries: &[(&str, &str)]) -> TranslationMap {
    entries
        .iter()
        .map(|&(key, value)| (key.to_owned(), value.to_owned()))
        .collect()
}

#[test]
fn system() {
    let mut data_translator = DataTranslator::new(map(&[
        ("勇者の旅", "Hero's Journey"),
        ("レベル", "Level"),
        ("戦う", "Fight"),
        ("炎", "Fire"),
        ("勇者", "Hero"),
        ("ja_JP", "en_US"),
        ("Cursor1", "Cursor"),
        ("%1には効かなかった！", "%1 was unaffected!"),
        ("スイッチ", "Switch"),
    ]));

    let source = json!({
        "gameTitle": "勇者の旅",
        "currencyUnit": "G",
        "locale": "ja_JP",
        "title1Name": "勇者",
        "elements": ["", "炎"],
        "switches": ["", "スイッチ"],
        "sounds": [{"name": "Cursor1", "pan": 0, "pitch": 100, "volume": 90}],
        "terms": {
            "basic": ["レベル", "Lv"],
            "commands": ["戦う", null],
            "messages": {"actionFailure": "%1には効かなかった！"}
        }
    });

    let translated: Value = serde_json::from_str(
        &data_translator
            .translate_json("System.json", &source.to_string())
            .unwrap(),
    )
    .unwrap();

    assert_eq!(
        translated,
        json!({
            "gameTitle": "Hero's Journey",
            "currencyUnit": "G",
            "locale": "ja_JP",
            "title1Name": "勇者",
            "elements": ["", "Fire"],
            "switches": ["", "Switch"],
            "sounds": [{"name": "Cursor1", "pan": 0, "pitch": 100, "volume": 90}],
            "terms": {
                "basic": ["Level", "Lv"],
                "commands": ["Fight", null],
                "messages": {"actionFailure": "%1 was unaffected!"}
            }
        })
    );
}
