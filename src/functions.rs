use crate::types::{Error, GameDataFile, TranslationMap};
use serde_json::Value;
use std::{
    fs::{read_dir, read_to_string},
    io,
    path::Path,
};

const BOM: char = '\u{FEFF}';

#[inline]
/// This function is exactly similar to `std::fs::read_to_string`, but it doesn't include Byte Order Mark, if there's any.
pub fn read_to_string_without_bom<P: AsRef<Path>>(
    file_path: P,
) -> io::Result<String> {
    let mut content = read_to_string(file_path)?;

    if content.starts_with(BOM) {
        content.replace_range(..BOM.len_utf8(), "");
    }

    Ok(content)
}

/// Parses translation dictionary file contents.
///
/// Dictionary must be a JSON object, which values are all strings. Entry order is preserved.
///
/// # Errors
///
/// - [`Error::JsonParse`] if `content` isn't valid JSON.
/// - [`Error::InvalidDictionary`] if root isn't an object, or any value isn't a string.
pub fn parse_dictionary(content: &str) -> Result<TranslationMap, Error> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let root: Value = serde_json::from_str(content)?;

    let Value::Object(object) = root else {
        return Err(Error::InvalidDictionary(format!(
            "root is {}, not an object",
            json_type_name(&root)
        )));
    };

    let mut map = TranslationMap::with_capacity_and_hasher(
        object.len(),
        Default::default(),
    );

    for (key, value) in object {
        let Value::String(value) = value else {
            return Err(Error::InvalidDictionary(format!(
                "value of `{key}` is {}, not a string",
                json_type_name(&value)
            )));
        };

        map.insert(key, value);
    }

    Ok(map)
}

/// Checks whether `content` is a flat JSON object of strings, that can be used as a translation dictionary.
#[must_use]
pub fn is_dictionary_json(content: &str) -> bool {
    parse_dictionary(content).is_ok()
}

/// Lists `.json` files in the top level of `data_dir`, sorted by name.
///
/// # Errors
///
/// - [`Error::Io`] if directory can't be read.
pub fn collect_data_files<P: AsRef<Path>>(
    data_dir: P,
) -> Result<Vec<GameDataFile>, Error> {
    let data_dir = data_dir.as_ref();

    let mut files: Vec<GameDataFile> = read_dir(data_dir)
        .map_err(|e| Error::Io(data_dir.to_path_buf(), e))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .map(GameDataFile::new)
        .filter(GameDataFile::is_json)
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Whether plugin command argument is a number, like `12`, `-3` or `1.5`.
pub(crate) fn is_numeric_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);

    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && digits.parse::<f64>().is_ok()
}

/// Number of lines in `string`, as `split('\n')` yields them.
pub(crate) fn line_count(string: &str) -> usize {
    string.bytes().filter(|&b| b == b'\n').count() + 1
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_keeps_entry_order() {
        let map = parse_dictionary(r#"{"b":"2","a":"1","c":"3"}"#).unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn dictionary_ignores_bom() {
        let map = parse_dictionary("\u{FEFF}{\"a\":\"b\"}").unwrap();
        assert_eq!(map.get("a").map(String::as_str), Some("b"));
    }

    #[test]
    fn dictionary_rejects_non_object_root() {
        assert!(matches!(
            parse_dictionary(r#"["a", "b"]"#),
            Err(Error::InvalidDictionary(_))
        ));
    }

    #[test]
    fn dictionary_rejects_non_string_values() {
        assert!(matches!(
            parse_dictionary(r#"{"a": 1}"#),
            Err(Error::InvalidDictionary(_))
        ));
        assert!(!is_dictionary_json(r#"{"a": {"b": "c"}}"#));
        assert!(!is_dictionary_json("{"));
        assert!(is_dictionary_json("{}"));
    }

    #[test]
    fn numeric_tokens() {
        assert!(is_numeric_token("12"));
        assert!(is_numeric_token("-3"));
        assert!(is_numeric_token("1.5"));
        assert!(is_numeric_token("-0.25"));
        assert!(!is_numeric_token("1.2.3"));
        assert!(!is_numeric_token("."));
        assert!(!is_numeric_token("inf"));
        assert!(!is_numeric_token("1e5"));
        assert!(!is_numeric_token("hello"));
        assert!(!is_numeric_token("-"));
        assert!(!is_numeric_token(""));
    }

    #[test]
    fn counts_lines() {
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\nb\n"), 3);
    }
}
