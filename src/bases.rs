use crate::{
    constants::{localization::*, *},
    core::{TranslateOptions, Translator},
    functions::is_numeric_token,
    types::{Code, Error, SessionFlags, TargetKind},
};
use log::warn;
use regex::Captures;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::path::Path;

/// Decides, which object keys open a translatable subtree.
pub trait Whitelist {
    fn allows(&self, key: &str) -> bool;
}

impl Whitelist for phf::Set<&'static str> {
    #[inline]
    fn allows(&self, key: &str) -> bool {
        self.contains(key)
    }
}

impl Whitelist for [&str] {
    #[inline]
    fn allows(&self, key: &str) -> bool {
        self.iter().any(|&allowed| allowed == key)
    }
}

/// Walks a JSON tree and translates strings, located under whitelisted object keys.
///
/// Once a key is whitelisted, the whole subtree under it is translated, including nested arrays and objects.
pub struct WhitelistBase<'a, W: Whitelist + ?Sized> {
    translator: &'a mut Translator,
    whitelist: &'a W,
}

impl<'a, W: Whitelist + ?Sized> WhitelistBase<'a, W> {
    pub fn new(translator: &'a mut Translator, whitelist: &'a W) -> Self {
        Self {
            translator,
            whitelist,
        }
    }

    /// Walks `value`. `translate` indicates whether `value` itself is already inside of a whitelisted subtree.
    pub fn process(&mut self, value: &mut Value, translate: bool) {
        match value {
            Value::String(text) => {
                if translate {
                    *text = self.translator.translate(text);
                }
            }
            Value::Array(array) => {
                for value in array {
                    self.process(value, translate);
                }
            }
            Value::Object(object) => {
                for (key, value) in object.iter_mut() {
                    let translate = translate || self.whitelist.allows(key);
                    self.process(value, translate);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
}

/// Walker of event command lists: maps, common events, troops and anything unknown.
///
/// Command objects are recognized by their `code` field, and only parameters of text commands are translated.
/// Objects without `code`, but with `displayName`, have their display name translated. After that, walker descends
/// into every nested value, so commands are found at any depth.
pub struct EventBase<'a> {
    translator: &'a mut Translator,
}

impl<'a> EventBase<'a> {
    pub fn new(translator: &'a mut Translator) -> Self {
        Self { translator }
    }

    pub fn process(&mut self, value: &mut Value) {
        match value {
            Value::Object(object) => {
                if object.contains_key("code") {
                    self.process_command(object);
                } else if let Some(Value::String(display_name)) =
                    object.get_mut("displayName")
                {
                    *display_name = self.translator.translate(display_name);
                }

                for value in object.values_mut() {
                    self.process(value);
                }
            }
            Value::Array(array) => {
                for value in array {
                    self.process(value);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    fn process_command(&mut self, command: &mut Map<String, Value>) {
        let code = command.get("code").map_or(Code::Bad, Code::from_json);

        let Some(Value::Array(parameters)) = command.get_mut("parameters")
        else {
            return;
        };

        match code {
            Code::Comment => {
                for parameter in parameters {
                    self.translate_strings(parameter, TranslateOptions::capped(1));
                }
            }
            code if code.is_any_text() => {
                for parameter in parameters {
                    self.translate_strings(parameter, TranslateOptions::default());
                }
            }
            Code::DialogueStart => {
                if !self
                    .translator
                    .flags()
                    .contains(SessionFlags::SpeakerNames)
                {
                    return;
                }

                if let Some(Value::String(speaker)) = parameters.get_mut(4) {
                    *speaker = self.translator.translate(speaker);
                }
            }
            Code::PluginArray => {
                for parameter in parameters {
                    if let Value::String(command) = parameter {
                        self.translate_plugin_command(command);
                    }
                }
            }
            Code::PluginObject => {
                let Some(fields) = parameters
                    .first()
                    .and_then(Value::as_str)
                    .and_then(|plugin| PLUGIN_OBJECT_WHITELIST.get(plugin))
                    .copied()
                else {
                    return;
                };

                let mut base = WhitelistBase::new(&mut *self.translator, fields);

                for parameter in parameters {
                    base.process(parameter, false);
                }
            }
            _ => {}
        }
    }

    fn translate_strings(&mut self, value: &mut Value, options: TranslateOptions) {
        match value {
            Value::String(text) => {
                *text = self.translator.translate_with(text, options);
            }
            Value::Array(array) => {
                for value in array {
                    self.translate_strings(value, options);
                }
            }
            _ => {}
        }
    }

    /// Translates arguments of a whitelisted `KEYWORD arg arg ...` plugin command. Keyword and numeric arguments
    /// stay as is.
    fn translate_plugin_command(&mut self, command: &mut String) {
        let mut tokens = command.split(' ');

        let Some(keyword) = tokens.next() else {
            return;
        };

        if !PLUGIN_ARRAY_WHITELIST.contains(keyword) {
            return;
        }

        let translated: Vec<String> = std::iter::once(keyword.to_owned())
            .chain(tokens.map(|token| {
                if token.is_empty() || is_numeric_token(token) {
                    token.to_owned()
                } else {
                    self.translator.translate(token)
                }
            }))
            .collect();

        *command = translated.join(" ");
    }
}

/// Walker of database files: actors, items, skills and the like.
pub struct ObjectBase<'a> {
    translator: &'a mut Translator,
}

impl<'a> ObjectBase<'a> {
    pub fn new(translator: &'a mut Translator) -> Self {
        Self { translator }
    }

    pub fn process(&mut self, value: &mut Value) {
        self.process_value(value, false);
    }

    /// `translate` indicates whether `value` is nested under a text field, like `name` or `message1`.
    fn process_value(&mut self, value: &mut Value, translate: bool) {
        match value {
            Value::String(text) => {
                if translate {
                    *text = self.translator.translate(text);
                }
            }
            Value::Object(object) => {
                for (key, value) in object.iter_mut() {
                    match value {
                        Value::String(note) if !translate && key == NOTE_FIELD => {
                            *note = self.translate_note(note);
                        }
                        _ => {
                            let translate =
                                translate || is_object_text_field(key);
                            self.process_value(value, translate);
                        }
                    }
                }
            }
            Value::Array(array) => {
                for value in array {
                    self.process_value(value, translate);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Translates content of known `<Tag:content>` note tags. Everything else in the note is kept.
    fn translate_note(&mut self, note: &str) -> String {
        let note_tag_re = self.translator.patterns().note_tag.clone();

        note_tag_re
            .replace_all(note, |captures: &Captures| {
                let tag = &captures[1];

                if NOTE_TAGS.contains(tag) {
                    format!("<{tag}:{}>", self.translator.translate(&captures[2]))
                } else {
                    captures[0].to_owned()
                }
            })
            .into_owned()
    }
}

fn is_object_text_field(key: &str) -> bool {
    OBJECT_TEXT_FIELDS.contains(key) || key.starts_with(MESSAGE_FIELD_PREFIX)
}

/// Walker of `System.json`. Only subtrees of [`SYSTEM_WHITELIST`] keys are translated.
pub struct SystemBase<'a> {
    translator: &'a mut Translator,
}

impl<'a> SystemBase<'a> {
    pub fn new(translator: &'a mut Translator) -> Self {
        Self { translator }
    }

    pub fn process(&mut self, value: &mut Value) {
        WhitelistBase::new(&mut *self.translator, &SYSTEM_WHITELIST)
            .process(value, false);
    }
}

/// Patcher of `plugins.js`.
///
/// Finds the `var $plugins = [...]` literal, translates parameters of [`PLUGINS_JS_WHITELIST`] plugins, and writes
/// the literal back, leaving the rest of the script untouched.
pub struct PluginBase<'a> {
    translator: &'a mut Translator,
    plugins_file_path: &'a Path,
}

impl<'a> PluginBase<'a> {
    pub fn new(
        translator: &'a mut Translator,
        plugins_file_path: &'a Path,
    ) -> Self {
        Self {
            translator,
            plugins_file_path,
        }
    }

    /// Returns patched `content` of `plugins.js`.
    ///
    /// # Errors
    ///
    /// - [`Error::NoPluginsArray`] if `content` has no `$plugins` array literal.
    /// - [`Error::JsonParse`] if the literal isn't a valid JSON array.
    pub fn process(&mut self, content: &str) -> Result<String, Error> {
        let plugins_array_re =
            self.translator.patterns().plugins_array.clone();

        let captures = plugins_array_re.captures(content);

        let Some((literal, json)) = captures.as_ref().and_then(|captures| {
            Some((captures.get(0)?, captures.name("json")?))
        }) else {
            return Err(Error::NoPluginsArray(
                self.plugins_file_path.to_path_buf(),
            ));
        };

        let mut plugins: Vec<Value> = serde_json::from_str(json.as_str())?;

        for plugin in &mut plugins {
            self.process_plugin(plugin);
        }

        let terminator = if literal.as_str().ends_with(';') { ";" } else { "" };

        let mut output = String::with_capacity(content.len());
        output.push_str(&content[..literal.start()]);
        output.push_str(PLUGINS_ARRAY_PREFIX);
        output.push_str(&serialize_plugins(&plugins)?);
        output.push_str(terminator);
        output.push_str(&content[literal.end()..]);

        Ok(output)
    }

    fn process_plugin(&mut self, plugin: &mut Value) {
        let Some(plugin_name) = plugin.get("name").and_then(Value::as_str) else {
            return;
        };

        let Some(targets) = PLUGINS_JS_WHITELIST.get(plugin_name).copied() else {
            return;
        };

        let plugin_name = plugin_name.to_owned();

        let Some(parameters) = plugin.get_mut("parameters") else {
            return;
        };

        let string_targets: SmallVec<[&str; 8]> = targets
            .iter()
            .filter(|target| target.kind.is_string())
            .map(|target| target.name)
            .collect();

        if !string_targets.is_empty() {
            WhitelistBase::new(&mut *self.translator, string_targets.as_slice())
                .process(parameters, false);
        }

        let Value::Object(parameters) = parameters else {
            return;
        };

        for target in targets {
            let TargetKind::ObjectArray(fields) = target.kind else {
                continue;
            };

            if let Some(Value::String(encoded)) = parameters.get_mut(target.name) {
                self.process_object_array(&plugin_name, encoded, fields);
            }
        }
    }

    /// Translates `fields` of each object in a JSON-encoded array of JSON-encoded objects.
    ///
    /// Items that fail to parse are left as is.
    fn process_object_array(
        &mut self,
        plugin_name: &str,
        encoded: &mut String,
        fields: &[&str],
    ) {
        let mut items: Vec<Value> = match serde_json::from_str(encoded) {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    "{IN_PLUGIN_MSG} {plugin_name}: {COULD_NOT_PARSE_PLUGIN_ITEM_MSG} {err}"
                );
                return;
            }
        };

        for item in &mut items {
            let Value::String(encoded_item) = item else {
                continue;
            };

            let mut object: Value = match serde_json::from_str(encoded_item) {
                Ok(object) => object,
                Err(err) => {
                    warn!(
                        "{IN_PLUGIN_MSG} {plugin_name}: {COULD_NOT_PARSE_PLUGIN_ITEM_MSG} {err}"
                    );
                    continue;
                }
            };

            WhitelistBase::new(&mut *self.translator, fields)
                .process(&mut object, false);

            if let Ok(serialized) = serde_json::to_string(&object) {
                *encoded_item = serialized;
            }
        }

        if let Ok(serialized) = serde_json::to_string(&items) {
            *encoded = serialized;
        }
    }
}

/// Serializes plugins the way RPG Maker does: one compact plugin per line.
fn serialize_plugins(plugins: &[Value]) -> Result<String, Error> {
    if plugins.is_empty() {
        return Ok("[]".to_owned());
    }

    let lines = plugins
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<String>, serde_json::Error>>()?;

    Ok(format!("[\n{}\n]", lines.join(",\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_text_fields() {
        assert!(is_object_text_field("name"));
        assert!(is_object_text_field("message1"));
        assert!(is_object_text_field("nickname"));
        assert!(!is_object_text_field("note"));
        assert!(!is_object_text_field("iconIndex"));
    }

    #[test]
    fn serializes_plugins_line_by_line() {
        let plugins: Vec<Value> =
            serde_json::from_str(r#"[{"name":"A","status":true},{"name":"B"}]"#)
                .unwrap();

        assert_eq!(
            serialize_plugins(&plugins).unwrap(),
            "[\n{\"name\":\"A\",\"status\":true},\n{\"name\":\"B\"}\n]"
        );
        assert_eq!(serialize_plugins(&[]).unwrap(), "[]");
    }
}
