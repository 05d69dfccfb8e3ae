use crate::types::TranslateTarget;
use const_format::concatcp;
use phf::{phf_map, phf_set};

pub(crate) mod localization {
    pub const TRANSLATED_FILE_MSG: &str = "Translated file.";
    pub const PATCHED_PLUGINS_MSG: &str = "Patched plugins.";
    pub const SKIPPED_FILE_MSG: &str = "Skipped file, it isn't JSON.";

    pub const COULD_NOT_PARSE_FILE_MSG: &str =
        "Couldn't parse file as JSON. It's left untranslated.";
    pub const NO_PLUGINS_ARRAY_MSG: &str =
        "Couldn't find `var $plugins = [...]` array literal.";
    pub const COULD_NOT_PARSE_PLUGINS_MSG: &str =
        "Couldn't parse `$plugins` array literal as JSON.";
    pub const COULD_NOT_PARSE_PLUGIN_ITEM_MSG: &str =
        "Couldn't parse embedded plugin parameter item. It's left untranslated.";
    pub const IN_FILE_MSG: &str = "In file";
    pub const IN_PLUGIN_MSG: &str = "In plugin";
}

/// Minimum length a line of a multiline dictionary entry must exceed to become an entry of its own.
pub const DEFAULT_MIN_LINE_LENGTH: usize = 3;

const ESCAPE_WITH_ARGUMENT: &str = r"\\[A-Za-z0-9_]+\[[^\]\r\n]*\]";
const ESCAPE_BRACED: &str = r"\\\{[^}]*\}";
const ESCAPE_CONTROL: &str = r"\\[.|!<>^$]";

/// Engine escape grammar: `\V[1]`, `\C[2]`, `\I[45]`, `\{text}` and single-character controls like `\.` or `\!`.
pub const ESCAPE_PATTERN: &str =
    concatcp!(ESCAPE_WITH_ARGUMENT, "|", ESCAPE_BRACED, "|", ESCAPE_CONTROL);

/// Speaker names wrapped into `<Name>` or `【Name】`.
pub const SPEAKER_PATTERN: &str = r"<([^<>]+)>|【([^【】]+)】";

/// `<TagName:content>` note tags.
pub const NOTE_TAG_PATTERN: &str = r"<([^<>:]+):([^<>]*)>";

/// `var $plugins = [...];` assignment in `plugins.js`.
pub const PLUGINS_ARRAY_PATTERN: &str =
    r"(?s)var \$plugins\s*=\s*(?P<json>\[.*\]);?";

pub const PLUGINS_ARRAY_PREFIX: &str = "var $plugins =\n";

/// RPG Maker MV and MZ data files that hold database objects, rather than events.
pub static DATA_OBJECT_FILES: phf::Set<&str> = phf_set! {
    "Actors.json",
    "Armors.json",
    "Classes.json",
    "Enemies.json",
    "Items.json",
    "MapInfos.json",
    "Skills.json",
    "States.json",
    "Weapons.json",
};

/// Database object fields, which are translated as a whole. Keys starting with `message` are translated too.
pub static OBJECT_TEXT_FIELDS: phf::Set<&str> = phf_set! {
    "name",
    "description",
    "nickname",
    "profile",
};

pub const MESSAGE_FIELD_PREFIX: &str = "message";
pub const NOTE_FIELD: &str = "note";

/// Top-level `System.json` keys, which subtrees are translated.
pub static SYSTEM_WHITELIST: phf::Set<&str> = phf_set! {
    "armorTypes",
    "currencyUnit",
    "elements",
    "equipTypes",
    "gameTitle",
    "skillTypes",
    "switches",
    "variables",
    "weaponTypes",
    "terms",
};

/// Note tags, which content is translated by the object walker.
pub static NOTE_TAGS: phf::Set<&str> = phf_set! {
    "SG説明",
    "SGカテゴリ",
};

/// Plugin commands of code 356, which arguments are translated.
///
/// `{"code":356,"indent":1,"parameters":["D_TEXT こんだけ注目集めといてSじゃなかったら・・・ 12"]}`
pub static PLUGIN_ARRAY_WHITELIST: phf::Set<&str> = phf_set! {
    "D_TEXT",
};

/// Plugins invoked with code 357 and their argument fields that are translated.
///
/// `{"code":357,"indent":0,"parameters":["DTextPicture","dText","文字列ピクチャ準備",{"text":"ロレンチア\n","fontSize":"0"}]}`
pub static PLUGIN_OBJECT_WHITELIST: phf::Map<&str, &[&str]> = phf_map! {
    "DTextPicture" => &["text"],
};

/// `plugins.js` entries by plugin name, and their translatable parameters.
///
/// Plain parameters hold a string. Object array parameters hold a JSON-encoded array of JSON-encoded objects, for example
/// `baseItems: '["{\"name\":\"ステータス\",\"commonEvent\":\"21\"}"]'`, and only the listed object fields are translated.
pub static PLUGINS_JS_WHITELIST: phf::Map<&str, &[TranslateTarget]> = phf_map! {
    "TorigoyaMZ_CommonMenu" => &[TranslateTarget::object_array("baseItems", &["name"])],
    "LoadComSim" => &[TranslateTarget::string("loadtext")],
    "OriginMenuStatus" => &[TranslateTarget::string("command_name")],
    "BB_CustomSaveWindow" => &[
        TranslateTarget::string("Item1title"),
        TranslateTarget::string("Item2title"),
        TranslateTarget::string("Item3title"),
        TranslateTarget::string("Item4title"),
        TranslateTarget::string("Item5title"),
        TranslateTarget::string("Item6title"),
    ],
    "SceneGlossary" => &[TranslateTarget::object_array(
        "GlossaryInfo",
        &["CategoryHelp", "GlossaryHelp", "ConfirmHelp", "UsingHelp"],
    )],
    "YED_SkillShop" => &[
        TranslateTarget::string("Buy Command"),
        TranslateTarget::string("Gold Cost Text"),
        TranslateTarget::string("Item Cost Text"),
        TranslateTarget::string("Cancel Command"),
    ],
};
