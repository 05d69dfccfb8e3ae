use crate::constants::{
    DATA_OBJECT_FILES, ESCAPE_PATTERN, NOTE_TAG_PATTERN, PLUGINS_ARRAY_PATTERN,
    SPEAKER_PATTERN,
};
use bitflags::bitflags;
use indexmap::{IndexMap, IndexSet};
use num_enum::FromPrimitive;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::{
    hash::BuildHasherDefault,
    io,
    path::{Path, PathBuf},
};
use strum_macros::{Display, EnumIs};
use thiserror::Error;
use xxhash_rust::xxh3::Xxh3;

pub(crate) type Xxh3Builder = BuildHasherDefault<Xxh3>;
pub(crate) type IndexSetXxh<K> = IndexSet<K, Xxh3Builder>;
pub(crate) type IndexMapXxh<K, V> = IndexMap<K, V, Xxh3Builder>;

/// Flat source → translation mapping, in the order of the dictionary file.
pub type TranslationMap = IndexMapXxh<String, String>;

/// Event command codes that carry translatable text.
///
/// 401 - Dialogue line, under 101.
///
/// 101 - Start of the dialogue. In MZ, its fifth parameter holds the speaker name.
///
/// 102 - Dialogue choices array.
///
/// 402 - One of the dialogue choices from the array.
///
/// 405 - Scrolling text line.
///
/// 108 - Comment. Often used by plugins as directives, so it's matched with a single replacement.
///
/// 356 - Plugin command with space-separated arguments (MV).
///
/// 357 - Plugin command with structured arguments (MZ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs, FromPrimitive)]
#[repr(u16)]
pub enum Code {
    Dialogue = 401,
    DialogueStart = 101,
    ChoiceArray = 102,
    Choice = 402,
    ScrollingText = 405,
    Comment = 108,
    PluginArray = 356,
    PluginObject = 357,
    #[num_enum(default)]
    Bad = 0,
}

impl Code {
    /// Parses a JSON `code` field. Anything that doesn't fit is [`Code::Bad`].
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        value
            .as_u64()
            .and_then(|code| u16::try_from(code).ok())
            .map_or(Self::Bad, Self::from_primitive)
    }

    /// Whether all string parameters of the command are text.
    #[must_use]
    pub const fn is_any_text(self) -> bool {
        matches!(
            self,
            Self::Dialogue
                | Self::ChoiceArray
                | Self::Choice
                | Self::ScrollingText
                | Self::Comment
        )
    }
}

/// Which walker a game data file is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs, Display)]
pub enum DataFileType {
    System,
    CommonEvents,
    DataObject,
    Map,
    Other,
}

impl DataFileType {
    /// Classifies a data file by its file name.
    ///
    /// `MapInfos.json` is a data object file, even though it starts with `Map`.
    #[must_use]
    pub fn from_filename(filename: &str) -> Self {
        if filename == "System.json" {
            Self::System
        } else if filename.starts_with("CommonEvents") {
            Self::CommonEvents
        } else if DATA_OBJECT_FILES.contains(filename) {
            Self::DataObject
        } else if filename.starts_with("Map") && filename.ends_with(".json") {
            Self::Map
        } else {
            Self::Other
        }
    }
}

/// Shape of a translatable plugin parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum TargetKind {
    /// Parameter holds a plain string.
    String,
    /// Parameter holds a JSON-encoded array of JSON-encoded objects; only the listed fields of the objects are translated.
    ObjectArray(&'static [&'static str]),
}

/// Names a translatable parameter of a `plugins.js` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateTarget {
    pub name: &'static str,
    pub kind: TargetKind,
}

impl TranslateTarget {
    #[must_use]
    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: TargetKind::String,
        }
    }

    #[must_use]
    pub const fn object_array(
        name: &'static str,
        sub_targets: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            kind: TargetKind::ObjectArray(sub_targets),
        }
    }
}

/// Game data file, that's going to be translated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDataFile {
    pub path: PathBuf,
    /// Set, when file was translated and written back.
    pub is_done: bool,
}

impl GameDataFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_done: false,
        }
    }

    /// File name of the file, or an empty string if path doesn't have one.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn file_type(&self) -> DataFileType {
        DataFileType::from_filename(self.file_name())
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|extension| extension == "json")
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: IO error occurred: {1}")]
    Io(PathBuf, io::Error),
    #[error("Parsing JSON data failed with: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Translation dictionary must be a flat JSON object of strings: {0}")]
    InvalidDictionary(String),
    #[error("{0}: `var $plugins = [...]` array literal couldn't be found.")]
    NoPluginsArray(PathBuf),
    #[error(
        "{0}: Couldn't determine RPG Maker version. Ensure you've passed the game directory, containing `www/data` or `data` directory."
    )]
    UnknownGameLayout(PathBuf),
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
    #[serde(into = "u8", try_from = "u8")]
    /// Indicates how the translation session treats the dictionary and the data.
    ///
    /// Check each flag to see what it does.
    pub struct SessionFlags: u8 {
        /// Add each line of multiline dictionary entries as a separate entry, if the source and the translation have
        /// the same line count.
        const SplitLines = 1 << 0;

        /// Add speaker names, wrapped into `<Name>` or `【Name】`, as separate entries, if the source and the
        /// translation have the same speaker count.
        const SplitSpeakers = 1 << 1;

        /// Remember results of substring matching as dictionary entries for the rest of the session.
        ///
        /// Disabling it makes results independent of the order files are translated in.
        const Cache = 1 << 2;

        /// Translate the speaker name of the MZ dialogue start command (code 101).
        const SpeakerNames = 1 << 3;
    }
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self::SplitLines | Self::Cache | Self::SpeakerNames
    }
}

impl TryFrom<u8> for SessionFlags {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(Self::from_bits_truncate(value))
    }
}

impl From<SessionFlags> for u8 {
    fn from(value: SessionFlags) -> Self {
        value.bits()
    }
}

/// Regular expressions the matcher and the walkers rely on.
///
/// Swap them to retarget the translator to RPG Maker-like engines with a different escape grammar.
#[derive(Debug, Clone)]
pub struct Patterns {
    /// Escape sequences, which are never translated.
    pub escape: Regex,
    /// Speaker name markers. Name is captured by the first or the second group.
    pub speaker: Regex,
    /// `<TagName:content>` note tags. Tag name is the first group, content is the second.
    pub note_tag: Regex,
    /// Array literal of `plugins.js`, captured by the `json` group.
    pub plugins_array: Regex,
}

impl Patterns {
    /// Compiles patterns from the given pattern strings.
    ///
    /// # Errors
    ///
    /// - [`Error::Pattern`] if any of the patterns is invalid.
    pub fn new(
        escape: &str,
        speaker: &str,
        note_tag: &str,
        plugins_array: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            escape: Regex::new(escape)?,
            speaker: Regex::new(speaker)?,
            note_tag: Regex::new(note_tag)?,
            plugins_array: Regex::new(plugins_array)?,
        })
    }
}

impl Default for Patterns {
    fn default() -> Self {
        // SAFETY: Built-in patterns are valid.
        unsafe {
            Self::new(
                ESCAPE_PATTERN,
                SPEAKER_PATTERN,
                NOTE_TAG_PATTERN,
                PLUGINS_ARRAY_PATTERN,
            )
            .unwrap_unchecked()
        }
    }
}

/// RPG Maker version of the game, determined by its directory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs, Display)]
pub enum EngineVersion {
    /// Game data lives in `www/data`.
    MV,
    /// Game data lives in `data`.
    MZ,
}

/// Resolved paths of an RPG Maker MV/MZ game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    pub version: EngineVersion,
    pub root: PathBuf,
}

impl GameLayout {
    /// Detects the layout of the game.
    ///
    /// `path` may point either to the game directory or to any file inside of it, like `Game.exe`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownGameLayout`] if neither `www/data` nor `data` directory exists.
    pub fn detect(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let root = if path.is_file() {
            path.parent().unwrap_or(path)
        } else {
            path
        };

        let version = if root.join("www").join("data").is_dir() {
            EngineVersion::MV
        } else if root.join("data").is_dir() {
            EngineVersion::MZ
        } else {
            return Err(Error::UnknownGameLayout(path.to_path_buf()));
        };

        Ok(Self {
            version,
            root: root.to_path_buf(),
        })
    }

    /// `www` directory for MV, game root for MZ.
    #[must_use]
    pub fn content_dir(&self) -> PathBuf {
        match self.version {
            EngineVersion::MV => self.root.join("www"),
            EngineVersion::MZ => self.root.clone(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.content_dir().join("data")
    }

    #[must_use]
    pub fn plugins_path(&self) -> PathBuf {
        self.content_dir().join("js").join("plugins.js")
    }
}
