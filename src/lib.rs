//!Library for dictionary-based in-place translation of RPG Maker MV/MZ game data and `plugins.js`.

pub mod bases;
pub mod constants;
pub mod core;
pub mod dictionary;
mod functions;
mod processors;
pub mod types;

pub use crate::core::{TranslateOptions, Translator};
pub use dictionary::{Dictionary, LengthIndex};
pub use functions::{
    collect_data_files, is_dictionary_json, parse_dictionary,
    read_to_string_without_bom,
};
pub use processors::{DataTranslator, DataTranslatorBuilder};
pub use types::{
    Code, DataFileType, EngineVersion, Error, GameDataFile, GameLayout,
    Patterns, SessionFlags, TargetKind, TranslateTarget, TranslationMap,
};
