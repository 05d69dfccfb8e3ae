use crate::{
    bases::{EventBase, ObjectBase, PluginBase, SystemBase},
    constants::{localization::*, DEFAULT_MIN_LINE_LENGTH},
    core::Translator,
    functions::{collect_data_files, parse_dictionary, read_to_string_without_bom},
    types::{
        DataFileType, Error, GameDataFile, GameLayout, Patterns, SessionFlags,
        TranslationMap,
    },
};
use log::{info, warn};
use serde_json::Value;
use std::{fs::write, path::Path};

/// A struct used for translating RPG Maker MV/MZ game data in place, using a translation dictionary.
///
/// # Fields
/// - `translator`: [`Translator`] session, that owns the dictionary. Results of substring matching may be cached into
///   it, so translating the same files in a different order may give different results, unless
///   [`SessionFlags::Cache`] is disabled.
///
/// # Example
///
/// ```no_run
/// use rpgm_translator_lib::{DataTranslator, collect_data_files};
///
/// let mut data_translator = DataTranslator::from_file("C:/Game/translation.json").unwrap();
/// let mut files = collect_data_files("C:/Game/www/data").unwrap();
/// data_translator.translate_all(&mut files).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DataTranslator {
    translator: Translator,
}

impl DataTranslator {
    /// Creates a new [`DataTranslator`] with default session flags.
    ///
    /// # Example
    ///
    /// ```
    /// use rpgm_translator_lib::{DataTranslator, TranslationMap};
    ///
    /// let mut map = TranslationMap::default();
    /// map.insert("ポーション".into(), "Potion".into());
    ///
    /// let data_translator = DataTranslator::new(map);
    /// ```
    #[must_use]
    pub fn new(entries: TranslationMap) -> Self {
        Self {
            translator: Translator::new(entries),
        }
    }

    /// Creates a new [`DataTranslator`] from a dictionary file, with default session flags.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if file can't be read.
    /// - [`Error::JsonParse`] if file isn't valid JSON.
    /// - [`Error::InvalidDictionary`] if file isn't a flat JSON object of strings.
    pub fn from_file<P: AsRef<Path>>(dictionary_path: P) -> Result<Self, Error> {
        DataTranslatorBuilder::new().build_from_file(dictionary_path)
    }

    #[must_use]
    pub fn from_translator(translator: Translator) -> Self {
        Self { translator }
    }

    #[must_use]
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn translator_mut(&mut self) -> &mut Translator {
        &mut self.translator
    }

    /// Translates a parsed data file in place, using the walker matching `filename`.
    ///
    /// # Parameters
    ///
    /// - `filename` - File name, like `Map001.json`, which determines the walker. See [`DataFileType`].
    /// - `value` - Parsed file contents.
    pub fn translate_value(&mut self, filename: &str, value: &mut Value) {
        let translator = &mut self.translator;

        match DataFileType::from_filename(filename) {
            DataFileType::System => SystemBase::new(translator).process(value),
            DataFileType::DataObject => ObjectBase::new(translator).process(value),
            DataFileType::CommonEvents
            | DataFileType::Map
            | DataFileType::Other => EventBase::new(translator).process(value),
        }
    }

    /// Translates contents of a data file, and returns them serialized compactly.
    ///
    /// # Errors
    ///
    /// - [`Error::JsonParse`] if `content` isn't valid JSON.
    pub fn translate_json(
        &mut self,
        filename: &str,
        content: &str,
    ) -> Result<String, Error> {
        let mut value: Value = serde_json::from_str(content)?;
        self.translate_value(filename, &mut value);
        Ok(serde_json::to_string(&value)?)
    }

    /// Translates `files` in place, one by one, and marks each written file as done.
    ///
    /// File, that fails to parse as JSON, is left untouched, and doesn't stop the batch.
    ///
    /// # Returns
    ///
    /// - `true` if every JSON file was translated and written.
    /// - `false` if any file failed to parse.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if a file can't be read or written. Batch is aborted.
    pub fn translate_all(
        &mut self,
        files: &mut [GameDataFile],
    ) -> Result<bool, Error> {
        let mut success = true;

        for file in files.iter_mut() {
            let filename = file.file_name().to_owned();

            if !file.is_json() {
                warn!("{filename}: {SKIPPED_FILE_MSG}");
                continue;
            }

            let content = read_to_string_without_bom(&file.path)
                .map_err(|e| Error::Io(file.path.clone(), e))?;

            let translated = match self.translate_json(&filename, &content) {
                Ok(translated) => translated,
                Err(err) => {
                    warn!(
                        "{IN_FILE_MSG} {filename}: {COULD_NOT_PARSE_FILE_MSG} {err}"
                    );
                    success = false;
                    continue;
                }
            };

            write(&file.path, translated)
                .map_err(|e| Error::Io(file.path.clone(), e))?;

            file.is_done = true;
            info!("{filename}: {TRANSLATED_FILE_MSG}");
        }

        Ok(success)
    }

    /// Patches `plugins.js` in place.
    ///
    /// # Returns
    ///
    /// - `true` if the file was patched and written.
    /// - `false` if it has no `$plugins` array literal, or the literal isn't valid JSON. File is left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file can't be read or written.
    pub fn translate_plugins<P: AsRef<Path>>(
        &mut self,
        plugins_file_path: P,
    ) -> Result<bool, Error> {
        let plugins_file_path = plugins_file_path.as_ref();

        let content = read_to_string_without_bom(plugins_file_path)
            .map_err(|e| Error::Io(plugins_file_path.to_path_buf(), e))?;

        let mut plugin_base =
            PluginBase::new(&mut self.translator, plugins_file_path);

        let patched = match plugin_base.process(&content) {
            Ok(patched) => patched,
            Err(Error::NoPluginsArray(_)) => {
                warn!(
                    "{IN_FILE_MSG} {}: {NO_PLUGINS_ARRAY_MSG}",
                    plugins_file_path.display()
                );
                return Ok(false);
            }
            Err(Error::JsonParse(err)) => {
                warn!(
                    "{IN_FILE_MSG} {}: {COULD_NOT_PARSE_PLUGINS_MSG} {err}",
                    plugins_file_path.display()
                );
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        write(plugins_file_path, patched)
            .map_err(|e| Error::Io(plugins_file_path.to_path_buf(), e))?;

        info!("{}: {PATCHED_PLUGINS_MSG}", plugins_file_path.display());
        Ok(true)
    }

    /// Translates the whole game: every JSON file of its data directory, and then `js/plugins.js`, if it exists.
    ///
    /// # Parameters
    ///
    /// - `game_path` - Game directory, or any file inside of it. See [`GameLayout::detect`].
    ///
    /// # Returns
    ///
    /// - `true` if both data files and plugins were translated without failures.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownGameLayout`] if `game_path` isn't an RPG Maker MV/MZ game.
    /// - [`Error::Io`] on I/O error.
    pub fn translate_game<P: AsRef<Path>>(
        &mut self,
        game_path: P,
    ) -> Result<bool, Error> {
        let layout = GameLayout::detect(game_path)?;
        info!("Detected RPG Maker {} game.", layout.version);

        let mut files = collect_data_files(layout.data_dir())?;
        let data_success = self.translate_all(&mut files)?;

        let plugins_path = layout.plugins_path();
        let plugins_success = if plugins_path.is_file() {
            self.translate_plugins(&plugins_path)?
        } else {
            true
        };

        Ok(data_success && plugins_success)
    }
}

/// A builder struct for [`DataTranslator`].
///
/// # Fields
/// - `flags`: Indicates, how the dictionary is enriched and how the session behaves. Use [`DataTranslatorBuilder::with_flags`]. For more info, see [`SessionFlags`].
/// - `min_line_length`: Lines of multiline entries must be longer than this to become separate entries. Use [`DataTranslatorBuilder::min_line_length`].
/// - `patterns`: Regular expressions the matcher relies on. Use [`DataTranslatorBuilder::patterns`].
///
/// # Example
///
/// ```
/// use rpgm_translator_lib::{DataTranslatorBuilder, SessionFlags, TranslationMap};
///
/// let data_translator = DataTranslatorBuilder::new()
///     .with_flags(SessionFlags::SplitLines | SessionFlags::SplitSpeakers)
///     .build(TranslationMap::default());
/// ```
#[derive(Debug, Clone)]
pub struct DataTranslatorBuilder {
    flags: SessionFlags,
    min_line_length: usize,
    patterns: Patterns,
}

impl Default for DataTranslatorBuilder {
    fn default() -> Self {
        Self {
            flags: SessionFlags::default(),
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
            patterns: Patterns::default(),
        }
    }
}

impl DataTranslatorBuilder {
    /// Creates a new [`DataTranslatorBuilder`] instance with default values.
    ///
    /// By default, [`SessionFlags::default`] flags are set, and minimum line length is 3.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flags of the session.
    ///
    /// # Parameters
    ///
    /// - `flags` - [`SessionFlags`] bitflags.
    ///
    /// # Example
    ///
    /// ```
    /// use rpgm_translator_lib::{DataTranslatorBuilder, SessionFlags};
    ///
    /// let builder = DataTranslatorBuilder::new().with_flags(SessionFlags::SplitLines);
    /// ```
    #[must_use]
    pub fn with_flags(mut self, flags: SessionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the length, that lines of multiline entries must exceed to become separate entries.
    ///
    /// Has effect only with [`SessionFlags::SplitLines`].
    #[must_use]
    pub fn min_line_length(mut self, length: usize) -> Self {
        self.min_line_length = length;
        self
    }

    /// Sets the patterns, used for escape sequences, speaker names, note tags and the plugins literal.
    ///
    /// # Example
    ///
    /// ```
    /// use rpgm_translator_lib::{DataTranslatorBuilder, Patterns};
    ///
    /// let patterns = Patterns::new(
    ///     r"\\[A-Z]\[\d+\]",
    ///     r"<([^<>]+)>|【([^【】]+)】",
    ///     r"<([^<>:]+):([^<>]*)>",
    ///     r"(?s)var \$plugins\s*=\s*(?P<json>\[.*\]);?",
    /// )
    /// .unwrap();
    ///
    /// let builder = DataTranslatorBuilder::new().patterns(patterns);
    /// ```
    #[must_use]
    pub fn patterns(mut self, patterns: Patterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Builds and returns the [`DataTranslator`] for the dictionary `entries`.
    #[must_use]
    pub fn build(self, entries: TranslationMap) -> DataTranslator {
        DataTranslator::from_translator(Translator::with_config(
            entries,
            self.flags,
            self.min_line_length,
            self.patterns,
        ))
    }

    /// Reads the dictionary file, and builds the [`DataTranslator`] for it.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if file can't be read.
    /// - [`Error::JsonParse`] if file isn't valid JSON.
    /// - [`Error::InvalidDictionary`] if file isn't a flat JSON object of strings.
    pub fn build_from_file<P: AsRef<Path>>(
        self,
        dictionary_path: P,
    ) -> Result<DataTranslator, Error> {
        let dictionary_path = dictionary_path.as_ref();

        let content = read_to_string_without_bom(dictionary_path)
            .map_err(|e| Error::Io(dictionary_path.to_path_buf(), e))?;

        Ok(self.build(parse_dictionary(&content)?))
    }
}
