//! Configuration module
//!
//! Loads the player settings from the INI file, seeding missing keys and
//! falling back to defaults for anything absent or invalid.

pub mod reader;
mod schema;

pub use reader::ValueError;
pub use schema::{
    AudioConfig, C64Model, COLOR_NAMES, CiaModel, Color, CombinedWaveforms, ConsoleConfig,
    EmulationConfig, GeneralConfig, Named, SamplingMethod, Settings, SidModel,
};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ini::{IniError, IniStore};
use crate::util::{self, PathResolver};
use reader::{read_bool, read_color, read_double, read_int, read_named, read_string, read_time};

const SECTION_GENERAL: &str = "SIDPlayfp";
const SECTION_CONSOLE: &str = "Console";
const SECTION_AUDIO: &str = "Audio";
const SECTION_EMULATION: &str = "Emulation";

/// Key name used before the capitalized `FilterRange6581`
const LEGACY_FILTER_RANGE: &str = "filterRange6581";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot get config path!")]
    NoConfigDir,

    #[error("cannot create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Ini(#[from] IniError),
}

/// Resolve the config file path, creating its directories.
pub fn config_path(paths: &dyn PathResolver) -> Result<PathBuf, ConfigError> {
    let base = paths.config_dir().ok_or(ConfigError::NoConfigDir)?;
    tracing::debug!("Config path: {:?}", base);

    let dir = base.join(util::DIR_NAME);
    for d in [&base, &dir] {
        util::ensure_dir(d).map_err(|source| ConfigError::CreateDir {
            path: d.clone(),
            source,
        })?;
    }

    let file = dir.join(util::FILE_NAME);
    tracing::debug!("Config file: {:?}", file);
    Ok(file)
}

/// Player settings backed by the INI file
#[derive(Debug, Default)]
pub struct IniConfig {
    settings: Settings,
    file_name: Option<PathBuf>,
}

impl IniConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn general(&self) -> &GeneralConfig {
        &self.settings.general
    }

    pub fn console(&self) -> &ConsoleConfig {
        &self.settings.console
    }

    pub fn audio(&self) -> &AudioConfig {
        &self.settings.audio
    }

    pub fn emulation(&self) -> &EmulationConfig {
        &self.settings.emulation
    }

    /// File the settings were last loaded from
    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    /// Reset every field to its compiled-in default
    pub fn clear(&mut self) {
        self.settings = Settings::default();
        self.file_name = None;
    }

    /// Load settings from the config file, writing back seeded keys.
    ///
    /// If the file cannot be resolved or opened the settings stay at their
    /// defaults.
    pub fn read(&mut self, paths: &dyn PathResolver) -> Result<(), ConfigError> {
        self.clear();

        let mut ini = IniStore::new();
        if !Self::try_portable(&mut ini, paths) {
            let path = config_path(paths)?;
            ini.open(&path)?;
        }

        self.read_store(&mut ini, paths);
        self.file_name = ini.path().map(Path::to_path_buf);

        ini.close()?;
        Ok(())
    }

    fn try_portable(ini: &mut IniStore, paths: &dyn PathResolver) -> bool {
        let Some(dir) = paths.portable_dir() else {
            return false;
        };
        ini.try_open(dir.join(util::FILE_NAME)).is_ok()
    }

    /// Run every section pass over an already opened store
    pub fn read_store(&mut self, ini: &mut IniStore, paths: &dyn PathResolver) {
        self.read_general(ini, paths);
        self.read_console(ini);
        self.read_audio(ini);
        self.read_emulation(ini);
    }

    fn read_general(&mut self, ini: &mut IniStore, paths: &dyn PathResolver) {
        select_section(ini, SECTION_GENERAL);
        let general = &mut self.settings.general;

        let mut version = general.version;
        read_int(ini, "Version", &mut version);
        if version > 0 {
            general.version = version;
        }

        general.database = read_string(ini, "Songlength Database");
        if general.database.is_empty() {
            if let Some(db) = default_database(paths) {
                general.database = db;
            }
        }

        read_time(ini, "Default Play Length", &mut general.play_length);
        read_time(ini, "Default Record Length", &mut general.record_length);

        general.kernal_rom = read_string(ini, "Kernal Rom");
        general.basic_rom = read_string(ini, "Basic Rom");
        general.chargen_rom = read_string(ini, "Chargen Rom");

        read_int(ini, "VerboseLevel", &mut general.verbose_level);
    }

    fn read_console(&mut self, ini: &mut IniStore) {
        select_section(ini, SECTION_CONSOLE);
        let console = &mut self.settings.console;

        let mut ascii = false;
        read_bool(ini, "ASCII", &mut ascii);
        if ascii {
            console.use_ascii_borders();
        }

        read_bool(ini, "Ansi", &mut console.ansi);

        read_color(ini, "Color Decorations", &mut console.decorations);
        read_color(ini, "Color Title", &mut console.title);
        read_color(ini, "Color Label Core", &mut console.label_core);
        read_color(ini, "Color Text Core", &mut console.text_core);
        read_color(ini, "Color Label Extra", &mut console.label_extra);
        read_color(ini, "Color Text Extra", &mut console.text_extra);
        read_color(ini, "Color Notes", &mut console.notes);
        read_color(ini, "Color Control On", &mut console.control_on);
        read_color(ini, "Color Control Off", &mut console.control_off);
    }

    fn read_audio(&mut self, ini: &mut IniStore) {
        select_section(ini, SECTION_AUDIO);
        let audio = &mut self.settings.audio;

        read_int(ini, "Frequency", &mut audio.frequency);
        read_int(ini, "Channels", &mut audio.channels);
        read_int(ini, "BitsPerSample", &mut audio.precision);
        read_int(ini, "BufferLength", &mut audio.buffer_length);
    }

    fn read_emulation(&mut self, ini: &mut IniStore) {
        select_section(ini, SECTION_EMULATION);
        let emulation = &mut self.settings.emulation;

        emulation.engine = read_string(ini, "Engine");

        read_named(ini, "C64Model", &mut emulation.model_default);
        read_bool(ini, "ForceC64Model", &mut emulation.model_forced);
        read_bool(ini, "DigiBoost", &mut emulation.digiboost);
        read_named(ini, "CiaModel", &mut emulation.cia_model);
        read_named(ini, "SidModel", &mut emulation.sid_model);
        read_bool(ini, "ForceSidModel", &mut emulation.force_sid_model);

        read_bool(ini, "UseFilter", &mut emulation.filter);

        read_double(ini, "FilterBias", &mut emulation.bias);
        read_double(ini, "FilterCurve6581", &mut emulation.filter_curve_6581);
        migrate_key(ini, LEGACY_FILTER_RANGE, "FilterRange6581");
        read_double(ini, "FilterRange6581", &mut emulation.filter_range_6581);
        read_double(ini, "FilterCurve8580", &mut emulation.filter_curve_8580);

        read_named(ini, "CombinedWaveforms", &mut emulation.combined_waveforms);

        read_int(ini, "PowerOnDelay", &mut emulation.power_on_delay);

        read_named(ini, "Sampling", &mut emulation.sampling_method);
        read_bool(ini, "ResidFastSampling", &mut emulation.fast_sampling);
    }
}

fn select_section(ini: &mut IniStore, name: &str) {
    if !ini.set_section(name) {
        if let Err(e) = ini.add_section(name) {
            tracing::warn!("{}", e);
        }
    }
}

/// Move a non-empty value from `old` to `new` in the current section
fn migrate_key(ini: &mut IniStore, old: &str, new: &str) {
    let Some(value) = ini.value(old).filter(|v| !v.is_empty()).map(str::to_string) else {
        return;
    };
    tracing::debug!("Renaming key {} to {}", old, new);
    match ini.add_value(new, &value) {
        Ok(()) => ini.remove_value(old),
        Err(e) => tracing::warn!("{}", e),
    }
}

/// Song length database shipped in the data directory, if usable
fn default_database(paths: &dyn PathResolver) -> Option<String> {
    let candidate = paths
        .data_dir()?
        .join(util::DIR_NAME)
        .join(util::SONGLENGTH_DB);

    if util::is_world_readable_file(&candidate) {
        Some(candidate.to_string_lossy().into_owned())
    } else {
        None
    }
}
