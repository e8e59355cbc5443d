//! Configuration schema
//!
//! Typed settings record with the compiled-in defaults.

use serde::Serialize;

/// Value restricted to a fixed set of names in the INI file.
pub trait Named: Copy + Sized + 'static {
    /// Candidate names in match order
    const TABLE: &'static [(&'static str, Self)];

    /// Exact, case-sensitive lookup; the first match wins
    fn from_name(name: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, v)| v)
    }
}

/// Main settings record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Settings {
    pub general: GeneralConfig,
    pub console: ConsoleConfig,
    pub audio: AudioConfig,
    pub emulation: EmulationConfig,
}

/// Player-wide settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralConfig {
    /// INI file version
    pub version: i32,

    /// Song length database path
    pub database: String,

    /// Default play length in milliseconds (0 = infinite)
    pub play_length: u32,

    /// Default record length in milliseconds
    pub record_length: u32,

    pub kernal_rom: String,
    pub basic_rom: String,
    pub chargen_rom: String,

    pub verbose_level: i32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            version: 1,
            database: String::new(),
            play_length: 0,
            record_length: (3 * 60 + 30) * 1000,
            kernal_rom: String::new(),
            basic_rom: String::new(),
            chargen_rom: String::new(),
            verbose_level: 0,
        }
    }
}

/// Console color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Color {
    #[serde(rename = "black")]
    Black,
    #[serde(rename = "red")]
    Red,
    #[serde(rename = "green")]
    Green,
    #[serde(rename = "yellow")]
    Yellow,
    #[serde(rename = "blue")]
    Blue,
    #[serde(rename = "magenta")]
    Magenta,
    #[serde(rename = "cyan")]
    Cyan,
    #[serde(rename = "white")]
    White,
    #[serde(rename = "bright black")]
    BrightBlack,
    #[serde(rename = "bright red")]
    BrightRed,
    #[serde(rename = "bright green")]
    BrightGreen,
    #[serde(rename = "bright yellow")]
    BrightYellow,
    #[serde(rename = "bright blue")]
    BrightBlue,
    #[serde(rename = "bright magenta")]
    BrightMagenta,
    #[serde(rename = "bright cyan")]
    BrightCyan,
    #[serde(rename = "bright white")]
    BrightWhite,
}

/// Color names, indexed by palette position
pub const COLOR_NAMES: [&str; 16] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright black",
    "bright red",
    "bright green",
    "bright yellow",
    "bright blue",
    "bright magenta",
    "bright cyan",
    "bright white",
];

impl Color {
    pub const ALL: [Color; 16] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
        Color::BrightBlack,
        Color::BrightRed,
        Color::BrightGreen,
        Color::BrightYellow,
        Color::BrightBlue,
        Color::BrightMagenta,
        Color::BrightCyan,
        Color::BrightWhite,
    ];

    /// Palette position, 0-15
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        COLOR_NAMES[self.index()]
    }
}

impl Named for Color {
    const TABLE: &'static [(&'static str, Self)] = &[
        (COLOR_NAMES[0], Color::Black),
        (COLOR_NAMES[1], Color::Red),
        (COLOR_NAMES[2], Color::Green),
        (COLOR_NAMES[3], Color::Yellow),
        (COLOR_NAMES[4], Color::Blue),
        (COLOR_NAMES[5], Color::Magenta),
        (COLOR_NAMES[6], Color::Cyan),
        (COLOR_NAMES[7], Color::White),
        (COLOR_NAMES[8], Color::BrightBlack),
        (COLOR_NAMES[9], Color::BrightRed),
        (COLOR_NAMES[10], Color::BrightGreen),
        (COLOR_NAMES[11], Color::BrightYellow),
        (COLOR_NAMES[12], Color::BrightBlue),
        (COLOR_NAMES[13], Color::BrightMagenta),
        (COLOR_NAMES[14], Color::BrightCyan),
        (COLOR_NAMES[15], Color::BrightWhite),
    ];
}

/// Console theme
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsoleConfig {
    /// Use terminal colors
    pub ansi: bool,

    pub top_left: String,
    pub top_right: String,
    pub bottom_left: String,
    pub bottom_right: String,
    pub vertical: String,
    pub horizontal: String,
    pub junction_left: String,
    pub junction_right: String,

    pub decorations: Color,
    pub title: Color,
    pub label_core: Color,
    pub text_core: Color,
    pub label_extra: Color,
    pub text_extra: Color,
    pub notes: Color,
    pub control_on: Color,
    pub control_off: Color,
}

impl ConsoleConfig {
    /// Replace the box-drawing border glyphs with plain ASCII
    pub fn use_ascii_borders(&mut self) {
        self.top_left = "+".to_string();
        self.top_right = "+".to_string();
        self.bottom_left = "+".to_string();
        self.bottom_right = "+".to_string();
        self.vertical = "|".to_string();
        self.horizontal = "-".to_string();
        self.junction_left = "+".to_string();
        self.junction_right = "+".to_string();
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            ansi: false,
            top_left: "┌".to_string(),
            top_right: "┐".to_string(),
            bottom_left: "└".to_string(),
            bottom_right: "┘".to_string(),
            vertical: "│".to_string(),
            horizontal: "─".to_string(),
            junction_left: "┤".to_string(),
            junction_right: "├".to_string(),
            decorations: Color::BrightWhite,
            title: Color::White,
            label_core: Color::BrightGreen,
            text_core: Color::BrightYellow,
            label_extra: Color::BrightMagenta,
            text_extra: Color::BrightCyan,
            notes: Color::BrightBlue,
            control_on: Color::BrightGreen,
            control_off: Color::BrightRed,
        }
    }
}

/// Default output sampling frequency in Hz
pub const DEFAULT_SAMPLING_FREQ: u32 = 48000;

/// Audio output settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioConfig {
    pub frequency: u32,

    /// Output channels (0 = decided by the tune)
    pub channels: u32,

    /// Bits per sample
    pub precision: u32,

    /// Buffer length in milliseconds
    pub buffer_length: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_SAMPLING_FREQ,
            channels: 0,
            precision: 16,
            buffer_length: 250,
        }
    }
}

/// C64 video standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum C64Model {
    #[serde(rename = "PAL")]
    Pal,
    #[serde(rename = "NTSC")]
    Ntsc,
    #[serde(rename = "OLD_NTSC")]
    OldNtsc,
    #[serde(rename = "DREAN")]
    Drean,
}

impl Named for C64Model {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("PAL", C64Model::Pal),
        ("NTSC", C64Model::Ntsc),
        ("OLD_NTSC", C64Model::OldNtsc),
        ("DREAN", C64Model::Drean),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CiaModel {
    #[serde(rename = "MOS6526")]
    Mos6526,
    #[serde(rename = "MOS8521")]
    Mos8521,
}

impl Named for CiaModel {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("MOS6526", CiaModel::Mos6526),
        ("MOS8521", CiaModel::Mos8521),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SidModel {
    #[serde(rename = "MOS6581")]
    Mos6581,
    #[serde(rename = "MOS8580")]
    Mos8580,
}

impl Named for SidModel {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("MOS6581", SidModel::Mos6581),
        ("MOS8580", SidModel::Mos8580),
    ];
}

/// Strength of the combined waveforms emulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombinedWaveforms {
    #[serde(rename = "AVERAGE")]
    Average,
    #[serde(rename = "WEAK")]
    Weak,
    #[serde(rename = "STRONG")]
    Strong,
}

impl Named for CombinedWaveforms {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("AVERAGE", CombinedWaveforms::Average),
        ("WEAK", CombinedWaveforms::Weak),
        ("STRONG", CombinedWaveforms::Strong),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SamplingMethod {
    #[serde(rename = "INTERPOLATE")]
    Interpolate,
    #[serde(rename = "RESAMPLE")]
    ResampleInterpolate,
}

impl Named for SamplingMethod {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("INTERPOLATE", SamplingMethod::Interpolate),
        ("RESAMPLE", SamplingMethod::ResampleInterpolate),
    ];
}

/// Emulation engine settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmulationConfig {
    pub engine: String,

    pub model_default: C64Model,
    pub model_forced: bool,
    pub digiboost: bool,
    pub cia_model: CiaModel,
    pub sid_model: SidModel,
    pub force_sid_model: bool,

    pub filter: bool,
    pub bias: f64,
    pub filter_curve_6581: f64,
    pub filter_range_6581: f64,
    pub filter_curve_8580: f64,

    pub combined_waveforms: CombinedWaveforms,

    /// Power-on delay in cycles, -1 for random
    pub power_on_delay: i32,

    pub sampling_method: SamplingMethod,
    pub fast_sampling: bool,
}

impl Default for EmulationConfig {
    fn default() -> Self {
        Self {
            engine: String::new(),
            model_default: C64Model::Pal,
            model_forced: false,
            digiboost: false,
            cia_model: CiaModel::Mos6526,
            sid_model: SidModel::Mos6581,
            force_sid_model: false,
            filter: true,
            bias: 0.5,
            filter_curve_6581: 0.5,
            filter_range_6581: 0.5,
            filter_curve_8580: 0.5,
            combined_waveforms: CombinedWaveforms::Average,
            power_on_delay: -1,
            sampling_method: SamplingMethod::ResampleInterpolate,
            fast_sampling: false,
        }
    }
}
