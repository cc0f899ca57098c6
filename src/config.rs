//! TOML configuration for chapter rendering.
//!
//! Every knob the two original per-chapter scripts hard-coded lives here
//! instead: page geometry under `[layout]`, the font search list under
//! `[fonts]`, scenario-file conventions under `[script]`, and one
//! `[[chapter]]` table per chapter to render. All values except the
//! chapter list itself have defaults, so a minimal config is just chapter
//! entries.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub fonts: Fonts,
    #[serde(default)]
    pub script: Script,
    #[serde(default, rename = "chapter")]
    pub chapters: Vec<Chapter>,
}

impl Config {
    /// A starter configuration with one sample chapter, written out by the
    /// `config` subcommand.
    pub fn example() -> Config {
        Config {
            chapters: vec![Chapter {
                title: "Глава 1: Пробуждение Силы".to_string(),
                base_dir: PathBuf::from("Главы/Глава 01"),
                output: PathBuf::from("Chapter_01.pdf"),
                first_page: 1,
                last_page: 8,
            }],
            ..Config::default()
        }
    }
}

/// Page geometry, in points. Defaults reproduce the original chapter
/// layout: landscape A4 with a text column on the left half and an image
/// box on the right half, separated by a gap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout {
    /// Left and right page margin
    #[serde(default = "default_margin_x")]
    pub margin_x_pt: f32,
    /// Top page margin
    #[serde(default = "default_margin_y")]
    pub margin_top_pt: f32,
    /// Bottom page margin; text stops when it would cross this line
    #[serde(default = "default_margin_y")]
    pub margin_bottom_pt: f32,
    /// Horizontal gap between the text column and the image box
    #[serde(default = "default_gap")]
    pub gap_pt: f32,
    /// Body text size
    #[serde(default = "default_font_size")]
    pub font_size_pt: f32,
    /// Title page text size
    #[serde(default = "default_title_size")]
    pub title_size_pt: f32,
    /// Page number text size
    #[serde(default = "default_footer_size")]
    pub footer_size_pt: f32,
    /// Vertical distance between consecutive text baselines
    #[serde(default = "default_line_height")]
    pub line_height_pt: f32,
    /// Baseline of the centered page number
    #[serde(default = "default_footer_baseline")]
    pub footer_baseline_pt: f32,
}

fn default_margin_x() -> f32 {
    40.0
}
fn default_margin_y() -> f32 {
    50.0
}
fn default_gap() -> f32 {
    30.0
}
fn default_font_size() -> f32 {
    12.0
}
fn default_title_size() -> f32 {
    36.0
}
fn default_footer_size() -> f32 {
    10.0
}
fn default_line_height() -> f32 {
    18.0
}
fn default_footer_baseline() -> f32 {
    20.0
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            margin_x_pt: default_margin_x(),
            margin_top_pt: default_margin_y(),
            margin_bottom_pt: default_margin_y(),
            gap_pt: default_gap(),
            font_size_pt: default_font_size(),
            title_size_pt: default_title_size(),
            footer_size_pt: default_footer_size(),
            line_height_pt: default_line_height(),
            footer_baseline_pt: default_footer_baseline(),
        }
    }
}

/// Candidate font files, tried in order. The first one that reads and
/// parses is embedded; if none does, rendering falls back to the built-in
/// Courier base font (which cannot display Cyrillic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fonts {
    #[serde(default = "default_font_candidates")]
    pub candidates: Vec<PathBuf>,
}

fn default_font_candidates() -> Vec<PathBuf> {
    [
        // macOS
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        // Linux
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

impl Default for Fonts {
    fn default() -> Self {
        Fonts {
            candidates: default_font_candidates(),
        }
    }
}

/// Conventions of the per-page directories: the scenario filename, the
/// section to typeset, and the image filenames to try.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default = "default_scenario_file")]
    pub scenario_file: String,
    #[serde(default = "default_section_header")]
    pub section_header: String,
    #[serde(default = "default_image_file")]
    pub image_file: String,
    #[serde(default = "default_image_file_fallback")]
    pub image_file_fallback: String,
}

fn default_scenario_file() -> String {
    "сценарий.md".to_string()
}
fn default_section_header() -> String {
    "## Текст (Левая страница)".to_string()
}
fn default_image_file() -> String {
    "render.png".to_string()
}
fn default_image_file_fallback() -> String {
    "рендер.png".to_string()
}

impl Default for Script {
    fn default() -> Self {
        Script {
            scenario_file: default_scenario_file(),
            section_header: default_section_header(),
            image_file: default_image_file(),
            image_file_fallback: default_image_file_fallback(),
        }
    }
}

/// One chapter to render: where its page directories live, what the title
/// page says, and which page indices to look for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub base_dir: PathBuf,
    pub output: PathBuf,
    pub first_page: u32,
    pub last_page: u32,
}

impl Chapter {
    pub fn page_indices(&self) -> RangeInclusive<u32> {
        self.first_page..=self.last_page
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_serialize_config() {
        let config = Config::example();
        toml::to_string_pretty(&config).expect("can serialize config to TOML");
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
            [[chapter]]
            title = "Глава 2: Первый бой"
            base_dir = "Главы/Глава 02"
            output = "Chapter_02.pdf"
            first_page = 1
            last_page = 7
            "#,
        )
        .expect("can parse minimal config");

        assert_eq!(config.chapters.len(), 1);
        assert_eq!(config.chapters[0].page_indices().count(), 7);
        assert_eq!(config.layout.margin_x_pt, 40.0);
        assert_eq!(config.layout.line_height_pt, 18.0);
        assert_eq!(config.script.scenario_file, "сценарий.md");
        assert_eq!(config.script.image_file_fallback, "рендер.png");
        assert!(!config.fonts.candidates.is_empty());
    }

    #[test]
    fn layout_overrides_are_honoured() {
        let config: Config = toml::from_str(
            r#"
            [layout]
            line_height_pt = 15.0
            "#,
        )
        .expect("can parse layout override");

        assert_eq!(config.layout.line_height_pt, 15.0);
        // untouched values keep their defaults
        assert_eq!(config.layout.gap_pt, 30.0);
    }
}
