//! Screen presentation: clearing the terminal and drawing a model's logo.
//!
//! Logos come from an optional JSON file mapping a key (`"llama"`,
//! `"mistral"`, ...) to the logo's lines. Each line is tinted along a
//! two-color gradient chosen by the same key. None of this affects how the
//! shell behaves; a missing file just means no logo.

use anyhow::{Context, Result};
use crossterm::style::{Color, Stylize};
use crossterm::{cursor, terminal, Command};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

const DEFAULT_KEY: &str = "default";

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

const PALETTES: [(&str, Color, Color); 8] = [
    ("llama", rgb(0xB7, 0x21, 0xFF), rgb(0x21, 0xD4, 0xFD)),
    ("mistral", rgb(0xFF, 0x80, 0x08), rgb(0xFF, 0xC8, 0x37)),
    ("gemma", rgb(0x00, 0x7B, 0xFF), rgb(0x00, 0xC6, 0xFF)),
    ("phi3", rgb(0x6A, 0x11, 0xCB), rgb(0x25, 0x75, 0xFC)),
    ("deepseek", rgb(0x1D, 0x2B, 0x64), rgb(0xF8, 0xCD, 0xDA)),
    ("qwen", rgb(0x4E, 0x49, 0xE7), rgb(0xA8, 0x49, 0xE7)),
    ("gpt", rgb(0x74, 0xAA, 0x9C), rgb(0x2C, 0xB7, 0x7F)),
    (DEFAULT_KEY, rgb(0xFF, 0xFF, 0xFF), rgb(0xEA, 0xEA, 0xEA)),
];

/// Presentation collaborator used by the shell.
pub trait Presenter {
    fn clear_screen(&self, output: &mut dyn Write) -> Result<()>;

    /// Draws whatever identifies `model`; may draw nothing.
    fn render(&self, model: &str, output: &mut dyn Write) -> Result<()>;
}

/// Presenter that draws nothing, for non-interactive use and tests.
pub struct PlainPresenter;

impl Presenter for PlainPresenter {
    fn clear_screen(&self, _output: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn render(&self, _model: &str, _output: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}

/// Point `t` (clamped to `0.0..=1.0`) on the line from `start` to `end`.
///
/// Only RGB colors can be mixed; anything else yields `end`.
pub fn blend(start: Color, end: Color, t: f64) -> Color {
    let (
        Color::Rgb { r: r1, g: g1, b: b1 },
        Color::Rgb { r: r2, g: g2, b: b2 },
    ) = (start, end)
    else {
        return end;
    };
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
}

/// Immutable logo table loaded once at startup.
#[derive(Debug, Default)]
pub struct LogoBook {
    logos: BTreeMap<String, Vec<String>>,
}

impl LogoBook {
    pub fn new(logos: BTreeMap<String, Vec<String>>) -> Self {
        Self { logos }
    }

    /// Loads logos from `path`, degrading to an empty book with a warning.
    ///
    /// Returns the book and, when the file could not be used, a message for
    /// the user.
    pub fn load_or_empty(path: &Path) -> (Self, Option<String>) {
        match Self::load(path) {
            Ok(book) => (book, None),
            Err(e) => {
                warn!("Logos unavailable: {:#}", e);
                (
                    Self::default(),
                    Some(format!("Warning: {} not usable, skipping logos.", path.display())),
                )
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let logos: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("Loaded {} logos from {}", logos.len(), path.display());
        Ok(Self::new(logos))
    }

    pub fn is_empty(&self) -> bool {
        self.logos.is_empty()
    }

    /// Key of the logo for `model`: the longest logo key contained in the
    /// lowercased model name, or `"default"`.
    pub fn logo_key(&self, model: &str) -> &str {
        let lower = model.to_lowercase();
        self.logos
            .keys()
            .filter(|key| !key.is_empty() && lower.contains(key.as_str()))
            .max_by_key(|key| key.len())
            .map(String::as_str)
            .unwrap_or(DEFAULT_KEY)
    }

    pub fn palette(key: &str) -> (Color, Color) {
        PALETTES
            .iter()
            .find(|(name, _, _)| *name == key)
            .or_else(|| PALETTES.iter().find(|(name, _, _)| *name == DEFAULT_KEY))
            .map(|(_, start, end)| (*start, *end))
            .unwrap_or((Color::White, Color::White))
    }

    /// Logo lines for `model` paired with their gradient color.
    pub fn colored_lines(&self, model: &str) -> Vec<(Color, &str)> {
        let key = self.logo_key(model);
        let Some(lines) = self.logos.get(key) else {
            return Vec::new();
        };
        let (start, end) = Self::palette(key);
        let last = lines.len().saturating_sub(1);
        lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let t = if last == 0 { 1.0 } else { i as f64 / last as f64 };
                (blend(start, end, t), line.as_str())
            })
            .collect()
    }
}

impl Presenter for LogoBook {
    fn clear_screen(&self, output: &mut dyn Write) -> Result<()> {
        let mut ansi = String::new();
        terminal::Clear(terminal::ClearType::All).write_ansi(&mut ansi)?;
        cursor::MoveTo(0, 0).write_ansi(&mut ansi)?;
        output.write_all(ansi.as_bytes())?;
        output.flush()?;
        Ok(())
    }

    fn render(&self, model: &str, output: &mut dyn Write) -> Result<()> {
        for (color, line) in self.colored_lines(model) {
            writeln!(output, "{}", line.with(color))?;
        }
        output.flush()?;
        Ok(())
    }
}
