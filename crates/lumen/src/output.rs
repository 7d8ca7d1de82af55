//! `--output` rendering for command results.
//!
//! Tables go through `tabled`, json and yaml serialize the domain types
//! directly, and plain prints one name per line for piping into scripts.

use std::io::{self, IsTerminal, Write};

use lumen_core::Rgb;
use lumen_core::view::Tone;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// `--color auto` honours `NO_COLOR` and only colors a terminal.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Two-cell truecolor block followed by the hex code.
pub fn swatch(color: Rgb, colored: bool) -> String {
    let hex = color.to_hex();
    if colored {
        format!("{} {hex}", "  ".on_truecolor(color.r, color.g, color.b))
    } else {
        hex
    }
}

/// Paint a status line by tone.
pub fn toned(text: &str, tone: Tone, colored: bool) -> String {
    if !colored {
        return text.to_owned();
    }
    match tone {
        Tone::Good => text.green().to_string(),
        Tone::Bad => text.red().to_string(),
        Tone::Pending => text.yellow().to_string(),
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────

/// Lists: `to_row` builds the table row, `id_fn` the plain-mode line.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Single records: table mode prints the `detail_fn` block.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Write to stdout unless `-q` or there is nothing to say.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Formats ──────────────────────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

/// Compact single-line JSON, for streaming one record per line.
pub fn render_json_line<T: serde::Serialize + ?Sized>(data: &T) -> String {
    render_json(data, true)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("# serialization failed: {e}"))
}

/// One YAML document with its `---` marker, for streaming records.
pub fn render_yaml_document<T: serde::Serialize + ?Sized>(data: &T) -> String {
    format!("---\n{}", render_yaml(data).trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Item {
        name: String,
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let data = vec![
            Item { name: "Lamp A".into() },
            Item { name: "Lamp B".into() },
        ];
        let out = render_list(
            &OutputFormat::Plain,
            &data,
            |i| Item {
                name: i.name.clone(),
            },
            |i| i.name.clone(),
        );
        assert_eq!(out, "Lamp A\nLamp B");
    }

    #[test]
    fn json_compact_is_single_line() {
        let out = render_json_line(&serde_json::json!({"running": true, "fps": 25}));
        assert!(!out.contains('\n'));
        assert!(out.contains("\"fps\":25"));
    }

    #[test]
    fn yaml_documents_start_with_a_marker() {
        let out = render_yaml_document(&serde_json::json!({"running": true, "fps": 25}));
        assert!(out.starts_with("---\n"));
        assert!(out.contains("fps: 25"));
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn swatch_without_color_is_plain_hex() {
        assert_eq!(swatch(Rgb::new(255, 0, 128), false), "#ff0080");
        assert!(swatch(Rgb::new(255, 0, 128), true).contains("\u{1b}["));
    }
}
