// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::palette::Theme;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  heartfall --theme pink --fps 60 --spawn-ms 250 --max-items 50 --pool 100 --mix 73,86 --damping 0.8 --margin 200 --color-bg black";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_usage(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 32);
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("  heartfall") {
            out.push_str("  \x1b[1;35mheartfall\x1b[0m");
            out.push_str(rest);
        } else if line.ends_with(':') && line == line.to_ascii_uppercase() {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

/// Variant split as two cumulative percentages: `TEXT,TEXT+HEART`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mix {
    pub text: f32,
    pub heart: f32,
}

impl FromStr for Mix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: TEXT_PCT,HEART_PCT".to_string())?;
        let text: f32 = a
            .trim()
            .parse()
            .map_err(|_| "invalid text percentage".to_string())?;
        let heart: f32 = b
            .trim()
            .parse()
            .map_err(|_| "invalid heart percentage".to_string())?;
        if !(0.0..=100.0).contains(&text) || !(0.0..=100.0).contains(&heart) || text > heart {
            return Err("percentages must be within 0..100 and TEXT <= HEART".to_string());
        }
        Ok(Self {
            text: text / 100.0,
            heart: heart / 100.0,
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "heartfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'p',
        long = "project",
        value_name = "FILE",
        help_heading = "CONTENT",
        help = "Project file (TOML: title, theme, texts, image_urls, music_url)"
    )]
    pub project: Option<PathBuf>,

    #[arg(
        short = 'm',
        long = "message",
        value_name = "TEXT",
        help_heading = "CONTENT",
        help = "Falling message (repeatable; replaces the project's texts)"
    )]
    pub messages: Vec<String>,

    #[arg(
        short = 'I',
        long = "image",
        value_name = "REF",
        help_heading = "CONTENT",
        help = "Falling image reference (repeatable; replaces the project's images)"
    )]
    pub images: Vec<String>,

    #[arg(
        long = "title",
        help_heading = "CONTENT",
        help = "Header title (overrides the project's title)"
    )]
    pub title: Option<String>,

    #[arg(
        long = "audio",
        value_name = "REF",
        help_heading = "CONTENT",
        help = "Background music reference shown in the header"
    )]
    pub audio: Option<String>,

    #[arg(
        long = "drop-missing-images",
        help_heading = "CONTENT",
        help = "Remove falling images whose local file does not exist"
    )]
    pub drop_missing_images: bool,

    #[arg(
        short = 't',
        long = "theme",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-themes); defaults to the project's theme or pink"
    )]
    pub theme: Option<String>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "emoji",
        help_heading = "APPEARANCE",
        help = "Draw hearts as emoji instead of narrow terminal glyphs"
    )]
    pub emoji: bool,

    #[arg(
        long = "no-sparkles",
        help_heading = "APPEARANCE",
        help = "Disable background sparkles and decorative hearts"
    )]
    pub no_sparkles: bool,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "ANIMATION",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "spawn-ms",
        default_value_t = 250,
        help_heading = "ANIMATION",
        help = "Spawn interval in ms (min 10 max 10000)"
    )]
    pub spawn_ms: u32,

    #[arg(
        short = 'n',
        long = "max-items",
        default_value_t = 50,
        help_heading = "ANIMATION",
        help = "Maximum items falling at once (min 1 max 500)"
    )]
    pub max_items: usize,

    #[arg(
        long = "pool",
        default_value_t = 100,
        help_heading = "ANIMATION",
        help = "Records kept ready for reuse (min 1 max 10000)"
    )]
    pub pool: usize,

    #[arg(
        long = "mix",
        default_value = "73,86",
        help_heading = "ANIMATION",
        help = "Variant split: TEXT_PCT,TEXT+HEART_PCT (rest are images)"
    )]
    pub mix: Mix,

    #[arg(
        long = "damping",
        default_value_t = 0.8,
        help_heading = "ANIMATION",
        help = "Motion smoothing (min 0.05 max 1)"
    )]
    pub damping: f32,

    #[arg(
        long = "margin",
        default_value_t = 200.0,
        help_heading = "ANIMATION",
        help = "Distance below the screen before an item is retired (min 0 max 2000)"
    )]
    pub margin: f32,

    #[arg(
        long = "seed",
        help_heading = "ANIMATION",
        help = "Seed the random source for a reproducible show"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "perf-stats",
        help_heading = "GENERAL",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "log-file",
        value_name = "FILE",
        help_heading = "GENERAL",
        help = "Write debug logs to FILE (filter with RUST_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-themes",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_themes: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_themes() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE THEMES:\x1b[0m");
    } else {
        println!("AVAILABLE THEMES:");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    for theme in Theme::ALL {
        let about = match theme {
            Theme::Pink => "Hot pink glow (aliases: love, default)",
            Theme::Rose => "Deep red roses (alias: red)",
            Theme::Lavender => "Soft violet (alias: purple)",
            Theme::Gold => "Warm candlelight (alias: yellow)",
            Theme::Ocean => "Cool blue (alias: blue)",
        };
        println!("{:<12} {}", theme.name(), about);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn repeatable_content_flags_collect() {
        let args = Args::try_parse_from([
            "heartfall",
            "-m",
            "hello",
            "--message",
            "world",
            "-I",
            "a.png",
            "--mix",
            "50,75",
        ])
        .unwrap();
        assert_eq!(args.messages, vec!["hello", "world"]);
        assert_eq!(args.images, vec!["a.png"]);
        assert_eq!(
            args.mix,
            Mix {
                text: 0.5,
                heart: 0.75
            }
        );
        assert_eq!(args.max_items, 50);
        assert_eq!(args.spawn_ms, 250);
    }

    #[test]
    fn mix_rejects_inverted_split() {
        assert!("90,40".parse::<Mix>().is_err());
        assert!("73".parse::<Mix>().is_err());
        assert!("73,186".parse::<Mix>().is_err());
    }
}
