//! Clap derive structures for the `lumen` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lumen -- drive a Hue lighting control panel from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "lumen",
    version,
    about = "Control Hue lighting scenes and screen mirroring from the command line",
    long_about = "Talks to a lumen bridge facade: apply lighting configurations,\n\
        inspect light and bridge status, assign lights to screen positions\n\
        and drive the screen mirroring loop.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Bridge profile to use
    #[arg(long, short = 'p', env = "LUMEN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Bridge facade URL (overrides profile)
    #[arg(long, short = 'b', env = "LUMEN_BRIDGE", global = true)]
    pub bridge: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LUMEN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LUMEN_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "LUMEN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and apply lighting configurations
    #[command(alias = "cfg", alias = "c")]
    Configs(ConfigsArgs),

    /// Show light status
    #[command(alias = "l")]
    Lights(LightsArgs),

    /// Show the facade's connection to the Hue bridge
    Bridge(BridgeArgs),

    /// Assign lights to screen positions
    #[command(alias = "pos")]
    Positions(PositionsArgs),

    /// Control screen mirroring
    #[command(alias = "m")]
    Mirror(MirrorArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIGURATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigsArgs {
    #[command(subcommand)]
    pub command: ConfigsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigsCommand {
    /// List available configurations
    #[command(alias = "ls")]
    List,

    /// Apply a configuration by name
    Apply {
        /// Configuration name (exact, as listed)
        name: String,

        /// Transition time in seconds (empty or omitted means 0)
        #[arg(long, short = 't')]
        transition: Option<String>,

        /// Keep the configuration for this many minutes, then revert
        #[arg(long, short = 'd')]
        duration: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIGHTS / BRIDGE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// Show every light sorted by name
    Status {
        /// Keep refreshing at the profile's poll interval until Ctrl-C
        #[arg(long, short = 'w')]
        watch: bool,
    },
}

#[derive(Debug, Args)]
pub struct BridgeArgs {
    #[command(subcommand)]
    pub command: BridgeCommand,
}

#[derive(Debug, Subcommand)]
pub enum BridgeCommand {
    /// Show whether the facade reaches the Hue bridge
    Status,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POSITIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PositionsArgs {
    #[command(subcommand)]
    pub command: PositionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PositionsCommand {
    /// List lights with their assigned position
    #[command(alias = "ls")]
    List,

    /// Count enabled lights per screen slot
    Slots,

    /// Assign a light to a position (e.g. left, top-right, ambient)
    Set {
        /// Light name
        light: String,
        /// Position id
        position: String,
    },

    /// Include a light in mirroring
    Enable {
        /// Light name
        light: String,
    },

    /// Exclude a light from mirroring
    Disable {
        /// Light name
        light: String,
    },

    /// List the enabled lights at one position
    Show {
        /// Position id
        position: String,
    },

    /// Restore the server's default mapping
    Reset,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MIRROR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MirrorArgs {
    #[command(subcommand)]
    pub command: MirrorCommand,
}

#[derive(Debug, Subcommand)]
pub enum MirrorCommand {
    /// Show whether mirroring runs and the last sampled colors
    Status,

    /// Start mirroring
    Start {
        /// Frames per second
        #[arg(long, default_value = "25", value_parser = clap::value_parser!(u32).range(1..=60))]
        fps: u32,

        /// Brightness (0-254)
        #[arg(long, default_value = "200", value_parser = clap::value_parser!(u32).range(0..=254))]
        brightness: u32,
    },

    /// Stop mirroring
    Stop,

    /// Change settings of the running loop (unset flags stay unchanged)
    Settings(MirrorSettingsArgs),

    /// Stream live frames until Ctrl-C or the socket gives up
    Watch,
}

#[derive(Debug, Args)]
pub struct MirrorSettingsArgs {
    /// Frames per second
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub fps: Option<u32>,

    /// Brightness (0-254)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=254))]
    pub brightness: Option<u32>,

    /// Saturation multiplier (0.5-2.0)
    #[arg(long)]
    pub saturation_boost: Option<f64>,

    /// Color smoothing between frames (0-1)
    #[arg(long)]
    pub smoothing_factor: Option<f64>,

    /// Bridge transition time in seconds
    #[arg(long)]
    pub transition_time: Option<f64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Persist the TUI color theme
    SetTheme {
        /// light or dark
        theme: ThemeArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
