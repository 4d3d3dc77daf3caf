//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

/// Render nested-bracket syntax trees as collapsible SVG diagrams
#[derive(Parser, Debug)]
#[command(name = "syntree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory searched for .syntree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a tree literal to SVG or HTML
    Draw(DrawArgs),

    /// Print the tree with each internal node's summary
    Tree {
        /// JSON tree literal file, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Print the computed layout of every node
    Layout {
        /// JSON tree literal file, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// Horizontal gap between sibling subtrees
        #[arg(long)]
        spacing: Option<f64>,

        /// Vertical distance between levels
        #[arg(long)]
        vertical_gap: Option<f64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Output format of `draw`
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Svg,
    Html,
}

#[derive(Args, Debug)]
pub struct DrawArgs {
    /// JSON tree literal file, `-` for stdin
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Mount point id (default from settings)
    #[arg(long)]
    pub container: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Svg)]
    pub format: Format,

    /// Horizontal gap between sibling subtrees
    #[arg(long)]
    pub spacing: Option<f64>,

    /// Vertical distance between levels
    #[arg(long)]
    pub vertical_gap: Option<f64>,

    /// Duration of each fade phase in ms
    #[arg(long)]
    pub animation_duration: Option<u64>,

    #[arg(long)]
    pub width: Option<f64>,

    #[arg(long)]
    pub height: Option<f64>,

    /// Size the drawing to the laid-out tree
    #[arg(long)]
    pub fit: bool,

    /// Draw without an animator (toggles apply instantly)
    #[arg(long)]
    pub no_animation: bool,

    /// Reject literals nested deeper than this many levels
    #[arg(long, value_name = "LEVELS")]
    pub max_depth: Option<usize>,

    /// Collapse every node with this label before writing (repeatable)
    #[arg(long, value_name = "LABEL")]
    pub collapse: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration as TOML
    Show,
    /// Show config file locations
    Path,
}
