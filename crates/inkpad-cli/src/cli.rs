use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "inkpad")]
#[command(about = "Write Markdown notes and export them from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the note collection
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "add")]
    New {
        /// Note title (defaults to a timestamped title)
        #[arg(long)]
        title: Option<String>,
        /// Note content (read from piped stdin when omitted)
        content: Vec<String>,
    },
    /// List notes, most recently changed first
    List {
        /// Only show notes whose title or content contains this text
        #[arg(short, long, value_name = "QUERY")]
        search: Option<String>,
        /// Number of notes to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a note's content
    Show {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Edit an existing note
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New content (opens $VISUAL/$EDITOR when neither flag is given)
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete an existing note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Export a note as Markdown or PDF
    Export {
        /// Note ID or unique ID prefix (defaults to the most recent note)
        id: Option<String>,
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
        /// Pre-rendered image of the note's view, required for PDF
        #[arg(long, value_name = "IMAGE")]
        view: Option<PathBuf>,
        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Markdown,
    Pdf,
}

impl From<ExportFormat> for inkpad_core::ExportFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Markdown => Self::Markdown,
            ExportFormat::Pdf => Self::Pdf,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}
