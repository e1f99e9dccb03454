use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dlg-cli")]
#[command(about = "Compile, inspect and play indentation-based dialogue scripts")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Compile scripts and list the dialogues they declare.
    Check(CheckArgs),
    /// Print the compiled graph of one script as JSON.
    Dump(DumpArgs),
    /// Play a dialogue in line mode on stdin/stdout.
    Play(PlayArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(
        long = "script",
        conflicts_with = "scripts_dir",
        required_unless_present = "scripts_dir"
    )]
    pub(crate) script: Option<String>,
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct DumpArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
}

#[derive(Debug, Args)]
pub(crate) struct PlayArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "dialogue")]
    pub(crate) dialogue: String,
    /// Overrides a variable after the script's own declarations.
    #[arg(long = "var", value_name = "NAME=LITERAL")]
    pub(crate) vars: Vec<String>,
}
