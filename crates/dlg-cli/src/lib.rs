use std::ffi::OsString;

use clap::Parser;
use dlg_api::compile_dialogues;
use serde::Serialize;

mod cli_args;
mod error_map;
mod line_player;
mod models;
mod session_ops;
mod source_loader;

pub(crate) use cli_args::{CheckArgs, Cli, DumpArgs, Mode, PlayArgs};
pub(crate) use error_map::{
    emit_error, map_cli_dump, map_cli_source_path, map_cli_source_read, map_cli_source_scan,
    map_player_io, CliError,
};
pub(crate) use line_player::run_line_player;
#[cfg(test)]
pub(crate) use line_player::{handle_line_cmd, run_line_player_with_io};
pub(crate) use models::{LineCommandAction, LoadedScript};
pub(crate) use session_ops::{create_engine_for_script, host_commands, scoped};
pub(crate) use source_loader::{load_script_file, load_scripts_dir};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    init_logging();
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

/// `RUST_LOG` controls the filter; records go to stderr so stdout stays
/// parseable.
fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Mode::Check(args) => run_check(args),
        Mode::Dump(args) => run_dump(args),
        Mode::Play(args) => run_play(args),
    }
}

fn run_check(args: CheckArgs) -> Result<i32, CliError> {
    let scripts = match (args.script, args.scripts_dir) {
        (Some(script), _) => vec![load_script_file(&script)?],
        (None, Some(scripts_dir)) => load_scripts_dir(&scripts_dir)?,
        (None, None) => {
            return Err(CliError::new(
                "CLI_ARGS",
                "either --script or --scripts-dir is required",
            ))
        }
    };

    let commands = host_commands();
    let mut reports = Vec::with_capacity(scripts.len());
    for script in &scripts {
        let compiled = compile_dialogues(&script.lines, &commands)
            .map_err(|error| scoped(script, error.into()))?;
        let dialogues = compiled
            .graph
            .dialogue_ids()
            .map(str::to_string)
            .collect::<Vec<_>>();
        reports.push((script.label.as_str(), dialogues));
    }

    println!("RESULT:OK");
    for (label, dialogues) in reports {
        println!("SCRIPT:{}", label);
        println!(
            "DIALOGUES_JSON:{}",
            serde_json::to_string(&dialogues).map_err(map_cli_dump)?
        );
    }
    Ok(0)
}

#[derive(Serialize)]
struct DumpReport<'a> {
    dialogues: Vec<&'a str>,
    variables: &'a dlg_core::VariableStore,
    graph: &'a dlg_core::DialogueGraph,
}

fn run_dump(args: DumpArgs) -> Result<i32, CliError> {
    let script = load_script_file(&args.script)?;
    let compiled = compile_dialogues(&script.lines, &host_commands())
        .map_err(|error| scoped(&script, error.into()))?;
    let report = DumpReport {
        dialogues: compiled.graph.dialogue_ids().collect(),
        variables: &compiled.variables,
        graph: &compiled.graph,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).map_err(map_cli_dump)?
    );
    Ok(0)
}

fn run_play(args: PlayArgs) -> Result<i32, CliError> {
    let script = load_script_file(&args.script)?;
    let mut engine = create_engine_for_script(&script, &args.vars)?;
    engine.start(&args.dialogue)?;
    run_line_player(&mut engine)
}

#[cfg(test)]
mod cli_test_support;
#[cfg(test)]
mod tests;
