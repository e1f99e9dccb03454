use std::io::{self, BufRead, Write};

use dlg_core::{ChoiceItem, DialogueOutput, LineView, DEFAULT_EXPRESSION};
use dlg_runtime::DialogueEngine;

use crate::{map_player_io, CliError, LineCommandAction};

const HELP_TEXT: &str = "commands: :help :vars :restart :quit";

pub(crate) fn run_line_player(engine: &mut DialogueEngine) -> Result<i32, CliError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_line_player_with_io(engine, &mut reader, &mut writer)
}

/// Plays the started session until it ends, the reader is exhausted or the
/// player quits. Plain lines wait for Enter; choices wait for an index.
pub(crate) fn run_line_player_with_io(
    engine: &mut DialogueEngine,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, CliError> {
    writeln!(writer, "Dialogue player").map_err(map_player_io)?;
    writeln!(writer, "{}", HELP_TEXT).map_err(map_player_io)?;

    loop {
        match engine.next_output()? {
            DialogueOutput::Line(view) => {
                writeln!(writer).map_err(map_player_io)?;
                writeln!(writer, "{}", format_line(&view)).map_err(map_player_io)?;
                loop {
                    let Some(raw) = prompt_input_from("... ", reader, writer)? else {
                        return Ok(0);
                    };
                    match dispatch_line_cmd(raw.trim(), engine, writer)? {
                        LineCommandAction::Continue => continue,
                        LineCommandAction::Quit => return Ok(0),
                        LineCommandAction::RefreshBoundary | LineCommandAction::NotHandled => {
                            break
                        }
                    }
                }
            }
            DialogueOutput::Choices { line, items } => {
                writeln!(writer).map_err(map_player_io)?;
                writeln!(writer, "{}", format_line(&line)).map_err(map_player_io)?;
                for item in &items {
                    writeln!(writer, "{}", format_choice(item)).map_err(map_player_io)?;
                }
                loop {
                    let Some(raw) = prompt_input_from("> ", reader, writer)? else {
                        return Ok(0);
                    };
                    let raw = raw.trim();
                    match dispatch_line_cmd(raw, engine, writer)? {
                        LineCommandAction::Continue => continue,
                        LineCommandAction::RefreshBoundary => break,
                        LineCommandAction::Quit => return Ok(0),
                        LineCommandAction::NotHandled => {}
                    }
                    match raw.parse::<usize>() {
                        Ok(choice) if choice < items.len() => {
                            engine.choose(choice)?;
                            break;
                        }
                        _ => writeln!(writer, "choose 0-{}", items.len() - 1)
                            .map_err(map_player_io)?,
                    }
                }
            }
            DialogueOutput::End => {
                writeln!(writer).map_err(map_player_io)?;
                writeln!(writer, "[END]").map_err(map_player_io)?;
                return Ok(0);
            }
        }
    }
}

pub(crate) fn handle_line_cmd(
    raw: &str,
    engine: &mut DialogueEngine,
    emit: &mut dyn FnMut(String),
) -> Result<LineCommandAction, CliError> {
    match raw {
        ":help" => {
            emit(HELP_TEXT.to_string());
            Ok(LineCommandAction::Continue)
        }
        ":vars" => {
            if engine.variables().is_empty() {
                emit("(no variables)".to_string());
            }
            for (name, value) in engine.variables().iter() {
                emit(format!("${} = {}", name, value));
            }
            Ok(LineCommandAction::Continue)
        }
        ":restart" => {
            engine.restart()?;
            emit("restarted".to_string());
            Ok(LineCommandAction::RefreshBoundary)
        }
        ":quit" => {
            emit("bye".to_string());
            Ok(LineCommandAction::Quit)
        }
        _ => Ok(LineCommandAction::NotHandled),
    }
}

fn dispatch_line_cmd(
    raw: &str,
    engine: &mut DialogueEngine,
    writer: &mut dyn Write,
) -> Result<LineCommandAction, CliError> {
    let mut emitted = Vec::new();
    let action = handle_line_cmd(raw, engine, &mut |line| emitted.push(line))?;
    for line in emitted {
        writeln!(writer, "{}", line).map_err(map_player_io)?;
    }
    Ok(action)
}

pub(crate) fn format_line(view: &LineView) -> String {
    if view.expression == DEFAULT_EXPRESSION {
        format!("{}: {}", view.speaker, view.text)
    } else {
        format!("{} [{}]: {}", view.speaker, view.expression, view.text)
    }
}

fn format_choice(item: &ChoiceItem) -> String {
    let seen = if item.was_selected { " (seen)" } else { "" };
    format!("  [{}] {}{}", item.index, item.text, seen)
}

/// Reads one line after printing `prefix`; `None` once the reader is
/// exhausted.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, CliError> {
    write!(writer, "{}", prefix).map_err(map_player_io)?;
    writer.flush().map_err(map_player_io)?;
    let mut input = String::new();
    if reader.read_line(&mut input).map_err(map_player_io)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
