use super::*;
use crate::cli_test_support::*;

use std::io::Cursor;

fn shop_engine() -> dlg_runtime::DialogueEngine {
    let script = load_script_file(&demo_script("02-shop.dlg")).expect("demo should load");
    let mut engine = create_engine_for_script(&script, &[]).expect("engine should build");
    engine.start("SHOP").expect("start should pass");
    engine
}

fn play_with_input(engine: &mut dlg_runtime::DialogueEngine, input: &str) -> (i32, String) {
    let mut reader = Cursor::new(input.as_bytes().to_vec());
    let mut writer = Vec::new();
    let code =
        run_line_player_with_io(engine, &mut reader, &mut writer).expect("player should run");
    (code, String::from_utf8(writer).expect("utf-8 output"))
}

#[test]
fn parse_errors_return_non_zero() {
    assert_ne!(run_cli_from_args(["dlg-cli", "unknown"]), 0);
    assert_ne!(run_cli_from_args(["dlg-cli", "check"]), 0);
    assert_ne!(
        run_cli_from_args(["dlg-cli", "check", "--script", "a.dlg", "--scripts-dir", "d"]),
        0
    );
}

#[test]
fn check_accepts_every_demo() {
    let code = run(Cli {
        command: Mode::Check(CheckArgs {
            script: None,
            scripts_dir: Some(demos_dir().to_string_lossy().to_string()),
        }),
    })
    .expect("check should pass");
    assert_eq!(code, 0);

    let code = run_check(CheckArgs {
        script: Some(demo_script("03-guard.dlg")),
        scripts_dir: None,
    })
    .expect("single check should pass");
    assert_eq!(code, 0);
}

#[test]
fn check_reports_the_failing_script() {
    let root = temp_path("broken-scripts");
    write_file(&root.join("good.dlg"), "- A\nNPC: Hi");
    write_file(&root.join("worse.dlg"), "- B\nNPC: Hi\n\t\tNPC: Too deep");

    let error = run_check(CheckArgs {
        script: None,
        scripts_dir: Some(root.to_string_lossy().to_string()),
    })
    .expect_err("broken script should fail");
    assert_eq!(error.code, "SCRIPT_STRUCTURE");
    assert!(error.message.starts_with("worse.dlg: line 3"));
}

#[test]
fn dump_prints_the_compiled_graph() {
    let code = run_dump(DumpArgs {
        script: demo_script("01-first-meeting.dlg"),
    })
    .expect("dump should pass");
    assert_eq!(code, 0);

    let error = run_dump(DumpArgs {
        script: temp_path("missing.dlg").to_string_lossy().to_string(),
    })
    .expect_err("missing script should fail");
    assert_eq!(error.code, "CLI_SOURCE_NOT_FOUND");
}

#[test]
fn play_rejects_unknown_dialogue_and_bad_overrides() {
    let error = run_play(PlayArgs {
        script: demo_script("02-shop.dlg"),
        dialogue: "BANK".to_string(),
        vars: Vec::new(),
    })
    .expect_err("unknown dialogue should fail");
    assert_eq!(error.code, "DIALOGUE_NOT_FOUND");

    let error = run_play(PlayArgs {
        script: demo_script("02-shop.dlg"),
        dialogue: "SHOP".to_string(),
        vars: vec!["Gold".to_string()],
    })
    .expect_err("bad override should fail");
    assert_eq!(error.code, "CLI_VAR_INVALID");
}

#[test]
fn line_player_buys_returns_and_leaves() {
    let mut engine = shop_engine();
    let (code, output) = play_with_input(&mut engine, "0\n\n2\n");
    assert_eq!(code, 0);
    assert!(output.contains("Shopkeeper [happy]: Welcome, traveler! You have 10 gold."));
    assert!(output.contains("  [0] Buy a sword."));
    assert!(output.contains("Shopkeeper: A fine blade. Anything else?"));
    assert!(output.contains("Shopkeeper [happy]: Welcome, traveler! You have 0 gold."));
    assert!(output.contains("  [0] Show off the sword."));
    assert!(output.ends_with("[END]\n"));
}

#[test]
fn line_player_reprompts_invalid_choices_and_stops_at_eof() {
    let mut engine = shop_engine();
    let (code, output) = play_with_input(&mut engine, "9\nabc\n");
    assert_eq!(code, 0);
    assert_eq!(output.matches("choose 0-2").count(), 2);
    assert!(!output.contains("[END]"));
}

#[test]
fn line_player_meta_commands() {
    let mut engine = shop_engine();
    let (code, output) = play_with_input(&mut engine, ":help\n:vars\n:restart\n:quit\n");
    assert_eq!(code, 0);
    assert!(output.contains("commands: :help :vars :restart :quit"));
    assert!(output.contains("$Gold = 10"));
    assert!(output.contains("$Greeting = Welcome, traveler!"));
    assert!(output.contains("restarted"));
    assert!(output.ends_with("bye\n"));
    assert_eq!(output.matches("You have 10 gold.").count(), 2);
}

#[test]
fn handle_line_cmd_actions() {
    let mut engine = shop_engine();
    let mut emitted = Vec::new();
    let mut emit = |line: String| emitted.push(line);

    let action = handle_line_cmd(":vars", &mut engine, &mut emit).expect("vars");
    assert_eq!(action, LineCommandAction::Continue);
    let action = handle_line_cmd(":restart", &mut engine, &mut emit).expect("restart");
    assert_eq!(action, LineCommandAction::RefreshBoundary);
    let action = handle_line_cmd("1", &mut engine, &mut emit).expect("not a command");
    assert_eq!(action, LineCommandAction::NotHandled);
    let action = handle_line_cmd(":quit", &mut engine, &mut emit).expect("quit");
    assert_eq!(action, LineCommandAction::Quit);

    assert_eq!(
        emitted,
        vec![
            "$Gold = 10".to_string(),
            "$Greeting = Welcome, traveler!".to_string(),
            "$HasSword = false".to_string(),
            "restarted".to_string(),
            "bye".to_string(),
        ]
    );
}
