use std::fs;
use std::path::{Path, PathBuf};

use dlg_api::source_lines;
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan, CliError, LoadedScript};

pub(crate) const SCRIPT_EXTENSION: &str = "dlg";

pub(crate) fn resolve_source_path(raw: &str) -> Result<PathBuf, CliError> {
    let path = PathBuf::from(raw);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(CliError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("path does not exist: {}", absolute.display()),
        ));
    }
    Ok(absolute)
}

pub(crate) fn load_script_file(script: &str) -> Result<LoadedScript, CliError> {
    let path = resolve_source_path(script)?;
    if !path.is_file() {
        return Err(CliError::new(
            "CLI_SOURCE_NOT_FILE",
            format!("script is not a file: {}", path.display()),
        ));
    }
    read_script(&path, script.to_string())
}

pub(crate) fn load_scripts_dir(scripts_dir: &str) -> Result<Vec<LoadedScript>, CliError> {
    let root = resolve_source_path(scripts_dir)?;
    if !root.is_dir() {
        return Err(CliError::new(
            "CLI_SOURCE_NOT_DIR",
            format!("scripts-dir is not a directory: {}", root.display()),
        ));
    }
    read_scripts_from_dir(&root)
}

pub(crate) fn read_scripts_from_dir(scripts_dir: &Path) -> Result<Vec<LoadedScript>, CliError> {
    let mut scripts = Vec::new();

    for entry in WalkDir::new(scripts_dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(map_cli_source_scan)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(SCRIPT_EXTENSION) {
            continue;
        }

        let label = path
            .strip_prefix(scripts_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        scripts.push(read_script(path, label)?);
    }

    if scripts.is_empty() {
        return Err(CliError::new(
            "CLI_SOURCE_EMPTY",
            format!("No .{} files under {}", SCRIPT_EXTENSION, scripts_dir.display()),
        ));
    }
    log::debug!(
        "loaded {} script(s) from {}",
        scripts.len(),
        scripts_dir.display()
    );
    Ok(scripts)
}

fn read_script(path: &Path, label: String) -> Result<LoadedScript, CliError> {
    let content = fs::read_to_string(path).map_err(map_cli_source_read)?;
    Ok(LoadedScript {
        label,
        lines: source_lines(&content),
    })
}

#[cfg(test)]
mod source_loader_tests {
    use super::*;
    use crate::cli_test_support::*;

    #[test]
    fn resolve_source_path_reports_missing_paths() {
        let missing = temp_path("missing-dir");
        let error = resolve_source_path(missing.to_string_lossy().as_ref())
            .expect_err("missing path should fail");
        assert_eq!(error.code, "CLI_SOURCE_NOT_FOUND");
    }

    #[test]
    fn load_script_file_rejects_directories() {
        let root = temp_path("script-is-dir");
        fs::create_dir_all(&root).expect("root");
        let error =
            load_script_file(root.to_string_lossy().as_ref()).expect_err("directory should fail");
        assert_eq!(error.code, "CLI_SOURCE_NOT_FILE");
    }

    #[test]
    fn load_scripts_dir_rejects_plain_files() {
        let file_path = temp_path("plain-file.dlg");
        write_file(&file_path, "- A\nNPC: Hi");
        let error = load_scripts_dir(file_path.to_string_lossy().as_ref())
            .expect_err("file path should fail");
        assert_eq!(error.code, "CLI_SOURCE_NOT_DIR");
    }

    #[test]
    fn read_scripts_from_dir_filters_extension_and_sorts() {
        let root = temp_path("scripts-dir");
        write_file(&root.join("b.dlg"), "- B\nNPC: Hi");
        write_file(&root.join("nested").join("a.dlg"), "- A\nNPC: Hi");
        write_file(&root.join("notes.txt"), "ignored");

        let scripts = read_scripts_from_dir(&root).expect("scan should pass");
        let labels = scripts
            .iter()
            .map(|script| script.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["b.dlg", "nested/a.dlg"]);
        assert_eq!(scripts[0].lines, vec!["- B", "NPC: Hi"]);
    }

    #[test]
    fn read_scripts_from_dir_errors_when_no_scripts() {
        let root = temp_path("empty-scripts-dir");
        write_file(&root.join("readme.txt"), "not a script");

        let error = read_scripts_from_dir(&root).expect_err("empty source set should fail");
        assert_eq!(error.code, "CLI_SOURCE_EMPTY");
    }
}
