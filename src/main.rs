#![forbid(unsafe_code)]

use std::io::Write;
use std::process::exit;

use saphyr_json::{Budget, check_yaml_budget};
use serde_json::Value;

const USAGE: &str = "Usage: saphyr-json [--to-yaml | --budget] <file>\n\
    Converts a YAML file to JSON. With --to-yaml converts a JSON file to YAML, \
    with --budget prints the resource budget needed to parse the YAML file.";

enum Mode {
    ToJson,
    ToYaml,
    Budget,
}

fn fail(code: i32, message: &str) -> ! {
    eprintln!("{message}");
    exit(code);
}

fn convert(mode: Mode, content: &str) -> Result<(), String> {
    let stdout = std::io::stdout();
    match mode {
        Mode::ToJson => {
            let value = saphyr_json::from_str(content).map_err(|err| err.to_string())?;
            let json = serde_json::to_string_pretty(&value).map_err(|err| err.to_string())?;
            writeln!(stdout.lock(), "{json}").map_err(|err| err.to_string())
        }
        Mode::ToYaml => {
            let value: Value = serde_json::from_str(content).map_err(|err| err.to_string())?;
            saphyr_json::to_io_writer(stdout.lock(), &value).map_err(|err| err.to_string())
        }
        Mode::Budget => {
            let report =
                check_yaml_budget(content, &Budget::default()).map_err(|err| err.to_string())?;
            let value = serde_json::to_value(&report).map_err(|err| err.to_string())?;
            let yaml = saphyr_json::to_string(&value).map_err(|err| err.to_string())?;
            writeln!(stdout.lock(), "Budget report:\n{yaml}").map_err(|err| err.to_string())?;
            match report.breached {
                Some(breach) => Err(format!("budget exceeded: {breach}")),
                None => Ok(()),
            }
        }
    }
}

fn main() {
    let mut mode = Mode::ToJson;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--to-yaml" => mode = Mode::ToYaml,
            "--budget" => mode = Mode::Budget,
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            flag if flag.starts_with("--") => fail(1, &format!("Unknown option {flag}\n{USAGE}")),
            extra if path.is_some() => {
                fail(1, &format!("Unexpected extra argument {extra}\n{USAGE}"))
            }
            _ => path = Some(arg),
        }
    }
    let Some(path) = path else {
        fail(1, USAGE);
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => fail(2, &format!("Failed to read {path}: {err}")),
    };

    if let Err(err) = convert(mode, &content) {
        fail(3, &format!("{path} invalid:\n{err}"));
    }
}
