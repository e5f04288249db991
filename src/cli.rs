//! Command line parsing.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::engine::DebugFlags;

/// Directory played when `play` gets no paths.
pub const DEFAULT_MAP_DIR: &str = "maps";

pub const USAGE: &str = "\
usage: tofu-byte [play] [--debug <flags>] [<map.json|dir>...]
       tofu-byte new <path> [name]
       tofu-byte check <path>
       tofu-byte fmt <path>

debug flags (comma separated): fps, step, contact_dir";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play { maps: Vec<PathBuf> },
    New { path: PathBuf, name: Option<String> },
    Check { path: PathBuf },
    Fmt { path: PathBuf },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    /// Overrides `TOFU_BYTE_DEBUG` when present.
    pub debug: Option<DebugFlags>,
}

/// Parse arguments without the program name.
pub fn parse_args(args: &[String]) -> Result<Cli> {
    let mut debug = None;
    let mut positional = Vec::new();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--debug" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --debug"))?;
                debug = Some(DebugFlags::parse(v)?);
            }
            "-h" | "--help" => {
                return Ok(Cli {
                    command: Command::Help,
                    debug,
                })
            }
            flag if flag.starts_with("--") => {
                return Err(anyhow!("unknown option: {}", flag));
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = match positional.first().map(String::as_str) {
        Some("new") => {
            let path = required_path(&positional, "new")?;
            if positional.len() > 3 {
                return Err(anyhow!("new: too many arguments"));
            }
            Command::New {
                path,
                name: positional.get(2).cloned(),
            }
        }
        Some("check") => Command::Check {
            path: single_path(&positional, "check")?,
        },
        Some("fmt") => Command::Fmt {
            path: single_path(&positional, "fmt")?,
        },
        Some("play") => play(&positional[1..]),
        _ => play(&positional),
    };
    Ok(Cli { command, debug })
}

fn play(paths: &[String]) -> Command {
    let maps = if paths.is_empty() {
        vec![PathBuf::from(DEFAULT_MAP_DIR)]
    } else {
        paths.iter().map(PathBuf::from).collect()
    };
    Command::Play { maps }
}

fn required_path(positional: &[String], command: &str) -> Result<PathBuf> {
    positional
        .get(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{}: missing <path>", command))
}

fn single_path(positional: &[String], command: &str) -> Result<PathBuf> {
    if positional.len() > 2 {
        return Err(anyhow!("{}: expected a single <path>", command));
    }
    required_path(positional, command)
}
