use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use level_cli::{run, CommandKind, CommonOptions, DEFAULT_SEED};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut options = CommonOptions {
        root: None,
        seed: DEFAULT_SEED,
    };
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--root" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --root".to_string())?;
                options.root = Some(PathBuf::from(value));
                index += 2;
            }
            "--seed" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --seed".to_string())?;
                options.seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("invalid --seed value '{value}' (expected u64)"))?;
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let kind = match command {
        "generate" => {
            let level = command_args
                .first()
                .ok_or_else(|| "generate requires a level number".to_string())?;
            let level = parse_level(level)?;
            let mut json = false;
            for arg in &command_args[1..] {
                if arg == "--json" {
                    json = true;
                } else {
                    return Err(format!(
                        "unknown generate argument '{arg}' (expected --json)"
                    ));
                }
            }
            CommandKind::Generate { level, json }
        }
        "sweep" => match command_args {
            [] => CommandKind::Sweep { from: 1, to: None },
            [from] => CommandKind::Sweep {
                from: parse_level(from)?,
                to: None,
            },
            [from, to] => CommandKind::Sweep {
                from: parse_level(from)?,
                to: Some(parse_level(to)?),
            },
            _ => return Err("sweep takes at most <from> <to>".to_string()),
        },
        "validate" => {
            if !command_args.is_empty() {
                return Err("validate takes no arguments".to_string());
            }
            CommandKind::Validate
        }
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    run(kind, options, &mut io::stdout()).map_err(|error| error.to_string())
}

fn parse_level(raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| format!("invalid level '{raw}' (expected u32)"))
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "level_cli - inspect procedural level generation",
        "",
        "Usage:",
        "  level_cli [--root <path>] [--seed <u64>] generate <level> [--json]",
        "  level_cli [--root <path>] [--seed <u64>] sweep [<from> [<to>]]",
        "  level_cli [--root <path>] [--seed <u64>] validate",
        "",
        "Defaults:",
        "  --root  $MEMORY_PAIRS_ROOT or the directory above the executable",
        "  --seed  0",
    ]
    .join("\n")
}
