use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use engine::{AudioCategory, CardState, FlipOutcome, KeyValueStore, MenuEvent};
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::flow::GameFlow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Command {
    Play,
    Flip { row: u32, column: u32 },
    Close,
    Next,
    Volume { category: AudioCategory, value: f32 },
    Sound(bool),
    Status,
    Help,
    Quit,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let mut flow = app.flow;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let result = run_session(&mut flow, stdin.lock(), &mut stdout);
    flow.shutdown();
    if let Err(err) = result {
        error!(error = %err, "session_failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Drives `flow` from line commands until `quit` or end of input.
pub(crate) fn run_session<S, R, W>(flow: &mut GameFlow<S>, input: R, out: &mut W) -> io::Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    if let Err(err) = flow.start() {
        writeln!(out, "error: {err}")?;
    }
    writeln!(out, "memory pairs - type 'help' for commands")?;
    report(flow, out)?;

    for line in input.lines() {
        let line = line?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(message) = apply(flow, command, out) {
            writeln!(out, "error: {message}")?;
        }
        report(flow, out)?;
    }

    info!(
        level_number = flow.context().levels.current_level(),
        "session_ended"
    );
    Ok(())
}

fn apply<S: KeyValueStore, W: Write>(
    flow: &mut GameFlow<S>,
    command: Command,
    out: &mut W,
) -> Result<(), String> {
    match command {
        Command::Play => flow.start_level().map_err(|err| err.to_string()),
        Command::Next => flow
            .continue_to_next_level()
            .map_err(|err| err.to_string()),
        Command::Flip { row, column } => {
            let index = flow
                .session()
                .ok_or_else(|| "no board yet, type 'play'".to_string())?
                .board()
                .card_at(row, column)
                .ok_or_else(|| format!("no card at row {row}, column {column}"))?;
            let outcome = flow.flip(index).map_err(|err| err.to_string())?;
            let text = match outcome {
                FlipOutcome::Ignored => "nothing happens",
                FlipOutcome::Opened(_) => "flipped",
                FlipOutcome::Matched(..) => "match!",
                FlipOutcome::Mismatched(..) => "no match",
                FlipOutcome::Completed(..) => "level cleared! type 'next' to continue",
            };
            writeln!(out, "{text}").map_err(|err| err.to_string())
        }
        Command::Close => {
            flow.close_mismatched();
            Ok(())
        }
        Command::Volume { category, value } => {
            flow.context_mut().audio.set_volume(category, value);
            Ok(())
        }
        Command::Sound(enabled) => {
            flow.context_mut().audio.set_sound_enabled(enabled);
            Ok(())
        }
        Command::Status => {
            let audio = &flow.context().audio;
            writeln!(
                out,
                "level {} | global {:.2} fx {:.2} music {:.2}",
                flow.context().levels.current_level(),
                audio.global_volume(),
                audio.fx_volume(),
                audio.music_volume()
            )
            .map_err(|err| err.to_string())
        }
        Command::Help => writeln!(out, "{}", help_text()).map_err(|err| err.to_string()),
        Command::Quit => Ok(()),
    }
}

/// Writes pending menu transitions, sound cues and the board.
fn report<S: KeyValueStore, W: Write>(flow: &mut GameFlow<S>, out: &mut W) -> io::Result<()> {
    let context = flow.context_mut();
    for event in context.menus.drain_events() {
        match event {
            MenuEvent::Activated(menu) => writeln!(out, "[menu] {menu:?} shown")?,
            MenuEvent::Deactivated(menu) => writeln!(out, "[menu] {menu:?} hidden")?,
            MenuEvent::Added(_) | MenuEvent::Removed(_) => {}
        }
    }
    if context.audio.is_sound_enabled() {
        for cue in context.audio.drain_cues() {
            writeln!(out, "[sound] {cue:?}")?;
        }
    } else {
        context.audio.drain_cues();
    }
    for change in context.audio.drain_volume_changes() {
        writeln!(
            out,
            "[volume] {} {:.2} -> {:.2}",
            change.category.name(),
            change.previous,
            change.current
        )?;
    }

    if let Some(session) = flow.session() {
        out.write_all(render_board(session.board()).as_bytes())?;
    }
    out.flush()
}

pub(crate) fn render_board(board: &engine::Board) -> String {
    let width = board
        .cards()
        .iter()
        .map(|card| card.id().len())
        .max()
        .unwrap_or(0)
        .max(2);
    let mut text = format!("level {}\n", board.level());
    for row in 0..board.rows() {
        let cells = (0..board.columns())
            .map(|column| {
                let label = match board.card_at(row, column).and_then(|index| board.card(index)) {
                    None => "",
                    Some(card) => match card.state() {
                        CardState::Closed => "??",
                        CardState::Open => card.id(),
                        CardState::Matched => "--",
                    },
                };
                format!("[{label:^width$}]")
            })
            .collect::<Vec<_>>();
        text.push_str(&cells.join(" "));
        text.push('\n');
    }
    text
}

pub(crate) fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(None);
    };
    let args = parts.collect::<Vec<_>>();

    let command = match name {
        "play" => no_args(name, &args, Command::Play)?,
        "next" => no_args(name, &args, Command::Next)?,
        "close" => no_args(name, &args, Command::Close)?,
        "status" => no_args(name, &args, Command::Status)?,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "flip" => {
            let [row, column] = args.as_slice() else {
                return Err("flip requires <row> <column>".to_string());
            };
            Command::Flip {
                row: parse_value(row, "row")?,
                column: parse_value(column, "column")?,
            }
        }
        "volume" => {
            let [category, value] = args.as_slice() else {
                return Err("volume requires <global|fx|music> <0..1>".to_string());
            };
            Command::Volume {
                category: parse_category(category)?,
                value: parse_value(value, "volume")?,
            }
        }
        "sound" => match args.as_slice() {
            ["on"] => Command::Sound(true),
            ["off"] => Command::Sound(false),
            _ => return Err("sound requires on|off".to_string()),
        },
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

fn no_args(name: &str, args: &[&str], command: Command) -> Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(format!("{name} takes no arguments"))
    }
}

fn parse_value<T: std::str::FromStr>(raw: &str, label: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("invalid {label} value '{raw}'"))
}

fn parse_category(raw: &str) -> Result<AudioCategory, String> {
    AudioCategory::ALL
        .into_iter()
        .find(|category| category.name().eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("unknown audio category '{raw}' (expected global, fx or music)"))
}

fn help_text() -> String {
    [
        "Commands:",
        "  play                      lay out the current level",
        "  flip <row> <column>       flip the card at a cell",
        "  close                     turn a mismatched pair back over",
        "  next                      continue after clearing a level",
        "  volume <category> <0..1>  set global, fx or music volume",
        "  sound on|off              toggle all sound",
        "  status                    show level and volumes",
        "  quit",
    ]
    .join("\n")
}
