use std::error::Error;
use std::io::Write;
use std::io::{stdin, stdout};
use std::sync::Arc;

use clap::{Arg, Command};
use itertools::Itertools;
use tokio::sync::Mutex;

use crate::context::{AppContext, KEY_DRAFT_LOG};
use crate::models::card::Card;
use crate::models::draft_data::CardId;
use crate::scanner::Scanner;
use crate::watcher;

pub async fn main(
    scanner: Arc<Mutex<Scanner>>,
    context: Arc<AppContext>,
    use_ocr: bool,
) -> Result<(), Box<dyn Error>> {
    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(&scanner, &context, use_ocr, line).await {
            Ok((reply, quit)) => {
                writeln!(stdout(), "{reply}")?;
                stdout().flush()?;
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(stdout(), "{err}")?;
                stdout().flush()?;
            }
        }
    }

    Ok(())
}

/// Runs one command line. Returns the text to show and whether to leave the loop.
async fn respond(
    scanner: &Mutex<Scanner>,
    context: &AppContext,
    use_ocr: bool,
    line: &str,
) -> Result<(String, bool), Box<dyn Error>> {
    let args = shlex::split(line).ok_or("error: Invalid quoting")?;
    let matches = cli().try_get_matches_from(args)?;
    let mut scanner = scanner.lock().await;

    let reply = match matches.subcommand() {
        Some(("status", _)) => status(&scanner),
        Some(("event", _)) => {
            let (set_code, label) = scanner.current_event();
            if set_code.is_empty() {
                "No event".to_string()
            } else {
                format!("{} {}", set_code, label)
            }
        }
        Some(("pack", _)) => describe(&scanner.current_pack(), scanner.current_pack_cards()),
        Some(("missing", _)) => describe(&scanner.missing(), scanner.missing_cards()),
        Some(("taken", _)) => describe(scanner.taken(), scanner.taken_cards()),
        Some(("picks", _)) => {
            if scanner.picks().is_empty() {
                "No picks".to_string()
            } else {
                scanner
                    .picks()
                    .iter()
                    .map(|pick| format!("{}: {}", pick.coordinate, pick.cards.join(", ")))
                    .join("\n")
            }
        }
        Some(("poll", _)) => {
            if watcher::tick(&mut scanner, use_ocr) {
                format!("Updated, now at {}", scanner.coordinate())
            } else {
                "Nothing new".to_string()
            }
        }
        Some(("log", matches)) => {
            let enabled = matches
                .get_one::<String>("state")
                .map(|state| state == "on")
                .ok_or("error: Expected on or off")?;
            scanner.set_draft_log_enabled(enabled);
            context.write_data(KEY_DRAFT_LOG, &enabled.to_string())?;
            format!("Draft log {}", if enabled { "on" } else { "off" })
        }
        Some(("quit", _)) => return Ok(("Exiting ...".to_string(), true)),
        Some((name, _)) => return Err(format!("error: Unknown command {}", name).into()),
        None => unreachable!("subcommand required"),
    };

    Ok((reply, false))
}

fn status(scanner: &Scanner) -> String {
    let snapshot = scanner.snapshot();
    let Some(session) = snapshot.session else {
        return format!("Watching {}, no event yet", scanner.log_path().display());
    };

    let mut text = format!(
        "{} {} [{}] at {}\n{} in pack, {} missing, {} taken",
        session.set_codes.join("/"),
        session.label,
        session.format,
        snapshot.coordinate,
        snapshot.pack.len(),
        snapshot.missing.len(),
        snapshot.taken.len()
    );
    if let Some(file) = scanner.draft_log_file().filter(|_| scanner.draft_log_enabled()) {
        text.push_str(&format!("\nRecording to {}", file.display()));
    }
    text
}

/// Card lines when the dataset knows the ids, the raw ids otherwise.
fn describe(ids: &[CardId], cards: Vec<Card>) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else if cards.is_empty() {
        ids.join(", ")
    } else {
        cards.iter().map(Card::to_text).join("\n")
    }
}

fn cli() -> Command {
    // strip out usage
    const PARSER_TEMPLATE: &str = "\
        {all-args}
    ";
    // strip out name/version
    const COMMAND_TEMPLATE: &str = "\
        {about-with-newline}\n\
        {usage-heading}\n    {usage}\n\
        \n\
        {all-args}{after-help}\
    ";

    let simple = [
        ("status", "Show the current event and pick"),
        ("event", "Show the set and event label"),
        ("pack", "List the cards in the current pack"),
        ("missing", "List the cards taken from the current pack since it was first seen"),
        ("taken", "List every card taken so far"),
        ("picks", "List each recorded pick"),
        ("poll", "Read the log once right now"),
    ];

    let mut cmd = Command::new("repl")
        .multicall(true)
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand_value_name("COMMAND")
        .subcommand_help_heading("COMMANDS")
        .help_template(PARSER_TEMPLATE);

    for (name, about) in simple {
        cmd = cmd.subcommand(
            Command::new(name)
                .about(about)
                .help_template(COMMAND_TEMPLATE),
        );
    }

    cmd.subcommand(
        Command::new("log")
            .about("Turn draft log recording on or off")
            .arg(
                Arg::new("state")
                    .required(true)
                    .value_parser(["on", "off"]),
            )
            .help_template(COMMAND_TEMPLATE),
    )
    .subcommand(
        Command::new("quit")
            .alias("exit")
            .alias("q")
            .alias(":q")
            .about("Quit the REPL")
            .help_template(COMMAND_TEMPLATE),
    )
}

fn readline() -> Result<String, Box<dyn Error>> {
    write!(stdout(), "> ")?;
    stdout().flush()?;
    let mut buffer = String::new();
    stdin().read_line(&mut buffer)?;
    Ok(buffer)
}
