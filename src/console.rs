// Line-oriented console front end.
//
// Translates typed input lines into Command messages sent to the app
// orchestrator and renders Notice updates to stdout. All behavior lives in
// the pure `parse_command` / `render_notice` functions; `run` only wires
// them to stdin and the channels.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::app::{Command, Notice};

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

/// Parse one input line into a command.
///
/// Returns `None` for blank lines and anything unrecognized (including
/// malformed arguments); the caller prints a hint in that case.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword {
        "names" if !rest.is_empty() => Some(Command::ReplaceNames { raw: rest.to_string() }),
        "load" if !rest.is_empty() => Some(Command::LoadFile { path: rest.to_string() }),
        "sample" => Some(Command::LoadSample),
        "list" => Some(Command::List),
        "dedupe" => Some(Command::Dedupe),
        "repeat" => match rest {
            "on" => Some(Command::SetRepeat { allow: true }),
            "off" => Some(Command::SetRepeat { allow: false }),
            _ => None,
        },
        "draw" => Some(Command::Draw),
        "winners" => Some(Command::ShowWinners),
        "clear" => Some(Command::ClearHistory),
        "group" => {
            if rest.is_empty() {
                Some(Command::Form { size: None })
            } else {
                rest.parse::<usize>()
                    .ok()
                    .map(|size| Command::Form { size: Some(size) })
            }
        }
        "export" => Some(Command::Export),
        "help" => Some(Command::Help),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Notice rendering
// ---------------------------------------------------------------------------

const HELP_TEXT: &str = "\
commands:
  names <text>   replace the roster (names separated by commas or newlines)
  load <path>    replace the roster from a text/CSV file
  sample         load the built-in demo roster
  list           show the roster with duplicate markers
  dedupe         drop repeated names, keeping first occurrences
  repeat on|off  allow or disallow repeat winners
  draw           run a lucky draw
  winners        show the winner history (most recent first)
  clear          clear the winner history
  group [size]   shuffle the roster into groups (default size from config)
  export         write the last grouping to a CSV file
  quit           exit";

/// Render a notice as display text.
pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::RosterUpdated { count, duplicates } => {
            if *duplicates > 0 {
                format!("roster: {count} names ({duplicates} duplicate entries)")
            } else {
                format!("roster: {count} names")
            }
        }
        Notice::RosterListing { participants } => {
            if participants.is_empty() {
                "roster is empty".to_string()
            } else {
                participants
                    .iter()
                    .map(|p| {
                        if p.is_duplicate {
                            format!("  {} (duplicate)", p.name)
                        } else {
                            format!("  {}", p.name)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Notice::LoadFailed { path, message } => {
            format!("could not read {path}: {message}")
        }
        Notice::RollTick { name } => format!("... {name}"),
        Notice::WinnerSettled { name, remaining } => {
            format!("winner: {name} ({remaining} still eligible)")
        }
        Notice::PoolExhausted => {
            "no eligible names left -- add names or clear the history".to_string()
        }
        Notice::RollInProgress => "a draw is already running".to_string(),
        Notice::WinnerHistory { winners } => {
            if winners.is_empty() {
                "no winners yet".to_string()
            } else {
                winners
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("  {}. {name}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Notice::HistoryCleared => "winner history cleared".to_string(),
        Notice::RepeatMode { allow } => {
            if *allow {
                "repeat winners allowed (history capped at 10)".to_string()
            } else {
                "repeat winners disallowed".to_string()
            }
        }
        Notice::GroupsFormed { groups } => {
            let mut lines = vec![format!("{} groups:", groups.len())];
            for group in groups {
                lines.push(format!(
                    "  group {}: {}",
                    group.id,
                    group.members.join(", ")
                ));
            }
            lines.join("\n")
        }
        Notice::GroupingFailed { message } => format!("grouping failed: {message}"),
        Notice::Exported { path, rows } => {
            format!("exported {rows} rows to {}", path.display())
        }
        Notice::ExportFailed { message } => format!("export failed: {message}"),
        Notice::NothingToExport => "nothing to export -- run `group` first".to_string(),
        Notice::Help => HELP_TEXT.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Console loop
// ---------------------------------------------------------------------------

/// Run the console loop: read stdin lines, forward parsed commands, and
/// print notices as they arrive. Returns when the user quits, stdin closes,
/// or the notice channel closes.
pub async fn run(
    mut out_rx: mpsc::Receiver<Notice>,
    cmd_tx: mpsc::Sender<Command>,
) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    println!("event assistant ready -- type `help` for commands");

    loop {
        tokio::select! {
            // --- Input lines ---
            line = lines.next_line() => {
                match line? {
                    Some(line) => match parse_command(&line) {
                        Some(Command::Quit) => {
                            let _ = cmd_tx.send(Command::Quit).await;
                            break;
                        }
                        Some(cmd) => {
                            if cmd_tx.send(cmd).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            if !line.trim().is_empty() {
                                println!("unrecognized command -- type `help` for commands");
                            }
                        }
                    },
                    None => {
                        // stdin closed (EOF); treat it as a quit.
                        info!("stdin closed, quitting");
                        let _ = cmd_tx.send(Command::Quit).await;
                        break;
                    }
                }
            }

            // --- Notices ---
            notice = out_rx.recv() => {
                match notice {
                    Some(notice) => println!("{}", render_notice(&notice)),
                    None => {
                        info!("Notice channel closed, console exiting");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;

    // -- Parsing --

    #[test]
    fn parses_every_command_form() {
        let cases: Vec<(&str, Option<Command>)> = vec![
            (
                "names Alice, Bob",
                Some(Command::ReplaceNames { raw: "Alice, Bob".into() }),
            ),
            (
                "load names.csv",
                Some(Command::LoadFile { path: "names.csv".into() }),
            ),
            ("sample", Some(Command::LoadSample)),
            ("list", Some(Command::List)),
            ("dedupe", Some(Command::Dedupe)),
            ("repeat on", Some(Command::SetRepeat { allow: true })),
            ("repeat off", Some(Command::SetRepeat { allow: false })),
            ("draw", Some(Command::Draw)),
            ("winners", Some(Command::ShowWinners)),
            ("clear", Some(Command::ClearHistory)),
            ("group", Some(Command::Form { size: None })),
            ("group 4", Some(Command::Form { size: Some(4) })),
            ("export", Some(Command::Export)),
            ("help", Some(Command::Help)),
            ("quit", Some(Command::Quit)),
            ("exit", Some(Command::Quit)),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_command(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn rejects_blank_and_unknown_input() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command("frobnicate"), None);
        assert_eq!(parse_command("names"), None);
        assert_eq!(parse_command("load"), None);
        assert_eq!(parse_command("repeat maybe"), None);
        assert_eq!(parse_command("group four"), None);
    }

    #[test]
    fn parsing_trims_surrounding_whitespace() {
        assert_eq!(parse_command("  draw  "), Some(Command::Draw));
        assert_eq!(
            parse_command("  names  Alice  "),
            Some(Command::ReplaceNames { raw: "Alice".into() })
        );
    }

    // -- Rendering --

    #[test]
    fn renders_roster_update_with_and_without_duplicates() {
        assert_eq!(
            render_notice(&Notice::RosterUpdated { count: 5, duplicates: 0 }),
            "roster: 5 names"
        );
        assert_eq!(
            render_notice(&Notice::RosterUpdated { count: 5, duplicates: 2 }),
            "roster: 5 names (2 duplicate entries)"
        );
    }

    #[test]
    fn renders_winner_and_exhaustion() {
        assert_eq!(
            render_notice(&Notice::WinnerSettled {
                name: "Alice".into(),
                remaining: 3
            }),
            "winner: Alice (3 still eligible)"
        );
        assert!(render_notice(&Notice::PoolExhausted).contains("no eligible names"));
    }

    #[test]
    fn renders_groups_one_line_each() {
        let notice = Notice::GroupsFormed {
            groups: vec![
                Group {
                    id: 1,
                    members: vec!["A".into(), "B".into()],
                },
                Group {
                    id: 2,
                    members: vec!["C".into()],
                },
            ],
        };
        let text = render_notice(&notice);
        assert!(text.starts_with("2 groups:"));
        assert!(text.contains("group 1: A, B"));
        assert!(text.contains("group 2: C"));
    }

    #[test]
    fn help_mentions_every_command_keyword() {
        let text = render_notice(&Notice::Help);
        for keyword in [
            "names", "load", "sample", "list", "dedupe", "repeat", "draw", "winners", "clear",
            "group", "export", "quit",
        ] {
            assert!(text.contains(keyword), "help is missing `{keyword}`");
        }
    }
}
