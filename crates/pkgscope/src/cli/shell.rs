//! `pkgscope shell` command implementation.
//!
//! Line-oriented stand-in for a graphical front end: every command maps to
//! one session operation, and the graph is printed after each change.

use std::io::{BufRead, Write};
use std::path::Path;

use colored::Colorize;
use pkgscope::Session;

use super::{LoadArgs, display};

const HELP: &str = "\
commands:
  explode <id>   replace a package with its sub-packages and modules
  delete <id>    remove a node and its edges
  undo           revert the last explode or delete
  select [<id>]  toggle the selection, or clear it
  show           print the graph
  reload         run the analyzer again
  help           show this message
  quit           leave the shell";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Explode(String),
    Delete(String),
    Undo,
    Select(Option<String>),
    Show,
    Reload,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next().map(str::to_string);
        if words.next().is_some() {
            return Err(format!("too many arguments to '{verb}'"));
        }

        let needs_id = |arg: Option<String>| arg.ok_or_else(|| format!("'{verb}' needs a node id"));
        let command = match verb {
            "explode" | "x" => Self::Explode(needs_id(arg)?),
            "delete" | "rm" => Self::Delete(needs_id(arg)?),
            "undo" | "u" => Self::Undo,
            "select" | "s" => Self::Select(arg),
            "show" | "ls" => Self::Show,
            "reload" => Self::Reload,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(Some(command))
    }
}

/// Run the shell command.
pub fn run(root: &Path, args: &LoadArgs) -> Result<(), pkgscope::Error> {
    let (mut session, report) = args.load(root)?;
    display::print_load_report(&report);
    display::print_graph(session.graph(), session.selection());
    println!();
    println!("{}", "Type 'help' for commands.".dimmed());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "pkgscope>".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}: {message}", "error".red().bold());
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        execute(&mut session, root, command);
    }

    Ok(())
}

/// Apply one command. Failures are printed and leave the session usable.
fn execute(session: &mut Session, root: &Path, command: Command) {
    match command {
        Command::Explode(id) => match session.explode(&id) {
            Ok(children) => {
                println!(
                    "{} {id} into {} nodes",
                    "Exploded".green().bold(),
                    children.len()
                );
                display::print_graph(session.graph(), session.selection());
            }
            Err(e) if e.is_notice() => println!("{}: {e}", "notice".yellow().bold()),
            Err(e) => println!("{}: {e}", "error".red().bold()),
        },
        Command::Delete(id) => match session.delete(&id) {
            Ok(()) => {
                println!("{} {id}", "Deleted".green().bold());
                display::print_graph(session.graph(), session.selection());
            }
            Err(e) => println!("{}: {e}", "error".red().bold()),
        },
        Command::Undo => {
            if session.undo().is_ok() {
                println!(
                    "{} ({} left)",
                    "Undone".green().bold(),
                    session.history_len()
                );
                display::print_graph(session.graph(), session.selection());
            } else {
                println!("{}", "Nothing to undo.".dimmed());
            }
        }
        Command::Select(id) => match session.select(id.as_deref()) {
            Ok(()) => match session.selection().selected() {
                Some(selected) => {
                    println!("{} {selected}", "Selected".green().bold());
                    let graph = session.graph();
                    for dep in graph.dependencies(selected.as_str()) {
                        println!("  {} {dep}", "→".red());
                    }
                    for dependent in graph.dependents(selected.as_str()) {
                        println!("  {} {dependent}", "←".blue());
                    }
                }
                None => println!("{}", "Selection cleared".dimmed()),
            },
            Err(e) => println!("{}: {e}", "error".red().bold()),
        },
        Command::Show => display::print_graph(session.graph(), session.selection()),
        Command::Reload => match session.load(root) {
            Ok(report) => {
                display::print_load_report(&report);
                display::print_graph(session.graph(), session.selection());
            }
            Err(e) => println!(
                "{}: {e}\n{}",
                "error".red().bold(),
                "Keeping the previous graph.".dimmed()
            ),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_aliases() {
        assert_eq!(
            Command::parse("explode pkg.sub"),
            Ok(Some(Command::Explode("pkg.sub".to_string())))
        );
        assert_eq!(Command::parse("rm ext:numpy"), Ok(Some(Command::Delete("ext:numpy".to_string()))));
        assert_eq!(Command::parse("  u "), Ok(Some(Command::Undo)));
        assert_eq!(Command::parse("select"), Ok(Some(Command::Select(None))));
        assert_eq!(Command::parse(""), Ok(None));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Command::parse("explode").is_err());
        assert!(Command::parse("delete a b").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }
}
