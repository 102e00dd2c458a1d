//! Command parsing for the command line

use crate::progress::Status;

/// Parsed command from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quit the application: :q or :quit
    Quit,
    /// Show help: :help or :h
    Help,
    /// Go to the dashboard: :dashboard
    Dashboard,
    /// Open a topic by name or 1-based number: :topic <name|n>
    Topic(String),
    /// Open a question by id: :open cses_1068
    Open(String),
    /// Set the open question's status: :status solved
    Status(Status),
    /// Ask for a hint on the open question: :hint
    Hint,
    /// Explain an approach's code (1-based, default the selected one): :explain [n]
    Explain(Option<usize>),
    /// Ask for another approach: :suggest
    Suggest,
    /// Copy a calendar reminder link: :remind
    Remind,
    /// Copy an approach's code (1-based, default the selected one): :copy [n]
    Copy(Option<usize>),
    /// Store the Gemini API key: :ai-key <key>
    AiKey(String),
    /// Remove the stored Gemini API key: :ai-clear
    AiClear,
    /// Clear message: (empty command)
    Nop,
}

/// Result of parsing a command
#[derive(Debug)]
pub enum ParseResult {
    /// Successfully parsed command
    Ok(Command),
    /// Unknown command
    UnknownCommand(String),
    /// Command needs an argument
    MissingArgument(String),
    /// Argument present but not understood
    InvalidArgument(String, String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim();

    if input.is_empty() {
        return ParseResult::Ok(Command::Nop);
    }

    // Split into command and arguments
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim()).unwrap_or("");

    match cmd.to_lowercase().as_str() {
        "quit" | "q" => ParseResult::Ok(Command::Quit),
        "help" | "h" | "?" => ParseResult::Ok(Command::Help),
        "dashboard" | "dash" | "d" => ParseResult::Ok(Command::Dashboard),
        "topic" | "t" => {
            if args.is_empty() {
                ParseResult::MissingArgument("topic".to_string())
            } else {
                ParseResult::Ok(Command::Topic(args.to_string()))
            }
        }
        "open" | "o" => {
            if args.is_empty() {
                ParseResult::MissingArgument("open".to_string())
            } else {
                ParseResult::Ok(Command::Open(args.to_string()))
            }
        }
        "status" | "s" => {
            if args.is_empty() {
                return ParseResult::MissingArgument("status".to_string());
            }
            match Status::parse(args) {
                Some(status) => ParseResult::Ok(Command::Status(status)),
                None => ParseResult::InvalidArgument("status".to_string(), args.to_string()),
            }
        }
        "hint" => ParseResult::Ok(Command::Hint),
        "explain" | "x" => match parse_index(args) {
            Ok(index) => ParseResult::Ok(Command::Explain(index)),
            Err(()) => ParseResult::InvalidArgument("explain".to_string(), args.to_string()),
        },
        "suggest" => ParseResult::Ok(Command::Suggest),
        "remind" | "reminder" => ParseResult::Ok(Command::Remind),
        "copy" | "y" => match parse_index(args) {
            Ok(index) => ParseResult::Ok(Command::Copy(index)),
            Err(()) => ParseResult::InvalidArgument("copy".to_string(), args.to_string()),
        },
        "ai-key" | "ak" => {
            if args.is_empty() {
                ParseResult::MissingArgument("ai-key".to_string())
            } else {
                ParseResult::Ok(Command::AiKey(args.to_string()))
            }
        }
        "ai-clear" | "ac" => ParseResult::Ok(Command::AiClear),
        _ => ParseResult::UnknownCommand(cmd.to_string()),
    }
}

/// Optional 1-based approach number, returned 0-based
fn parse_index(args: &str) -> Result<Option<usize>, ()> {
    if args.is_empty() {
        return Ok(None);
    }
    match args.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Some(n - 1)),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_command() {
        assert!(matches!(parse_command("q"), ParseResult::Ok(Command::Quit)));
        assert!(matches!(parse_command("quit"), ParseResult::Ok(Command::Quit)));
        assert!(matches!(parse_command("Q"), ParseResult::Ok(Command::Quit)));
    }

    #[test]
    fn parse_help_command() {
        assert!(matches!(parse_command("help"), ParseResult::Ok(Command::Help)));
        assert!(matches!(parse_command("?"), ParseResult::Ok(Command::Help)));
    }

    #[test]
    fn parse_topic_keeps_spaces() {
        match parse_command("topic Sorting and Searching") {
            ParseResult::Ok(Command::Topic(name)) => assert_eq!(name, "Sorting and Searching"),
            other => panic!("Expected Topic command, got {other:?}"),
        }
        assert!(matches!(parse_command("topic"), ParseResult::MissingArgument(_)));
    }

    #[test]
    fn parse_open_command() {
        match parse_command("open cses_1068") {
            ParseResult::Ok(Command::Open(id)) => assert_eq!(id, "cses_1068"),
            other => panic!("Expected Open command, got {other:?}"),
        }
    }

    #[test]
    fn parse_status_command() {
        assert!(matches!(
            parse_command("status Solved"),
            ParseResult::Ok(Command::Status(Status::Solved))
        ));
        assert!(matches!(
            parse_command("s to-do"),
            ParseResult::Ok(Command::Status(Status::ToDo))
        ));
        assert!(matches!(parse_command("status maybe"), ParseResult::InvalidArgument(_, _)));
        assert!(matches!(parse_command("status"), ParseResult::MissingArgument(_)));
    }

    #[test]
    fn parse_explain_index() {
        assert!(matches!(parse_command("explain"), ParseResult::Ok(Command::Explain(None))));
        assert!(matches!(parse_command("explain 2"), ParseResult::Ok(Command::Explain(Some(1)))));
        assert!(matches!(parse_command("explain 0"), ParseResult::InvalidArgument(_, _)));
        assert!(matches!(parse_command("copy x"), ParseResult::InvalidArgument(_, _)));
        assert!(matches!(parse_command("copy 1"), ParseResult::Ok(Command::Copy(Some(0)))));
    }

    #[test]
    fn parse_ai_key() {
        match parse_command("ai-key AIzaSyExample") {
            ParseResult::Ok(Command::AiKey(key)) => assert_eq!(key, "AIzaSyExample"),
            other => panic!("Expected AiKey command, got {other:?}"),
        }
        assert!(matches!(parse_command("ai-key"), ParseResult::MissingArgument(_)));
        assert!(matches!(parse_command("ai-clear"), ParseResult::Ok(Command::AiClear)));
    }

    #[test]
    fn parse_unknown_command() {
        assert!(matches!(parse_command("unknown"), ParseResult::UnknownCommand(_)));
    }

    #[test]
    fn parse_empty_is_nop() {
        assert!(matches!(parse_command(""), ParseResult::Ok(Command::Nop)));
        assert!(matches!(parse_command("   "), ParseResult::Ok(Command::Nop)));
    }
}
