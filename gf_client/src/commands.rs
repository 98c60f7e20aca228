//! Subcommand parsing for the `gf_client` binary.

use std::fmt;

/// Edits applied to today's entry by `log`
///
/// Fields left as `None` keep whatever was saved before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEdits {
    pub trash: Option<u32>,
    pub recycle: Option<u32>,
    pub miles: Option<String>,
    pub bottle: bool,
    pub bag: bool,
}

/// A parsed `gf_client` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register {
        username: String,
        email: String,
        password: String,
    },
    Login {
        username: String,
        password: String,
    },
    Logout,
    WhoAmI,
    Today,
    Log(LogEdits),
    Streak,
    Rename {
        new_username: String,
    },
    ChangePassword {
        new_password: String,
    },
    DeleteAccount,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No subcommand given.
    MissingCommand,
    /// Subcommand is missing positional arguments.
    MissingArguments { command: String, usage: String },
    /// A `log` flag expects a value that wasn't there.
    MissingFlagValue(String),
    /// A count that isn't a non-negative integer.
    InvalidCount { flag: String, value: String },
    /// Unknown `log` flag or extra argument.
    UnexpectedArgument(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommand => write!(f, "No command given. Use --help to see commands"),
            Self::MissingArguments { command, usage } => {
                write!(f, "'{}' needs more arguments (usage: {})", command, usage)
            }
            Self::MissingFlagValue(flag) => write!(f, "{} needs a value", flag),
            Self::InvalidCount { flag, value } => write!(
                f,
                "Invalid value '{}' for {}. Must be a whole number (e.g., '{} 3')",
                value, flag, flag
            ),
            Self::UnexpectedArgument(arg) => write!(f, "Unexpected argument '{}'", arg),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Use --help to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse the free arguments left after global options.
///
/// # Examples
///
/// ```
/// use gf_client::commands::{Command, parse_command};
///
/// let args: Vec<String> = ["log", "--recycle", "5", "--bag"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
///
/// let Ok(Command::Log(edits)) = parse_command(&args) else {
///     panic!("expected a log command");
/// };
/// assert_eq!(edits.recycle, Some(5));
/// assert!(edits.bag);
/// ```
pub fn parse_command(args: &[String]) -> Result<Command, ParseError> {
    let parts: Vec<&str> = args.iter().map(String::as_str).collect();
    let Some((&name, rest)) = parts.split_first() else {
        return Err(ParseError::MissingCommand);
    };

    match name {
        "logout" => no_arguments(rest, Command::Logout),
        "whoami" => no_arguments(rest, Command::WhoAmI),
        "today" => no_arguments(rest, Command::Today),
        "streak" => no_arguments(rest, Command::Streak),
        "delete-account" => no_arguments(rest, Command::DeleteAccount),
        "register" => match rest {
            [username, email, password] => Ok(Command::Register {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(missing(name, "register USER EMAIL PASS")),
        },
        "login" => match rest {
            [username, password] => Ok(Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err(missing(name, "login USER PASS")),
        },
        "rename" => match rest {
            [new_username] => Ok(Command::Rename {
                new_username: new_username.to_string(),
            }),
            _ => Err(missing(name, "rename NEW_USERNAME")),
        },
        "passwd" => match rest {
            [new_password] => Ok(Command::ChangePassword {
                new_password: new_password.to_string(),
            }),
            _ => Err(missing(name, "passwd NEW_PASSWORD")),
        },
        "log" => parse_log_command(rest),
        _ => Err(ParseError::UnrecognizedCommand(name.to_string())),
    }
}

fn no_arguments(rest: &[&str], command: Command) -> Result<Command, ParseError> {
    match rest.first() {
        Some(extra) => Err(ParseError::UnexpectedArgument(extra.to_string())),
        None => Ok(command),
    }
}

fn missing(command: &str, usage: &str) -> ParseError {
    ParseError::MissingArguments {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

/// Parse "log [--trash N] [--recycle N] [--miles M] [--bottle] [--bag]"
fn parse_log_command(rest: &[&str]) -> Result<Command, ParseError> {
    let mut edits = LogEdits::default();
    let mut iter = rest.iter();

    while let Some(&flag) = iter.next() {
        match flag {
            "--bottle" => edits.bottle = true,
            "--bag" => edits.bag = true,
            "--trash" | "--recycle" | "--miles" => {
                let value = iter
                    .next()
                    .ok_or_else(|| ParseError::MissingFlagValue(flag.to_string()))?;
                match flag {
                    "--trash" => edits.trash = Some(parse_count(flag, value)?),
                    "--recycle" => edits.recycle = Some(parse_count(flag, value)?),
                    // Mileage is sanitized later, never rejected
                    _ => edits.miles = Some(value.to_string()),
                }
            }
            other => return Err(ParseError::UnexpectedArgument(other.to_string())),
        }
    }

    Ok(Command::Log(edits))
}

fn parse_count(flag: &str, value: &str) -> Result<u32, ParseError> {
    value.parse::<u32>().map_err(|_| ParseError::InvalidCount {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}
