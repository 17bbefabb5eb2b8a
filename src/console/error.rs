use std::fmt;

use colored::Colorize;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    UnknownCommand(String),
    InvalidCharacter(char),
    MissingArgument(&'static str),
    InvalidArgument(String),
    NumberParsingError(NumberParsingError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumberParsingError {
    InvalidCharacter(char),
    Empty,
}

impl From<NumberParsingError> for CommandError {
    fn from(err: NumberParsingError) -> Self {
        CommandError::NumberParsingError(err)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CommandError::*;
        let msg = match self {
            UnknownCommand(name) => format!("Unknown command: {}", name),
            InvalidCharacter(c) => format!("Invalid character: {}", c),
            MissingArgument(what) => format!("Missing argument: {}", what),
            InvalidArgument(arg) => format!("Invalid argument: {}", arg),
            NumberParsingError(self::NumberParsingError::InvalidCharacter(c)) => {
                format!("Invalid character in number: {}", c)
            }
            NumberParsingError(self::NumberParsingError::Empty) => "Expected a number".to_string(),
        };
        write!(f, "{} {}", "ERROR:".red(), msg)
    }
}

impl std::error::Error for CommandError {}
