//! Debug console. Lines starting with `/` are commands, everything else is
//! a chat message. The caller owns the line editor and feeds lines in.

use colored::Colorize;
use glam::DVec3;

use crate::{GameMode, Player, time::DeltaTime};
pub use error::{CommandError, NumberParsingError};
mod error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    Quit,
    /// `None` toggles.
    Gravity(Option<bool>),
    Mode(GameMode),
    Teleport(DVec3),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Message(String),
    Chat(String),
    Quit,
}

pub struct Console {
    delta_time: DeltaTime,
    name: String,
}

impl Console {
    pub fn new(delta_time: DeltaTime, name: impl Into<String>) -> Self {
        Self {
            delta_time,
            name: name.into(),
        }
    }

    /// Handles one input line. Errors come back as a coloured message.
    pub fn handle_line(&self, player: &mut Player, line: &str) -> Option<Reply> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Reply::Chat(format!("{} {}", format!("{}:", self.name).bold(), line)));
        };
        if rest.is_empty() {
            return None;
        }
        match parse_command(rest) {
            Ok(command) => Some(self.execute(player, command)),
            Err(err) => Some(Reply::Message(err.to_string())),
        }
    }

    pub fn execute(&self, player: &mut Player, command: Command) -> Reply {
        use Command::*;
        match command {
            Status => Reply::Message(self.status(player)),
            Quit => Reply::Quit,
            Gravity(enabled) => {
                let enabled = enabled.unwrap_or(!player.gravity());
                player.set_gravity(enabled);
                Reply::Message(format!("gravity {}", if enabled { "on" } else { "off" }))
            }
            Mode(mode) => {
                player.set_mode(mode);
                Reply::Message(format!("mode {}", mode))
            }
            Teleport(pos) => {
                player.state_mut().teleport(pos);
                Reply::Message(format!("teleported to {:.2} {:.2} {:.2}", pos.x, pos.y, pos.z))
            }
        }
    }

    fn status(&self, player: &Player) -> String {
        let state = player.state();
        let fps = self.delta_time.fps().unwrap_or(0.0);
        let msg = format!("FPS: {:.1}", fps);
        let msg = if fps < 10.0 {
            msg.red()
        } else if fps < 60.0 {
            msg.truecolor(200, 180, 0)
        } else {
            msg.green()
        };
        format!(
            "{}\npos {:.2} {:.2} {:.2} | vel {:.2} {:.2} {:.2} | {} | mode {} | gravity {}",
            msg.bold(),
            state.position.x,
            state.position.y,
            state.position.z,
            state.velocity.x,
            state.velocity.y,
            state.velocity.z,
            if state.falling() { "falling" } else { "grounded" },
            player.mode(),
            if player.gravity() { "on" } else { "off" },
        )
    }
}

pub fn parse_command(raw_command: &str) -> Result<Command, CommandError> {
    let mut parts = raw_command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    if let Some(c) = name.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(CommandError::InvalidCharacter(c));
    }
    let args: Vec<&str> = parts.collect();

    match name {
        "status" => Ok(Command::Status),
        "quit" => Ok(Command::Quit),
        "gravity" => match args.first().copied() {
            None => Ok(Command::Gravity(None)),
            Some("on") => Ok(Command::Gravity(Some(true))),
            Some("off") => Ok(Command::Gravity(Some(false))),
            Some(other) => Err(CommandError::InvalidArgument(other.to_string())),
        },
        "mode" => {
            let arg = args.first().ok_or(CommandError::MissingArgument("mode"))?;
            GameMode::from_name(arg)
                .map(Command::Mode)
                .ok_or_else(|| CommandError::InvalidArgument(arg.to_string()))
        }
        "tp" => {
            let [x, y, z] = args.as_slice() else {
                return Err(CommandError::MissingArgument("x y z"));
            };
            Ok(Command::Teleport(DVec3::new(
                parse_number(x)?,
                parse_number(y)?,
                parse_number(z)?,
            )))
        }
        _ => Err(CommandError::UnknownCommand(name.to_string())),
    }
}

/// Decimal numbers with an optional sign, fraction and `_` separators.
fn parse_number(raw: &str) -> Result<f64, NumberParsingError> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    let mut result = 0.0;
    let mut scale = 1.0;
    let mut after_decimal_point = false;
    let mut seen_digit = false;
    for c in digits.chars() {
        if let Some(num) = c.to_digit(10) {
            seen_digit = true;
            if after_decimal_point {
                scale /= 10.0;
                result += num as f64 * scale;
            } else {
                result = result * 10.0 + num as f64;
            }
        } else if c == '.' && !after_decimal_point {
            after_decimal_point = true;
        } else if c != '_' {
            return Err(NumberParsingError::InvalidCharacter(c));
        }
    }
    if !seen_digit {
        return Err(NumberParsingError::Empty);
    }
    Ok(if negative { -result } else { result })
}

#[cfg(test)]
mod test {
    use glam::DVec3;

    use super::{Command, CommandError, Console, NumberParsingError, Reply, parse_command, parse_number};
    use crate::{GameMode, Player, config::Tuning, time::DeltaTimeMeter};

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("status"), Ok(Command::Status));
        assert_eq!(parse_command("gravity off"), Ok(Command::Gravity(Some(false))));
        assert_eq!(parse_command("gravity"), Ok(Command::Gravity(None)));
        assert_eq!(parse_command("mode tourney"), Ok(Command::Mode(GameMode::Tourney)));
        assert_eq!(
            parse_command("tp 1.5 -2 1_0"),
            Ok(Command::Teleport(DVec3::new(1.5, -2.0, 10.0)))
        );
    }

    #[test]
    fn reports_bad_commands() {
        assert_eq!(
            parse_command("fly"),
            Err(CommandError::UnknownCommand("fly".to_string()))
        );
        assert_eq!(parse_command("st@tus"), Err(CommandError::InvalidCharacter('@')));
        assert_eq!(parse_command("mode"), Err(CommandError::MissingArgument("mode")));
        assert_eq!(parse_command("tp 1 2"), Err(CommandError::MissingArgument("x y z")));
        assert_eq!(
            parse_command("tp 1 2 x"),
            Err(CommandError::NumberParsingError(NumberParsingError::InvalidCharacter('x')))
        );
        assert_eq!(parse_number("-"), Err(NumberParsingError::Empty));
        assert!(
            CommandError::from(NumberParsingError::Empty)
                .to_string()
                .contains("Expected a number")
        );
        assert!(
            CommandError::from(NumberParsingError::InvalidCharacter('x'))
                .to_string()
                .contains("Invalid character in number: x")
        );
    }

    #[test]
    fn commands_drive_the_player() {
        let console = Console::new(DeltaTimeMeter::new().reader(), "Mika");
        let mut player = Player::spawn(DVec3::ZERO, Tuning::default());

        console.handle_line(&mut player, "/gravity");
        assert!(!player.gravity());
        console.handle_line(&mut player, "/mode play");
        assert_eq!(player.mode(), GameMode::Play);
        console.handle_line(&mut player, "/tp 3 4 20");
        assert_eq!(player.state().position, DVec3::new(3.0, 4.0, 20.0));
        assert!(player.state().falling());

        assert_eq!(console.handle_line(&mut player, "/quit"), Some(Reply::Quit));
        assert!(matches!(console.handle_line(&mut player, "hello"), Some(Reply::Chat(_))));
        assert!(matches!(
            console.handle_line(&mut player, "/status"),
            Some(Reply::Message(msg)) if msg.contains("mode play")
        ));
        assert_eq!(console.handle_line(&mut player, "   "), None);
    }
}
