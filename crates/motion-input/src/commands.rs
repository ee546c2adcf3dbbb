use crate::ViewerAction;
use motion_config::Mode;
use thiserror::Error;

/// Why a command line could not be turned into an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    /// The command is known but its arguments are not.
    #[error("usage: {0}")]
    BadArguments(&'static str),
}

pub const HELP: &str = "\
commands:
  toggle | t              enable or disable sensing
  mode gyro|absolute      select the sensing mode (also: gyro, absolute)
  reset | r               zero the orientation and reset the camera
  orbit <yaw> <pitch>     orbit the camera, in degrees
  status | s              show status and last reading
  help | h                this text
  quit | q                exit";

/// Parse one line of the text control surface.
pub fn parse_command(line: &str) -> Result<ViewerAction, ParseError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(ParseError::Empty);
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "toggle" | "t" => ViewerAction::ToggleSensing,
        "reset" | "r" => ViewerAction::Reset,
        "status" | "s" => ViewerAction::ShowStatus,
        "quit" | "q" | "exit" => ViewerAction::Quit,
        "help" | "h" | "?" => ViewerAction::Help,
        "mode" | "m" => {
            let mode = words
                .next()
                .and_then(Mode::from_label)
                .ok_or(ParseError::BadArguments("mode gyro|absolute"))?;
            ViewerAction::SelectMode(mode)
        }
        "gyro" => ViewerAction::SelectMode(Mode::AngularVelocity),
        "absolute" => ViewerAction::SelectMode(Mode::AbsoluteOrientation),
        "orbit" | "o" => {
            const USAGE: &str = "orbit <yaw> <pitch>";
            let mut angle = || -> Result<f32, ParseError> {
                words
                    .next()
                    .and_then(|w| w.parse::<f32>().ok())
                    .ok_or(ParseError::BadArguments(USAGE))
            };
            let yaw = angle()?;
            let pitch = angle()?;
            ViewerAction::Orbit(yaw.to_radians(), pitch.to_radians())
        }
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lifecycle_commands() {
        assert_eq!(parse_command("toggle"), Ok(ViewerAction::ToggleSensing));
        assert_eq!(parse_command("  T  "), Ok(ViewerAction::ToggleSensing));
        assert_eq!(parse_command("reset"), Ok(ViewerAction::Reset));
        assert_eq!(parse_command("q"), Ok(ViewerAction::Quit));
        assert_eq!(parse_command("status"), Ok(ViewerAction::ShowStatus));
        assert_eq!(parse_command("?"), Ok(ViewerAction::Help));
    }

    #[test]
    fn parses_mode_selection() {
        assert_eq!(
            parse_command("mode absolute"),
            Ok(ViewerAction::SelectMode(Mode::AbsoluteOrientation))
        );
        assert_eq!(
            parse_command("gyro"),
            Ok(ViewerAction::SelectMode(Mode::AngularVelocity))
        );
        assert_eq!(
            parse_command("mode compass"),
            Err(ParseError::BadArguments("mode gyro|absolute"))
        );
    }

    #[test]
    fn parses_orbit_in_degrees() {
        match parse_command("orbit 90 -45") {
            Ok(ViewerAction::Orbit(yaw, pitch)) => {
                assert!((yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
                assert!((pitch + std::f32::consts::FRAC_PI_4).abs() < 1e-6);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse_command("orbit 90"),
            Err(ParseError::BadArguments(_))
        ));
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_command("fly"),
            Err(ParseError::Unknown("fly".to_string()))
        );
    }
}
