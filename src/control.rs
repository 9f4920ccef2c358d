use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    StepUp { input: String },
    StepDown { input: String },
    Mute { scene: String, input: String },
    Unmute { scene: String, input: String },
    Show { input: String },
    // dumps the whole published key space
    State,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub type Receiver = crossbeam_channel::Receiver<Message>;
pub type Sender = crossbeam_channel::Sender<Message>;

pub fn channel() -> (Sender, Receiver) {
    crossbeam_channel::unbounded()
}

fn one_arg(args: &[&str], usage: &'static str) -> Result<String, Error> {
    match args {
        [input] => Ok(String::from(*input)),
        _ => Err(Error::Usage(usage)),
    }
}

fn two_args(args: &[&str], usage: &'static str) -> Result<(String, String), Error> {
    match args {
        [scene, input] => Ok((String::from(*scene), String::from(*input))),
        _ => Err(Error::Usage(usage)),
    }
}

// Returns None for blank lines and # comments
pub fn parse(line: &str) -> Result<Option<Message>, Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let (command, args) = (words[0], &words[1..]);
    let message = match command {
        "up" => Message::StepUp {
            input: one_arg(args, "up <input>")?,
        },
        "down" => Message::StepDown {
            input: one_arg(args, "down <input>")?,
        },
        "get" => Message::Show {
            input: one_arg(args, "get <input>")?,
        },
        "mute" => {
            let (scene, input) = two_args(args, "mute <scene> <input>")?;
            Message::Mute { scene, input }
        }
        "unmute" => {
            let (scene, input) = two_args(args, "unmute <scene> <input>")?;
            Message::Unmute { scene, input }
        }
        "state" if args.is_empty() => Message::State,
        "state" => return Err(Error::Usage("state")),
        "quit" | "exit" if args.is_empty() => Message::Quit,
        "quit" | "exit" => return Err(Error::Usage("quit")),
        _ => return Err(Error::UnknownCommand(String::from(command))),
    };
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse("up Mic"),
            Ok(Some(Message::StepUp {
                input: String::from("Mic")
            }))
        );
        assert_eq!(
            parse("  unmute Live Mic  "),
            Ok(Some(Message::Unmute {
                scene: String::from("Live"),
                input: String::from("Mic")
            }))
        );
        assert_eq!(parse("state"), Ok(Some(Message::State)));
        assert_eq!(parse("quit"), Ok(Some(Message::Quit)));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   # fade the music"), Ok(None));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            parse("louder Mic"),
            Err(Error::UnknownCommand(String::from("louder")))
        );
        assert_eq!(parse("mute Mic"), Err(Error::Usage("mute <scene> <input>")));
        assert_eq!(parse("down"), Err(Error::Usage("down <input>")));
    }
}
