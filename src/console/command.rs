use thiserror::Error;

use crate::process::Pid;

/// A tokenised console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Program path followed by its arguments
    Exec(Vec<String>),
    Kill(Pid),
    Stop(Pid),
    Cont(Pid),
    List,
    Info(Pid),
    Quit,
    /// Blank line
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("error, {command} requires a valid {argument}")]
    Usage {
        command: &'static str,
        argument: &'static str,
    },

    #[error("invalid command")]
    Unknown(String),
}

impl Command {
    /// Every command may be abbreviated to its first letter
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();
        let Some(task) = tokens.next() else {
            return Ok(Command::Empty);
        };

        match task {
            "exec" | "e" => {
                let argv: Vec<String> = tokens.map(str::to_string).collect();
                if argv.is_empty() {
                    return Err(ParseError::Usage {
                        command: "exec",
                        argument: "PATH",
                    });
                }
                Ok(Command::Exec(argv))
            }
            "kill" | "k" => parse_pid("kill", tokens.next()).map(Command::Kill),
            "stop" | "s" => parse_pid("stop", tokens.next()).map(Command::Stop),
            "cont" | "c" => parse_pid("cont", tokens.next()).map(Command::Cont),
            "info" | "i" => parse_pid("info", tokens.next()).map(Command::Info),
            "list" | "l" => Ok(Command::List),
            "quit" | "q" => Ok(Command::Quit),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

fn parse_pid(command: &'static str, token: Option<&str>) -> Result<Pid, ParseError> {
    token
        .and_then(|token| token.parse::<Pid>().ok())
        .filter(|pid| *pid > 0)
        .ok_or(ParseError::Usage {
            command,
            argument: "PID",
        })
}
