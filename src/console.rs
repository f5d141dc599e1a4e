//! Console commands read from stdin

use anyhow::{anyhow, bail, Context, Result};
use rx_input::joypad::MAX_PLAYERS;
use rx_input::{InjectedInput, PlayerSlot};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Reset,
    Save(u32),
    Load(u32),
    Press(PlayerSlot, InjectedInput),
    Open(PathBuf),
    Select(String),
    Status,
    Stop,
    Quit,
}

impl Command {
    /// Parse one input line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "reset" => Command::Reset,
            "save" => Command::Save(parse_slot(rest)?),
            "load" => Command::Load(parse_slot(rest)?),
            "press" => {
                let mut parts = rest.split_whitespace();
                let (Some(player), Some(button)) = (parts.next(), parts.next()) else {
                    bail!("usage: press PLAYER BUTTON");
                };
                let input = InjectedInput::from_name(button)
                    .ok_or_else(|| anyhow!("unknown button {:?}", button))?;
                Command::Press(parse_player(player)?, input)
            }
            "open" => {
                if rest.is_empty() {
                    bail!("usage: open FILE");
                }
                Command::Open(PathBuf::from(rest))
            }
            "select" => {
                if rest.is_empty() {
                    bail!("usage: select SYSTEM");
                }
                Command::Select(rest.to_string())
            }
            "status" => Command::Status,
            "stop" => Command::Stop,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command {:?}", other),
        };

        Ok(Some(command))
    }
}

fn parse_slot(raw: &str) -> Result<u32> {
    raw.parse()
        .with_context(|| format!("invalid save slot {:?}", raw))
}

/// Players are numbered from 1 on the console
fn parse_player(raw: &str) -> Result<PlayerSlot> {
    let number: u8 = raw
        .parse()
        .with_context(|| format!("invalid player {:?}", raw))?;
    number
        .checked_sub(1)
        .and_then(PlayerSlot::new)
        .ok_or_else(|| anyhow!("player must be between 1 and {}", MAX_PLAYERS))
}
