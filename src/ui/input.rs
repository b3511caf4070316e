/// Keyboard input.
///
/// Movement is turn-based: each fresh key press is one step, so only
/// Press events count (Repeat/Release are dropped). Key names come from
/// `config.toml` and are resolved once at startup.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

use fogwalk::config::KeyConfig;
use fogwalk::Direction;

/// What a key press asks for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Step(Direction),
    Quit,
}

pub struct InputState {
    bindings: Vec<(KeyCode, Command)>,
    /// Commands collected during the most recent `drain_events()`.
    pending: Vec<Command>,
}

impl InputState {
    pub fn new(keys: &KeyConfig) -> Self {
        let mut bindings = vec![];
        let mut bind = |names: &[String], cmd: Command| {
            for name in names {
                match parse_key_name(name) {
                    Some(code) => bindings.push((code, cmd)),
                    None => tracing::warn!(key = %name, "unknown key name in config, ignored"),
                }
            }
        };
        bind(&keys.north, Command::Step(Direction::North));
        bind(&keys.north_east, Command::Step(Direction::NorthEast));
        bind(&keys.east, Command::Step(Direction::East));
        bind(&keys.south_east, Command::Step(Direction::SouthEast));
        bind(&keys.south, Command::Step(Direction::South));
        bind(&keys.south_west, Command::Step(Direction::SouthWest));
        bind(&keys.west, Command::Step(Direction::West));
        bind(&keys.north_west, Command::Step(Direction::NorthWest));
        bind(&keys.quit, Command::Quit);

        InputState { bindings, pending: Vec::with_capacity(8) }
    }

    /// Wait up to `timeout` for input, then drain everything queued.
    pub fn drain_events(&mut self, timeout: Duration) -> std::io::Result<&[Command]> {
        self.pending.clear();
        let mut wait = timeout;
        while poll(wait)? {
            wait = Duration::ZERO;
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
                {
                    self.pending.push(Command::Quit);
                    continue;
                }
                if let Some(&(_, cmd)) = self.bindings.iter().find(|(code, _)| *code == key.code) {
                    self.pending.push(cmd);
                }
            }
        }
        Ok(&self.pending)
    }
}

/// `"Up"`, `"Esc"`, `"k"`, `"8"` → key code.
fn parse_key_name(name: &str) -> Option<KeyCode> {
    let code = match name {
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Esc" => KeyCode::Esc,
        "Enter" => KeyCode::Enter,
        "Space" => KeyCode::Char(' '),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}
