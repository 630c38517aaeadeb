//! Keypad command parser
//!
//! Turns text lines (stdin, WebSocket frames) into front-panel events.
//! Accepted forms: a key name or shortcut, optionally followed by an event
//! type, e.g. `ok`, `d repeat`, `LEFT release`, `quit`.

use lazy_static::lazy_static;
use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::types::{InputEvent, InputKey, InputType};

lazy_static! {
    static ref RE_COMMAND: Regex = Regex::new(
        r"(?i)^\s*(up|down|left|right|ok|back|quit|exit|recalibrate|u|d|l|r|o|b|q)(?:\s+(press|release|repeat))?\s*$"
    ).unwrap();
}

fn key_for(word: &str) -> Option<InputKey> {
    let key = match word.to_ascii_lowercase().as_str() {
        "up" | "u" => InputKey::Up,
        "down" | "d" => InputKey::Down,
        "left" | "l" => InputKey::Left,
        "right" | "r" => InputKey::Right,
        "ok" | "o" | "recalibrate" => InputKey::Ok,
        "back" | "b" | "q" | "quit" | "exit" => InputKey::Back,
        _ => return None,
    };
    Some(key)
}

fn kind_for(word: &str) -> InputType {
    match word.to_ascii_lowercase().as_str() {
        "release" => InputType::Release,
        "repeat" => InputType::Repeat,
        _ => InputType::Press,
    }
}

/// Parse one command line; None when it is not a key command
pub fn parse_command(line: &str) -> Option<InputEvent> {
    let caps = RE_COMMAND.captures(line)?;
    let key = key_for(caps.get(1)?.as_str())?;
    let kind = caps.get(2).map(|m| kind_for(m.as_str())).unwrap_or_default();
    Some(InputEvent::new(key, kind))
}

/// Forward keypad lines from `reader` into the input queue
///
/// Unknown lines are logged and skipped. With `back_on_eof` the end of
/// input is delivered as a Back press.
pub async fn feed_keypad<R>(reader: R, tx: mpsc::Sender<InputEvent>, back_on_eof: bool)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "keypad input failed");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_command(line) {
            Some(event) => {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            None => warn!(input = line, "unknown key command"),
        }
    }

    if back_on_eof {
        let _ = tx.send(InputEvent::press(InputKey::Back)).await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
