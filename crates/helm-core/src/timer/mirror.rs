//! Satellite display transport types.
//!
//! The primary process owns the session; a mirror only renders frames and
//! sends back `toggle`/`stop`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::session::SessionMode;

/// One frame pushed to a mirror at tick resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorFrame {
    pub remaining_formatted: String,
    pub is_active: bool,
    pub mode: SessionMode,
}

/// Commands a mirror may send back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorCommand {
    Toggle,
    Stop,
}

impl FromStr for MirrorCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle" => Ok(MirrorCommand::Toggle),
            "stop" => Ok(MirrorCommand::Stop),
            other => Err(format!("unknown mirror command '{other}'")),
        }
    }
}

/// `M:SS`, minutes unbounded.
pub fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(59), "0:59");
        assert_eq!(format_remaining(1500), "25:00");
        assert_eq!(format_remaining(7265), "121:05");
    }

    #[test]
    fn frame_uses_wire_field_names() {
        let frame = MirrorFrame {
            remaining_formatted: "4:59".into(),
            is_active: true,
            mode: SessionMode::Break,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json, serde_json::json!({"remainingFormatted": "4:59", "isActive": true, "mode": "BREAK"}));
    }

    #[test]
    fn parses_commands() {
        assert_eq!("toggle".parse::<MirrorCommand>().unwrap(), MirrorCommand::Toggle);
        assert_eq!(" STOP ".parse::<MirrorCommand>().unwrap(), MirrorCommand::Stop);
        assert!("skip".parse::<MirrorCommand>().is_err());
    }
}
