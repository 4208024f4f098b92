use std::fmt;

/// Transient text shown over the view. No message is shown as an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    Reloading,
    OutOfAmmo,
    TimeUp { score: u32 },
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusMessage::Reloading => f.write_str("Reloading..."),
            StatusMessage::OutOfAmmo => f.write_str("Out of ammo"),
            StatusMessage::TimeUp { score } => write!(f, "Time Up! Score: {score}"),
        }
    }
}

/// Numbers and text for the on-screen overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct HudStatus {
    pub score: u32,
    /// Rounded up.
    pub seconds_left: u32,
    /// Rounded down.
    pub health: u32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reloading: bool,
    pub scoped: bool,
    pub message: Option<StatusMessage>,
}

impl HudStatus {
    pub fn message_text(&self) -> String {
        self.message.map(|m| m.to_string()).unwrap_or_default()
    }

    pub fn ammo_text(&self) -> String {
        format!("{}/{}", self.ammo, self.max_ammo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(message: Option<StatusMessage>) -> HudStatus {
        HudStatus {
            score: 30,
            seconds_left: 0,
            health: 100,
            ammo: 2,
            max_ammo: 5,
            reloading: false,
            scoped: false,
            message,
        }
    }

    #[test]
    fn message_texts_match_overlay_strings() {
        assert_eq!(StatusMessage::Reloading.to_string(), "Reloading...");
        assert_eq!(StatusMessage::OutOfAmmo.to_string(), "Out of ammo");
        assert_eq!(
            StatusMessage::TimeUp { score: 30 }.to_string(),
            "Time Up! Score: 30"
        );
    }

    #[test]
    fn cleared_message_is_empty_string() {
        assert_eq!(status(None).message_text(), "");
        assert_eq!(
            status(Some(StatusMessage::OutOfAmmo)).message_text(),
            "Out of ammo"
        );
    }

    #[test]
    fn ammo_counter_reads_left_over_max() {
        assert_eq!(status(None).ammo_text(), "2/5");
    }
}
