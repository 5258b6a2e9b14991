//! Console command surface for the kiosk service.

/// Operator commands accepted on the control console. Parsing is
/// case-insensitive and whitespace-tolerant; anything unrecognised is
/// simply ignored by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskCommand {
    /// Begin a deposit session.
    Start,
    /// Scan and sort the item currently on the platform.
    Scan,
    /// End the session and report counts to the cloud.
    Stop,
    /// Return to idle, ready for the next user.
    Reset,
    /// Print the current state snapshot.
    ShowState,
}

impl KioskCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "scan" => Some(Self::Scan),
            "stop" => Some(Self::Stop),
            "reset" => Some(Self::Reset),
            "state" | "status" => Some(Self::ShowState),
            _ => None,
        }
    }
}
