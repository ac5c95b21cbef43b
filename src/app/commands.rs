//! Inbound UI intents.
//!
//! Renderers translate taps and console lines into a [`UiIntent`] and hand
//! it to [`Controller::dispatch`](super::controller::Controller::dispatch).

use core::fmt;
use core::str::FromStr;

use super::state::Screen;

/// Actions a renderer can request from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiIntent {
    /// Switch to a screen.
    Goto(Screen),
    /// Force-refresh the reading for the current screen.
    Refresh,
    /// Request the valve to open.
    OpenValve,
    /// Request the valve to close.
    CloseValve,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIntent(pub String);

impl fmt::Display for UnknownIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command '{}'", self.0)
    }
}

impl std::error::Error for UnknownIntent {}

impl FromStr for UiIntent {
    type Err = UnknownIntent;

    /// Accepts a screen id (`menu`, `moisture`, ...), `back`, `refresh`,
    /// `open` or `close`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim().to_ascii_lowercase();
        match word.as_str() {
            "back" => Ok(Self::Goto(Screen::Menu)),
            "refresh" | "r" => Ok(Self::Refresh),
            "open" => Ok(Self::OpenValve),
            "close" => Ok(Self::CloseValve),
            other => other
                .parse::<Screen>()
                .map(Self::Goto)
                .map_err(|_| UnknownIntent(other.to_string())),
        }
    }
}
