//! Domain types for activity tracking.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// The two states of the idle machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    /// A qualifying event happened within the timeout window.
    #[default]
    Active,
    /// The timeout window elapsed with no qualifying event.
    Inactive,
}

impl Activity {
    /// Build from the boolean "is active" form.
    pub fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// Lowercase name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of input event that counts as evidence of user presence.
///
/// Serialized with the DOM event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "keypress")]
    KeyPress,
    #[serde(rename = "mousemove")]
    PointerMove,
    #[serde(rename = "touchmove")]
    TouchMove,
    #[serde(rename = "click")]
    Click,
    #[serde(rename = "scroll")]
    Scroll,
}

impl EventKind {
    /// Every qualifying event kind, in registration order.
    pub const ALL: [EventKind; 5] = [
        Self::KeyPress,
        Self::PointerMove,
        Self::TouchMove,
        Self::Click,
        Self::Scroll,
    ];

    /// Get the DOM event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeyPress => "keypress",
            Self::PointerMove => "mousemove",
            Self::TouchMove => "touchmove",
            Self::Click => "click",
            Self::Scroll => "scroll",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::KeyPress => 1,
            Self::PointerMove => 1 << 1,
            Self::TouchMove => 1 << 2,
            Self::Click => 1 << 3,
            Self::Scroll => 1 << 4,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name an event kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownEventKind(name.to_string()))
    }
}

/// A set of event kinds that a listener is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventKinds(u8);

impl EventKinds {
    /// The empty set.
    pub const NONE: EventKinds = EventKinds(0);

    /// The fixed set of qualifying kinds: key press, pointer move, touch move,
    /// click and scroll.
    pub const QUALIFYING: EventKinds = EventKinds(0b1_1111);

    pub fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: EventKind) {
        self.0 |= kind.bit();
    }

    /// Return a copy with `kind` added.
    #[must_use]
    pub fn with(mut self, kind: EventKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the kinds in the set, in registration order.
    pub fn iter(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<EventKind> for EventKinds {
    fn from_iter<I: IntoIterator<Item = EventKind>>(iter: I) -> Self {
        let mut kinds = Self::NONE;
        for kind in iter {
            kinds.insert(kind);
        }
        kinds
    }
}

impl fmt::Display for EventKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(EventKind::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
