//! idle-monitor - user idle detection for page-like documents.
//!
//! Listens for input events on a document, flips between active and inactive
//! after a silence window, and projects the state onto a page view.

pub mod activity;
pub mod config;
pub mod domain;
pub mod monitor;
pub mod surface;
pub mod view;

pub use crate::activity::ActivityState;
pub use crate::config::{Config, ConfigError, ViewConfig};
pub use crate::domain::{Activity, EventKind, EventKinds, UnknownEventKind};
pub use crate::monitor::{ActivityObserver, IdleMonitor, MonitorConfig};
pub use crate::surface::{Document, InputEvent, InputSurface, ListenerId};
pub use crate::view::{Element, Page, PageView, Selector, ViewError};
