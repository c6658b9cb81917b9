//! Change notifications for downstream listeners
//!
//! Notifications are fire-and-forget. The tag service hands them to the
//! notifier after its own transaction scope commits. When that scope is nested
//! inside a caller's transaction, this happens before the outer commit.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::debug;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    Add,
    Modify,
    Delete,
    Remove,
    /// Recheck everything; carries no ids
    Redraw,
}

/// What it happened to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    #[serde(rename = "tag")]
    Tag,
    #[serde(rename = "item-tag")]
    ItemTag,
    #[serde(rename = "item")]
    Item,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Event::Add => "add",
            Event::Modify => "modify",
            Event::Delete => "delete",
            Event::Remove => "remove",
            Event::Redraw => "redraw",
        };
        f.write_str(s)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Tag => "tag",
            EntityKind::ItemTag => "item-tag",
            EntityKind::Item => "item",
        };
        f.write_str(s)
    }
}

/// A single change notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub event: Event,
    pub kind: EntityKind,
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(event: Event, kind: EntityKind, ids: Vec<String>) -> Self {
        Self {
            event,
            kind,
            ids,
            data: None,
        }
    }

    /// Notification about tags, ids rendered as decimal
    pub fn tags(event: Event, ids: &[i64]) -> Self {
        Self::new(event, EntityKind::Tag, ids.iter().map(i64::to_string).collect())
    }

    /// Notification about item-tag links
    pub fn item_tags(event: Event, pairs: &[(i64, i64)]) -> Self {
        Self::new(
            event,
            EntityKind::ItemTag,
            pairs
                .iter()
                .map(|(item, tag)| item_tag_key(*item, *tag))
                .collect(),
        )
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Identifier of an item-tag link in notifications: `"{item}-{tag}"`
pub fn item_tag_key(item_id: i64, tag_id: i64) -> String {
    format!("{}-{}", item_id, tag_id)
}

/// Receiver of change notifications
pub trait Notifier {
    fn trigger(&self, notification: Notification);
}

/// Logs notifications through `tracing`
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn trigger(&self, notification: Notification) {
        debug!(
            event = %notification.event,
            kind = %notification.kind,
            ids = ?notification.ids,
            "notify"
        );
    }
}

/// Keeps every notification; clones share the same log
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    log: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far
    pub fn events(&self) -> Vec<Notification> {
        self.log.borrow().clone()
    }

    /// Recorded notifications matching an event and kind
    pub fn matching(&self, event: Event, kind: EntityKind) -> Vec<Notification> {
        self.log
            .borrow()
            .iter()
            .filter(|n| n.event == event && n.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn trigger(&self, notification: Notification) {
        self.log.borrow_mut().push(notification);
    }
}
