// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound notifications for tree, property and panel UIs.
//!
//! The core is single-threaded; events are accumulated in a plain queue
//! the host drains once per frame (or after each operation). Events are
//! emitted after the state change they describe, so a consumer reading
//! the queue always observes the core in the announced state.

use serde::{Deserialize, Serialize};

use bimview_scene::SceneGeneration;

use crate::ids::ElementId;
use crate::visibility::DisplayMode;

/// Notifications produced by the viewer facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ViewerEvent {
    /// A new scene became current.
    SceneAttached { generation: SceneGeneration },
    /// The current scene was dropped without a replacement.
    SceneDetached,
    /// The active selection changed; `None` means deselected. The id is
    /// absent for selected nodes that resolve to no element.
    SelectionChanged { id: Option<ElementId> },
    /// Visibility presentation changed (isolate, focus, show-all).
    IsolationChanged {
        ids: Vec<ElementId>,
        mode: DisplayMode,
    },
}

/// Vec-backed drain queue.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<ViewerEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: ViewerEvent) {
        self.events.push(event);
    }

    /// Removes and returns all pending events, oldest first.
    pub fn take(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
