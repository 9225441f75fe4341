//! Charts and canvases.

use super::{Component, ComponentKind};
use crate::config::RequestConfig;
use crate::locator::Locator;
use serde::{Deserialize, Serialize};

/// Rendering surface of a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GraphEntry {
    /// SVG or DOM chart
    Chart,
    /// `<canvas>` drawing
    Canvas,
}

/// Chart or canvas backed by a data request
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    base: Component,
    entries: Vec<GraphEntry>,
}

super::specialization!(Graph, default_actions);

impl Graph {
    /// Graph at `locator`
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        locator: impl Into<Locator>,
        entries: impl Into<Vec<GraphEntry>>,
    ) -> Self {
        Self {
            base: Component::new(ComponentKind::Graph, name).with_locator(locator),
            entries: entries.into(),
        }
    }

    /// Attach request declarations
    #[must_use]
    pub fn with_request(mut self, request: &RequestConfig) -> Self {
        self.base.apply_requests(request);
        self
    }

    /// Rendering surfaces
    #[must_use]
    pub fn entries(&self) -> &[GraphEntry] {
        &self.entries
    }

    /// Whether the graph draws on a canvas
    #[must_use]
    pub fn is_canvas(&self) -> bool {
        self.entries.contains(&GraphEntry::Canvas)
    }
}
