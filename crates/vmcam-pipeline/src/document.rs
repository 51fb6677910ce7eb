use crate::Canvas;
use std::collections::HashMap;

/// The host page: elements addressed by fixed identifiers.
pub trait Document {
    type Canvas: Canvas;

    /// Whether an element with `id` exists.
    fn has_element(&self, id: &str) -> bool;

    /// Hand the canvas with `id` over to the caller.
    fn take_canvas(&mut self, id: &str) -> Option<Self::Canvas>;

    /// Value of attribute `name` on element `element_id`.
    fn attribute(&self, element_id: &str, name: &str) -> Option<String>;
}

/// A `Document` assembled in code.
pub struct MemoryDocument<C> {
    canvases: HashMap<String, C>,
    attributes: HashMap<String, HashMap<String, String>>,
}

impl<C: Canvas> MemoryDocument<C> {
    pub fn new() -> Self {
        Self {
            canvases: HashMap::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_canvas(mut self, id: impl Into<String>, canvas: C) -> Self {
        self.canvases.insert(id.into(), canvas);
        self
    }

    /// Add a non-canvas element (e.g. the video element).
    pub fn with_element(mut self, id: impl Into<String>) -> Self {
        self.attributes.entry(id.into()).or_default();
        self
    }

    /// Set an attribute, creating the element if needed.
    pub fn with_attribute(
        mut self,
        element_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes
            .entry(element_id.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }
}

impl<C: Canvas> Default for MemoryDocument<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Canvas> Document for MemoryDocument<C> {
    type Canvas = C;

    fn has_element(&self, id: &str) -> bool {
        self.attributes.contains_key(id) || self.canvases.contains_key(id)
    }

    fn take_canvas(&mut self, id: &str) -> Option<C> {
        self.canvases.remove(id)
    }

    fn attribute(&self, element_id: &str, name: &str) -> Option<String> {
        self.attributes.get(element_id)?.get(name).cloned()
    }
}
