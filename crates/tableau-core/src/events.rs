// crates/tableau-core/src/events.rs
use crate::{NodeId, NodeTree, Result};
use glam::Vec2;
use std::fmt;
use std::rc::Rc;

/// A tap delivered to one node.
#[derive(Debug, Clone, PartialEq)]
pub struct TapEvent {
    pub target: NodeId,
    /// Relative to the node's top-left corner, in unscaled node units.
    pub point: Vec2,
    /// Set by a listener to stop the tap reaching nodes underneath.
    pub handled: bool,
}

impl TapEvent {
    pub fn new(target: NodeId, point: Vec2) -> Self {
        Self {
            target,
            point,
            handled: false,
        }
    }
}

type TapCallback = dyn Fn(&mut TapEvent, &mut NodeTree) -> Result<()>;

#[derive(Clone)]
pub struct TapListener {
    pub key: Option<String>,
    callback: Rc<TapCallback>,
}

impl TapListener {
    pub fn new<F>(key: Option<String>, callback: F) -> Self
    where
        F: Fn(&mut TapEvent, &mut NodeTree) -> Result<()> + 'static,
    {
        Self {
            key,
            callback: Rc::new(callback),
        }
    }

    pub fn call(&self, event: &mut TapEvent, tree: &mut NodeTree) -> Result<()> {
        (self.callback)(event, tree)
    }
}

impl fmt::Debug for TapListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapListener").field("key", &self.key).finish_non_exhaustive()
    }
}
