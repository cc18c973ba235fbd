// crates/tableau-runtime/src/navigator.rs
use crate::Transition;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct SceneRequest {
    pub scene: String,
    pub transition: Transition,
}

/// Handle that callbacks use to ask the session for a scene change. Tap
/// listeners and custom actions only see the node tree, so they queue the
/// request here and the session presents it on its next update.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    pending: Rc<RefCell<VecDeque<SceneRequest>>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&self, scene: impl Into<String>, transition: Transition) {
        self.pending.borrow_mut().push_back(SceneRequest {
            scene: scene.into(),
            transition,
        });
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    pub(crate) fn take_pending(&self) -> Vec<SceneRequest> {
        self.pending.borrow_mut().drain(..).collect()
    }
}
