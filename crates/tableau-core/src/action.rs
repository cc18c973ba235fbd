// crates/tableau-core/src/action.rs
use crate::{Easing, NodeId, NodeTree, Result};
use glam::Vec2;
use std::fmt;
use std::rc::Rc;

/// What a `custom` callback gets to work with. Changes it makes to the tree
/// take effect within the tick that runs it.
pub struct ActionContext<'a> {
    pub tree: &'a mut NodeTree,
    pub node: NodeId,
    pub now: f64,
}

#[derive(Clone)]
pub struct ActionCallback(Rc<dyn Fn(&mut ActionContext<'_>) -> Result<()>>);

impl ActionCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> Result<()> + 'static,
    {
        Self(Rc::new(callback))
    }

    pub fn call(&self, context: &mut ActionContext<'_>) -> Result<()> {
        (self.0)(context)
    }
}

impl fmt::Debug for ActionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionCallback(..)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Pending,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub enum ActionKind {
    Wait {
        duration: f64,
    },
    Move {
        to: Vec2,
        duration: f64,
        easing: Easing,
        /// Captured from the node the first time the action is evaluated.
        from: Option<Vec2>,
    },
    Scale {
        to: f32,
        duration: f64,
        easing: Easing,
        from: Option<f32>,
    },
    Custom {
        callback: ActionCallback,
    },
    Sequence {
        actions: Vec<Action>,
        current: usize,
    },
    Group {
        actions: Vec<Action>,
    },
}

/// A timed or one-shot unit of behavior attached to a node.
///
/// The start time is stamped lazily by the evaluator, so an action queued
/// on a node that is not being evaluated does not use up its duration.
#[derive(Debug, Clone)]
pub struct Action {
    pub kind: ActionKind,
    pub key: Option<String>,
    pub run_during_transition: bool,
    pub state: ActionState,
    pub run_start_time: Option<f64>,
    pub run_end_time: Option<f64>,
}

impl Action {
    fn from_kind(kind: ActionKind) -> Self {
        Self {
            kind,
            key: None,
            run_during_transition: false,
            state: ActionState::Pending,
            run_start_time: None,
            run_end_time: None,
        }
    }

    pub fn wait(duration: f64) -> Self {
        Self::from_kind(ActionKind::Wait { duration })
    }

    pub fn move_to(to: Vec2, duration: f64, easing: Easing) -> Self {
        Self::from_kind(ActionKind::Move {
            to,
            duration,
            easing,
            from: None,
        })
    }

    pub fn scale_to(to: f32, duration: f64, easing: Easing) -> Self {
        Self::from_kind(ActionKind::Scale {
            to,
            duration,
            easing,
            from: None,
        })
    }

    pub fn custom<F>(callback: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> Result<()> + 'static,
    {
        Self::from_kind(ActionKind::Custom {
            callback: ActionCallback::new(callback),
        })
    }

    pub fn sequence(actions: Vec<Action>) -> Self {
        Self::from_kind(ActionKind::Sequence { actions, current: 0 })
    }

    pub fn group(actions: Vec<Action>) -> Self {
        Self::from_kind(ActionKind::Group { actions })
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn run_during_transition(mut self) -> Self {
        self.run_during_transition = true;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.state == ActionState::Completed
    }

    /// Milliseconds since the action was first evaluated, or zero if it has
    /// not started.
    pub fn elapsed(&self, now: f64) -> f64 {
        self.run_start_time.map_or(0.0, |start| (now - start).max(0.0))
    }

    /// A copy back in its pending state, ready to run from scratch.
    pub fn rearmed(&self) -> Self {
        let mut action = self.clone();
        action.reset();
        action
    }

    fn reset(&mut self) {
        self.state = ActionState::Pending;
        self.run_start_time = None;
        self.run_end_time = None;
        match &mut self.kind {
            ActionKind::Move { from, .. } => *from = None,
            ActionKind::Scale { from, .. } => *from = None,
            ActionKind::Sequence { actions, current } => {
                *current = 0;
                actions.iter_mut().for_each(Action::reset);
            }
            ActionKind::Group { actions } => actions.iter_mut().for_each(Action::reset),
            ActionKind::Wait { .. } | ActionKind::Custom { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let action = Action::wait(250.0).with_key("pause").run_during_transition();
        assert_eq!(action.key.as_deref(), Some("pause"));
        assert!(action.run_during_transition);
        assert_eq!(action.state, ActionState::Pending);
        assert_eq!(action.elapsed(1000.0), 0.0);
    }

    #[test]
    fn test_rearmed_resets_nested_state() {
        let mut action = Action::sequence(vec![
            Action::move_to(Vec2::new(1.0, 1.0), 10.0, Easing::Linear),
            Action::wait(10.0),
        ]);
        action.state = ActionState::Completed;
        action.run_start_time = Some(5.0);
        if let ActionKind::Sequence { actions, current } = &mut action.kind {
            *current = 2;
            actions[0].state = ActionState::Completed;
            if let ActionKind::Move { from, .. } = &mut actions[0].kind {
                *from = Some(Vec2::ZERO);
            }
        }

        let fresh = action.rearmed();
        assert_eq!(fresh.state, ActionState::Pending);
        assert_eq!(fresh.run_start_time, None);
        let ActionKind::Sequence { actions, current } = &fresh.kind else {
            panic!("expected a sequence");
        };
        assert_eq!(*current, 0);
        assert_eq!(actions[0].state, ActionState::Pending);
        assert!(matches!(actions[0].kind, ActionKind::Move { from: None, .. }));
    }
}
