// crates/tableau-runtime/src/transition.rs
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use tableau_core::{Action, Easing, NodeId, NodeTree, Result};
use tracing::debug;

/// Key of the actions a slide puts on the two scenes.
pub const TRANSITION_ACTION_KEY: &str = "tableau.transition";

/// Which way the content moves. With `Left` the outgoing scene leaves over
/// the left edge and the incoming one enters from the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SlideDirection {
    /// Where the incoming scene starts, relative to the origin.
    pub fn entry_offset(self, canvas_size: Vec2) -> Vec2 {
        match self {
            SlideDirection::Left => Vec2::new(canvas_size.x, 0.0),
            SlideDirection::Right => Vec2::new(-canvas_size.x, 0.0),
            SlideDirection::Up => Vec2::new(0.0, canvas_size.y),
            SlideDirection::Down => Vec2::new(0.0, -canvas_size.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Transition {
    /// Instant swap.
    #[default]
    None,
    Slide {
        direction: SlideDirection,
        duration: f64,
        easing: Easing,
    },
}

impl Transition {
    pub fn none() -> Self {
        Transition::None
    }

    pub fn slide(direction: SlideDirection, duration: f64) -> Self {
        Transition::Slide {
            direction,
            duration,
            easing: Easing::SineInOut,
        }
    }

    pub fn with_easing(self, easing: Easing) -> Self {
        match self {
            Transition::Slide { direction, duration, .. } => Transition::Slide {
                direction,
                duration,
                easing,
            },
            Transition::None => Transition::None,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum TransitionState {
    #[default]
    Idle,
    Transitioning {
        outgoing: Option<NodeId>,
        incoming: NodeId,
        completed: Rc<Cell<bool>>,
    },
}

/// The scenes involved in a transition that just ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEnd {
    pub outgoing: Option<NodeId>,
    pub incoming: NodeId,
}

/// `Idle -> Transitioning -> Idle`. Both scenes are live while
/// transitioning; the session stops drawing the outgoing one once the
/// machine is idle again.
#[derive(Debug, Default)]
pub struct TransitionMachine {
    state: TransitionState,
}

impl TransitionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, TransitionState::Transitioning { .. })
    }

    pub fn outgoing(&self) -> Option<NodeId> {
        match &self.state {
            TransitionState::Transitioning { outgoing, .. } => *outgoing,
            TransitionState::Idle => None,
        }
    }

    /// Starts moving from `outgoing` to `incoming`. Returns `true` when the
    /// swap is already complete (no animation).
    pub fn begin(
        &mut self,
        tree: &mut NodeTree,
        outgoing: Option<NodeId>,
        incoming: NodeId,
        transition: Transition,
        canvas_size: Vec2,
    ) -> Result<bool> {
        let outgoing = outgoing.filter(|&scene| scene != incoming);
        match transition {
            Transition::None => {
                tree.get_mut(incoming)?.position = Vec2::ZERO;
                if let Some(scene) = outgoing {
                    tree.get_mut(scene)?.position = Vec2::ZERO;
                }
                self.state = TransitionState::Idle;
                Ok(true)
            }
            Transition::Slide {
                direction,
                duration,
                easing,
            } => {
                let offset = direction.entry_offset(canvas_size);
                let completed = Rc::new(Cell::new(false));
                let flag = completed.clone();

                tree.get_mut(incoming)?.position = offset;
                tree.with_transient_actions(|tree| -> Result<()> {
                    tree.run_action(
                        incoming,
                        Action::sequence(vec![
                            Action::move_to(Vec2::ZERO, duration, easing),
                            Action::custom(move |_| {
                                flag.set(true);
                                Ok(())
                            }),
                        ])
                        .run_during_transition()
                        .with_key(TRANSITION_ACTION_KEY),
                    )?;
                    if let Some(scene) = outgoing {
                        tree.run_action(
                            scene,
                            Action::move_to(-offset, duration, easing)
                                .run_during_transition()
                                .with_key(TRANSITION_ACTION_KEY),
                        )?;
                    }
                    Ok(())
                })?;

                debug!("Slide {:?} over {}ms started", direction, duration);
                self.state = TransitionState::Transitioning {
                    outgoing,
                    incoming,
                    completed,
                };
                Ok(false)
            }
        }
    }

    /// Checks whether the incoming scene's slide has landed and, if so,
    /// returns to idle.
    pub fn poll(&mut self, tree: &mut NodeTree) -> Result<Option<TransitionEnd>> {
        match &self.state {
            TransitionState::Transitioning {
                outgoing,
                incoming,
                completed,
            } if completed.get() => {
                let end = TransitionEnd {
                    outgoing: *outgoing,
                    incoming: *incoming,
                };
                self.finish(tree, end).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Ends an in-flight transition immediately, snapping the incoming scene
    /// into place.
    pub fn finish_now(&mut self, tree: &mut NodeTree) -> Result<Option<TransitionEnd>> {
        match &self.state {
            TransitionState::Transitioning { outgoing, incoming, .. } => {
                let end = TransitionEnd {
                    outgoing: *outgoing,
                    incoming: *incoming,
                };
                if let Ok(node) = tree.get_mut(end.incoming) {
                    node.position = Vec2::ZERO;
                }
                self.finish(tree, end).map(Some)
            }
            TransitionState::Idle => Ok(None),
        }
    }

    fn finish(&mut self, tree: &mut NodeTree, end: TransitionEnd) -> Result<TransitionEnd> {
        self.state = TransitionState::Idle;
        for scene in end.outgoing.into_iter().chain(Some(end.incoming)) {
            if tree.contains(scene) {
                tree.remove_action(scene, TRANSITION_ACTION_KEY)?;
            }
        }
        if let Some(node) = end.outgoing.and_then(|scene| tree.get_mut(scene).ok()) {
            node.position = Vec2::ZERO;
        }
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate_subtree;
    use glam::Vec4;
    use tableau_core::Node;

    fn two_scenes() -> (NodeTree, NodeId, NodeId) {
        let mut tree = NodeTree::new();
        let size = Vec2::new(400.0, 300.0);
        let a = tree.insert(Node::scene(Vec4::ONE).with_name("a").with_size(size)).unwrap();
        let b = tree.insert(Node::scene(Vec4::ONE).with_name("b").with_size(size)).unwrap();
        (tree, a, b)
    }

    #[test]
    fn test_entry_offsets() {
        let canvas = Vec2::new(400.0, 300.0);
        assert_eq!(SlideDirection::Left.entry_offset(canvas), Vec2::new(400.0, 0.0));
        assert_eq!(SlideDirection::Right.entry_offset(canvas), Vec2::new(-400.0, 0.0));
        assert_eq!(SlideDirection::Up.entry_offset(canvas), Vec2::new(0.0, 300.0));
        assert_eq!(SlideDirection::Down.entry_offset(canvas), Vec2::new(0.0, -300.0));
    }

    #[test]
    fn test_none_completes_immediately() {
        let (mut tree, a, b) = two_scenes();
        let mut machine = TransitionMachine::new();
        assert!(machine.begin(&mut tree, Some(a), b, Transition::none(), Vec2::new(400.0, 300.0)).unwrap());
        assert!(!machine.is_in_flight());
    }

    #[test]
    fn test_slide_runs_to_completion() {
        let (mut tree, a, b) = two_scenes();
        let mut machine = TransitionMachine::new();
        let slide = Transition::slide(SlideDirection::Left, 200.0).with_easing(Easing::Linear);
        assert!(!machine.begin(&mut tree, Some(a), b, slide, Vec2::new(400.0, 300.0)).unwrap());
        assert_eq!(tree.get(b).unwrap().position, Vec2::new(400.0, 0.0));
        assert_eq!(machine.outgoing(), Some(a));

        for now in [0.0, 100.0] {
            evaluate_subtree(&mut tree, a, now, true).unwrap();
            evaluate_subtree(&mut tree, b, now, true).unwrap();
            assert_eq!(machine.poll(&mut tree).unwrap(), None);
        }
        assert_eq!(tree.get(a).unwrap().position, Vec2::new(-200.0, 0.0));
        assert_eq!(tree.get(b).unwrap().position, Vec2::new(200.0, 0.0));

        evaluate_subtree(&mut tree, a, 200.0, true).unwrap();
        evaluate_subtree(&mut tree, b, 200.0, true).unwrap();
        let end = machine.poll(&mut tree).unwrap();
        assert_eq!(end, Some(TransitionEnd { outgoing: Some(a), incoming: b }));
        assert!(!machine.is_in_flight());
        assert_eq!(tree.get(b).unwrap().position, Vec2::ZERO);
        assert_eq!(tree.get(a).unwrap().position, Vec2::ZERO);
        assert!(!tree.get(a).unwrap().has_actions());
        assert!(!tree.get(b).unwrap().has_actions());
    }

    #[test]
    fn test_finish_now_snaps_and_clears() {
        let (mut tree, a, b) = two_scenes();
        let mut machine = TransitionMachine::new();
        machine
            .begin(&mut tree, Some(a), b, Transition::slide(SlideDirection::Up, 500.0), Vec2::new(400.0, 300.0))
            .unwrap();
        evaluate_subtree(&mut tree, b, 0.0, true).unwrap();

        let end = machine.finish_now(&mut tree).unwrap();
        assert_eq!(end.map(|e| e.incoming), Some(b));
        assert_eq!(tree.get(b).unwrap().position, Vec2::ZERO);
        assert!(!tree.get(b).unwrap().has_actions());
        assert_eq!(machine.finish_now(&mut tree).unwrap(), None);
    }
}
