// crates/tableau-runtime/src/actions.rs
use tableau_core::{Action, ActionContext, ActionKind, ActionState, NodeId, NodeTree, Result};

/// Runs one tick of a node's action queue.
///
/// If the node has uncompleted transition-scoped actions, only those run.
/// Otherwise its ordinary actions run, unless a transition is in flight,
/// in which case they are held and do not even get a start time. Completed
/// actions are dropped from the queue afterwards.
pub fn evaluate_node(tree: &mut NodeTree, id: NodeId, now: f64, transition_in_flight: bool) -> Result<()> {
    if !tree.get(id)?.has_actions() {
        return Ok(());
    }

    let mut queue = tree.checkout_actions(id)?;
    let transition_pending = queue.iter().any(|a| !a.is_completed() && a.run_during_transition);

    let mut result = Ok(());
    for action in queue.iter_mut() {
        if action.is_completed() {
            continue;
        }
        let eligible = if transition_pending {
            action.run_during_transition
        } else {
            !transition_in_flight
        };
        if !eligible {
            continue;
        }
        result = advance(tree, id, action, now, now);
        if result.is_err() || !tree.contains(id) {
            break;
        }
    }

    queue.retain(|a| !a.is_completed());
    if tree.contains(id) {
        tree.return_actions(id, queue)?;
    }
    result
}

/// Evaluates every node of `root`'s subtree, parents first. Nodes removed
/// by an earlier callback in the same tick are skipped.
pub fn evaluate_subtree(tree: &mut NodeTree, root: NodeId, now: f64, transition_in_flight: bool) -> Result<()> {
    for id in tree.subtree(root) {
        if tree.contains(id) {
            evaluate_node(tree, id, now, transition_in_flight)?;
        }
    }
    Ok(())
}

fn complete(action: &mut Action, end: f64) {
    action.state = ActionState::Completed;
    action.run_end_time = Some(end);
}

/// Progress in [0, 1]. A non-positive duration is already finished.
fn progress(start: f64, duration: f64, now: f64) -> f64 {
    if duration <= 0.0 {
        1.0
    } else {
        ((now - start) / duration).clamp(0.0, 1.0)
    }
}

/// Advances one action. `start` is the time it starts at if this is its
/// first evaluation: the tick time for queued actions, or the previous
/// member's end time inside a sequence.
fn advance(tree: &mut NodeTree, id: NodeId, action: &mut Action, start: f64, now: f64) -> Result<()> {
    let start = *action.run_start_time.get_or_insert(start);
    action.state = ActionState::Running;

    match &mut action.kind {
        ActionKind::Wait { duration } => {
            let duration = *duration;
            if now - start >= duration {
                complete(action, start + duration.max(0.0));
            }
        }
        ActionKind::Move {
            to,
            duration,
            easing,
            from,
        } => {
            let (to, duration, easing) = (*to, *duration, *easing);
            let node = tree.get_mut(id)?;
            let from = *from.get_or_insert(node.position);
            let t = progress(start, duration, now);
            if t >= 1.0 {
                node.position = to;
                complete(action, start + duration.max(0.0));
            } else {
                node.position = from + (to - from) * easing.apply(t as f32);
            }
        }
        ActionKind::Scale {
            to,
            duration,
            easing,
            from,
        } => {
            let (to, duration, easing) = (*to, *duration, *easing);
            let node = tree.get_mut(id)?;
            let from = *from.get_or_insert(node.scale);
            let t = progress(start, duration, now);
            if t >= 1.0 {
                node.scale = to;
                complete(action, start + duration.max(0.0));
            } else {
                node.scale = from + (to - from) * easing.apply(t as f32);
            }
        }
        ActionKind::Custom { callback } => {
            let callback = callback.clone();
            tree.with_transient_actions(|tree| {
                let mut context = ActionContext { tree, node: id, now };
                callback.call(&mut context)
            })?;
            complete(action, start);
        }
        ActionKind::Sequence { actions, current } => {
            while *current < actions.len() {
                let member_start = match current.checked_sub(1) {
                    Some(previous) => actions[previous].run_end_time.unwrap_or(now),
                    None => start,
                };
                let member = &mut actions[*current];
                advance(tree, id, member, member_start, now)?;
                if !member.is_completed() || !tree.contains(id) {
                    break;
                }
                *current += 1;
            }
            if *current >= actions.len() {
                let end = actions.last().and_then(|a| a.run_end_time).unwrap_or(start);
                complete(action, end);
            }
        }
        ActionKind::Group { actions } => {
            for member in actions.iter_mut().filter(|a| !a.is_completed()) {
                advance(tree, id, member, start, now)?;
                if !tree.contains(id) {
                    return Ok(());
                }
            }
            if actions.iter().all(Action::is_completed) {
                let end = actions
                    .iter()
                    .filter_map(|a| a.run_end_time)
                    .fold(start, f64::max);
                complete(action, end);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};
    use std::cell::Cell;
    use std::rc::Rc;
    use tableau_core::{Easing, Node};

    fn tree_with_node() -> (NodeTree, NodeId) {
        let mut tree = NodeTree::new();
        let scene = tree.insert(Node::scene(Vec4::ONE).with_name("scene")).unwrap();
        let node = tree.add_child(scene, Node::group().with_name("node")).unwrap();
        (tree, node)
    }

    fn position(tree: &NodeTree, id: NodeId) -> Vec2 {
        tree.get(id).unwrap().position
    }

    #[test]
    fn test_move_interpolates_and_snaps() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(node, Action::move_to(Vec2::new(100.0, 0.0), 1000.0, Easing::Linear))
            .unwrap();

        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        assert_eq!(position(&tree, node), Vec2::ZERO);

        evaluate_node(&mut tree, node, 500.0, false).unwrap();
        assert_eq!(position(&tree, node), Vec2::new(50.0, 0.0));

        evaluate_node(&mut tree, node, 1000.0, false).unwrap();
        assert_eq!(position(&tree, node), Vec2::new(100.0, 0.0));
        assert!(!tree.get(node).unwrap().has_actions());
    }

    #[test]
    fn test_eased_move_lands_exactly_on_target() {
        let (mut tree, node) = tree_with_node();
        let target = Vec2::new(33.3, -17.9);
        tree.run_action(node, Action::move_to(target, 300.0, Easing::SineInOut))
            .unwrap();

        for now in [0.0, 70.0, 150.0, 299.0, 1234.0] {
            evaluate_node(&mut tree, node, now, false).unwrap();
        }
        assert_eq!(position(&tree, node), target);
    }

    #[test]
    fn test_scale_action() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(node, Action::scale_to(3.0, 100.0, Easing::Linear)).unwrap();
        evaluate_node(&mut tree, node, 10.0, false).unwrap();
        evaluate_node(&mut tree, node, 60.0, false).unwrap();
        assert_eq!(tree.get(node).unwrap().scale, 2.0);
        evaluate_node(&mut tree, node, 110.0, false).unwrap();
        assert_eq!(tree.get(node).unwrap().scale, 3.0);
    }

    #[test]
    fn test_remove_all_actions_from_own_callback_empties_queue() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(
            node,
            Action::custom(|ctx| ctx.tree.remove_all_actions(ctx.node)),
        )
        .unwrap();
        tree.run_action(node, Action::wait(1000.0).with_key("timer")).unwrap();
        tree.run_action(node, Action::move_to(Vec2::new(100.0, 0.0), 200.0, Easing::Linear))
            .unwrap();

        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        assert!(!tree.get(node).unwrap().has_actions());

        evaluate_node(&mut tree, node, 500.0, false).unwrap();
        assert_eq!(position(&tree, node), Vec2::ZERO);

        tree.rearm_actions(node).unwrap();
        assert!(!tree.get(node).unwrap().has_actions());
    }

    #[test]
    fn test_sequence_waits_then_fires_once() {
        let (mut tree, node) = tree_with_node();
        let calls = Rc::new(Cell::new(0));
        let fired_at = Rc::new(Cell::new(f64::NAN));
        let (counter, stamp) = (calls.clone(), fired_at.clone());
        tree.run_action(
            node,
            Action::sequence(vec![
                Action::wait(100.0),
                Action::custom(move |ctx| {
                    counter.set(counter.get() + 1);
                    stamp.set(ctx.now);
                    Ok(())
                }),
            ]),
        )
        .unwrap();

        let mut now = 0.0;
        while now < 300.0 {
            evaluate_node(&mut tree, node, now, false).unwrap();
            if now < 100.0 {
                assert_eq!(calls.get(), 0);
            }
            now += 7.0;
        }
        assert_eq!(calls.get(), 1);
        assert!(fired_at.get() >= 100.0);
    }

    #[test]
    fn test_sequence_hands_exact_end_time_to_next_member() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(
            node,
            Action::sequence(vec![
                Action::wait(100.0),
                Action::move_to(Vec2::new(100.0, 0.0), 100.0, Easing::Linear),
            ]),
        )
        .unwrap();

        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        // One long tick: the wait ended at 100, so the move is already halfway.
        evaluate_node(&mut tree, node, 150.0, false).unwrap();
        assert_eq!(position(&tree, node), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_group_runs_members_together() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(
            node,
            Action::group(vec![
                Action::move_to(Vec2::new(10.0, 0.0), 100.0, Easing::Linear),
                Action::scale_to(2.0, 200.0, Easing::Linear),
            ]),
        )
        .unwrap();

        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        evaluate_node(&mut tree, node, 100.0, false).unwrap();
        assert_eq!(position(&tree, node), Vec2::new(10.0, 0.0));
        assert_eq!(tree.get(node).unwrap().scale, 1.5);
        assert!(tree.get(node).unwrap().has_actions());

        evaluate_node(&mut tree, node, 200.0, false).unwrap();
        assert!(!tree.get(node).unwrap().has_actions());
    }

    #[test]
    fn test_ordinary_actions_held_while_transition_actions_run() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(node, Action::wait(50.0).with_key("ordinary")).unwrap();
        tree.run_action(
            node,
            Action::move_to(Vec2::new(10.0, 0.0), 100.0, Easing::Linear).run_during_transition(),
        )
        .unwrap();

        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        evaluate_node(&mut tree, node, 60.0, false).unwrap();
        let ordinary = &tree.get(node).unwrap().actions()[0];
        assert_eq!(ordinary.run_start_time, None);
        assert_eq!(ordinary.elapsed(60.0), 0.0);

        evaluate_node(&mut tree, node, 100.0, false).unwrap();
        evaluate_node(&mut tree, node, 120.0, false).unwrap();
        let ordinary = &tree.get(node).unwrap().actions()[0];
        assert_eq!(ordinary.run_start_time, Some(120.0));
    }

    #[test]
    fn test_in_flight_transition_holds_plain_nodes() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(node, Action::wait(10.0)).unwrap();
        evaluate_node(&mut tree, node, 0.0, true).unwrap();
        evaluate_node(&mut tree, node, 50.0, true).unwrap();
        assert_eq!(tree.get(node).unwrap().actions()[0].run_start_time, None);

        evaluate_node(&mut tree, node, 60.0, false).unwrap();
        evaluate_node(&mut tree, node, 70.0, false).unwrap();
        assert!(!tree.get(node).unwrap().has_actions());
    }

    #[test]
    fn test_run_appends_and_callbacks_can_queue_more() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(
            node,
            Action::custom(|ctx| ctx.tree.run_action(ctx.node, Action::wait(5.0).with_key("spawned"))),
        )
        .unwrap();
        tree.run_action(node, Action::wait(1000.0).with_key("long")).unwrap();

        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        let keys: Vec<_> = tree
            .get(node)
            .unwrap()
            .actions()
            .iter()
            .filter_map(|a| a.key.clone())
            .collect();
        assert_eq!(keys, vec!["long", "spawned"]);
    }

    #[test]
    fn test_callback_may_remove_its_own_node() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(node, Action::custom(|ctx| ctx.tree.remove_subtree(ctx.node)))
            .unwrap();
        tree.run_action(node, Action::wait(1.0)).unwrap();

        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        assert!(!tree.contains(node));
    }

    #[test]
    fn test_removed_key_is_gone_next_tick() {
        let (mut tree, node) = tree_with_node();
        tree.run_action(node, Action::move_to(Vec2::new(100.0, 0.0), 100.0, Easing::Linear).with_key("slide"))
            .unwrap();
        evaluate_node(&mut tree, node, 0.0, false).unwrap();
        evaluate_node(&mut tree, node, 50.0, false).unwrap();
        assert!(tree.remove_action(node, "slide").unwrap());

        evaluate_node(&mut tree, node, 100.0, false).unwrap();
        assert_eq!(position(&tree, node), Vec2::new(50.0, 0.0));
    }
}
