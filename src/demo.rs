// src/demo.rs
use glam::{Vec2, Vec4};
use std::cell::RefCell;
use std::rc::Rc;
use tableau_core::{Action, Constraints, Easing, Node, NodeId, NodeKind, NodeTree, Result};
use tableau_render::{color, CommandRenderer};
use tableau_runtime::{Navigator, Session, SlideDirection, Transition};
use tracing::info;

pub const INSTRUCTIONS_SCENE: &str = "instructions";
pub const DONE_SCENE: &str = "done";
pub const STAR_IMAGE: &str = "star";

const SLIDE_MS: f64 = 400.0;
const REVEAL_DELAY_MS: f64 = 300.0;
const CARD_SIZE: Vec2 = Vec2::new(120.0, 160.0);
const CARD_GAP: f32 = 40.0;

/// Cards shown on each trial, in the order they are laid out left to right.
pub const TRIALS: &[&[&str]] = &[&["circle", "square"], &["star", "circle", "square"]];

pub fn trial_scene_name(index: usize) -> String {
    format!("trial-{}", index + 1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub trial: String,
    pub card: String,
    /// Where on the card the tap landed, in card units.
    pub point: Vec2,
}

/// What the demo observed while it ran. Shared with the callbacks that
/// record into it.
#[derive(Debug, Clone, Default)]
pub struct DemoLog {
    choices: Rc<RefCell<Vec<Choice>>>,
    appeared: Rc<RefCell<Vec<String>>>,
}

impl DemoLog {
    pub fn choices(&self) -> Vec<Choice> {
        self.choices.borrow().clone()
    }

    /// Scene names in the order their `on_appear` hooks ran.
    pub fn appeared(&self) -> Vec<String> {
        self.appeared.borrow().clone()
    }
}

/// Registers the demo's resources and scenes and presents the instructions.
pub fn build_demo<R: CommandRenderer>(session: &mut Session<R>) -> Result<DemoLog> {
    let log = DemoLog::default();
    let navigator = session.navigator();
    let canvas = session.options().canvas_size();

    session.resources_mut().add_image(STAR_IMAGE, Vec2::new(64.0, 64.0));

    build_instructions(session, &navigator, &log)?;
    for (index, cards) in TRIALS.iter().enumerate() {
        let next = if index + 1 < TRIALS.len() {
            trial_scene_name(index + 1)
        } else {
            DONE_SCENE.to_string()
        };
        build_trial(session, &navigator, &log, index, cards, &next, canvas)?;
    }
    build_done(session, &navigator, &log)?;

    session.present_scene_named(INSTRUCTIONS_SCENE, Transition::none())?;
    info!("Demo ready with {} trial(s)", TRIALS.len());
    Ok(log)
}

fn recording_appear(log: &DemoLog, scene: Node) -> Node {
    let appeared = log.appeared.clone();
    let name = scene.name().to_string();
    scene.on_appear(move |_, _| {
        appeared.borrow_mut().push(name.clone());
        Ok(())
    })
}

fn build_instructions<R: CommandRenderer>(session: &mut Session<R>, navigator: &Navigator, log: &DemoLog) -> Result<()> {
    let scene = Node::scene(color::from_hex(0x1B2A41FF)).with_name(INSTRUCTIONS_SCENE);
    let scene = session.add_scene(recording_appear(log, scene))?;
    let tree = session.tree_mut();

    tree.add_child(
        scene,
        Node::label("Pick the card you like best")
            .with_name("title")
            .with_font_size(32.0)
            .with_layout(
                Constraints::new()
                    .top_to_top_of(INSTRUCTIONS_SCENE)
                    .margin_top(80.0)
                    .center_horizontally_in(INSTRUCTIONS_SCENE),
            ),
    )?;

    let start = tree.add_child(
        scene,
        Node::rect(Vec2::new(200.0, 60.0), color::from_hex(0x2E8B57FF))
            .with_name("start")
            .with_corner_radius(8.0)
            .interactive()
            .with_layout(
                Constraints::new()
                    .top_to_bottom_of("title")
                    .margin_top(60.0)
                    .center_horizontally_in(INSTRUCTIONS_SCENE),
            ),
    )?;
    tree.add_child(start, Node::label("Start").with_name("start-label").with_font_size(24.0))?;

    let first = trial_scene_name(0);
    let navigator = navigator.clone();
    tree.on_tap(start, move |event, _| {
        navigator.present(first.as_str(), Transition::slide(SlideDirection::Left, SLIDE_MS));
        event.handled = true;
        Ok(())
    })?;

    tree.run_action(
        start,
        Action::sequence(vec![
            Action::scale_to(1.1, 300.0, Easing::QuadOut),
            Action::scale_to(1.0, 300.0, Easing::QuadIn),
        ]),
    )?;
    Ok(())
}

fn card_color(card: &str) -> Vec4 {
    match card {
        "circle" => color::from_hex(0xE07A5FFF),
        "square" => color::from_hex(0x3D85C6FF),
        "star" => color::from_hex(0xF2CC8FFF),
        _ => color::GRAY,
    }
}

fn set_cards_hidden(tree: &mut NodeTree, scene: NodeId, hidden: bool) -> Result<()> {
    if let Some(cards) = tree.child_named(scene, "cards") {
        tree.get_mut(cards)?.set_hidden(hidden);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_trial<R: CommandRenderer>(
    session: &mut Session<R>,
    navigator: &Navigator,
    log: &DemoLog,
    index: usize,
    cards: &[&str],
    next: &str,
    canvas: Vec2,
) -> Result<()> {
    let name = trial_scene_name(index);

    // Cards stay hidden until the scene has settled and the reveal delay passed.
    let scene = Node::scene(color::from_hex(0x22313FFF))
        .with_name(name.as_str())
        .on_setup(|tree, scene| set_cards_hidden(tree, scene, true))
        .on_appear(|tree, scene| {
            tree.run_action(
                scene,
                Action::sequence(vec![
                    Action::wait(REVEAL_DELAY_MS),
                    Action::custom(|ctx| set_cards_hidden(ctx.tree, ctx.node, false)),
                ])
                .with_key("reveal"),
            )
        });
    let scene = session.add_scene(recording_appear(log, scene))?;
    let tree = session.tree_mut();

    tree.add_child(
        scene,
        Node::label(format!("Trial {}: pick a card", index + 1))
            .with_name("prompt")
            .with_font_size(28.0)
            .with_layout(
                Constraints::new()
                    .top_to_top_of(name.as_str())
                    .margin_top(40.0)
                    .center_horizontally_in(name.as_str()),
            ),
    )?;

    let row = cards.len() as f32 * CARD_SIZE.x + cards.len().saturating_sub(1) as f32 * CARD_GAP;
    let leading = ((canvas.x - row) / 2.0).max(0.0);
    let group = tree.add_child(scene, Node::group().with_name("cards"))?;

    // Inserted right to left so the layout pass has to order them itself.
    for (slot, card) in cards.iter().enumerate().rev() {
        let horizontal = if slot == 0 {
            Constraints::new().start_to_start_of(name.as_str()).margin_start(leading)
        } else {
            Constraints::new().start_to_end_of(cards[slot - 1]).margin_start(CARD_GAP)
        };
        let id = tree.add_child(
            group,
            Node::rect(CARD_SIZE, card_color(card))
                .with_name(*card)
                .with_stroke(color::WHITE, 2.0)
                .interactive()
                .with_layout(horizontal.center_vertically_in(name.as_str())),
        )?;
        tree.add_child(id, Node::label(*card).with_name(format!("{}-label", card)).with_font_size(20.0))?;

        let choices = log.choices.clone();
        let navigator = navigator.clone();
        let trial = name.clone();
        let card = card.to_string();
        let next = next.to_string();
        tree.on_tap(id, move |event, _| {
            info!("{}: picked '{}'", trial, card);
            choices.borrow_mut().push(Choice {
                trial: trial.clone(),
                card: card.clone(),
                point: event.point,
            });
            navigator.present(next.as_str(), Transition::slide(SlideDirection::Left, SLIDE_MS));
            event.handled = true;
            Ok(())
        })?;
    }
    Ok(())
}

fn build_done<R: CommandRenderer>(session: &mut Session<R>, navigator: &Navigator, log: &DemoLog) -> Result<()> {
    let choices = log.choices.clone();
    let scene = Node::scene(color::from_hex(0x1B2A41FF))
        .with_name(DONE_SCENE)
        .on_setup(move |tree, scene| {
            let picked: Vec<String> = choices.borrow().iter().map(|choice| choice.card.clone()).collect();
            if let Some(summary) = tree.child_named(scene, "summary") {
                if let NodeKind::Label(label) = tree.get_mut(summary)?.kind_mut() {
                    label.text = format!("You picked: {}", picked.join(", "));
                }
            }
            Ok(())
        });
    let scene = session.add_scene(recording_appear(log, scene))?;
    let tree = session.tree_mut();

    tree.add_child(
        scene,
        Node::label("All done")
            .with_name("summary")
            .with_font_size(28.0)
            .with_layout(
                Constraints::new()
                    .center_horizontally_in(DONE_SCENE)
                    .center_vertically_in(DONE_SCENE)
                    .vertical_bias(0.4),
            ),
    )?;
    tree.add_child(
        scene,
        Node::sprite(STAR_IMAGE).with_name("star").with_layout(
            Constraints::new()
                .top_to_bottom_of("summary")
                .margin_top(24.0)
                .center_horizontally_in(DONE_SCENE),
        ),
    )?;

    let again = tree.add_child(
        scene,
        Node::rect(Vec2::new(180.0, 50.0), color::GRAY)
            .with_name("again")
            .interactive()
            .with_layout(
                Constraints::new()
                    .bottom_to_bottom_of(DONE_SCENE)
                    .margin_bottom(60.0)
                    .center_horizontally_in(DONE_SCENE),
            ),
    )?;
    tree.add_child(again, Node::label("Again").with_name("again-label").with_font_size(20.0))?;

    let navigator = navigator.clone();
    tree.on_tap(again, move |event, _| {
        navigator.present(INSTRUCTIONS_SCENE, Transition::slide(SlideDirection::Right, SLIDE_MS));
        event.handled = true;
        Ok(())
    })
}

/// Device-pixel center of the named node in the current scene, for
/// scripted taps.
pub fn device_center<R: CommandRenderer>(session: &Session<R>, name: &str) -> Option<Vec2> {
    let scene = session.current_scene()?;
    let id = session.tree().find_descendant(scene, name)?;
    let node = session.tree().get(id).ok()?;
    Some(node.absolute_position() * session.device_scale())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_render::RecordingRenderer;
    use tableau_runtime::SessionOptions;

    fn demo() -> (Session<RecordingRenderer>, DemoLog) {
        let options = SessionOptions::default();
        let mut session = Session::new(RecordingRenderer::new(options.canvas_size()), options);
        let log = build_demo(&mut session).unwrap();
        (session, log)
    }

    #[test]
    fn test_demo_registers_every_scene() {
        let (session, log) = demo();
        assert_eq!(session.scenes().len(), TRIALS.len() + 2);
        assert_eq!(session.current_scene(), session.scene_named(INSTRUCTIONS_SCENE));
        assert_eq!(log.appeared(), vec![INSTRUCTIONS_SCENE.to_string()]);
    }

    #[test]
    fn test_trial_cards_are_laid_out_left_to_right() {
        let (mut session, _) = demo();
        let trial = session.scene_named("trial-2").unwrap();
        session.present_scene(trial, Transition::none()).unwrap();
        session.update(0.0).unwrap();

        let tree = session.tree();
        let x = |name: &str| {
            let id = tree.find_descendant(trial, name).unwrap();
            tree.get(id).unwrap().absolute_position().x
        };
        // 3 * 120 + 2 * 40 = 440 wide, centered on an 800 canvas.
        assert_eq!(x("star"), 240.0);
        assert_eq!(x("circle"), 400.0);
        assert_eq!(x("square"), 560.0);
    }
}
