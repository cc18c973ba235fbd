// crates/tableau-runtime/src/lib.rs

use anyhow::Context;
use glam::Vec2;
use tableau_core::{
    InitState, Node, NodeId, NodeKind, NodeTree, ResourceManager, Result, SceneHook, TableauError, TapEvent, TickContext,
};
use tableau_layout::{ConstraintLayoutEngine, LayoutEngine};
use tableau_render::{CommandRenderer, InputEvent, MouseButton, RenderResult, SceneRenderer};
use tracing::{debug, info, warn};

pub mod actions;
pub mod clock;
pub mod config;
pub mod debug;
pub mod navigator;
pub mod transition;

pub use actions::*;
pub use clock::*;
pub use config::*;
pub use debug::*;
pub use navigator::*;
pub use transition::*;

#[derive(Debug, Clone, Copy)]
enum SceneHookKind {
    Setup,
    Appear,
}

/// Hosts the registered scenes and drives them one frame at a time:
/// actions, transition bookkeeping, initialization, layout, then drawing.
pub struct Session<R: CommandRenderer> {
    // Core data
    tree: NodeTree,
    scenes: Vec<NodeId>,
    current: Option<NodeId>,
    resources: ResourceManager,

    // Systems
    transitions: TransitionMachine,
    layout_engine: Box<dyn LayoutEngine>,
    renderer: SceneRenderer<R>,
    navigator: Navigator,

    // State
    options: SessionOptions,
    clock: FrameClock,
}

impl<R: CommandRenderer> Session<R> {
    pub fn new(backend: R, options: SessionOptions) -> Self {
        let layout_engine = Box::new(ConstraintLayoutEngine::new().with_debug(options.debug_layout));
        Self::new_with_layout_engine(backend, options, layout_engine)
    }

    pub fn new_with_layout_engine(backend: R, options: SessionOptions, layout_engine: Box<dyn LayoutEngine>) -> Self {
        let renderer = SceneRenderer::new(backend, options.canvas_size());
        Self {
            tree: NodeTree::new(),
            scenes: Vec::new(),
            current: None,
            resources: ResourceManager::new(),
            transitions: TransitionMachine::new(),
            layout_engine,
            renderer,
            navigator: Navigator::new(),
            options,
            clock: FrameClock::new(),
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn renderer(&self) -> &SceneRenderer<R> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut SceneRenderer<R> {
        &mut self.renderer
    }

    /// A handle callbacks can keep to request scene changes.
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    pub fn current_scene(&self) -> Option<NodeId> {
        self.current
    }

    pub fn scenes(&self) -> &[NodeId] {
        &self.scenes
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitions.is_in_flight()
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    /// Registers a scene. A scene without a size is given the canvas size.
    pub fn add_scene(&mut self, mut scene: Node) -> Result<NodeId> {
        if !scene.is_scene() {
            return Err(TableauError::NotAScene(scene.name().to_string()));
        }
        if self.scene_named(scene.name()).is_some() {
            return Err(TableauError::DuplicateName {
                name: scene.name().to_string(),
                parent: "session".to_string(),
            });
        }
        if scene.size() == Vec2::ZERO {
            scene.set_size(self.options.canvas_size());
        }
        let id = self.tree.insert(scene)?;
        self.scenes.push(id);
        debug!("Registered scene '{}'", self.tree.get(id)?.name());
        Ok(id)
    }

    pub fn scene_named(&self, name: &str) -> Option<NodeId> {
        self.scenes
            .iter()
            .copied()
            .find(|&id| self.tree.get(id).is_ok_and(|scene| scene.name() == name))
    }

    /// Makes `scene` current.
    ///
    /// The scene's actions are re-armed and its `on_setup` hooks run before
    /// the transition starts; `on_appear` runs once it has finished, which
    /// for [`Transition::None`] is right away. A transition still in flight
    /// is completed first.
    pub fn present_scene(&mut self, scene: NodeId, transition: Transition) -> Result<()> {
        if !self.scenes.contains(&scene) {
            let name = self
                .tree
                .get(scene)
                .map(|node| node.name().to_string())
                .unwrap_or_else(|_| scene.to_string());
            return Err(TableauError::SceneNotRegistered(name));
        }

        if let Some(end) = self.transitions.finish_now(&mut self.tree)? {
            warn!("Presenting a scene mid-transition; finishing the previous transition first");
            self.run_scene_hooks(end.incoming, SceneHookKind::Appear)?;
        }

        let outgoing = self.current.filter(|&current| current != scene);
        let transition = if outgoing.is_some() { transition } else { Transition::None };

        self.tree.rearm_actions(scene)?;
        self.tree.get_mut(scene)?.position = Vec2::ZERO;
        self.run_scene_hooks(scene, SceneHookKind::Setup)?;

        self.current = Some(scene);
        info!("Presenting scene '{}' with {:?}", self.tree.get(scene)?.name(), transition);
        let finished = self
            .transitions
            .begin(&mut self.tree, outgoing, scene, transition, self.options.canvas_size())?;
        if finished {
            self.run_scene_hooks(scene, SceneHookKind::Appear)?;
        }
        Ok(())
    }

    pub fn present_scene_named(&mut self, name: &str, transition: Transition) -> Result<()> {
        let scene = self
            .scene_named(name)
            .ok_or_else(|| TableauError::SceneNotRegistered(name.to_string()))?;
        self.present_scene(scene, transition)
    }

    fn run_scene_hooks(&mut self, scene: NodeId, kind: SceneHookKind) -> Result<()> {
        let hooks: Vec<SceneHook> = match self.tree.get(scene)?.kind() {
            NodeKind::Scene(data) => match kind {
                SceneHookKind::Setup => data.on_setup.clone(),
                SceneHookKind::Appear => data.on_appear.clone(),
            },
            _ => Vec::new(),
        };
        debug!("Running {} {:?} hook(s) for {}", hooks.len(), kind, scene);
        self.tree
            .with_transient_actions(|tree| hooks.iter().try_for_each(|hook| hook.call(tree, scene)))
    }

    /// Scenes drawn and updated this frame: the outgoing scene of an
    /// in-flight transition, then the current one.
    pub fn live_scenes(&self) -> Vec<NodeId> {
        self.transitions
            .outgoing()
            .into_iter()
            .chain(self.current)
            .collect()
    }

    fn apply_scene_requests(&mut self) -> Result<()> {
        for request in self.navigator.take_pending() {
            self.present_scene_named(&request.scene, request.transition)?;
        }
        Ok(())
    }

    /// Root space to points, fitting the canvas inside the viewport.
    pub fn canvas_scale(&self) -> f32 {
        let canvas = self.options.canvas_size();
        if canvas.x <= 0.0 || canvas.y <= 0.0 || self.options.device_pixel_ratio <= 0.0 {
            return 1.0;
        }
        let viewport = self.renderer.viewport_size() / self.options.device_pixel_ratio;
        let scale = (viewport.x / canvas.x).min(viewport.y / canvas.y);
        if scale > 0.0 && scale.is_finite() {
            scale
        } else {
            1.0
        }
    }

    /// Root space to device pixels.
    pub fn device_scale(&self) -> f32 {
        self.canvas_scale() * self.options.device_pixel_ratio
    }

    /// Advances the session to `now` (milliseconds on the host clock).
    pub fn update(&mut self, now: f64) -> Result<TickContext> {
        self.apply_scene_requests()?;
        let ctx = self.clock.advance(now, self.canvas_scale());

        let in_flight = self.transitions.is_in_flight();
        for scene in self.live_scenes() {
            evaluate_subtree(&mut self.tree, scene, ctx.now, in_flight)?;
        }

        if let Some(end) = self.transitions.poll(&mut self.tree)? {
            info!("Transition to '{}' finished", self.tree.get(end.incoming)?.name());
            self.run_scene_hooks(end.incoming, SceneHookKind::Appear)?;
        }
        self.apply_scene_requests()?;

        for scene in self.live_scenes() {
            self.tree.initialize_pending(scene, &self.resources)?;
            self.layout_engine.update_transforms(&mut self.tree, scene, &ctx)?;
        }
        Ok(ctx)
    }

    pub fn draw(&mut self) -> RenderResult<()> {
        let scenes = self.live_scenes();
        let device_scale = self.device_scale();
        self.renderer
            .render_frame(&self.tree, &scenes, self.options.background_color(), device_scale)
    }

    /// One full frame.
    pub fn tick(&mut self, now: f64) -> anyhow::Result<()> {
        self.update(now).context("Failed to update session")?;
        self.draw().context("Failed to draw session")?;

        if self.clock.frame_count() % 60 == 0 {
            debug!("Frame {} at {:.0}ms", self.clock.frame_count(), now);
        }
        Ok(())
    }

    /// Delivers a tap at a device-pixel position to the topmost interactive
    /// node under it. Returns whether any listener ran.
    pub fn handle_tap(&mut self, device_point: Vec2) -> Result<bool> {
        if self.transitions.is_in_flight() {
            debug!("Ignoring tap during transition");
            return Ok(false);
        }
        let Some(scene) = self.current else {
            return Ok(false);
        };
        let device_scale = self.device_scale();
        if device_scale <= 0.0 {
            return Ok(false);
        }
        let point = device_point / device_scale;

        let mut delivered = false;
        for target in self.hit_test(scene, point)? {
            let node = self.tree.get(target)?;
            let scale = node.absolute_scale();
            if scale == 0.0 {
                continue;
            }
            let mut event = TapEvent::new(target, (point - node.absolute_min()) / scale);
            let listeners = node.tap_listeners().to_vec();

            for listener in listeners {
                self.tree.with_transient_actions(|tree| listener.call(&mut event, tree))?;
                delivered = true;
                if event.handled {
                    debug!("Tap handled by '{}'", self.tree.get(target).map(|n| n.name()).unwrap_or("?"));
                    self.apply_scene_requests()?;
                    return Ok(true);
                }
            }
            if !self.tree.contains(target) {
                break;
            }
        }
        self.apply_scene_requests()?;
        Ok(delivered)
    }

    /// Interactive, visible, initialized nodes containing `point`, topmost
    /// first.
    pub fn hit_test(&self, scene: NodeId, point: Vec2) -> Result<Vec<NodeId>> {
        let mut hits = Vec::new();
        let mut stack = vec![scene];
        while let Some(id) = stack.pop() {
            let node = self.tree.get(id)?;
            if node.is_hidden() {
                continue;
            }
            if node.is_interactive() && node.init_state() == InitState::Clean && node.contains_point(point) {
                hits.push((hits.len(), node.z_position, id));
            }
            stack.extend(node.children().iter().rev().copied());
        }
        // Later in tree order draws on top among equal z.
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.0.cmp(&a.0)));
        Ok(hits.into_iter().map(|(_, _, id)| id).collect())
    }

    pub fn handle_input(&mut self, event: InputEvent) -> anyhow::Result<()> {
        match event {
            InputEvent::Resize { size } => {
                self.renderer.resize(size)?;
            }
            InputEvent::MousePress {
                position,
                button: MouseButton::Left,
            } => {
                self.handle_tap(position)?;
            }
            _ => {}
        }
        Ok(())
    }
}
