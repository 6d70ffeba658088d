//! The puzzle facade.
//!
//! [`OrangePuzzle`] owns the scene, the wedges, the animators and the frame
//! scheduler. The host feeds it pointer events and one `tick` per display
//! refresh, and listens for twist / solved notifications.
//!
//! - `registry`: wedge identity and ownership
//! - `layout`: slot hierarchy, ring spin, (re)initialisation
//! - `solved`: order check from world positions

pub mod layout;
pub mod registry;
pub mod solved;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::anim::twist::{TwistAnimator, TwistDirection, TwistOutcome, TwistProgress};
use crate::config::PuzzleConfig;
use crate::error::PuzzleError;
use crate::frame::{FrameLoop, FrameScheduler};
use crate::input::gesture::{GestureAction, GestureController, GesturePhase, GestureSettings, Swipe};
use crate::scene::pick::{pick_nearest, Camera, WedgeShape};
use crate::scene::SceneGraph;
use crate::session::{GameSession, SessionEvent};

use self::layout::{LayoutOutcome, RingLayout, SourceSolid};
use self::registry::PieceRegistry;
use self::solved::{check_solved, SolvedReport};

/// Why a twist request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    TwistInProgress,
    /// The wedge sources have not been loaded yet.
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwistStart {
    Started {
        start_slot: usize,
        direction: TwistDirection,
    },
    Ignored(IgnoreReason),
}

impl TwistStart {
    pub fn is_started(&self) -> bool {
        matches!(self, TwistStart::Started { .. })
    }
}

/// Wedges to tint while a twist is fresh (original indices).
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub primary: usize,
    pub secondary: Vec<usize>,
    /// Set by the first tick after the twist starts, like the twist clock.
    pub until_ms: Option<f64>,
}

type TwistListener = Box<dyn FnMut(&TwistOutcome)>;
type SolvedListener = Box<dyn FnMut(&SolvedReport)>;

pub struct OrangePuzzle {
    config: PuzzleConfig,
    scene: SceneGraph,
    registry: PieceRegistry,
    layout: RingLayout,
    animator: TwistAnimator,
    gesture: GestureController,
    frames: FrameScheduler,
    session: GameSession,
    camera: Camera,
    shape: WedgeShape,
    rng: StdRng,
    sources: Vec<SourceSolid>,
    /// Timestamp of the latest tick
    clock_ms: f64,
    highlight: Option<Highlight>,
    /// The running twist belongs to a scramble
    scramble_twist: bool,
    twist_listeners: Vec<TwistListener>,
    solved_listeners: Vec<SolvedListener>,
}

impl OrangePuzzle {
    /// An empty puzzle. Twists are ignored until [`load_sources`](Self::load_sources).
    pub fn new(config: PuzzleConfig) -> Result<Self, PuzzleError> {
        config.validate()?;
        let mut scene = SceneGraph::new();
        let layout = RingLayout::new(&mut scene, config.slices, config.gap)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            animator: TwistAnimator::new(config.twist_duration_ms),
            gesture: GestureController::new(GestureSettings::from_config(&config)),
            shape: WedgeShape::for_ring(config.radius, config.slices),
            scene,
            registry: PieceRegistry::new(),
            layout,
            frames: FrameScheduler::new(),
            session: GameSession::new(),
            camera: Camera::default(),
            rng,
            sources: Vec::new(),
            clock_ms: 0.0,
            highlight: None,
            scramble_twist: false,
            twist_listeners: Vec::new(),
            solved_listeners: Vec::new(),
            config,
        })
    }

    /// A puzzle laid out from numbered stand-in wedges.
    pub fn with_default_sources(config: PuzzleConfig) -> Result<Self, PuzzleError> {
        let mut puzzle = Self::new(config)?;
        let sources = SourceSolid::numbered(puzzle.config.slices);
        puzzle.load_sources(sources)?;
        Ok(puzzle)
    }

    /// Hand over the wedge models and lay them out. Too few sources defers.
    pub fn load_sources(&mut self, sources: Vec<SourceSolid>) -> Result<LayoutOutcome, PuzzleError> {
        self.sources = sources;
        self.rebuild()
    }

    /// Rebuild the ring from the sources, discarding in-flight animations.
    pub fn reset(&mut self) -> Result<LayoutOutcome, PuzzleError> {
        self.session.reset();
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<LayoutOutcome, PuzzleError> {
        self.frames.cancel_all();
        self.gesture.cancel();
        if self.animator.cancel().is_some() {
            log::debug!("puzzle: discarded twist in flight");
        }
        self.scramble_twist = false;
        self.highlight = None;
        self.layout.rebuild(
            &mut self.scene,
            &mut self.registry,
            &self.sources,
            &self.config.layout,
            &mut self.rng,
        )
    }

    /// Cancel every pending frame loop and drop the listeners.
    /// A twist cut short here stays in the pivot until the next `reset`.
    pub fn teardown(&mut self) {
        self.frames.cancel_all();
        self.gesture.cancel();
        self.highlight = None;
        self.twist_listeners.clear();
        self.solved_listeners.clear();
    }

    pub fn on_twist_complete<F>(&mut self, listener: F)
    where
        F: FnMut(&TwistOutcome) + 'static,
    {
        self.twist_listeners.push(Box::new(listener));
    }

    pub fn on_solved<F>(&mut self, listener: F)
    where
        F: FnMut(&SolvedReport) + 'static,
    {
        self.solved_listeners.push(Box::new(listener));
    }

    // ── Queries ──

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &RingLayout {
        &self.layout
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn is_ready(&self) -> bool {
        self.layout.is_built()
    }

    pub fn twist_in_progress(&self) -> bool {
        self.animator.is_active()
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    /// True while a frame loop is pending or a highlight is waiting to expire.
    pub fn is_animating(&self) -> bool {
        self.frames.has_pending() || self.highlight.is_some()
    }

    pub fn is_coasting(&self) -> bool {
        self.frames.is_pending(FrameLoop::Decay)
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Original index resting in each slot (`None` while carried by a twist).
    pub fn slot_contents(&self) -> Vec<Option<usize>> {
        self.registry.slot_contents(self.config.slices)
    }

    pub fn solved_report(&self) -> Result<SolvedReport, PuzzleError> {
        let samples = self.registry.samples(&self.scene)?;
        Ok(check_solved(&samples, self.config.solved))
    }

    pub fn is_solved(&self) -> Result<bool, PuzzleError> {
        Ok(self.solved_report()?.is_solved())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }

    // ── Spin & twist ──

    pub fn spin(&mut self, delta_yaw: f32) -> Result<(), PuzzleError> {
        self.layout.spin(&mut self.scene, delta_yaw)
    }

    /// Twist the arc selected by `slot`. `None` picks a random direction.
    pub fn begin_twist(
        &mut self,
        slot: usize,
        direction: Option<TwistDirection>,
    ) -> Result<TwistStart, PuzzleError> {
        let slices = self.config.slices;
        if slot >= slices {
            log::warn!("puzzle: twist on slot {} rejected, ring has {}", slot, slices);
            return Err(PuzzleError::InvalidSelection { index: slot, slices });
        }
        if let Some(reason) = self.busy() {
            return Ok(TwistStart::Ignored(reason));
        }
        let start = self
            .config
            .selection
            .arc_start(slot, self.config.twist_span(), slices);
        self.start_twist(start, slot, direction, false)
    }

    /// Twist starting from wherever wedge `original_index` currently rests.
    pub fn begin_twist_piece(
        &mut self,
        original_index: usize,
        direction: Option<TwistDirection>,
    ) -> Result<TwistStart, PuzzleError> {
        if original_index >= self.config.slices {
            return Err(PuzzleError::UnknownPiece { original_index });
        }
        if let Some(reason) = self.busy() {
            return Ok(TwistStart::Ignored(reason));
        }
        match self.registry.get(original_index)?.slot() {
            Some(slot) => self.begin_twist(slot, direction),
            None => Ok(TwistStart::Ignored(IgnoreReason::TwistInProgress)),
        }
    }

    /// Scramble with `scramble_moves` random twists, then start the game clock.
    pub fn start_scramble(&mut self) -> Result<TwistStart, PuzzleError> {
        if let Some(reason) = self.busy() {
            return Ok(TwistStart::Ignored(reason));
        }
        self.session.start_scramble(self.config.scramble_moves);
        self.random_twist()
    }

    fn busy(&self) -> Option<IgnoreReason> {
        if self.animator.is_active() {
            log::debug!("puzzle: twist ignored, another is running");
            Some(IgnoreReason::TwistInProgress)
        } else if !self.layout.is_built() {
            log::debug!("puzzle: twist ignored, wedges not loaded");
            Some(IgnoreReason::NotReady)
        } else {
            None
        }
    }

    fn random_twist(&mut self) -> Result<TwistStart, PuzzleError> {
        let start = self.rng.gen_range(0..self.config.slices);
        self.start_twist(start, start, None, true)
    }

    fn start_twist(
        &mut self,
        start_slot: usize,
        picked: usize,
        direction: Option<TwistDirection>,
        scramble: bool,
    ) -> Result<TwistStart, PuzzleError> {
        let direction = direction.unwrap_or_else(|| TwistDirection::random(&mut self.rng));

        // Stale coasting must not touch the ring once wedges are in the pivot.
        self.frames.cancel_loop(FrameLoop::Decay);
        self.gesture.cancel();

        let started = self.animator.begin(
            &mut self.scene,
            &mut self.registry,
            &self.layout,
            start_slot,
            direction,
        )?;
        if !started {
            return Ok(TwistStart::Ignored(IgnoreReason::TwistInProgress));
        }

        if let Some(twist) = self.animator.active() {
            let primary = twist
                .pieces
                .iter()
                .find(|(_, from)| *from == picked)
                .map_or(twist.pieces[0].0, |(idx, _)| *idx);
            self.highlight = Some(Highlight {
                primary,
                secondary: twist.original_indices().filter(|&i| i != primary).collect(),
                until_ms: None,
            });
        }
        self.scramble_twist = scramble;
        self.frames.request(FrameLoop::Twist);
        Ok(TwistStart::Started {
            start_slot,
            direction,
        })
    }

    // ── Frame loop ──

    /// Advance every pending loop to `now_ms`. Call once per display refresh.
    pub fn tick(&mut self, now_ms: f64) -> Result<(), PuzzleError> {
        self.clock_ms = now_ms;
        if let Some(highlight) = self.highlight.as_mut() {
            let until = *highlight
                .until_ms
                .get_or_insert(now_ms + self.config.highlight_ms);
            if now_ms >= until {
                self.highlight = None;
            }
        }
        for req in self.frames.take_due() {
            match req.kind() {
                FrameLoop::Twist => self.step_twist(now_ms)?,
                FrameLoop::Decay => self.step_decay()?,
            }
        }
        Ok(())
    }

    fn step_twist(&mut self, now_ms: f64) -> Result<(), PuzzleError> {
        match self
            .animator
            .advance(&mut self.scene, &mut self.registry, &self.layout, now_ms)?
        {
            Some(TwistProgress::Running { .. }) => {
                self.frames.request(FrameLoop::Twist);
            }
            Some(TwistProgress::Finished(outcome)) => self.finish_twist(&outcome, now_ms)?,
            None => {}
        }
        Ok(())
    }

    fn finish_twist(&mut self, outcome: &TwistOutcome, now_ms: f64) -> Result<(), PuzzleError> {
        let scramble = std::mem::take(&mut self.scramble_twist);
        for listener in self.twist_listeners.iter_mut() {
            listener(outcome);
        }

        let report = self.solved_report()?;
        match self.session.twist_completed(now_ms, report.is_solved()) {
            SessionEvent::ScrambleNext { remaining } => {
                log::debug!("puzzle: {} scramble twists to go", remaining);
                self.random_twist()?;
            }
            SessionEvent::ScrambleFinished => log::info!("puzzle: scramble finished"),
            SessionEvent::Solved { .. } | SessionEvent::None => {}
        }

        if !scramble && report.is_solved() {
            log::info!("puzzle: solved, order {:?}", report.order);
            for listener in self.solved_listeners.iter_mut() {
                listener(&report);
            }
        }
        Ok(())
    }

    fn step_decay(&mut self) -> Result<(), PuzzleError> {
        if let Some(velocity) = self.gesture.decay_step() {
            self.layout.spin(&mut self.scene, velocity)?;
            self.frames.request(FrameLoop::Decay);
        }
        Ok(())
    }

    // ── Pointer input ──

    pub fn pointer_down(&mut self, x: f32, y: f32) -> GestureAction {
        let action = self.gesture.pointer_down(x, y, self.animator.is_active());
        if action == GestureAction::BeginDrag && self.frames.cancel_loop(FrameLoop::Decay) {
            log::debug!("puzzle: press stopped the coasting ring");
        }
        action
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<GestureAction, PuzzleError> {
        let action = self.gesture.pointer_move(x, y);
        match action {
            GestureAction::Spin { delta_yaw } => self.spin(delta_yaw)?,
            GestureAction::Swipe(swipe) => {
                self.swipe_twist(swipe)?;
            }
            _ => {}
        }
        Ok(action)
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> Result<GestureAction, PuzzleError> {
        let action = self.gesture.pointer_up(x, y);
        match action {
            GestureAction::Tap { x, y } => {
                self.tap(x, y)?;
            }
            GestureAction::StartDecay { .. } => {
                self.frames.request(FrameLoop::Decay);
            }
            _ => {}
        }
        Ok(action)
    }

    pub fn pointer_leave(&mut self) -> GestureAction {
        let action = self.gesture.pointer_leave();
        if let GestureAction::StartDecay { .. } = action {
            self.frames.request(FrameLoop::Decay);
        }
        action
    }

    /// Ray-pick the wedge under `(x, y)` and twist from it.
    pub fn tap(&mut self, x: f32, y: f32) -> Result<Option<TwistStart>, PuzzleError> {
        let ray = self.camera.screen_ray(x, y);
        let candidates = self.registry.world_transforms(&self.scene)?;
        let Some(hit) = pick_nearest(&ray, &self.shape, candidates) else {
            log::debug!("puzzle: tap at ({:.0}, {:.0}) hit nothing", x, y);
            return Ok(None);
        };
        log::debug!("puzzle: tap hit wedge {} at {:.3}", hit.key, hit.distance);
        self.begin_twist_piece(hit.key, None).map(Some)
    }

    /// Twist the half of the ring lying furthest toward the swiped side of the screen.
    fn swipe_twist(&mut self, swipe: Swipe) -> Result<Option<TwistStart>, PuzzleError> {
        if let Some(reason) = self.busy() {
            return Ok(Some(TwistStart::Ignored(reason)));
        }
        let slices = self.config.slices;
        let span = self.config.twist_span();
        let eye = self.camera.eye();
        let right = self.camera.right();

        let mut side_x = Vec::with_capacity(slices);
        for slot in 0..slices {
            let piece = self
                .registry
                .piece_in_slot(slot)
                .ok_or_else(|| PuzzleError::InvalidLayout(format!("slot {} is empty", slot)))?;
            let pos = self.scene.world_position(piece.node())?;
            side_x.push((pos - eye).dot(right));
        }

        let left = swipe.start_x <= self.camera.viewport()[0] * 0.5;
        let arc_x = |start: usize| -> f32 { (0..span).map(|k| side_x[(start + k) % slices]).sum() };
        let mut best = 0;
        for start in 1..slices {
            let better = if left {
                arc_x(start) < arc_x(best)
            } else {
                arc_x(start) > arc_x(best)
            };
            if better {
                best = start;
            }
        }
        log::debug!(
            "puzzle: swipe {:?} on the {} side twists from slot {}",
            swipe.direction,
            if left { "left" } else { "right" },
            best
        );
        self.start_twist(best, best, Some(swipe.direction), false).map(Some)
    }
}
