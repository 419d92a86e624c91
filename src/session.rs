//! The interaction state machine: collects start and goal picks, runs the search and reveals the
//! resulting path one cell at a time. The host loop feeds it [Event]s and calls
//! [Session::tick] once per frame; rendering reads [Session::view].
use core::fmt;
use std::time::Duration;

use grid_util::point::Point;
use log::{debug, info, trace};
use smallvec::SmallVec;

use crate::engine::find_path;
use crate::grid::ObstacleGrid;

/// Edge length of a cell in pixels.
pub const CELL_SIZE: f32 = 16.0;
/// Ticks per reveal step with the frame-based cadence.
pub const DEFAULT_STEP_FRAMES: u32 = 8;
/// Time per reveal step with the timer-based cadence.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionState {
    Picking,
    Searching,
    Revealing,
    Error,
}

/// Normalized input. Pointer positions are converted to grid cells by the host, see
/// [pixel_to_cell].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Select(Point),
    Key,
    Closed,
}

/// How fast the reveal cursor advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCadence {
    /// One step every `n` ticks, regardless of the elapsed time.
    Frames(u32),
    /// One step per interval of accumulated tick time.
    Interval(Duration),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub cadence: StepCadence,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            cadence: StepCadence::Frames(DEFAULT_STEP_FRAMES),
        }
    }
}

/// How a cell should be drawn, in order of precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Start,
    Goal,
    Blocked,
    Path,
    Free,
}

#[derive(Clone, Copy, Debug, Default)]
struct Reveal {
    cursor: usize,
    frames: u32,
    elapsed: Duration,
}

/// Owns the grid together with everything the interaction needs.
#[derive(Clone, Debug)]
pub struct Session {
    grid: ObstacleGrid,
    config: SessionConfig,
    state: InteractionState,
    picks: SmallVec<[Point; 2]>,
    path: Vec<Point>,
    reveal: Reveal,
    failed_searches: usize,
    closed: bool,
}

impl Session {
    pub fn new(grid: ObstacleGrid, config: SessionConfig) -> Session {
        Session {
            grid,
            config,
            state: InteractionState::Picking,
            picks: SmallVec::new(),
            path: Vec::new(),
            reveal: Reveal::default(),
            failed_searches: 0,
            closed: false,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn grid(&self) -> &ObstacleGrid {
        &self.grid
    }

    pub fn picks(&self) -> &[Point] {
        &self.picks
    }

    /// The path being revealed; empty outside of [InteractionState::Revealing].
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Number of searches that ended without a path.
    pub fn failed_searches(&self) -> usize {
        self.failed_searches
    }

    /// Whether the host reported that the window was closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Index of the last revealed path cell while revealing.
    pub fn cursor(&self) -> Option<usize> {
        (self.state == InteractionState::Revealing).then_some(self.reveal.cursor)
    }

    /// Whether the reveal reached the goal. It then holds until the session is reset.
    pub fn reveal_complete(&self) -> bool {
        self.state == InteractionState::Revealing && self.reveal.cursor + 1 >= self.path.len()
    }

    pub fn handle(&mut self, event: Event) {
        match (self.state, event) {
            (_, Event::Closed) => {
                info!("Window closed");
                self.closed = true;
            }
            (InteractionState::Picking, Event::Select(p)) => self.pick(p),
            (InteractionState::Error, Event::Select(_) | Event::Key) => {
                info!("Retrying after failed search");
                self.reset();
            }
            (state, event) => trace!("Ignoring {:?} while {:?}", event, state),
        }
    }

    /// Advances the session by one frame that took `dt`.
    pub fn tick(&mut self, dt: Duration) {
        match self.state {
            InteractionState::Searching => self.search(),
            InteractionState::Revealing => self.advance(dt),
            InteractionState::Picking | InteractionState::Error => {}
        }
    }

    /// Drops picks and path and returns to picking on the same grid.
    pub fn reset(&mut self) {
        self.picks.clear();
        self.path.clear();
        self.reveal = Reveal::default();
        self.set_state(InteractionState::Picking);
    }

    fn set_state(&mut self, state: InteractionState) {
        if self.state != state {
            info!("{:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn pick(&mut self, p: Point) {
        debug_assert!(self.grid.in_bounds(p), "{} lies outside the grid", p);
        debug!("Picked {}", p);
        self.picks.push(p);
        self.grid.clear(p);
        if self.picks.len() == 2 {
            self.set_state(InteractionState::Searching);
        }
    }

    fn search(&mut self) {
        let (start, goal) = (self.picks[0], self.picks[1]);
        self.grid.update();
        match find_path(&self.grid, start, goal).path() {
            Some(path) => {
                self.path = path;
                self.reveal = Reveal::default();
                self.set_state(InteractionState::Revealing);
            }
            None => {
                self.failed_searches += 1;
                self.set_state(InteractionState::Error);
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        let last = self.path.len().saturating_sub(1);
        if self.reveal.cursor >= last {
            return;
        }
        match self.config.cadence {
            StepCadence::Frames(n) => {
                self.reveal.frames += 1;
                if self.reveal.frames >= n.max(1) {
                    self.reveal.frames = 0;
                    self.reveal.cursor += 1;
                }
            }
            StepCadence::Interval(step) if step.is_zero() => self.reveal.cursor = last,
            StepCadence::Interval(step) => {
                self.reveal.elapsed += dt;
                while self.reveal.elapsed >= step && self.reveal.cursor < last {
                    self.reveal.elapsed -= step;
                    self.reveal.cursor += 1;
                }
            }
        }
        trace!("Reveal cursor at {}/{}", self.reveal.cursor, last);
        if self.reveal.cursor >= last {
            self.reveal.frames = 0;
            self.reveal.elapsed = Duration::ZERO;
            info!("Path of {} cells fully revealed", self.path.len());
        }
    }

    /// Progress from the current path cell towards the next one, in [0, 1].
    fn step_fraction(&self) -> f32 {
        let t = match self.config.cadence {
            StepCadence::Frames(n) => self.reveal.frames as f32 / n.max(1) as f32,
            StepCadence::Interval(step) if step.is_zero() => 0.0,
            StepCadence::Interval(step) => {
                self.reveal.elapsed.as_secs_f32() / step.as_secs_f32()
            }
        };
        t.clamp(0.0, 1.0)
    }

    /// Position of the moving marker in cell units, interpolated between the current and the
    /// next path cell. Rests on the goal once the reveal is complete.
    pub fn marker_position(&self) -> Option<(f32, f32)> {
        if self.state != InteractionState::Revealing {
            return None;
        }
        let current = *self.path.get(self.reveal.cursor)?;
        let Some(next) = self.path.get(self.reveal.cursor + 1) else {
            return Some((current.x as f32, current.y as f32));
        };
        let t = self.step_fraction();
        Some((
            current.x as f32 + (next.x - current.x) as f32 * t,
            current.y as f32 + (next.y - current.y) as f32 * t,
        ))
    }

    pub fn view(&self) -> SessionView<'_> {
        let revealed = match self.cursor() {
            Some(cursor) => &self.path[..=cursor.min(self.path.len().saturating_sub(1))],
            None => &[],
        };
        SessionView {
            state: self.state,
            grid: &self.grid,
            picks: &self.picks,
            path: &self.path,
            revealed,
            cursor: self.cursor(),
            marker: self.marker_position(),
        }
    }
}

/// Read-only snapshot of a [Session] for drawing one frame.
#[derive(Clone, Copy, Debug)]
pub struct SessionView<'a> {
    pub state: InteractionState,
    pub grid: &'a ObstacleGrid,
    pub picks: &'a [Point],
    pub path: &'a [Point],
    pub revealed: &'a [Point],
    pub cursor: Option<usize>,
    pub marker: Option<(f32, f32)>,
}

impl SessionView<'_> {
    pub fn cell_kind(&self, p: Point) -> CellKind {
        if self.picks.first() == Some(&p) {
            CellKind::Start
        } else if self.picks.get(1) == Some(&p) {
            CellKind::Goal
        } else if self.grid.is_blocked(p) {
            CellKind::Blocked
        } else if self.revealed.contains(&p) {
            CellKind::Path
        } else {
            CellKind::Free
        }
    }
}

impl fmt::Display for SessionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let n = self.grid.size() as i32;
        for y in 0..n {
            let line = (0..n)
                .map(|x| match self.cell_kind(Point::new(x, y)) {
                    CellKind::Start => 'S',
                    CellKind::Goal => 'G',
                    CellKind::Blocked => '#',
                    CellKind::Path => '*',
                    CellKind::Free => '.',
                })
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Maps a pointer position in pixels to the cell under it, clamped onto a `size` x `size` grid.
pub fn pixel_to_cell(px: f32, py: f32, cell_size: f32, size: usize) -> Point {
    let max = size.saturating_sub(1) as i32;
    let to_cell = |v: f32| ((v / cell_size) as i32).clamp(0, max);
    Point::new(to_cell(px), to_cell(py))
}
