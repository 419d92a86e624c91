//! # grid_pathfinder
//!
//! Interactive shortest-path search on a square obstacle grid. A user picks a start and a goal
//! cell, a uniform-cost search (Dijkstra with a lazily pruned binary heap) computes a minimum
//! hop-count route over orthogonally adjacent free cells, and the route is revealed one cell at
//! a time.
//!
//! The crate only holds the logic. A host loop converts window input into [Event]s, calls
//! [Session::tick] once per frame and draws whatever [Session::view] reports.
//!
//! ```
//! use grid_pathfinder::{Event, ObstacleGrid, Session, SessionConfig, InteractionState};
//! use grid_util::point::Point;
//! use std::time::Duration;
//!
//! let mut session = Session::new(ObstacleGrid::new(5), SessionConfig::default());
//! session.handle(Event::Select(Point::new(0, 0)));
//! session.handle(Event::Select(Point::new(4, 4)));
//! session.tick(Duration::from_millis(16));
//! assert_eq!(session.state(), InteractionState::Revealing);
//! assert_eq!(session.path().len(), 9);
//! ```
pub mod engine;
pub mod grid;
pub mod search;
pub mod session;

pub use engine::{find_path, is_valid_path, SearchResult, UNVISITED};
pub use grid::{ObstacleGrid, DEFAULT_GRID_SIZE};
pub use session::{
    pixel_to_cell, CellKind, Event, InteractionState, Session, SessionConfig, SessionView,
    StepCadence, CELL_SIZE,
};
