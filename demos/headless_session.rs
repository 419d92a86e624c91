use grid_pathfinder::{
    pixel_to_cell, Event, InteractionState, ObstacleGrid, Session, SessionConfig, CELL_SIZE,
    DEFAULT_GRID_SIZE,
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

// Drives a session the way a window loop would: two clicks in pixel space, then one tick per
// 60 Hz frame until the path is fully revealed.
fn main() {
    let mut rng = StdRng::seed_from_u64(2024);
    let grid = ObstacleGrid::random(DEFAULT_GRID_SIZE, &mut rng);
    let mut session = Session::new(grid, SessionConfig::default());

    let window = DEFAULT_GRID_SIZE as f32 * CELL_SIZE;
    for (px, py) in [(4.0, 4.0), (window - 4.0, window - 4.0)] {
        let cell = pixel_to_cell(px, py, CELL_SIZE, DEFAULT_GRID_SIZE);
        session.handle(Event::Select(cell));
    }

    let frame = Duration::from_secs_f64(1.0 / 60.0);
    let mut ticks = 0;
    loop {
        session.tick(frame);
        ticks += 1;
        match session.state() {
            InteractionState::Error => {
                println!("No path between the picks");
                break;
            }
            InteractionState::Revealing if session.reveal_complete() => break,
            _ => {}
        }
        if ticks % 60 == 0 {
            println!("{:.2?} {:?}", session.view().marker, session.cursor());
        }
    }
    println!("{}", session.view());
    println!("Finished after {} ticks", ticks);
}
