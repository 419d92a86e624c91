use grid_pathfinder::{find_path, ObstacleGrid};
use grid_util::point::Point;

// The middle row separates start and goal:
//  ___
// |S  |
// |###|
// |E  |
//  ___
fn main() {
    let grid = ObstacleGrid::from_ascii("...\n###\n...").unwrap();
    let start = Point::new(0, 0);
    let end = Point::new(0, 2);
    let result = find_path(&grid, start, end);
    match result.goal_distance() {
        Some(d) => println!("Reached {} in {} steps", end, d),
        None => println!(
            "{} is unreachable from {}, {} cells were visited",
            end,
            start,
            result.visited()
        ),
    }
}
