use grid_pathfinder::{find_path, ObstacleGrid};
use grid_util::point::Point;

// In this example a path is found on a 3x3 grid with shape
//  ___
// |S  |
// | # |
// |  E|
//  ___
// where
// - # marks an obstacle
// - S marks the start
// - E marks the end
//
// Nodes have a 4-neighborhood

fn main() {
    let mut grid = ObstacleGrid::new(3);
    grid.set_blocked(Point::new(1, 1), true);
    println!("{}", grid);
    let start = Point::new(0, 0);
    let end = Point::new(2, 2);
    let result = find_path(&grid, start, end);
    if let Some(path) = result.path() {
        println!("Path of {} steps:", path.len() - 1);
        for p in path {
            println!("{:?}", p);
        }
    }
}
