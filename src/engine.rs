use grid_util::point::Point;
use itertools::Itertools;
use log::{debug, info, warn};
use smallvec::SmallVec;

use crate::grid::ObstacleGrid;
use crate::search::dijkstra;

/// Distance recorded for cells the search never reached.
pub const UNVISITED: u32 = u32::MAX;

/// Outcome of [find_path]: a tentative distance and predecessor for every cell of the grid,
/// indexed by linear cell index. An unreachable goal is a regular outcome and is signalled by
/// the goal distance staying at [UNVISITED].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    size: usize,
    start: Point,
    goal: Point,
    pub distances: Vec<u32>,
    pub predecessors: Vec<Option<usize>>,
}

impl SearchResult {
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    fn index(&self, p: Point) -> usize {
        p.y as usize * self.size + p.x as usize
    }

    fn point(&self, ix: usize) -> Point {
        Point::new((ix % self.size) as i32, (ix / self.size) as i32)
    }

    pub fn distance(&self, p: Point) -> Option<u32> {
        match self.distances[self.index(p)] {
            UNVISITED => None,
            d => Some(d),
        }
    }

    pub fn predecessor(&self, p: Point) -> Option<Point> {
        self.predecessors[self.index(p)].map(|ix| self.point(ix))
    }

    pub fn goal_distance(&self) -> Option<u32> {
        self.distance(self.goal)
    }

    pub fn reachable(&self) -> bool {
        self.goal_distance().is_some()
    }

    /// Number of cells that received a tentative distance.
    pub fn visited(&self) -> usize {
        self.distances.iter().filter(|&&d| d != UNVISITED).count()
    }

    /// Walks the predecessors back from the goal and returns the cells from start to goal, both
    /// inclusive. [None] if the goal was not reached.
    pub fn path(&self) -> Option<Vec<Point>> {
        if !self.reachable() {
            return None;
        }
        let mut cursor = self.index(self.goal);
        let mut path = vec![self.goal];
        while let Some(prev) = self.predecessors[cursor] {
            path.push(self.point(prev));
            cursor = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// Computes minimum hop-count distances from `start` over free, orthogonally adjacent cells,
/// stopping once `goal` is settled. Both points must lie inside the grid. Blocked cells are
/// never entered, though a blocked `start` is still expanded.
pub fn find_path(grid: &ObstacleGrid, start: Point, goal: Point) -> SearchResult {
    debug_assert!(grid.in_bounds(start) && grid.in_bounds(goal));
    debug!("Searching for a path from {} to {}", start, goal);
    // A free start on another component than the goal cannot reach it, skip the flood fill.
    if !grid.components_dirty && !grid.is_blocked(start) && grid.unreachable(start, goal) {
        info!("{} is not on the same component as {}", goal, start);
        let mut distances = vec![UNVISITED; grid.len()];
        distances[grid.index(start)] = 0;
        return SearchResult {
            size: grid.size(),
            start,
            goal,
            distances,
            predecessors: vec![None; grid.len()],
        };
    }
    let goal_ix = grid.index(goal);
    let tree = dijkstra(
        &grid.index(start),
        |&ix| {
            grid.neighbours(grid.point(ix))
                .into_iter()
                .filter(|&n| !grid.is_blocked(n))
                .map(|n| (grid.index(n), 1u32))
                .collect::<SmallVec<[(usize, u32); 4]>>()
        },
        |&ix| ix == goal_ix,
    );

    let mut distances = vec![UNVISITED; grid.len()];
    let mut predecessors = vec![None; grid.len()];
    for (&ix, parent, cost) in tree.iter() {
        distances[ix] = cost;
        predecessors[ix] = parent.copied();
    }
    let result = SearchResult {
        size: grid.size(),
        start,
        goal,
        distances,
        predecessors,
    };

    match tree.goal_cost() {
        Some(hops) => info!("Found path from {} to {} of {} steps", start, goal, hops),
        None => {
            info!("{} is not reachable from {}", goal, start);
            if !grid.components_dirty && grid.reachable(start, goal) {
                warn!("Unreachable goal shares a component with the start, are the components correct?");
            }
        }
    }
    result
}

/// Checks that `path` only visits free cells, never visits a cell twice and only moves between
/// orthogonal neighbours. An empty path is not a route.
pub fn is_valid_path(grid: &ObstacleGrid, path: &[Point]) -> bool {
    !path.is_empty()
        && path.iter().all(|&p| grid.in_bounds(p) && !grid.is_blocked(p))
        && path.iter().map(|&p| grid.index(p)).all_unique()
        && path
            .iter()
            .tuple_windows()
            .all(|(a, b)| (a.x - b.x).abs() + (a.y - b.y).abs() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Asserts that the case in which start and goal are equal is handled correctly.
    #[test]
    fn equal_start_goal() {
        let grid = ObstacleGrid::new(1);
        let start = Point::new(0, 0);
        let result = find_path(&grid, start, start);
        assert_eq!(result.goal_distance(), Some(0));
        assert_eq!(result.path().unwrap(), vec![start]);
    }

    /// Asserts that the optimal 4 step detour around the centre is found.
    #[test]
    fn solve_simple_problem() {
        //  ___
        // |S  |
        // | # |
        // |  G|
        //  ___
        let grid = ObstacleGrid::from_ascii("...\n.#.\n...").unwrap();
        let result = find_path(&grid, Point::new(0, 0), Point::new(2, 2));
        assert_eq!(result.goal_distance(), Some(4));
        let path = result.path().unwrap();
        assert_eq!(path.len(), 5);
        assert!(is_valid_path(&grid, &path));
    }

    /// The first neighbour in +x, -x, +y, -y order wins ties, so the path hugs the top row.
    #[test]
    fn ties_follow_neighbour_order() {
        let grid = ObstacleGrid::new(3);
        let result = find_path(&grid, Point::new(0, 0), Point::new(2, 2));
        assert_eq!(
            result.path().unwrap(),
            vec![
                Point::new(0, 0),
                Point::new(1, 0),
                Point::new(2, 0),
                Point::new(2, 1),
                Point::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_complex() {
        let grid = ObstacleGrid::from_ascii(
            "
            .....#....
            .#........
            ..........
            ..........
            ..........
            #.........
            ..........
            ..........
            ........#.
            ..........
            ",
        )
        .unwrap();
        let result = find_path(&grid, Point::new(0, 0), Point::new(7, 7));
        assert_eq!(result.goal_distance(), Some(14));
        let path = result.path().unwrap();
        assert_eq!(path.len(), 15);
        assert!(is_valid_path(&grid, &path));
    }

    #[test]
    fn blocked_goal_is_unreachable() {
        let grid = ObstacleGrid::from_ascii("..\n.#").unwrap();
        let result = find_path(&grid, Point::new(0, 0), Point::new(1, 1));
        assert!(!result.reachable());
        assert!(result.path().is_none());
        assert_eq!(result.distances[3], UNVISITED);
        // The blocked goal is its own component, so no cell besides the start is touched.
        assert_eq!(result.visited(), 1);
        assert_eq!(result.distance(Point::new(0, 0)), Some(0));
    }

    /// With stale components the search runs and floods the start's region instead.
    #[test]
    fn dirty_components_still_search() {
        let mut grid = ObstacleGrid::from_ascii("...\n...\n...").unwrap();
        grid.set_blocked(Point::new(1, 2), true);
        grid.set_blocked(Point::new(2, 1), true);
        assert!(grid.components_dirty);
        let result = find_path(&grid, Point::new(0, 0), Point::new(2, 2));
        assert!(!result.reachable());
        assert_eq!(result.visited(), 6);
        grid.update();
        let skipped = find_path(&grid, Point::new(0, 0), Point::new(2, 2));
        assert!(!skipped.reachable());
        assert_eq!(skipped.visited(), 1);
    }

    /// A blocked start is still expanded, components are not consulted for it.
    #[test]
    fn blocked_start_is_expanded() {
        let grid = ObstacleGrid::from_ascii("#.\n..").unwrap();
        let result = find_path(&grid, Point::new(0, 0), Point::new(1, 1));
        assert_eq!(result.goal_distance(), Some(2));
    }

    #[test]
    fn predecessors_lead_back_to_start() {
        let grid = ObstacleGrid::from_ascii(
            "
            ....
            ###.
            ....
            .###
            ",
        )
        .unwrap();
        let start = Point::new(0, 0);
        let goal = Point::new(0, 3);
        let result = find_path(&grid, start, goal);
        let distance = result.goal_distance().unwrap();
        assert_eq!(distance, 9);
        let mut cursor = goal;
        let mut steps = 0;
        while let Some(prev) = result.predecessor(cursor) {
            cursor = prev;
            steps += 1;
        }
        assert_eq!(cursor, start);
        assert_eq!(steps, distance);
        assert_eq!(result.predecessor(start), None);
    }

    #[test]
    fn invalid_paths_are_rejected() {
        let grid = ObstacleGrid::from_ascii("..\n.#").unwrap();
        let jump = [Point::new(0, 0), Point::new(1, 0), Point::new(0, 1)];
        let through_wall = [Point::new(1, 0), Point::new(1, 1)];
        let repeat = [Point::new(0, 0), Point::new(1, 0), Point::new(0, 0)];
        assert!(!is_valid_path(&grid, &jump));
        assert!(!is_valid_path(&grid, &through_wall));
        assert!(!is_valid_path(&grid, &repeat));
        assert!(!is_valid_path(&grid, &[]));
        assert!(is_valid_path(&grid, &[Point::new(0, 1), Point::new(0, 0)]));
    }
}
