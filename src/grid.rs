use core::fmt;
use grid_util::point::Point;
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use rand::Rng;
use smallvec::SmallVec;

/// Side length of the grid used by the interactive pathfinder.
pub const DEFAULT_GRID_SIZE: usize = 40;
/// Denominator of the share of cells that receive an obstacle at startup.
pub const OBSTACLE_DIVISOR: usize = 3;

/// Orthogonal offsets in the order neighbours are visited: +x, -x, +y, -y.
/// The search relies on this order being fixed for reproducible tie-breaking.
const NEUMANN_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// [ObstacleGrid] is a square occupancy map where each cell is either blocked ([true]) or
/// free ([false]). Cells are stored row-major, so the linear index of `(x, y)` is `y * size + x`.
/// In addition it maintains the 4-connected components of free cells in a [UnionFind], which
/// serves as a cheap reachability oracle next to the actual search.
#[derive(Clone, Debug)]
pub struct ObstacleGrid {
    size: usize,
    cells: Vec<bool>,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl Default for ObstacleGrid {
    fn default() -> ObstacleGrid {
        ObstacleGrid::new(DEFAULT_GRID_SIZE)
    }
}

impl ObstacleGrid {
    /// Creates a `size` x `size` grid without obstacles.
    pub fn new(size: usize) -> ObstacleGrid {
        let mut grid = ObstacleGrid {
            size,
            cells: vec![false; size * size],
            components: UnionFind::new(size * size),
            components_dirty: false,
        };
        grid.generate_components();
        grid
    }

    /// Creates a grid and scatters `size * size / 3` obstacles at random positions. Positions are
    /// drawn with replacement, so the number of distinct blocked cells is usually a bit lower.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> ObstacleGrid {
        let mut grid = ObstacleGrid::new(size);
        grid.scatter(rng, size * size / OBSTACLE_DIVISOR);
        grid.generate_components();
        grid
    }

    /// Blocks `count` uniformly drawn cells.
    pub fn scatter<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) {
        if self.size == 0 {
            return;
        }
        for _ in 0..count {
            let x = rng.gen_range(0..self.size) as i32;
            let y = rng.gen_range(0..self.size) as i32;
            self.set_blocked(Point::new(x, y), true);
        }
        debug!("Scattered {} obstacles over a {}x{} grid", count, self.size, self.size);
    }

    /// Parses a grid drawn with `#` for blocked and `.` for free cells, one row per line.
    /// Returns [None] if the drawing is not square or contains other characters.
    pub fn from_ascii(drawing: &str) -> Option<ObstacleGrid> {
        let rows = drawing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>();
        let size = rows.len();
        let mut grid = ObstacleGrid::new(size);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != size {
                return None;
            }
            for (x, c) in row.chars().enumerate() {
                let blocked = match c {
                    '#' => true,
                    '.' => false,
                    _ => return None,
                };
                grid.cells[y * size + x] = blocked;
            }
        }
        grid.generate_components();
        Some(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.size && (p.y as usize) < self.size
    }

    /// Clamps raw coordinates onto the grid. Input handling goes through this before handing
    /// cells to the rest of the system.
    pub fn clamp(&self, x: i32, y: i32) -> Point {
        let max = self.size.saturating_sub(1) as i32;
        Point::new(x.clamp(0, max), y.clamp(0, max))
    }

    pub fn index(&self, p: Point) -> usize {
        debug_assert!(self.in_bounds(p), "{} lies outside the grid", p);
        p.y as usize * self.size + p.x as usize
    }

    pub fn point(&self, ix: usize) -> Point {
        Point::new((ix % self.size) as i32, (ix / self.size) as i32)
    }

    /// Whether the cell holds an obstacle. The point must lie inside the grid.
    pub fn is_blocked(&self, p: Point) -> bool {
        self.cells[self.index(p)]
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|&&b| b).count()
    }

    /// Forces a cell to be free. Used for cells picked as start or goal.
    pub fn clear(&mut self, p: Point) {
        self.set_blocked(p, false);
    }

    /// Updates a cell. Joins newly connected components and flags the components
    /// as dirty if components are (potentially) broken apart into multiple.
    pub fn set_blocked(&mut self, p: Point, blocked: bool) {
        let ix = self.index(p);
        if blocked {
            if !self.cells[ix] {
                self.components_dirty = true;
            }
        } else {
            for n in self.neighbours(p) {
                if !self.is_blocked(n) {
                    let n_ix = self.index(n);
                    self.components.union(ix, n_ix);
                }
            }
        }
        self.cells[ix] = blocked;
    }

    /// The orthogonal neighbours of `p` that lie inside the grid, in the order +x, -x, +y, -y.
    /// Obstacles are not filtered out.
    pub fn neighbours(&self, p: Point) -> SmallVec<[Point; 4]> {
        NEUMANN_OFFSETS
            .iter()
            .map(|&(dx, dy)| Point::new(p.x + dx, p.y + dy))
            .filter(|&n| self.in_bounds(n))
            .collect()
    }

    /// Retrieves the component id a given [Point] belongs to.
    pub fn get_component(&self, p: Point) -> usize {
        self.components.find(self.index(p))
    }

    /// Checks if start and goal are on the same component. Only meaningful while the components
    /// are not dirty, see [update](Self::update).
    pub fn reachable(&self, start: Point, goal: Point) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: Point, goal: Point) -> bool {
        if self.in_bounds(start) && self.in_bounds(goal) {
            !self
                .components
                .equiv(self.index(start), self.index(goal))
        } else {
            true
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            info!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up free orthogonal neighbours.
    pub fn generate_components(&mut self) {
        let n = self.size;
        self.components = UnionFind::new(n * n);
        self.components_dirty = false;
        for ix in 0..self.cells.len() {
            if self.cells[ix] {
                continue;
            }
            // Linking right and down covers every edge once.
            let p = self.point(ix);
            for q in [Point::new(p.x + 1, p.y), Point::new(p.x, p.y + 1)] {
                if self.in_bounds(q) && !self.is_blocked(q) {
                    let q_ix = self.index(q);
                    self.components.union(ix, q_ix);
                }
            }
        }
    }
}

impl fmt::Display for ObstacleGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.size.max(1)) {
            let line = row
                .iter()
                .map(|&b| if b { '#' } else { '.' })
                .collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
