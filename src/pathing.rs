//! Flood fill path finding over obstacle grids, as produced by `to_bool_grid`.
//!
//! Every traversable tile is one step from its traversable north, east, south and west
//! neighbours, so a breadth first frontier gives the shortest distances without any weights.

use itertools::Itertools;
use smallvec::SmallVec;

use crate::utils::{self, FnvHashMap};

pub type PointSmallVec = SmallVec<[GridPoint; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, PartialOrd, Ord)]
pub struct GridPoint {
    pub x: usize,
    pub y: usize,
}

impl GridPoint {
    pub fn new(x: usize, y: usize) -> GridPoint {
        GridPoint { x, y }
    }
}

#[inline]
fn is_traversable(grid: &[Vec<bool>], point: GridPoint) -> bool {
    grid.get(point.y).and_then(|row| row.get(point.x)).map_or(false, |&obstacle| !obstacle)
}

/// Traversable points one step away from `point`.
pub fn traversable_neighbours(grid: &[Vec<bool>], point: GridPoint) -> PointSmallVec {
    let GridPoint { x, y } = point;
    let mut neighbours = PointSmallVec::new();
    if y > 0 {
        neighbours.push(GridPoint::new(x, y - 1));
    }
    neighbours.push(GridPoint::new(x + 1, y));
    neighbours.push(GridPoint::new(x, y + 1));
    if x > 0 {
        neighbours.push(GridPoint::new(x - 1, y));
    }
    neighbours.retain(|p| is_traversable(grid, *p));
    neighbours
}

pub fn traversable_points(grid: &[Vec<bool>]) -> Vec<GridPoint> {
    grid.iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &obstacle)| !obstacle)
                .map(move |(x, _)| GridPoint::new(x, y))
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Distances {
    start: GridPoint,
    distances: FnvHashMap<GridPoint, u32>,
    max_distance: u32,
}

impl Distances {
    /// Steps from `start` to every point reachable from it. None if `start` is not traversable.
    pub fn new(grid: &[Vec<bool>], start: GridPoint) -> Option<Distances> {
        if !is_traversable(grid, start) {
            return None;
        }

        let mut max_distance = 0;
        let mut distances = utils::fnv_hashmap(grid.len() * grid.first().map_or(0, |row| row.len()));
        distances.insert(start, 0);

        // The map doubles as the visited set, a point's first distance is already its shortest.
        let mut frontier = vec![start];
        while !frontier.is_empty() {
            let mut new_frontier = vec![];
            for point in &frontier {
                let distance = distances[point];
                max_distance = max_distance.max(distance);
                for neighbour in traversable_neighbours(grid, *point) {
                    if !distances.contains_key(&neighbour) {
                        distances.insert(neighbour, distance + 1);
                        new_frontier.push(neighbour);
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start,
            distances,
            max_distance,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> GridPoint {
        self.start
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    #[inline(always)]
    pub fn distance_from_start_to(&self, point: GridPoint) -> Option<u32> {
        self.distances.get(&point).cloned()
    }

    /// Number of points reachable from the start, the start included.
    pub fn reachable_count(&self) -> usize {
        self.distances.len()
    }

    /// All points at the maximum distance, in row major order.
    pub fn furthest_points(&self) -> SmallVec<[GridPoint; 8]> {
        self.distances
            .iter()
            .filter(|&(_, &distance)| distance == self.max_distance)
            .map(|(point, _)| *point)
            .sorted_by_key(|point| (point.y, point.x))
            .collect()
    }
}

pub fn shortest_path(grid: &[Vec<bool>],
                     distances_from_start: &Distances,
                     end_point: GridPoint)
                     -> Option<Vec<GridPoint>> {
    let mut current_distance = distances_from_start.distance_from_start_to(end_point)?;
    let mut current = end_point;
    let mut path = vec![end_point];

    while current != distances_from_start.start() {
        let closer = traversable_neighbours(grid, current)
            .iter()
            .cloned()
            .find(|p| distances_from_start.distance_from_start_to(*p) == Some(current_distance - 1));
        match closer {
            Some(point) => {
                current = point;
                current_distance -= 1;
                path.push(current);
            }
            // The distances were computed on some other grid.
            None => return None,
        }
    }

    path.reverse();
    Some(path)
}

/// The longest shortest path within the region of the first traversable point.
///
/// Exact when that region has no cycles, as in a maze before extra paths are added.
pub fn longest_path(grid: &[Vec<bool>]) -> Option<Vec<GridPoint>> {
    let arbitrary_start = traversable_points(grid).into_iter().next()?;
    let first_distances = Distances::new(grid, arbitrary_start)?;
    let path_start = first_distances.furthest_points()[0];
    let distances = Distances::new(grid, path_start)?;
    let path_end = distances.furthest_points()[0];
    shortest_path(grid, &distances, path_end)
}

/// Number of separate groups of traversable points.
pub fn count_regions(grid: &[Vec<bool>]) -> usize {
    let mut seen = utils::fnv_hashset(grid.len());
    let mut regions = 0;
    for point in traversable_points(grid) {
        if seen.contains(&point) {
            continue;
        }
        regions += 1;
        seen.insert(point);
        let mut frontier = vec![point];
        while let Some(current) = frontier.pop() {
            for neighbour in traversable_neighbours(grid, current) {
                if seen.insert(neighbour) {
                    frontier.push(neighbour);
                }
            }
        }
    }
    regions
}
