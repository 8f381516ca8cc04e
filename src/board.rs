use std::collections::{HashSet, VecDeque};
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::trace;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use unordered_pair::UnorderedPair;

use crate::domino::Placement;
use crate::location::{Coord, Location};
use crate::shape::{self, SquareStep};

/// The valid cells of a puzzle as an undirected graph, with an edge between every edge-adjacent pair.
///
/// Each edge carries the forward direction from its lower endpoint to its higher one.
/// The graph makes no assumption of connectivity; see [`Board::islands`].
#[derive(Clone)]
pub struct Board {
    pub(crate) graph: UnGraphMap<Location, SquareStep>,
    // rows, cols
    pub(crate) dims: (Coord, Coord),
}

impl Board {
    /// Build the board over `cells`; repeated cells collapse into one node.
    pub fn new(dims: (Coord, Coord), cells: impl IntoIterator<Item = Location>) -> Self {
        let mut graph = UnGraphMap::new();
        for location in cells {
            graph.add_node(location);
        }

        let nodes = graph.nodes().collect_vec();
        for location in nodes {
            // add edges down and to the right, if possible
            for direction in SquareStep::FORWARD_VARIANTS {
                if let Some(other) = direction.attempt_from(location).filter(|other| graph.contains_node(*other)) {
                    graph.add_edge(location, other, *direction);
                }
            }
        }

        trace!(target: "board", "built board with {} cells and {} edges", graph.node_count(), graph.edge_count());

        Self { graph, dims }
    }

    /// Number of distinct valid cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether `location` is a valid cell.
    #[inline]
    pub fn contains(&self, location: Location) -> bool {
        self.graph.contains_node(location)
    }

    /// Every valid cell, in ascending order.
    pub fn cells(&self) -> Vec<Location> {
        self.graph.nodes().sorted().collect_vec()
    }

    /// The valid edge-neighbors of `location`, in ascending order.
    pub fn neighbors(&self, location: Location) -> Vec<Location> {
        if !self.contains(location) {
            return Vec::new();
        }
        self.graph.neighbors(location).sorted().collect_vec()
    }

    /// The direction from `a` to `b` if both are on the board and share an edge.
    pub fn step_between(&self, a: Location, b: Location) -> Option<SquareStep> {
        let forward = self.graph.edge_weight(a, b)?;
        if a < b {
            Some(*forward)
        } else {
            Some(forward.invert())
        }
    }

    /// Whether both cells are on the board and share an edge.
    pub fn adjacent(&self, cells: UnorderedPair<Location>) -> bool {
        let UnorderedPair(a, b) = cells;
        self.step_between(a, b).is_some()
    }

    /// The connected components of the board, each sorted, ordered by their smallest cell.
    pub fn islands(&self) -> Vec<Vec<Location>> {
        let mut seen = HashSet::with_capacity(self.cell_count());
        let mut islands = Vec::new();

        for start in self.cells() {
            if seen.contains(&start) {
                continue;
            }

            let mut island = Vec::new();
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(location) = bfs.next(&self.graph) {
                seen.insert(location);
                island.push(location);
            }

            island.sort();
            islands.push(island);
        }

        islands
    }

    /// Flood fill restricted to `subset`: the connected components of the subgraph it induces.
    ///
    /// Members of `subset` not on the board are ignored.
    pub fn components_within(&self, subset: &HashSet<Location>) -> Vec<Vec<Location>> {
        let mut seen: HashSet<Location> = HashSet::with_capacity(subset.len());
        let mut components = Vec::new();

        for start in subset.iter().copied().filter(|l| self.contains(*l)).sorted() {
            if !seen.insert(start) {
                continue;
            }

            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(location) = queue.pop_front() {
                for neighbor in self.graph.neighbors(location) {
                    if subset.contains(&neighbor) && seen.insert(neighbor) {
                        component.push(neighbor);
                        queue.push_back(neighbor);
                    }
                }
            }

            component.sort();
            components.push(component);
        }

        components
    }

    fn canvas(&self) -> Array2<char> {
        let mut canvas = Array2::from_elem(self.dims, '.');
        for location in self.graph.nodes() {
            if let Some(slot) = canvas.get_mut(location.as_index()) {
                *slot = '#';
            }
        }
        canvas
    }

    /// Render `placements` over this board: each covered cell shows its pip.
    pub fn display_placements<'a>(&'a self, placements: &'a [Placement]) -> PlacementsDisplay<'a> {
        PlacementsDisplay { board: self, placements }
    }
}

/// `#` marks a valid cell, `.` a cell of the bounding box that is not on the board.
impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", shape::print(&self.canvas()))
    }
}

/// See [`Board::display_placements`].
pub struct PlacementsDisplay<'a> {
    board: &'a Board,
    placements: &'a [Placement],
}

impl Display for PlacementsDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut canvas = self.board.canvas();
        for (location, pip) in self.placements.iter().flat_map(Placement::covered) {
            if let Some(slot) = canvas.get_mut(location.as_index()) {
                *slot = char::from_digit(pip as u32, 10).unwrap_or('?');
            }
        }
        write!(f, "{}", shape::print(&canvas))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use unordered_pair::UnorderedPair;

    use crate::location::Location;
    use crate::shape::SquareStep;

    use super::Board;

    fn two_islands() -> Board {
        // two dominoes' worth of cells separated by a gap column
        Board::new((2, 4), [Location(0, 0), Location(1, 0), Location(0, 3), Location(1, 3), Location(1, 0)])
    }

    #[test]
    fn duplicate_cells_collapse() {
        assert_eq!(two_islands().cell_count(), 4);
    }

    #[test]
    fn renders_bounding_box() {
        assert_eq!(format!("{}", two_islands()), "#..#
#..#
");
    }

    #[test]
    fn finds_islands() {
        let islands = two_islands().islands();
        assert_eq!(islands, vec![
            vec![Location(0, 0), Location(1, 0)],
            vec![Location(0, 3), Location(1, 3)],
        ]);
    }

    #[test]
    fn steps_respect_board() {
        let board = two_islands();
        assert_eq!(board.step_between(Location(1, 0), Location(0, 0)), Some(SquareStep::Up));
        assert_eq!(board.step_between(Location(0, 0), Location(1, 0)), Some(SquareStep::Down));
        assert_eq!(board.step_between(Location(0, 0), Location(0, 1)), None);
        assert!(!board.adjacent(UnorderedPair(Location(0, 0), Location(0, 3))));
        assert!(board.neighbors(Location(0, 1)).is_empty());
    }

    #[test]
    fn no_edge_across_the_coordinate_limit() {
        let board = Board::new((1, 2), [Location(0, 0), Location(0, usize::MAX)]);
        assert_eq!(board.graph.edge_count(), 0);
        assert_eq!(board.islands().len(), 2);
        assert!(!board.adjacent(UnorderedPair(Location(0, usize::MAX), Location(0, 0))));
    }

    #[test]
    fn flood_fill_within_subset() {
        let board = Board::new((2, 2), [Location(0, 0), Location(0, 1), Location(1, 0), Location(1, 1)]);
        let diagonal: HashSet<_> = [Location(0, 0), Location(1, 1)].into_iter().collect();
        assert_eq!(board.components_within(&diagonal).len(), 2);
        let row: HashSet<_> = [Location(1, 0), Location(1, 1), Location(7, 7)].into_iter().collect();
        assert_eq!(board.components_within(&row), vec![vec![Location(1, 0), Location(1, 1)]]);
    }
}
