//! Uniform grid over the square domain for neighbor queries.
//!
//! The domain is split into `grid_length x grid_length` square cells, where `grid_length` is the
//! smallest integer whose square is at least the population. Cell `i` covers the column
//! `i / grid_length` along x and the row `i % grid_length` along y. A neighbor query returns every
//! agent registered in the 3x3 block of cells around an agent's cell, the agent itself included,
//! so that a contact search costs a handful of cells instead of the whole population.
use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::point::Point;

/// How the 3x3 block is cut off at the edges of the grid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Neighborhood {
    /// Adds the nine offsets `{-L-1, -L, -L+1, -1, 0, 1, L-1, L, L+1}` to the cell index and keeps
    /// those inside `[0, L*L)`. Offsets that step past the end of a column land at the other end
    /// of the adjacent column, so edge cells see a few cells from across the domain.
    #[default]
    Linear,
    /// Keeps only the cells that are adjacent in both grid coordinates.
    Clipped,
}

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    grid_length: usize,
    cell_side: f64,
    neighborhood: Neighborhood,
    /// Agent ids registered in each cell.
    cells: Vec<Vec<usize>>,
    /// The cell each agent is registered in, indexed by agent id.
    agent_cells: Vec<usize>,
}

/// Smallest `n >= 1` with `n * n >= population`.
fn grid_length_for(population: usize) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let mut length = (population as f64).sqrt() as usize;
    while length * length < population {
        length += 1;
    }
    length.max(1)
}

impl SpatialIndex {
    /// Builds the index and registers every agent at its current domain position. Agent ids are
    /// positions in `agents`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn build(agents: &[Agent], side_length: f64, neighborhood: Neighborhood) -> Self {
        let grid_length = grid_length_for(agents.len());
        let mut index = SpatialIndex {
            grid_length,
            cell_side: side_length / grid_length as f64,
            neighborhood,
            cells: vec![Vec::new(); grid_length * grid_length],
            agent_cells: Vec::with_capacity(agents.len()),
        };
        for (agent_id, agent) in agents.iter().enumerate() {
            let cell = index.cell_of(agent.domain_position(side_length));
            index.cells[cell].push(agent_id);
            index.agent_cells.push(cell);
        }
        debug!(
            "built {}x{} spatial index (cell side {}) for {} agents",
            grid_length,
            grid_length,
            index.cell_side,
            agents.len()
        );
        index
    }

    #[must_use]
    pub fn grid_length(&self) -> usize {
        self.grid_length
    }

    /// Total number of cells, `grid_length * grid_length`.
    #[must_use]
    pub fn grid_size(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cell_side(&self) -> f64 {
        self.cell_side
    }

    #[must_use]
    pub fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }

    fn axis_cell(&self, coordinate: f64) -> usize {
        if self.cell_side <= 0.0 {
            return 0;
        }
        // Saturating cast; a folded coordinate that rounds up to the side length lands in the
        // last cell.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cell = (coordinate / self.cell_side).floor() as usize;
        cell.min(self.grid_length - 1)
    }

    /// The cell containing a domain position.
    #[must_use]
    pub fn cell_of(&self, domain_position: Point) -> usize {
        self.axis_cell(domain_position.x) * self.grid_length + self.axis_cell(domain_position.y)
    }

    /// The distinct cells in the 3x3 block around `cell`, including `cell` itself.
    pub fn neighbor_cells(&self, cell: usize) -> impl Iterator<Item = usize> {
        let length = self.grid_length as isize;
        let size = self.grid_size() as isize;
        let center = cell as isize;
        let mut candidates = [None; 9];
        match self.neighborhood {
            Neighborhood::Linear => {
                let offsets = [
                    -length - 1,
                    -length,
                    -length + 1,
                    -1,
                    0,
                    1,
                    length - 1,
                    length,
                    length + 1,
                ];
                for (slot, offset) in candidates.iter_mut().zip(offsets) {
                    let neighbor = center + offset;
                    if (0..size).contains(&neighbor) {
                        *slot = Some(neighbor as usize);
                    }
                }
            }
            Neighborhood::Clipped => {
                let (column, row) = (center / length, center % length);
                let mut slot = 0;
                for c in column - 1..=column + 1 {
                    for r in row - 1..=row + 1 {
                        if (0..length).contains(&c) && (0..length).contains(&r) {
                            candidates[slot] = Some((c * length + r) as usize);
                        }
                        slot += 1;
                    }
                }
            }
        }
        // Small grids produce the same cell from several offsets.
        (0..candidates.len()).filter_map(move |i| match candidates[i] {
            Some(cell) if !candidates[..i].contains(&Some(cell)) => Some(cell),
            _ => None,
        })
    }

    /// Ids of all agents in the 3x3 block around `agent_id`'s cell, `agent_id` included.
    pub fn neighbors_of(&self, agent_id: usize) -> impl Iterator<Item = usize> + '_ {
        let cell = self.agent_cells[agent_id];
        self.neighbor_cells(cell)
            .flat_map(move |neighbor| self.cells[neighbor].iter().copied())
    }

    /// Moves `agent_id` to the cell containing `domain_position` if it is not already
    /// registered there. Returns true if the registration changed.
    pub fn relocate(&mut self, agent_id: usize, domain_position: Point) -> bool {
        let new_cell = self.cell_of(domain_position);
        let old_cell = self.agent_cells[agent_id];
        if new_cell == old_cell {
            return false;
        }
        let members = &mut self.cells[old_cell];
        if let Some(slot) = members.iter().position(|&member| member == agent_id) {
            members.swap_remove(slot);
        }
        self.cells[new_cell].push(agent_id);
        self.agent_cells[agent_id] = new_cell;
        true
    }

    #[must_use]
    pub fn registered_cell(&self, agent_id: usize) -> Option<usize> {
        self.agent_cells.get(agent_id).copied()
    }

    #[must_use]
    pub fn cell_members(&self, cell: usize) -> &[usize] {
        self.cells.get(cell).map_or(&[], Vec::as_slice)
    }
}
