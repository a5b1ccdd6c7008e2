//! Claim grid and the flood fill that seals territory.

use territory_core::{CellCoord, CellState};

/// Dense row-major grid of cell states with incrementally maintained counts.
///
/// Every write goes through a single setter that updates the grid and the
/// per-state counts together, so the counts always sum to the cell total and
/// always match the stored contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
    counts: [u32; 3],
}

impl Field {
    /// Creates a field of the provided dimensions filled with unclaimed cells.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let area = width.saturating_mul(height);
        let capacity = usize::try_from(area).unwrap_or(0);
        let mut counts = [0; 3];
        counts[slot(CellState::Unclaimed)] = area;
        Self {
            width,
            height,
            cells: vec![CellState::Unclaimed; capacity],
            counts,
        }
    }

    /// Number of columns in the field.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the field.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }

    /// Reports whether the coordinate lies inside the field.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// State stored at the coordinate, or `OutOfBounds` outside the field.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> CellState {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(CellState::OutOfBounds)
    }

    /// Writes a cell state.
    ///
    /// Writes outside the field and attempts to store `OutOfBounds` are
    /// ignored.
    pub fn set(&mut self, state: CellState, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.write(index, state);
        }
    }

    /// Number of cells currently holding the provided state.
    #[must_use]
    pub fn count(&self, state: CellState) -> u32 {
        if state.is_in_bounds() {
            self.counts[slot(state)]
        } else {
            0
        }
    }

    /// Fraction of cells that are claimed, in `[0, 1]`.
    #[must_use]
    pub fn claimed_ratio(&self) -> f32 {
        let area = self.area();
        if area == 0 {
            return 0.0;
        }
        self.count(CellState::Claimed) as f32 / area as f32
    }

    /// Visits every cell in row-major order (rows outer, columns inner).
    pub fn for_each_cell<F>(&self, mut visit: F)
    where
        F: FnMut(CellCoord, CellState),
    {
        for (cell, state) in self.iter() {
            visit(cell, state);
        }
    }

    /// Iterator over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellState)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells.iter().enumerate().map(move |(index, state)| {
            let column = (index % width) as i32;
            let row = (index / width) as i32;
            (CellCoord::new(column, row), *state)
        })
    }

    /// Marks a perimeter of the provided thickness as claimed.
    pub fn claim_border(&mut self, thickness: u32) {
        for index in 0..self.cells.len() {
            let (column, row) = self.coordinates(index);
            let edge_distance = column
                .min(row)
                .min(self.width - 1 - column)
                .min(self.height - 1 - row);
            if edge_distance < thickness {
                self.write(index, CellState::Claimed);
            }
        }
    }

    /// Discards an unfinished trail by reverting every `Claiming` cell.
    pub fn clear_claiming(&mut self) {
        self.replace_all(CellState::Claiming, CellState::Unclaimed);
    }

    /// Seals the current trail and claims every region no enemy can reach.
    ///
    /// The trail is converted to `Claimed` first. A cell stays unclaimed when
    /// any of the provided enemy cells reaches it through 4-connected,
    /// non-claimed cells. Returns how many cells became `Claimed`.
    pub fn claim(&mut self, enemies: &[CellCoord]) -> u32 {
        let before = self.count(CellState::Claimed);
        self.replace_all(CellState::Claiming, CellState::Claimed);

        let mut claimable = vec![true; self.cells.len()];
        for &enemy in enemies {
            self.mark_reachable(enemy, &mut claimable);
        }

        for (index, claim) in claimable.into_iter().enumerate() {
            if claim {
                self.write(index, CellState::Claimed);
            }
        }

        self.count(CellState::Claimed) - before
    }

    /// Scan-line fill clearing `claimable` for every cell reachable from `seed`.
    fn mark_reachable(&self, seed: CellCoord, claimable: &mut [bool]) {
        let Some(seed_index) = self.index(seed) else {
            return;
        };
        let width = self.width as usize;
        let height = self.height as usize;

        let mut spans = vec![(seed_index % width, seed_index / width)];
        while let Some((column, row)) = spans.pop() {
            let row_start = row * width;
            if self.blocks_fill(row_start + column, claimable) {
                continue;
            }

            let mut left = column;
            while left > 0 && !self.blocks_fill(row_start + left - 1, claimable) {
                left -= 1;
            }
            let mut right = column;
            while right + 1 < width && !self.blocks_fill(row_start + right + 1, claimable) {
                right += 1;
            }
            for flag in &mut claimable[row_start + left..=row_start + right] {
                *flag = false;
            }

            let above = row.checked_sub(1);
            let below = Some(row + 1).filter(|next| *next < height);
            for neighbour_row in [above, below].into_iter().flatten() {
                let neighbour_start = neighbour_row * width;
                let mut in_span = false;
                for neighbour_column in left..=right {
                    if self.blocks_fill(neighbour_start + neighbour_column, claimable) {
                        in_span = false;
                    } else if !in_span {
                        spans.push((neighbour_column, neighbour_row));
                        in_span = true;
                    }
                }
            }
        }
    }

    fn blocks_fill(&self, index: usize, claimable: &[bool]) -> bool {
        self.cells[index] == CellState::Claimed || !claimable[index]
    }

    fn replace_all(&mut self, from: CellState, to: CellState) {
        if self.count(from) == 0 {
            return;
        }
        for index in 0..self.cells.len() {
            if self.cells[index] == from {
                self.write(index, to);
            }
        }
    }

    fn write(&mut self, index: usize, state: CellState) {
        if !state.is_in_bounds() {
            return;
        }
        let Some(cell) = self.cells.get_mut(index) else {
            return;
        };
        let previous = std::mem::replace(cell, state);
        self.counts[slot(previous)] -= 1;
        self.counts[slot(state)] += 1;
    }

    fn coordinates(&self, index: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = u32::try_from(cell.column()).ok()?;
        let row = u32::try_from(cell.row()).ok()?;
        if column >= self.width || row >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

fn slot(state: CellState) -> usize {
    match state {
        CellState::Unclaimed | CellState::OutOfBounds => 0,
        CellState::Claimed => 1,
        CellState::Claiming => 2,
    }
}
