//! Incremental construction of a [`Puzzle`] over a rectangular grid.

use std::num::NonZero;

use itertools::Itertools;
use ndarray::Array2;
use thiserror::Error;

use crate::constraint::{Constraint, Region};
use crate::domino::{Domino, Pip, MAX_PIP};
use crate::location::{Dimension, Location};
use crate::puzzle::Puzzle;

/// Reasons a [`PuzzleBuilder`] may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum BuilderInvalidReason {
    /// A cell or region was placed outside the bounds specified by `dims`.
    #[error("feature placed outside the bounding box")]
    FeatureOutOfBounds,
    /// A domino was given a pip value above six.
    #[error("domino pip out of range")]
    PipOutOfRange,
}

/// Assembles a [`Puzzle`] from a rectangle of cells, with holes punched by [`drop_location`](Self::drop_location).
///
/// The builder mutates itself while building but can be [`Clone`]d to save its state at some point.
/// Once invalid, every further call does nothing.
#[derive(Clone)]
pub struct PuzzleBuilder {
    // width, height
    dims: (Dimension, Dimension),
    valid: Array2<bool>,
    regions: Vec<Region>,
    dominoes: Vec<Domino>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl Default for PuzzleBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::new(4).unwrap(), NonZero::new(4).unwrap()))
    }
}

impl PuzzleBuilder {
    /// Construct a new builder with every cell valid, with dimensions given in `(width, height)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            valid: Array2::from_elem((dims.1.get(), dims.0.get()), true),
            regions: Default::default(),
            dominoes: Default::default(),
            invalid_reasons: Default::default(),
        }
    }

    #[inline]
    fn in_bounds(&self, location: Location) -> bool {
        location.col() < self.dims.0.get() && location.row() < self.dims.1.get()
    }

    /// Drop a location from the board. Any region cell here is dropped too.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if `location` is out of bounds.
    pub fn drop_location(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        match self.valid.get_mut(location.as_index()) {
            Some(slot) => *slot = false,
            None => self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds),
        }

        self
    }

    /// Add a region over `cells` with `constraint`.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if any cell is out of bounds.
    pub fn add_region(&mut self, id: &str, cells: Vec<Location>, constraint: Constraint) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !cells.iter().all(|location| self.in_bounds(*location)) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        self.regions.push(Region::new(id, cells, constraint));
        self
    }

    /// Remove the most recently added region.
    pub fn pop_region(&mut self) -> &mut Self {
        if self.invalid_reasons.is_empty() {
            self.regions.pop();
        }

        self
    }

    /// Add one domino; identities are handed out in insertion order.
    ///
    /// May cause the builder to enter a [`PipOutOfRange`](BuilderInvalidReason::PipOutOfRange) invalid state.
    pub fn add_domino(&mut self, pips: (Pip, Pip)) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if pips.0 > MAX_PIP || pips.1 > MAX_PIP {
            self.invalid_reasons.push(BuilderInvalidReason::PipOutOfRange);
            return self;
        }

        let id = self.dominoes.len();
        self.dominoes.push(Domino::new(id, pips));
        self
    }

    /// Shorthand for multiple calls to [`Self::add_domino`], with the same conditions.
    pub fn add_dominoes(&mut self, dominoes: &[(Pip, Pip)]) -> &mut Self {
        for pips in dominoes {
            self.add_domino(*pips);
        }

        self
    }

    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Puzzle`].
    ///
    /// Region cells on dropped locations are removed from their region. No other checking happens here; that is
    /// the job of [`validate`](crate::validate).
    pub fn build(&self) -> Result<Puzzle, &Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(&self.invalid_reasons);
        }

        let (cells, blocked): (Vec<Location>, Vec<Location>) = self.valid.indexed_iter()
            .map(|(index, valid)| (Location::from(index), *valid))
            .partition_map(|(location, valid)| if valid {
                itertools::Either::Left(location)
            } else {
                itertools::Either::Right(location)
            });

        let regions = self.regions.iter()
            .map(|region| Region {
                cells: region.cells.iter()
                    .copied()
                    .filter(|location| self.valid.get(location.as_index()).copied().unwrap_or(false))
                    .collect_vec(),
                ..region.clone()
            })
            .collect_vec();

        Ok(Puzzle {
            width: self.dims.0.get(),
            height: self.dims.1.get(),
            cells,
            regions,
            dominoes: self.dominoes.clone(),
            blocked,
        })
    }
}
