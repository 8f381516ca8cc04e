//! Region constraints and the predicate that evaluates them.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::domino::{Pip, MAX_PIP};
use crate::location::Location;

/// Number of distinct pip values, and so the largest region a `different` constraint can cover.
pub const DISTINCT_PIPS: usize = MAX_PIP as usize + 1;

/// What a region demands of its pips. Written in lowercase (`"sum"`, `"equal"`, ...) when parsed or serialized.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// The pips total exactly the value.
    Sum,
    /// Every pip is the same.
    Equal,
    /// No two pips are the same.
    Different,
    /// The pips total more than the value.
    Greater,
    /// The pips total less than the value.
    Less,
    /// Anything goes.
    Any,
}

impl ConstraintKind {
    /// Whether this kind compares the region total against a value.
    pub fn needs_value(&self) -> bool {
        matches!(self, Self::Sum | Self::Greater | Self::Less)
    }
}

/// A [`ConstraintKind`] with its target or bound, if it takes one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// What is checked.
    pub kind: ConstraintKind,
    /// Target for `sum`, bound for `greater` and `less`; ignored otherwise.
    #[serde(default)]
    pub value: Option<i32>,
}

impl Constraint {
    /// The pips must total exactly `target`.
    pub fn sum(target: i32) -> Self {
        Self { kind: ConstraintKind::Sum, value: Some(target) }
    }

    /// All pips must match.
    pub fn equal() -> Self {
        Self { kind: ConstraintKind::Equal, value: None }
    }

    /// All pips must differ.
    pub fn different() -> Self {
        Self { kind: ConstraintKind::Different, value: None }
    }

    /// The pips must total more than `bound`.
    pub fn greater(bound: i32) -> Self {
        Self { kind: ConstraintKind::Greater, value: Some(bound) }
    }

    /// The pips must total less than `bound`.
    pub fn less(bound: i32) -> Self {
        Self { kind: ConstraintKind::Less, value: Some(bound) }
    }

    /// No restriction.
    pub fn any() -> Self {
        Self { kind: ConstraintKind::Any, value: None }
    }

    /// Evaluate this constraint over the pips of a region.
    ///
    /// With `complete` set, `pips` must hold every cell of the region and the constraint is checked exactly.
    /// Otherwise `pips` are the cells placed so far and the check only fails when no completion could pass.
    /// `greater` can never fail a partial check, since more pips only raise the total; `less` fails as soon as the
    /// running total reaches the bound.
    ///
    /// An empty `pips` satisfies every constraint. A `sum`, `greater` or `less` without a value passes every
    /// partial check and fails every complete one.
    pub fn satisfies(&self, pips: &[Pip], complete: bool) -> bool {
        if pips.is_empty() {
            return true;
        }

        let total = || pips.iter().map(|pip| i64::from(*pip)).sum::<i64>();

        match self.kind {
            ConstraintKind::Any => true,
            ConstraintKind::Equal => pips.iter().all_equal(),
            ConstraintKind::Different => pips.iter().all_unique(),
            ConstraintKind::Sum => match self.value {
                None => !complete,
                Some(target) if complete => total() == i64::from(target),
                Some(target) => total() <= i64::from(target),
            },
            ConstraintKind::Greater => match self.value {
                None => !complete,
                Some(bound) if complete => total() > i64::from(bound),
                Some(_) => true,
            },
            ConstraintKind::Less => match self.value {
                None => !complete,
                Some(bound) => total() < i64::from(bound),
            },
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.kind, self.value) {
            (ConstraintKind::Sum, Some(v)) => write!(f, "sum={v}"),
            (ConstraintKind::Greater, Some(v)) => write!(f, ">{v}"),
            (ConstraintKind::Less, Some(v)) => write!(f, "<{v}"),
            (kind, _) => write!(f, "{kind}"),
        }
    }
}

/// A group of cells sharing one constraint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Name used in diagnostics.
    pub id: String,
    /// Member cells. They should be contiguous, on the board, and not shared with another region.
    pub cells: Vec<Location>,
    /// Applied to the pips on `cells`.
    pub constraint: Constraint,
}

impl Region {
    /// Create a region named `id`.
    pub fn new(id: impl Into<String>, cells: Vec<Location>, constraint: Constraint) -> Self {
        Self { id: id.into(), cells, constraint }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Constraint, ConstraintKind};

    #[test]
    fn empty_region_always_passes() {
        for constraint in [Constraint::sum(3), Constraint::equal(), Constraint::different(), Constraint::greater(20), Constraint::less(0), Constraint::any()] {
            assert!(constraint.satisfies(&[], true), "{constraint}");
            assert!(constraint.satisfies(&[], false), "{constraint}");
        }
    }

    #[test]
    fn sum_prunes_on_overshoot() {
        let sum = Constraint::sum(7);
        assert!(sum.satisfies(&[3, 4], true));
        assert!(!sum.satisfies(&[3, 3], true));
        assert!(sum.satisfies(&[3, 3], false));
        assert!(!sum.satisfies(&[6, 2], false));
    }

    #[test]
    fn greater_never_prunes_but_less_does() {
        let greater = Constraint::greater(10);
        assert!(greater.satisfies(&[0], false));
        assert!(!greater.satisfies(&[5, 5], true));
        assert!(greater.satisfies(&[5, 6], true));

        let less = Constraint::less(4);
        assert!(less.satisfies(&[3], false));
        assert!(!less.satisfies(&[4], false));
        assert!(!less.satisfies(&[2, 2], true));
        assert!(less.satisfies(&[1, 2], true));
    }

    #[test]
    fn equal_and_different() {
        assert!(Constraint::equal().satisfies(&[2, 2, 2], true));
        assert!(!Constraint::equal().satisfies(&[2, 3], false));
        assert!(Constraint::different().satisfies(&[0, 1, 6], true));
        assert!(!Constraint::different().satisfies(&[1, 0, 1], false));
    }

    #[test]
    fn missing_value_fails_only_when_complete() {
        let bare = Constraint { kind: ConstraintKind::Sum, value: None };
        assert!(bare.satisfies(&[1], false));
        assert!(!bare.satisfies(&[1, 2], true));
    }

    #[test]
    fn kinds_parse_and_print() {
        assert_eq!(ConstraintKind::from_str("different").unwrap(), ConstraintKind::Different);
        assert!(ConstraintKind::from_str("bogus").is_err());
        assert_eq!(Constraint::sum(10).to_string(), "sum=10");
        assert_eq!(Constraint::less(3).to_string(), "<3");
        assert_eq!(Constraint::equal().to_string(), "equal");
    }
}
