//! Resource budgets threaded through one top-level call.

use crate::api::Options;

/// Hard ceiling on nesting levels.
///
/// Both the walker and the type formatter recurse once per level, so the
/// layer budget of `stringify` and the depth of `format` are capped here even
/// when configured as unbounded. Deeper values are cut with `…`.
pub const MAX_NESTING: usize = 64;

/// A ceiling on one resource. Negative configuration values mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// At most this many units remain.
    Limited(usize),
    /// No ceiling.
    Unbounded,
}

impl Budget {
    /// Maps a configuration value to a budget; negative means unbounded.
    pub fn from_signed(value: i64) -> Self {
        usize::try_from(value).map_or(Self::Unbounded, Self::Limited)
    }

    /// Consumes one unit. Returns false when nothing was left.
    pub fn take(&mut self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(0) => false,
            Self::Limited(n) => {
                *n -= 1;
                true
            }
        }
    }

    /// True when no unit is left.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Limited(0))
    }

    /// The budget one level down.
    pub fn lower(self) -> Self {
        match self {
            Self::Limited(n) => Self::Limited(n.saturating_sub(1)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// This budget, holding at most `ceiling` units.
    pub fn capped(self, ceiling: usize) -> Self {
        match self {
            Self::Limited(n) => Self::Limited(n.min(ceiling)),
            Self::Unbounded => Self::Limited(ceiling),
        }
    }

    /// The remaining units, `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Limited(n) => Some(*n),
            Self::Unbounded => None,
        }
    }
}

/// The mutable counters bounding one flatten call.
///
/// Visits and layers are consumed as the walk proceeds; the string length is a
/// per-scalar cap. Exhaustion truncates the output, it is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    visits: Budget,
    string_length: Budget,
    layers: Budget,
}

impl Quota {
    /// Creates a quota from explicit budgets. Layers are capped at
    /// [`MAX_NESTING`].
    pub fn new(visits: Budget, string_length: Budget, layers: Budget) -> Self {
        Self {
            visits,
            string_length,
            layers: layers.capped(MAX_NESTING),
        }
    }

    /// Creates the quota described by `options`.
    pub fn from_options(options: &Options) -> Self {
        Self::new(
            Budget::from_signed(options.visit_budget),
            Budget::from_signed(options.string_length_budget),
            Budget::from_signed(options.recursion_budget),
        )
    }

    /// Consumes one visit.
    pub fn take_visit(&mut self) -> bool {
        self.visits.take()
    }

    /// Consumes one layer.
    pub fn take_layer(&mut self) -> bool {
        self.layers.take()
    }

    /// Remaining visits.
    pub fn visits(&self) -> Budget {
        self.visits
    }

    /// Remaining layers.
    pub fn layers(&self) -> Budget {
        self.layers
    }

    /// The per-scalar length cap.
    pub fn string_length(&self) -> Budget {
        self.string_length
    }

    /// Puts the visit counter back to an earlier reading.
    pub(crate) fn restore_visits(&mut self, visits: Budget) {
        self.visits = visits;
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_are_unbounded() {
        assert_eq!(Budget::from_signed(-1), Budget::Unbounded);
        assert_eq!(Budget::from_signed(0), Budget::Limited(0));
        assert_eq!(Budget::from_signed(80), Budget::Limited(80));
    }

    #[test]
    fn take_stops_at_zero() {
        let mut b = Budget::Limited(2);
        assert!(b.take());
        assert!(b.take());
        assert!(!b.take());
        assert!(b.is_exhausted());

        let mut u = Budget::Unbounded;
        for _ in 0..1_000 {
            assert!(u.take());
        }
    }

    #[test]
    fn layers_never_exceed_the_nesting_ceiling() {
        let q = Quota::new(Budget::Unbounded, Budget::Unbounded, Budget::Unbounded);
        assert_eq!(q.layers(), Budget::Limited(MAX_NESTING));
        let q = Quota::new(Budget::Unbounded, Budget::Unbounded, Budget::Limited(10_000));
        assert_eq!(q.layers(), Budget::Limited(MAX_NESTING));
        assert_eq!(Budget::Limited(3).capped(MAX_NESTING), Budget::Limited(3));
        assert_eq!(q.visits(), Budget::Unbounded);
    }

    #[test]
    fn default_quota_matches_defaults() {
        let q = Quota::default();
        assert_eq!(q.visits(), Budget::Limited(80));
        assert_eq!(q.string_length(), Budget::Limited(400));
        assert_eq!(q.layers(), Budget::Limited(20));
    }
}
