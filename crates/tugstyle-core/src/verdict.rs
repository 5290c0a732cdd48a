//! The verdict lattice and the accumulator classifiers fold evidence into.
//!
//! A [`Verdict`] is one of four values ordered as a small join-semilattice:
//!
//! ```text
//!            Mixed
//!           /     \
//!         Yes      No
//!           \     /
//!           Unknown
//! ```
//!
//! [`Verdict::merge`] is the join. It is commutative, associative and
//! idempotent, so evidence can be folded in any traversal order and the
//! result for a single tree is the same. `Mixed` is absorbing.
//!
//! Classifiers never construct a verdict directly. They hand an
//! [`Observation`] to a [`Tally`], which applies [`Verdict::update`].

use serde::{Deserialize, Serialize};

// ============================================================================
// Verdict
// ============================================================================

/// Outcome of applying a classifier to one or more artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No evidence seen.
    #[default]
    Unknown,
    /// Only evidence for the convention.
    Yes,
    /// Only evidence against the convention.
    No,
    /// Evidence both ways.
    Mixed,
}

impl Verdict {
    /// Join two verdicts.
    pub fn merge(self, other: Verdict) -> Verdict {
        match (self, other) {
            (Verdict::Unknown, x) | (x, Verdict::Unknown) => x,
            (Verdict::Mixed, _) | (_, Verdict::Mixed) => Verdict::Mixed,
            (Verdict::Yes, Verdict::Yes) => Verdict::Yes,
            (Verdict::No, Verdict::No) => Verdict::No,
            (Verdict::Yes, Verdict::No) | (Verdict::No, Verdict::Yes) => Verdict::Mixed,
        }
    }

    /// Fold a single Yes/No signal into the current verdict.
    pub fn update(self, observed: Signal) -> Verdict {
        self.merge(observed.into())
    }

    /// Returns true for anything other than `Unknown`.
    pub fn is_known(self) -> bool {
        self != Verdict::Unknown
    }

    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Unknown => "unknown",
            Verdict::Yes => "yes",
            Verdict::No => "no",
            Verdict::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single piece of evidence, stripped of any payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Yes,
    No,
}

impl From<Signal> for Verdict {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Yes => Verdict::Yes,
            Signal::No => Verdict::No,
        }
    }
}

// ============================================================================
// Observations and the accumulator
// ============================================================================

/// Evidence emitted by a classifier for one node.
///
/// `Yes` carries the classifier's detail payload (`()` for most
/// classifiers; a blank-line flag for backing-field adjacency).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation<D> {
    Yes(D),
    No,
}

impl Observation<()> {
    /// Payload-free positive evidence.
    pub const YES: Observation<()> = Observation::Yes(());
}

impl<D> Observation<D> {
    /// The signal this observation contributes to the verdict.
    pub fn signal(&self) -> Signal {
        match self {
            Observation::Yes(_) => Signal::Yes,
            Observation::No => Signal::No,
        }
    }
}

/// Per-visit accumulator: the running verdict plus the detail of the
/// most recent positive observation.
///
/// A fresh `Tally` is the zero state described for borrowed walkers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<D> {
    verdict: Verdict,
    detail: Option<D>,
}

impl<D> Default for Tally<D> {
    fn default() -> Self {
        Tally {
            verdict: Verdict::Unknown,
            detail: None,
        }
    }
}

impl<D> Tally<D> {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation.
    pub fn record(&mut self, observation: Observation<D>) {
        self.verdict = self.verdict.update(observation.signal());
        if let Observation::Yes(detail) = observation {
            self.detail = Some(detail);
        }
    }

    /// The verdict accumulated so far.
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Reset to the zero state.
    pub fn clear(&mut self) {
        self.verdict = Verdict::Unknown;
        self.detail = None;
    }
}

impl<D: Clone> Tally<D> {
    /// Snapshot the tally as an [`Outcome`].
    pub fn outcome(&self) -> Outcome<D> {
        match (self.verdict, &self.detail) {
            (Verdict::Unknown, _) => Outcome::Unknown,
            (Verdict::No, _) => Outcome::No,
            (Verdict::Mixed, _) => Outcome::Mixed,
            (Verdict::Yes, Some(detail)) => Outcome::Yes(detail.clone()),
            // A Yes verdict is only reachable through a Yes observation.
            (Verdict::Yes, None) => Outcome::Unknown,
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// A verdict with the classifier detail attached to the `Yes` case.
///
/// The detail is only meaningful when the convention was observed, so it
/// only exists in that variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum Outcome<D = ()> {
    Unknown,
    Yes(D),
    No,
    Mixed,
}

impl<D> Outcome<D> {
    /// The bare verdict.
    pub fn verdict(&self) -> Verdict {
        match self {
            Outcome::Unknown => Verdict::Unknown,
            Outcome::Yes(_) => Verdict::Yes,
            Outcome::No => Verdict::No,
            Outcome::Mixed => Verdict::Mixed,
        }
    }

    /// The detail payload, present only for `Yes`.
    pub fn detail(&self) -> Option<&D> {
        match self {
            Outcome::Yes(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns true for anything other than `Unknown`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Outcome::Unknown)
    }

    /// Map the detail payload.
    pub fn map<U, F: FnOnce(D) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Unknown => Outcome::Unknown,
            Outcome::Yes(detail) => Outcome::Yes(f(detail)),
            Outcome::No => Outcome::No,
            Outcome::Mixed => Outcome::Mixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Verdict; 4] = [Verdict::Unknown, Verdict::Yes, Verdict::No, Verdict::Mixed];

    #[test]
    fn test_merge_table() {
        assert_eq!(Verdict::Unknown.merge(Verdict::Yes), Verdict::Yes);
        assert_eq!(Verdict::Unknown.merge(Verdict::No), Verdict::No);
        assert_eq!(Verdict::Yes.merge(Verdict::Yes), Verdict::Yes);
        assert_eq!(Verdict::No.merge(Verdict::No), Verdict::No);
        assert_eq!(Verdict::Yes.merge(Verdict::No), Verdict::Mixed);
        assert_eq!(Verdict::No.merge(Verdict::Yes), Verdict::Mixed);
        assert_eq!(Verdict::Mixed.merge(Verdict::Yes), Verdict::Mixed);
        assert_eq!(Verdict::Mixed.merge(Verdict::Unknown), Verdict::Mixed);
    }

    #[test]
    fn test_merge_is_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.merge(b), b.merge(a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_merge_is_associative() {
        for a in ALL {
            for b in ALL {
                for c in ALL {
                    assert_eq!(a.merge(b).merge(c), a.merge(b.merge(c)));
                }
            }
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        for a in ALL {
            assert_eq!(a.merge(a), a);
        }
    }

    #[test]
    fn test_mixed_is_absorbing() {
        let mut v = Verdict::Yes.update(Signal::No);
        assert_eq!(v, Verdict::Mixed);
        v = v.update(Signal::Yes);
        v = v.update(Signal::No);
        assert_eq!(v, Verdict::Mixed);
    }

    #[test]
    fn test_tally_keeps_last_yes_detail() {
        let mut tally = Tally::new();
        tally.record(Observation::Yes(false));
        tally.record(Observation::Yes(true));
        assert_eq!(tally.outcome(), Outcome::Yes(true));
    }

    #[test]
    fn test_tally_drops_detail_when_mixed() {
        let mut tally = Tally::new();
        tally.record(Observation::Yes(true));
        tally.record(Observation::No);
        assert_eq!(tally.outcome(), Outcome::Mixed);
        assert_eq!(tally.outcome().detail(), None);
    }

    #[test]
    fn test_tally_clear_returns_to_zero_state() {
        let mut tally = Tally::new();
        tally.record(Observation::YES);
        tally.clear();
        assert_eq!(tally, Tally::default());
        assert_eq!(tally.outcome(), Outcome::Unknown);
    }

    #[test]
    fn test_outcome_serializes_with_verdict_tag() {
        let json = serde_json::to_string(&Outcome::Yes(true)).unwrap();
        assert_eq!(json, r#"{"verdict":"yes","detail":true}"#);
        let json = serde_json::to_string(&Outcome::<bool>::No).unwrap();
        assert_eq!(json, r#"{"verdict":"no"}"#);
    }
}
