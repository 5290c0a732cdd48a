//! Convention classifiers for C#.
//!
//! Each classifier answers one question about how the code is written.
//! They share the member-resolution rules in [`crate::nav`]: a reference
//! only counts as evidence when it denotes exactly one member of the
//! nearest enclosing type and no local or parameter of the same name is in
//! scope.

mod backing_field;
mod qualification;
mod underscore_fields;
mod using_placement;

pub use backing_field::BackingFieldAdjacency;
pub use qualification::QualifyMemberAccess;
pub use underscore_fields::UnderscoreFields;
pub use using_placement::UsingPlacement;

#[cfg(test)]
pub(crate) mod test_support {
    use tugstyle_core::{Classifier, Outcome, WalkerPool};

    use crate::parser::parse;

    /// Classify a single snippet.
    pub fn classify<C: Classifier>(classifier: C, source: &str) -> Outcome<C::Detail> {
        let tree = parse(source).unwrap();
        let pool = WalkerPool::new(classifier);
        let mut walker = pool.borrow();
        walker.visit(&tree);
        walker.outcome()
    }
}
