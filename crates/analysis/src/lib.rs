//! Match-arm exhaustiveness and usefulness analysis.
//!
//! Given an opaque type descriptor (a [`ty::TyDb`] implementor) and the
//! patterns of a match expression, this crate decides whether the arms
//! cover every value of the scrutinee type (producing concrete witness
//! patterns for anything missed) and whether each arm can match a value
//! no earlier arm matches. The algorithm is the classic usefulness
//! construction from Maranget's "Warnings for pattern matching",
//! specialized over the [`Constructor`] algebra.
//!
//! The analysis is pure: no state survives a call, nothing is logged, and
//! every verdict is either complete or an error. An
//! [`MatchCheckError::IncompatibleConstructor`] means the caller built a
//! malformed matrix; [`MatchCheckError::UnsupportedDomain`] means the
//! verdict would require a constructor enumeration (array/slice lengths)
//! that is intentionally not implemented, and the caller should skip the
//! diagnostic rather than trust a guess.

pub mod constructor;
pub mod error;
pub mod pattern;
pub mod pattern_analysis;

pub use constructor::Constructor;
pub use error::MatchCheckError;
pub use pattern::{display_pattern, Pattern};
pub use pattern_analysis::{PatternMatrix, PatternRowVec, SigmaSet};

use ty::{TyDb, TyId};

/// Exhaustiveness verdict for a match. Witnesses reuse the input
/// [`Pattern`] vocabulary and are suitable for rendering as
/// "missing: `<pattern>`".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exhaustiveness {
    Exhaustive,
    NonExhaustive(Vec<Pattern>),
}

impl Exhaustiveness {
    pub fn is_exhaustive(&self) -> bool {
        matches!(self, Exhaustiveness::Exhaustive)
    }
}

/// One arm of a match expression. An arm with a guard may fail at
/// runtime, so it neither contributes to exhaustiveness nor shadows the
/// arms after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchArm {
    pub pat: Pattern,
    pub has_guard: bool,
}

impl MatchArm {
    pub fn new(pat: Pattern) -> Self {
        Self {
            pat,
            has_guard: false,
        }
    }

    pub fn guarded(pat: Pattern) -> Self {
        Self {
            pat,
            has_guard: true,
        }
    }
}

/// Combined verdict of [`check_match`]. `reachable` is 1:1 with the input
/// arms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchReport {
    pub exhaustiveness: Exhaustiveness,
    pub reachable: Vec<bool>,
}

/// Whether `patterns` cover every value of `ty`, with at least one
/// witness per gap when they do not.
pub fn check_exhaustiveness(
    db: &dyn TyDb,
    ty: TyId,
    patterns: &[Pattern],
) -> Result<Exhaustiveness, MatchCheckError> {
    let matrix = PatternMatrix::from_patterns(db, patterns, ty)?;
    match matrix.find_missing_patterns(db)? {
        Some(missing) => Ok(Exhaustiveness::NonExhaustive(witnesses(db, &missing))),
        None => Ok(Exhaustiveness::Exhaustive),
    }
}

/// Per-row reachability: `false` marks an arm fully subsumed by the arms
/// before it.
pub fn check_reachability(
    db: &dyn TyDb,
    ty: TyId,
    patterns: &[Pattern],
) -> Result<Vec<bool>, MatchCheckError> {
    let matrix = PatternMatrix::from_patterns(db, patterns, ty)?;
    (0..patterns.len())
        .map(|row| matrix.is_row_useful(db, row))
        .collect()
}

/// Whether `candidate` can match some value of `ty` that no pattern in
/// `preceding` matches.
pub fn is_useful(
    db: &dyn TyDb,
    ty: TyId,
    preceding: &[Pattern],
    candidate: &Pattern,
) -> Result<bool, MatchCheckError> {
    let matrix = PatternMatrix::from_patterns(db, preceding, ty)?;
    let row = PatternRowVec::new(vec![pattern::lower(db, candidate, ty)?]);
    matrix.is_pattern_useful(db, &row)
}

/// Guard-aware analysis of a whole match expression.
pub fn check_match(
    db: &dyn TyDb,
    ty: TyId,
    arms: &[MatchArm],
) -> Result<MatchReport, MatchCheckError> {
    let unguarded: Vec<Pattern> = arms
        .iter()
        .filter(|arm| !arm.has_guard)
        .map(|arm| arm.pat.clone())
        .collect();
    let exhaustiveness = check_exhaustiveness(db, ty, &unguarded)?;

    let mut reachable = Vec::with_capacity(arms.len());
    for (idx, arm) in arms.iter().enumerate() {
        let preceding: Vec<Pattern> = arms[..idx]
            .iter()
            .filter(|prior| !prior.has_guard)
            .map(|prior| prior.pat.clone())
            .collect();
        reachable.push(is_useful(db, ty, &preceding, &arm.pat)?);
    }

    Ok(MatchReport {
        exhaustiveness,
        reachable,
    })
}

/// A top-level witness row always has a single column; an or-set there is
/// several independent witnesses.
fn witnesses(db: &dyn TyDb, row: &[pattern::SimplifiedPattern]) -> Vec<Pattern> {
    let Some(head) = row.first() else {
        return vec![Pattern::Wildcard];
    };
    match pattern::to_pattern(db, head) {
        Pattern::Or(alternatives) => alternatives,
        witness => vec![witness],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ty::{ConstValue, TyStore};

    fn wild() -> Pattern {
        Pattern::Wildcard
    }

    fn lit(value: impl Into<ConstValue>) -> Pattern {
        Pattern::literal(value)
    }

    fn variant(db: &TyStore, ty: TyId, idx: usize, fields: Vec<Pattern>) -> Pattern {
        let adt = ty.as_adt(db).unwrap();
        Pattern::Constructor {
            ctor: Constructor::Variant { adt, idx },
            fields,
        }
    }

    fn shape_store() -> (TyStore, TyId) {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let shape = store.enum_ty(
            "Shape",
            vec![("Circle", vec![int]), ("Rect", vec![int, int]), ("Point", vec![])],
        );
        (store, shape)
    }

    #[test]
    fn bool_true_false_is_exhaustive_and_reachable() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();
        let arms = [lit(true), lit(false)];

        let verdict = check_exhaustiveness(&store, bool_ty, &arms).unwrap();
        assert_eq!(verdict, Exhaustiveness::Exhaustive);
        assert_eq!(
            check_reachability(&store, bool_ty, &arms).unwrap(),
            vec![true, true]
        );
    }

    #[test]
    fn bool_true_only_witnesses_false() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();

        let verdict = check_exhaustiveness(&store, bool_ty, &[lit(true)]).unwrap();
        assert_eq!(
            verdict,
            Exhaustiveness::NonExhaustive(vec![lit(false)])
        );
    }

    #[test]
    fn wildcard_after_full_bool_coverage_is_unreachable() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();
        let arms = [lit(true), lit(false), wild()];

        assert_eq!(
            check_reachability(&store, bool_ty, &arms).unwrap(),
            vec![true, true, false]
        );
    }

    #[test]
    fn empty_match_witnesses_a_wildcard() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();
        let verdict = check_exhaustiveness(&store, bool_ty, &[]).unwrap();
        assert_eq!(verdict, Exhaustiveness::NonExhaustive(vec![wild()]));
    }

    #[test]
    fn enum_with_trailing_wildcard_is_exhaustive() {
        let (store, shape) = shape_store();
        let arms = [
            variant(&store, shape, 0, vec![wild()]),
            variant(&store, shape, 1, vec![wild(), wild()]),
            wild(),
        ];
        let verdict = check_exhaustiveness(&store, shape, &arms).unwrap();
        assert_eq!(verdict, Exhaustiveness::Exhaustive);
        assert_eq!(
            check_reachability(&store, shape, &arms).unwrap(),
            vec![true, true, true]
        );
    }

    #[test]
    fn wildcard_shadows_later_variant_arm() {
        let (store, shape) = shape_store();
        let arms = [
            variant(&store, shape, 0, vec![wild()]),
            wild(),
            variant(&store, shape, 2, vec![]),
        ];
        assert_eq!(
            check_reachability(&store, shape, &arms).unwrap(),
            vec![true, true, false]
        );
    }

    #[test]
    fn missing_variant_is_witnessed_by_name() {
        let (store, shape) = shape_store();
        let arms = [
            variant(&store, shape, 0, vec![wild()]),
            variant(&store, shape, 1, vec![wild(), wild()]),
        ];
        let verdict = check_exhaustiveness(&store, shape, &arms).unwrap();
        let Exhaustiveness::NonExhaustive(witnesses) = verdict else {
            panic!("expected a missing-pattern verdict");
        };
        assert_eq!(witnesses, vec![variant(&store, shape, 2, vec![])]);
        assert_eq!(
            display_pattern(&store, shape, &witnesses[0]),
            "Shape::Point"
        );
    }

    #[test]
    fn two_missing_variants_are_two_witnesses() {
        let (store, shape) = shape_store();
        let arms = [variant(&store, shape, 1, vec![wild(), wild()])];
        let Exhaustiveness::NonExhaustive(witnesses) =
            check_exhaustiveness(&store, shape, &arms).unwrap()
        else {
            panic!("expected a missing-pattern verdict");
        };
        assert_eq!(
            witnesses,
            vec![
                variant(&store, shape, 0, vec![wild()]),
                variant(&store, shape, 2, vec![]),
            ]
        );
    }

    #[test]
    fn nested_variant_gap_is_found() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let shape = store.enum_ty("Shape", vec![("Circle", vec![int]), ("Point", vec![])]);
        let opt = store.enum_ty("Option", vec![("Some", vec![shape]), ("None", vec![])]);

        let covered = [
            variant(
                &store,
                opt,
                0,
                vec![variant(&store, shape, 0, vec![wild()])],
            ),
            variant(&store, opt, 0, vec![variant(&store, shape, 1, vec![])]),
            variant(&store, opt, 1, vec![]),
        ];
        assert!(check_exhaustiveness(&store, opt, &covered)
            .unwrap()
            .is_exhaustive());

        let gappy = [
            variant(
                &store,
                opt,
                0,
                vec![variant(&store, shape, 0, vec![wild()])],
            ),
            variant(&store, opt, 1, vec![]),
        ];
        let Exhaustiveness::NonExhaustive(witnesses) =
            check_exhaustiveness(&store, opt, &gappy).unwrap()
        else {
            panic!("Some(Point) is not covered");
        };
        assert_eq!(
            display_pattern(&store, opt, &witnesses[0]),
            "Option::Some(Shape::Point)"
        );
    }

    #[test]
    fn tuple_coverage_is_a_cross_product() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();
        let pair = store.tuple_ty(vec![bool_ty, bool_ty]);
        let tuple = |a: Pattern, b: Pattern| Pattern::Constructor {
            ctor: Constructor::Single,
            fields: vec![a, b],
        };

        // (true, _) and (_, false) leave (false, true) uncovered.
        let arms = [tuple(lit(true), wild()), tuple(wild(), lit(false))];
        let Exhaustiveness::NonExhaustive(witnesses) =
            check_exhaustiveness(&store, pair, &arms).unwrap()
        else {
            panic!("(false, true) is not covered");
        };
        assert_eq!(
            display_pattern(&store, pair, &witnesses[0]),
            "(false, true)"
        );

        let full = [tuple(lit(true), wild()), tuple(lit(false), wild())];
        assert!(check_exhaustiveness(&store, pair, &full)
            .unwrap()
            .is_exhaustive());
    }

    #[test]
    fn struct_wildcard_row_is_exhaustive() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let point = store.struct_ty("Point", vec![int, int]);

        assert!(check_exhaustiveness(&store, point, &[wild()])
            .unwrap()
            .is_exhaustive());

        let destructured = Pattern::Constructor {
            ctor: Constructor::Single,
            fields: vec![wild(), wild()],
        };
        assert!(check_exhaustiveness(&store, point, &[destructured])
            .unwrap()
            .is_exhaustive());
    }

    #[test]
    fn reference_is_matched_through() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();
        let reference = store.ref_ty(bool_ty);
        let deref = |inner: Pattern| Pattern::Constructor {
            ctor: Constructor::Single,
            fields: vec![inner],
        };

        let arms = [deref(lit(true)), deref(lit(false))];
        assert!(check_exhaustiveness(&store, reference, &arms)
            .unwrap()
            .is_exhaustive());

        let partial = [deref(lit(true))];
        let Exhaustiveness::NonExhaustive(witnesses) =
            check_exhaustiveness(&store, reference, &partial).unwrap()
        else {
            panic!("&false is not covered");
        };
        assert_eq!(display_pattern(&store, reference, &witnesses[0]), "&false");
    }

    #[test]
    fn integers_need_a_wildcard() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");

        let listed = [lit(1i64), lit(2i64)];
        let Exhaustiveness::NonExhaustive(witnesses) =
            check_exhaustiveness(&store, int, &listed).unwrap()
        else {
            panic!("integer literals never exhaust the type");
        };
        assert_eq!(witnesses, vec![wild()]);

        let closed = [lit(1i64), lit(2i64), wild()];
        assert!(check_exhaustiveness(&store, int, &closed)
            .unwrap()
            .is_exhaustive());
        assert_eq!(
            check_reachability(&store, int, &closed).unwrap(),
            vec![true, true, true]
        );
    }

    #[test]
    fn duplicate_literal_is_unreachable() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let arms = [lit(1i64), lit(1i64), wild()];
        assert_eq!(
            check_reachability(&store, int, &arms).unwrap(),
            vec![true, false, true]
        );
    }

    #[test]
    fn range_union_subsumes_a_spanning_range() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");

        // 0..=3 and 4..=5 together cover 0..=5 exactly.
        let arms = [
            Pattern::range(0i64, 3i64, true),
            Pattern::range(4i64, 5i64, true),
            Pattern::range(0i64, 5i64, true),
            wild(),
        ];
        assert_eq!(
            check_reachability(&store, int, &arms).unwrap(),
            vec![true, true, false, true]
        );
    }

    #[test]
    fn partially_overlapped_range_stays_reachable() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let arms = [
            Pattern::range(0i64, 3i64, true),
            Pattern::range(0i64, 5i64, true),
            wild(),
        ];
        assert_eq!(
            check_reachability(&store, int, &arms).unwrap(),
            vec![true, true, true]
        );
    }

    #[test]
    fn exclusive_range_leaves_its_endpoint() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");

        // 5 is outside 1..5 but 4 is inside.
        assert!(is_useful(
            &store,
            int,
            &[Pattern::range(1i64, 5i64, false)],
            &lit(5i64)
        )
        .unwrap());
        assert!(!is_useful(
            &store,
            int,
            &[Pattern::range(1i64, 5i64, false)],
            &lit(4i64)
        )
        .unwrap());
    }

    #[test]
    fn bool_ranges_complete_the_type() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();
        let arms = [Pattern::range(false, true, true)];
        assert!(check_exhaustiveness(&store, bool_ty, &arms)
            .unwrap()
            .is_exhaustive());
    }

    #[test]
    fn or_pattern_covers_both_variants() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let shape = store.enum_ty("Shape", vec![("Circle", vec![int]), ("Point", vec![])]);

        let either = Pattern::Or(vec![
            variant(&store, shape, 0, vec![wild()]),
            variant(&store, shape, 1, vec![]),
        ]);
        assert!(check_exhaustiveness(&store, shape, &[either])
            .unwrap()
            .is_exhaustive());

        let same_twice = Pattern::Or(vec![
            variant(&store, shape, 0, vec![wild()]),
            variant(&store, shape, 0, vec![wild()]),
        ]);
        assert!(!check_exhaustiveness(&store, shape, &[same_twice])
            .unwrap()
            .is_exhaustive());
    }

    #[test]
    fn slice_patterns_without_wildcard_cannot_be_decided() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let slice = store.slice_ty(int);
        let len = |size: usize| Pattern::Constructor {
            ctor: Constructor::Slice { size },
            fields: vec![wild(); size],
        };

        let open = [len(0), len(1)];
        assert!(matches!(
            check_exhaustiveness(&store, slice, &open),
            Err(MatchCheckError::UnsupportedDomain(_))
        ));

        // A trailing wildcard needs no length enumeration.
        let closed = [len(0), len(1), wild()];
        assert!(check_exhaustiveness(&store, slice, &closed)
            .unwrap()
            .is_exhaustive());
        assert_eq!(
            check_reachability(&store, slice, &closed).unwrap(),
            vec![true, true, true]
        );
    }

    #[test]
    fn mixed_literal_kinds_abort_the_analysis() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let arms = [lit(1i64), lit(true), wild()];
        assert!(matches!(
            check_reachability(&store, int, &arms),
            Err(MatchCheckError::IncompatibleConstructor(_))
        ));
    }

    #[test]
    fn guarded_arm_neither_counts_nor_shadows() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();

        // match b { true if g => .., true => .., false => .. }
        let arms = [
            MatchArm::guarded(lit(true)),
            MatchArm::new(lit(true)),
            MatchArm::new(lit(false)),
        ];
        let report = check_match(&store, bool_ty, &arms).unwrap();
        assert!(report.exhaustiveness.is_exhaustive());
        assert_eq!(report.reachable, vec![true, true, true]);

        // With only a guarded `false`, the match can still fall through.
        let leaky = [MatchArm::new(lit(true)), MatchArm::guarded(lit(false))];
        let report = check_match(&store, bool_ty, &leaky).unwrap();
        assert_eq!(
            report.exhaustiveness,
            Exhaustiveness::NonExhaustive(vec![lit(false)])
        );

        // A guarded arm behind full coverage is itself unreachable.
        let shadowed = [
            MatchArm::new(lit(true)),
            MatchArm::new(lit(false)),
            MatchArm::guarded(lit(true)),
        ];
        let report = check_match(&store, bool_ty, &shadowed).unwrap();
        assert_eq!(report.reachable, vec![true, true, false]);
    }
}
