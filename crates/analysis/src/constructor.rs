//! The constructor vocabulary of the pattern algebra.
//!
//! A [`Constructor`] names one way a value of a type can be built; the
//! engine decomposes types through it (`arity`/`sub_tys`), asks range
//! membership of it (`covered_by_range`), and seeds coverage checks from
//! [`Constructor::all_constructors`]. The set is closed: every consumer
//! matches it exhaustively, so a new constructor kind forces every
//! consumer to be revisited.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use ty::{AdtId, AdtKind, ConstValue, TyDb, TyId, TyKind};

use crate::error::MatchCheckError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constructor {
    /// The sole constructor of types with exactly one shape: structs,
    /// tuples, references, fixed-length arrays.
    Single,
    /// One arm of an enum, by declaration index.
    Variant { adt: AdtId, idx: usize },
    /// A single literal value.
    ConstantValue(ConstValue),
    /// A contiguous range of literal values (`2..5`, `2..=5`).
    ConstantRange {
        start: ConstValue,
        end: ConstValue,
        include_end: bool,
    },
    /// An array or slice pattern of observed length `size`.
    Slice { size: usize },
}

impl Constructor {
    /// The number of sub-pattern positions this constructor implies for
    /// `ty`. Pairings that cannot occur in a well-formed matrix are an
    /// [`MatchCheckError::IncompatibleConstructor`] error.
    pub fn arity(&self, db: &dyn TyDb, ty: TyId) -> Result<usize, MatchCheckError> {
        match ty.kind(db) {
            TyKind::Tuple(elems) => Ok(elems.len()),

            TyKind::Array { .. } | TyKind::Slice { .. } => match self {
                Constructor::Slice { size } => Ok(*size),
                // A string/byte literal matched against a slice-like type
                // has nothing further to match.
                Constructor::ConstantValue(_) => Ok(0),
                _ => Err(self.incompatible_with(db, ty)),
            },

            TyKind::Ref(_) => Ok(1),

            TyKind::Adt(adt) => {
                let data = db.adt_data(*adt);
                match (&data.kind, self) {
                    (AdtKind::Struct { field_tys }, _) => Ok(field_tys.len()),
                    (AdtKind::Enum { .. }, Constructor::Variant { adt: var_adt, idx })
                        if var_adt == adt =>
                    {
                        data.variant(*idx)
                            .map(|variant| variant.field_tys.len())
                            .ok_or_else(|| self.incompatible_with(db, ty))
                    }
                    _ => Err(self.incompatible_with(db, ty)),
                }
            }

            TyKind::Bool | TyKind::Other(_) => Ok(0),
        }
    }

    /// The types of the sub-positions implied by `arity`, in declared
    /// order. Total: unrecognized pairings degrade to an empty list, since
    /// decomposition is used speculatively during specialization and an
    /// empty list is a safe leaf.
    pub fn sub_tys(&self, db: &dyn TyDb, ty: TyId) -> Vec<TyId> {
        match ty.kind(db) {
            TyKind::Tuple(elems) => elems.clone(),

            TyKind::Array { elem, .. } | TyKind::Slice { elem } => match self {
                Constructor::Slice { size } => vec![*elem; *size],
                _ => vec![],
            },

            TyKind::Ref(inner) => vec![*inner],

            TyKind::Adt(adt) => {
                let data = db.adt_data(*adt);
                match (&data.kind, self) {
                    (AdtKind::Struct { field_tys }, Constructor::Single) => field_tys.clone(),
                    (AdtKind::Enum { .. }, Constructor::Variant { adt: var_adt, idx })
                        if var_adt == adt =>
                    {
                        data.variant(*idx)
                            .map(|variant| variant.field_tys.clone())
                            .unwrap_or_default()
                    }
                    _ => vec![],
                }
            }

            TyKind::Bool | TyKind::Other(_) => vec![],
        }
    }

    /// Whether this constructor's entire value set lies within the query
    /// range `[from, to]` (closed if `included`, half-open otherwise).
    ///
    /// `Single` carries no value information and answers `true`; the
    /// non-range-shaped constructors answer `false`. Mismatched literal
    /// kinds fail loudly instead of coercing.
    pub fn covered_by_range(
        &self,
        from: &ConstValue,
        to: &ConstValue,
        included: bool,
    ) -> Result<bool, MatchCheckError> {
        match self {
            Constructor::Single => Ok(true),

            Constructor::ConstantValue(value) => {
                let above = cmp(value, from)? != Ordering::Less;
                let below = match cmp(value, to)? {
                    Ordering::Less => true,
                    Ordering::Equal => included,
                    Ordering::Greater => false,
                };
                Ok(above && below)
            }

            Constructor::ConstantRange {
                start,
                end,
                include_end,
            } => {
                let start_ok = cmp(start, from)? != Ordering::Less;
                let end_ok = match cmp(end, to)? {
                    Ordering::Less => true,
                    // An exclusive end never reaches its endpoint, so
                    // `end == to` fits an inclusive query bound and an
                    // exclusive one alike.
                    Ordering::Equal => included || !include_end,
                    Ordering::Greater => false,
                };
                Ok(start_ok && end_ok)
            }

            Constructor::Variant { .. } | Constructor::Slice { .. } => Ok(false),
        }
    }

    /// Whether this constructor's value set lies entirely within `other`'s,
    /// for the range-shaped fragment of the algebra. `false` whenever
    /// `other` is not range-shaped.
    pub(crate) fn covered_by(&self, other: &Constructor) -> Result<bool, MatchCheckError> {
        match other {
            Constructor::ConstantValue(value) => self.covered_by_range(value, value, true),
            Constructor::ConstantRange {
                start,
                end,
                include_end,
            } => self.covered_by_range(start, end, *include_end),
            _ => Ok(false),
        }
    }

    pub(crate) fn is_range_shaped(&self) -> bool {
        matches!(
            self,
            Constructor::ConstantValue(_) | Constructor::ConstantRange { .. }
        )
    }

    /// Every constructor `ty` admits, in a deterministic order: booleans
    /// as `true` then `false`, enum variants in declaration order,
    /// everything single-shaped as `[Single]`.
    ///
    /// Array and slice types need a length-enumeration strategy that is
    /// intentionally not implemented; they fail fast with
    /// [`MatchCheckError::UnsupportedDomain`] rather than return a wrong
    /// or empty set.
    pub fn all_constructors(db: &dyn TyDb, ty: TyId) -> Result<Vec<Constructor>, MatchCheckError> {
        match ty.kind(db) {
            TyKind::Bool => Ok(vec![
                Constructor::ConstantValue(ConstValue::Bool(true)),
                Constructor::ConstantValue(ConstValue::Bool(false)),
            ]),

            TyKind::Adt(adt) => match &db.adt_data(*adt).kind {
                AdtKind::Enum { variants } => Ok((0..variants.len())
                    .map(|idx| Constructor::Variant { adt: *adt, idx })
                    .collect()),
                AdtKind::Struct { .. } => Ok(vec![Constructor::Single]),
            },

            TyKind::Array { size: Some(_), .. } => Err(MatchCheckError::UnsupportedDomain(
                "fixed-length array types",
            )),
            TyKind::Array { size: None, .. } | TyKind::Slice { .. } => Err(
                MatchCheckError::UnsupportedDomain("variable-length slice types"),
            ),

            TyKind::Tuple(_) | TyKind::Ref(_) | TyKind::Other(_) => Ok(vec![Constructor::Single]),
        }
    }

    fn incompatible_with(&self, db: &dyn TyDb, ty: TyId) -> MatchCheckError {
        MatchCheckError::incompatible(format!(
            "{self:?} applied to `{}`",
            ty.pretty_print(db)
        ))
    }
}

pub(crate) fn cmp(lhs: &ConstValue, rhs: &ConstValue) -> Result<Ordering, MatchCheckError> {
    lhs.try_cmp(rhs).ok_or_else(|| {
        MatchCheckError::incompatible(format!(
            "comparison of {} and {} literals",
            lhs.kind_name(),
            rhs.kind_name()
        ))
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScalarKind {
    Bool,
    Int,
    Char,
}

fn scalar_of(value: &ConstValue) -> Option<(ScalarKind, BigInt)> {
    match value {
        ConstValue::Bool(b) => Some((ScalarKind::Bool, BigInt::from(*b as u8))),
        ConstValue::Int(i) => Some((ScalarKind::Int, i.clone())),
        ConstValue::Char(c) => Some((ScalarKind::Char, BigInt::from(*c as u32))),
        ConstValue::Float(_) | ConstValue::Str(_) => None,
    }
}

fn value_of(kind: ScalarKind, scalar: &BigInt) -> Option<ConstValue> {
    match kind {
        ScalarKind::Bool => Some(ConstValue::Bool(*scalar == BigInt::from(1u8))),
        ScalarKind::Int => Some(ConstValue::Int(scalar.clone())),
        ScalarKind::Char => scalar.to_u32().and_then(char::from_u32).map(ConstValue::Char),
    }
}

/// Inclusive `[lo, hi]` scalar extent of a range-shaped constructor over a
/// discrete literal domain. `None` for non-discrete kinds and for
/// non-range constructors; the extent may be empty (`lo > hi`).
fn extent(ctor: &Constructor) -> Option<(ScalarKind, BigInt, BigInt)> {
    match ctor {
        Constructor::ConstantValue(value) => {
            let (kind, scalar) = scalar_of(value)?;
            Some((kind, scalar.clone(), scalar))
        }
        Constructor::ConstantRange {
            start,
            end,
            include_end,
        } => {
            let (start_kind, lo) = scalar_of(start)?;
            let (end_kind, mut hi) = scalar_of(end)?;
            if start_kind != end_kind {
                return None;
            }
            if !include_end {
                hi -= BigInt::from(1u8);
            }
            Some((start_kind, lo, hi))
        }
        _ => None,
    }
}

/// Splits a range-shaped `query` into maximal pieces that are each either
/// fully inside or fully outside every range-shaped constructor in
/// `column`. Partial overlaps between literal ranges are thereby reduced
/// to the all-or-nothing coverage the specialization step can decide.
///
/// `None` when the query's literal kind has no discrete successor
/// (floats, strings); callers then specialize by the whole query.
pub(crate) fn split_range<'a>(
    query: &Constructor,
    column: impl Iterator<Item = &'a Constructor>,
) -> Option<Vec<Constructor>> {
    let (kind, q_lo, q_hi) = extent(query)?;
    if q_lo > q_hi {
        // An empty range matches no value at all.
        return Some(vec![]);
    }

    // Piece start points strictly inside (q_lo, q_hi].
    let mut cuts = BTreeSet::new();
    for ctor in column {
        let Some((ctor_kind, lo, hi)) = extent(ctor) else {
            continue;
        };
        if ctor_kind != kind || hi < q_lo || lo > q_hi {
            continue;
        }
        if lo > q_lo {
            cuts.insert(lo);
        }
        if hi < q_hi {
            cuts.insert(hi + BigInt::from(1u8));
        }
    }

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut lo = q_lo;
    for cut in cuts {
        push_piece(&mut pieces, kind, &lo, &(&cut - BigInt::from(1u8)));
        lo = cut;
    }
    push_piece(&mut pieces, kind, &lo, &q_hi);
    Some(pieces)
}

fn push_piece(pieces: &mut Vec<Constructor>, kind: ScalarKind, lo: &BigInt, hi: &BigInt) {
    let mut lo = lo.clone();
    let mut hi = hi.clone();
    if kind == ScalarKind::Char {
        // Scalar values inside the surrogate gap are not chars; pieces are
        // clamped to the nearest valid boundary.
        let gap_lo = BigInt::from(0xD800u32);
        let gap_hi = BigInt::from(0xDFFFu32);
        if lo >= gap_lo && lo <= gap_hi {
            lo = &gap_hi + BigInt::from(1u8);
        }
        if hi >= gap_lo && hi <= gap_hi {
            hi = &gap_lo - BigInt::from(1u8);
        }
    }
    if lo > hi {
        return;
    }
    let (Some(lo_value), Some(hi_value)) = (value_of(kind, &lo), value_of(kind, &hi)) else {
        return;
    };
    pieces.push(if lo == hi {
        Constructor::ConstantValue(lo_value)
    } else {
        Constructor::ConstantRange {
            start: lo_value,
            end: hi_value,
            include_end: true,
        }
    });
}
