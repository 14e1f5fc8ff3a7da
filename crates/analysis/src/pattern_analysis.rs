//! Pattern matching analysis for exhaustiveness and reachability checking.
//! Based on "Warnings for pattern matching" by Luc Maranget.

use indexmap::IndexSet;
use ty::{TyDb, TyId};

use crate::constructor::{split_range, Constructor};
use crate::error::MatchCheckError;
use crate::pattern::{lower, Pattern, SimplifiedPattern, SimplifiedPatternKind};

#[derive(Clone, Debug)]
pub struct PatternMatrix {
    rows: Vec<PatternRowVec>,
    column_tys: Vec<TyId>,
}

impl PatternMatrix {
    /// Builds the one-column matrix for a match: one row per arm, each
    /// lowered against the scrutinee type.
    pub fn from_patterns(
        db: &dyn TyDb,
        patterns: &[Pattern],
        ty: TyId,
    ) -> Result<Self, MatchCheckError> {
        let rows = patterns
            .iter()
            .map(|pat| Ok(PatternRowVec::new(vec![lower(db, pat, ty)?])))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            rows,
            column_tys: vec![ty],
        })
    }

    /// `None` when the rows cover every value; otherwise a witness row,
    /// one pattern per remaining column, describing values no row
    /// matches.
    pub fn find_missing_patterns(
        &self,
        db: &dyn TyDb,
    ) -> Result<Option<Vec<SimplifiedPattern>>, MatchCheckError> {
        if self.nrows() == 0 {
            // Nothing matches anything: a full row of wildcards is a
            // witness.
            return Ok(Some(
                self.column_tys
                    .iter()
                    .map(|&ty| SimplifiedPattern::wildcard(ty))
                    .collect(),
            ));
        }
        if self.ncols() == 0 {
            return Ok(None);
        }

        let ty = self.first_column_ty();
        let sigma_set = self.sigma_set();

        if sigma_set.is_complete(db, ty)? {
            for ctor in sigma_set.iter() {
                let specialized = self.phi_specialize(db, ctor)?;
                if let Some(mut witness) = specialized.find_missing_patterns(db)? {
                    let field_num = ctor.sub_tys(db, ty).len();
                    let rem = witness.split_off(field_num);
                    let pat_kind = SimplifiedPatternKind::Constructor {
                        kind: ctor.clone(),
                        fields: witness,
                    };

                    let mut result = vec![SimplifiedPattern::new(pat_kind, ty)];
                    result.extend(rem);
                    return Ok(Some(result));
                }
            }
            Ok(None)
        } else {
            let Some(witness) = self.d_specialize().find_missing_patterns(db)? else {
                return Ok(None);
            };
            let kind = if sigma_set.is_empty() {
                SimplifiedPatternKind::WildCard
            } else {
                // The constructors no row mentions; enumerating them for a
                // type without an enumeration strategy is exactly where
                // the unsupported-domain error must surface.
                let mut missing = sigma_set.missing_from(db, ty)?;
                if missing.len() == 1 {
                    let ctor = missing.remove(0);
                    SimplifiedPatternKind::ctor_with_wild_card_fields(db, ctor, ty)
                } else {
                    SimplifiedPatternKind::Or(
                        missing
                            .into_iter()
                            .map(|ctor| {
                                let kind = SimplifiedPatternKind::ctor_with_wild_card_fields(
                                    db, ctor, ty,
                                );
                                SimplifiedPattern::new(kind, ty)
                            })
                            .collect(),
                    )
                }
            };

            let mut result = vec![SimplifiedPattern::new(kind, ty)];
            result.extend(witness);
            Ok(Some(result))
        }
    }

    /// Whether row `row` can match a value no earlier row matches.
    pub fn is_row_useful(&self, db: &dyn TyDb, row: usize) -> Result<bool, MatchCheckError> {
        debug_assert!(self.nrows() > row);

        let previous = Self {
            rows: self.rows[0..row].to_vec(),
            column_tys: self.column_tys.clone(),
        };
        previous.is_pattern_useful(db, &self.rows[row])
    }

    pub(crate) fn is_pattern_useful(
        &self,
        db: &dyn TyDb,
        pat_vec: &PatternRowVec,
    ) -> Result<bool, MatchCheckError> {
        if self.nrows() == 0 {
            return Ok(true);
        }
        if self.ncols() == 0 {
            return Ok(false);
        }
        let Some(head) = pat_vec.head() else {
            return Ok(false);
        };
        let ty = self.first_column_ty();

        match &head.kind {
            SimplifiedPatternKind::WildCard => {
                let sigma_set = self.sigma_set();
                if sigma_set.is_complete(db, ty)? {
                    // The listed constructors exhaust the type, so the
                    // wildcard only adds coverage if it does under one of
                    // them; the default matrix would miss that.
                    for ctor in sigma_set.iter() {
                        if self.specialized_useful(db, ctor, pat_vec)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                } else {
                    match pat_vec.d_specialize().into_iter().next() {
                        Some(rest) => self.d_specialize().is_pattern_useful(db, &rest),
                        None => Ok(false),
                    }
                }
            }

            SimplifiedPatternKind::Constructor { kind, .. } if kind.is_range_shaped() => {
                // A literal range is useful iff some piece of it not
                // claimed by the other rows' ranges is; splitting keeps a
                // partial overlap from deciding the whole range.
                let sigma_set = self.sigma_set();
                match split_range(kind, sigma_set.iter()) {
                    Some(pieces) => {
                        for piece in &pieces {
                            if self.specialized_useful(db, piece, pat_vec)? {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                    None => self.specialized_useful(db, kind, pat_vec),
                }
            }

            SimplifiedPatternKind::Constructor { kind, .. } => {
                self.specialized_useful(db, kind, pat_vec)
            }

            SimplifiedPatternKind::Or(pats) => {
                for pat in pats {
                    if self.is_pattern_useful(db, &pat_vec.with_head(pat.clone()))? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn specialized_useful(
        &self,
        db: &dyn TyDb,
        ctor: &Constructor,
        pat_vec: &PatternRowVec,
    ) -> Result<bool, MatchCheckError> {
        let Some(row) = pat_vec.phi_specialize(db, ctor)?.into_iter().next() else {
            return Ok(false);
        };
        self.phi_specialize(db, ctor)?.is_pattern_useful(db, &row)
    }

    pub fn phi_specialize(
        &self,
        db: &dyn TyDb,
        ctor: &Constructor,
    ) -> Result<Self, MatchCheckError> {
        debug_assert_ne!(self.ncols(), 0);

        let mut rows = Vec::new();
        for row in &self.rows {
            rows.extend(row.phi_specialize(db, ctor)?);
        }

        let mut column_tys = ctor.sub_tys(db, self.first_column_ty());
        column_tys.extend_from_slice(&self.column_tys[1..]);

        Ok(Self { rows, column_tys })
    }

    pub fn d_specialize(&self) -> Self {
        debug_assert_ne!(self.ncols(), 0);

        let mut rows = Vec::new();
        for row in &self.rows {
            rows.extend(row.d_specialize());
        }
        Self {
            rows,
            column_tys: self.column_tys[1..].to_vec(),
        }
    }

    pub fn sigma_set(&self) -> SigmaSet {
        SigmaSet::from_rows(self.rows.iter())
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.column_tys.len()
    }

    fn first_column_ty(&self) -> TyId {
        self.column_tys[0]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternRowVec {
    inner: Vec<SimplifiedPattern>,
}

impl PatternRowVec {
    pub fn new(inner: Vec<SimplifiedPattern>) -> Self {
        Self { inner }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn head(&self) -> Option<&SimplifiedPattern> {
        self.inner.first()
    }

    fn with_head(&self, head: SimplifiedPattern) -> Self {
        let mut inner = Vec::with_capacity(self.inner.len());
        inner.push(head);
        inner.extend_from_slice(&self.inner[1..]);
        Self::new(inner)
    }

    /// Rows of the matrix specialized to `ctor`: the head is replaced by
    /// its sub-patterns when it can match `ctor`, and the row is filtered
    /// out when it cannot. A value/range head keeps the row only when it
    /// covers all of `ctor`.
    pub fn phi_specialize(
        &self,
        db: &dyn TyDb,
        ctor: &Constructor,
    ) -> Result<Vec<Self>, MatchCheckError> {
        let Some(first_pat) = self.inner.first() else {
            return Ok(vec![]);
        };

        match &first_pat.kind {
            SimplifiedPatternKind::WildCard => {
                let sub_tys = ctor.sub_tys(db, first_pat.ty);
                let mut inner = Vec::with_capacity(sub_tys.len() + self.inner.len() - 1);
                for sub_ty in sub_tys {
                    inner.push(SimplifiedPattern::wildcard(sub_ty));
                }
                inner.extend_from_slice(&self.inner[1..]);
                Ok(vec![Self::new(inner)])
            }

            SimplifiedPatternKind::Constructor { kind, fields } => {
                let matches = kind == ctor
                    || (kind.is_range_shaped()
                        && ctor.is_range_shaped()
                        && ctor.covered_by(kind)?);
                if matches {
                    let mut inner = Vec::with_capacity(fields.len() + self.inner.len() - 1);
                    inner.extend_from_slice(fields);
                    inner.extend_from_slice(&self.inner[1..]);
                    Ok(vec![Self::new(inner)])
                } else {
                    Ok(vec![])
                }
            }

            SimplifiedPatternKind::Or(pats) => {
                let mut result = vec![];
                for pat in pats {
                    result.extend(self.with_head(pat.clone()).phi_specialize(db, ctor)?);
                }
                Ok(result)
            }
        }
    }

    pub fn d_specialize(&self) -> Vec<Self> {
        let Some(first_pat) = self.inner.first() else {
            return vec![];
        };

        match &first_pat.kind {
            SimplifiedPatternKind::WildCard => vec![Self::new(self.inner[1..].to_vec())],

            SimplifiedPatternKind::Constructor { .. } => vec![],

            SimplifiedPatternKind::Or(pats) => {
                let mut result = vec![];
                for pat in pats {
                    result.extend(self.with_head(pat.clone()).d_specialize());
                }
                result
            }
        }
    }

    fn collect_head_ctors(&self) -> Vec<Constructor> {
        match self.inner.first() {
            Some(pat) => pat.kind.collect_ctors(),
            None => vec![],
        }
    }
}

/// The constructors appearing at the head of a matrix's rows, in first-use
/// order so downstream iteration and witness reporting stay deterministic.
#[derive(Clone, Debug)]
pub struct SigmaSet(IndexSet<Constructor>);

impl SigmaSet {
    pub fn from_rows<'a>(rows: impl Iterator<Item = &'a PatternRowVec>) -> Self {
        let mut set = IndexSet::new();
        for row in rows {
            for ctor in row.collect_head_ctors() {
                set.insert(ctor);
            }
        }
        Self(set)
    }

    /// Whether every constructor `ty` admits is covered by this set: by
    /// literal membership, or for value/range constructors by lying
    /// inside one of the set's ranges.
    ///
    /// A type whose constructors cannot be enumerated is never provably
    /// complete; the verdicts that would depend on the enumeration fail
    /// later, in [`SigmaSet::missing_from`], instead of being guessed
    /// here.
    pub fn is_complete(&self, db: &dyn TyDb, ty: TyId) -> Result<bool, MatchCheckError> {
        if self.0.is_empty() {
            return Ok(false);
        }
        let all = match Constructor::all_constructors(db, ty) {
            Ok(all) => all,
            Err(MatchCheckError::UnsupportedDomain(_)) => return Ok(false),
            Err(err) => return Err(err),
        };
        for ctor in &all {
            if !self.covers(ctor)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The constructors of `ty` this set does not cover.
    pub fn missing_from(
        &self,
        db: &dyn TyDb,
        ty: TyId,
    ) -> Result<Vec<Constructor>, MatchCheckError> {
        let mut missing = vec![];
        for ctor in Constructor::all_constructors(db, ty)? {
            if !self.covers(&ctor)? {
                missing.push(ctor);
            }
        }
        Ok(missing)
    }

    fn covers(&self, ctor: &Constructor) -> Result<bool, MatchCheckError> {
        if self.0.contains(ctor) {
            return Ok(true);
        }
        if !ctor.is_range_shaped() {
            return Ok(false);
        }
        for member in &self.0 {
            if member.is_range_shaped() && ctor.covered_by(member)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constructor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
