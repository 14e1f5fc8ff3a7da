//! Pattern vocabulary: the tree the host supplies rows in (and receives
//! witnesses back in), and the simplified form the engine specializes.

use std::fmt::Write;

use ty::{ConstValue, TyDb, TyId, TyKind};

use crate::constructor::Constructor;
use crate::error::MatchCheckError;

/// A pattern node as supplied by the host front-end. Witnesses for
/// non-exhaustive matches reuse this vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// `_`, or any binding that matches everything.
    Wildcard,
    /// An explicit constructor application with one sub-pattern per
    /// constructor position.
    Constructor {
        ctor: Constructor,
        fields: Vec<Pattern>,
    },
    /// A single literal value.
    Literal(ConstValue),
    /// `start..end`, or `start..=end` when `inclusive`.
    Range {
        start: ConstValue,
        end: ConstValue,
        inclusive: bool,
    },
    /// `a | b | ...`
    Or(Vec<Pattern>),
}

impl Pattern {
    pub fn literal(value: impl Into<ConstValue>) -> Self {
        Pattern::Literal(value.into())
    }

    pub fn range(start: impl Into<ConstValue>, end: impl Into<ConstValue>, inclusive: bool) -> Self {
        Pattern::Range {
            start: start.into(),
            end: end.into(),
            inclusive,
        }
    }
}

/// Analysis-internal pattern form: every node is a wildcard, a
/// constructor application, or an or-set, and carries the type it
/// matches at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimplifiedPattern {
    pub kind: SimplifiedPatternKind,
    pub ty: TyId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimplifiedPatternKind {
    WildCard,
    Constructor {
        kind: Constructor,
        fields: Vec<SimplifiedPattern>,
    },
    Or(Vec<SimplifiedPattern>),
}

impl SimplifiedPattern {
    pub fn new(kind: SimplifiedPatternKind, ty: TyId) -> Self {
        Self { kind, ty }
    }

    pub fn wildcard(ty: TyId) -> Self {
        Self::new(SimplifiedPatternKind::WildCard, ty)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, SimplifiedPatternKind::WildCard)
    }
}

impl SimplifiedPatternKind {
    pub fn collect_ctors(&self) -> Vec<Constructor> {
        match self {
            Self::WildCard => vec![],
            Self::Constructor { kind, .. } => vec![kind.clone()],
            Self::Or(pats) => {
                let mut ctors = vec![];
                for pat in pats {
                    ctors.extend(pat.kind.collect_ctors());
                }
                ctors
            }
        }
    }

    /// A constructor application with a wildcard in every field position.
    pub fn ctor_with_wild_card_fields(db: &dyn TyDb, kind: Constructor, ty: TyId) -> Self {
        let fields = kind
            .sub_tys(db, ty)
            .into_iter()
            .map(SimplifiedPattern::wildcard)
            .collect();
        Self::Constructor { kind, fields }
    }
}

/// Lowers a host pattern against the type it matches at, normalizing
/// literals and ranges into constructor applications and validating that
/// explicit constructor applications carry the arity the type implies.
pub fn lower(db: &dyn TyDb, pat: &Pattern, ty: TyId) -> Result<SimplifiedPattern, MatchCheckError> {
    let kind = match pat {
        Pattern::Wildcard => SimplifiedPatternKind::WildCard,

        Pattern::Literal(value) => SimplifiedPatternKind::Constructor {
            kind: Constructor::ConstantValue(value.clone()),
            fields: vec![],
        },

        Pattern::Range {
            start,
            end,
            inclusive,
        } => SimplifiedPatternKind::Constructor {
            kind: Constructor::ConstantRange {
                start: start.clone(),
                end: end.clone(),
                include_end: *inclusive,
            },
            fields: vec![],
        },

        Pattern::Constructor { ctor, fields } => {
            let arity = ctor.arity(db, ty)?;
            if fields.len() != arity {
                return Err(MatchCheckError::incompatible(format!(
                    "{} sub-patterns where `{}` implies {arity}",
                    fields.len(),
                    ty.pretty_print(db)
                )));
            }
            let fields = fields
                .iter()
                .zip(ctor.sub_tys(db, ty))
                .map(|(field, field_ty)| lower(db, field, field_ty))
                .collect::<Result<_, _>>()?;
            SimplifiedPatternKind::Constructor {
                kind: ctor.clone(),
                fields,
            }
        }

        Pattern::Or(alternatives) => SimplifiedPatternKind::Or(
            alternatives
                .iter()
                .map(|alt| lower(db, alt, ty))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(SimplifiedPattern::new(kind, ty))
}

/// Converts an engine witness back into the host vocabulary. A `Single`
/// application on an opaque leaf type means "some value not otherwise
/// mentioned" and comes back as a wildcard.
pub fn to_pattern(db: &dyn TyDb, pat: &SimplifiedPattern) -> Pattern {
    match &pat.kind {
        SimplifiedPatternKind::WildCard => Pattern::Wildcard,

        SimplifiedPatternKind::Constructor { kind, fields } => match kind {
            Constructor::ConstantValue(value) => Pattern::Literal(value.clone()),
            Constructor::ConstantRange {
                start,
                end,
                include_end,
            } => Pattern::Range {
                start: start.clone(),
                end: end.clone(),
                inclusive: *include_end,
            },
            Constructor::Single
                if fields.is_empty() && matches!(pat.ty.kind(db), TyKind::Other(_)) =>
            {
                Pattern::Wildcard
            }
            _ => Pattern::Constructor {
                ctor: kind.clone(),
                fields: fields.iter().map(|field| to_pattern(db, field)).collect(),
            },
        },

        SimplifiedPatternKind::Or(pats) => {
            Pattern::Or(pats.iter().map(|alt| to_pattern(db, alt)).collect())
        }
    }
}

/// Renders a pattern for a diagnostic, e.g. `Shape::Circle(_)`. The type
/// is needed to name constructor positions; presentation proper belongs
/// to the host, this is the fallback rendering tests and simple hosts
/// use.
pub fn display_pattern(db: &dyn TyDb, ty: TyId, pat: &Pattern) -> String {
    match pat {
        Pattern::Wildcard => "_".to_string(),

        Pattern::Literal(value) => value.to_string(),

        Pattern::Range {
            start,
            end,
            inclusive,
        } => {
            let op = if *inclusive { "..=" } else { ".." };
            format!("{start}{op}{end}")
        }

        Pattern::Or(alternatives) => {
            let mut out = String::new();
            let mut delim = "";
            for alt in alternatives {
                write!(out, "{delim}{}", display_pattern(db, ty, alt)).unwrap();
                delim = " | ";
            }
            out
        }

        Pattern::Constructor { ctor, fields } => display_ctor(db, ty, ctor, fields),
    }
}

fn display_ctor(db: &dyn TyDb, ty: TyId, ctor: &Constructor, fields: &[Pattern]) -> String {
    let sub_tys = ctor.sub_tys(db, ty);
    let rendered = |out: &mut String, open: &str, close: &str| {
        out.push_str(open);
        let mut delim = "";
        for (field, field_ty) in fields.iter().zip(&sub_tys) {
            write!(out, "{delim}{}", display_pattern(db, *field_ty, field)).unwrap();
            delim = ", ";
        }
        out.push_str(close);
    };

    match (ctor, ty.kind(db)) {
        (Constructor::Variant { adt, idx }, _) => {
            let data = db.adt_data(*adt);
            let variant = data
                .variant(*idx)
                .map(|variant| variant.name.as_str())
                .unwrap_or("<variant>");
            let mut out = format!("{}::{variant}", data.name);
            if !fields.is_empty() {
                rendered(&mut out, "(", ")");
            }
            out
        }

        (Constructor::Slice { .. }, _) => {
            let mut out = String::new();
            rendered(&mut out, "[", "]");
            out
        }

        (Constructor::Single, TyKind::Tuple(_)) => {
            let mut out = String::new();
            rendered(&mut out, "(", ")");
            out
        }

        (Constructor::Single, TyKind::Ref(_)) => {
            let mut out = "&".to_string();
            if let (Some(field), Some(field_ty)) = (fields.first(), sub_tys.first()) {
                out.push_str(&display_pattern(db, *field_ty, field));
            } else {
                out.push('_');
            }
            out
        }

        (Constructor::Single, TyKind::Adt(adt)) => {
            let name = db.adt_data(*adt).name.clone();
            if fields.is_empty() {
                name.to_string()
            } else if fields.iter().all(|field| matches!(field, Pattern::Wildcard)) {
                format!("{name} {{ .. }}")
            } else {
                let mut out = name.to_string();
                rendered(&mut out, "(", ")");
                out
            }
        }

        (Constructor::Single, _) => "_".to_string(),

        // Literal-shaped constructors surface as `Pattern::Literal`/
        // `Pattern::Range` before rendering; cover them anyway.
        (Constructor::ConstantValue(value), _) => value.to_string(),
        (
            Constructor::ConstantRange {
                start,
                end,
                include_end,
            },
            _,
        ) => {
            let op = if *include_end { "..=" } else { ".." };
            format!("{start}{op}{end}")
        }
    }
}
