//! Opaque type descriptors and the capability surface the analysis consumes.
//!
//! The host language's real type system stays outside this crate. The
//! analysis queries shapes through [`TyDb`] and treats everything it does
//! not recognize as an atomic [`TyKind::Other`] leaf. [`TyStore`] is a
//! plain in-memory implementor so the engine can run against synthetic
//! descriptors in tests and small hosts; descriptors are read-only once
//! built and safe to share across threads.

use std::fmt::Write;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// An interned type handle. Only meaningful together with the [`TyDb`]
/// that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TyId(u32);

/// A handle to a struct or enum descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AdtId(u32);

/// The shape of a type, as far as match analysis cares.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TyKind {
    Bool,
    Tuple(Vec<TyId>),
    Array { elem: TyId, size: Option<usize> },
    Slice { elem: TyId },
    Ref(TyId),
    Adt(AdtId),
    /// Anything else (numeric primitives, chars, strings, foreign types).
    /// Atomic and indivisible; the name is carried for rendering only.
    Other(SmolStr),
}

/// A struct or enum descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdtData {
    pub name: SmolStr,
    pub kind: AdtKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdtKind {
    Struct { field_tys: Vec<TyId> },
    Enum { variants: Vec<VariantData> },
}

/// One enum variant, in declaration order within its [`AdtKind::Enum`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantData {
    pub name: SmolStr,
    pub field_tys: Vec<TyId>,
}

impl AdtData {
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, AdtKind::Enum { .. })
    }

    pub fn variants(&self) -> &[VariantData] {
        match &self.kind {
            AdtKind::Enum { variants } => variants,
            AdtKind::Struct { .. } => &[],
        }
    }

    pub fn variant(&self, idx: usize) -> Option<&VariantData> {
        self.variants().get(idx)
    }
}

/// The read-only capability surface the analysis is written against.
///
/// Implementors must hand back the same descriptor for the same handle for
/// the lifetime of an analysis run.
pub trait TyDb {
    fn ty_kind(&self, ty: TyId) -> &TyKind;
    fn adt_data(&self, adt: AdtId) -> &AdtData;
}

impl TyId {
    pub fn kind(self, db: &dyn TyDb) -> &TyKind {
        db.ty_kind(self)
    }

    pub fn is_bool(self, db: &dyn TyDb) -> bool {
        matches!(self.kind(db), TyKind::Bool)
    }

    pub fn as_adt(self, db: &dyn TyDb) -> Option<AdtId> {
        match self.kind(db) {
            TyKind::Adt(adt) => Some(*adt),
            _ => None,
        }
    }

    pub fn pretty_print(self, db: &dyn TyDb) -> String {
        match self.kind(db) {
            TyKind::Bool => "bool".to_string(),
            TyKind::Tuple(elems) => {
                let mut out = "(".to_string();
                let mut delim = "";
                for elem in elems {
                    write!(out, "{delim}{}", elem.pretty_print(db)).unwrap();
                    delim = ", ";
                }
                out.push(')');
                out
            }
            TyKind::Array { elem, size: Some(size) } => {
                format!("[{}; {size}]", elem.pretty_print(db))
            }
            TyKind::Array { elem, size: None } | TyKind::Slice { elem } => {
                format!("[{}]", elem.pretty_print(db))
            }
            TyKind::Ref(inner) => format!("&{}", inner.pretty_print(db)),
            TyKind::Adt(adt) => db.adt_data(*adt).name.to_string(),
            TyKind::Other(name) => name.to_string(),
        }
    }
}

/// In-memory type store with hash-consed [`TyKind`]s.
#[derive(Debug, Default)]
pub struct TyStore {
    tys: Vec<TyKind>,
    adts: Vec<AdtData>,
    interned: FxHashMap<TyKind, TyId>,
}

impl TyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, kind: TyKind) -> TyId {
        if let Some(&ty) = self.interned.get(&kind) {
            return ty;
        }
        let ty = TyId(self.tys.len() as u32);
        self.tys.push(kind.clone());
        self.interned.insert(kind, ty);
        ty
    }

    pub fn add_adt(&mut self, data: AdtData) -> AdtId {
        let adt = AdtId(self.adts.len() as u32);
        self.adts.push(data);
        adt
    }

    pub fn bool_ty(&mut self) -> TyId {
        self.intern(TyKind::Bool)
    }

    pub fn other_ty(&mut self, name: &str) -> TyId {
        self.intern(TyKind::Other(SmolStr::new(name)))
    }

    pub fn tuple_ty(&mut self, elems: Vec<TyId>) -> TyId {
        self.intern(TyKind::Tuple(elems))
    }

    pub fn ref_ty(&mut self, inner: TyId) -> TyId {
        self.intern(TyKind::Ref(inner))
    }

    pub fn slice_ty(&mut self, elem: TyId) -> TyId {
        self.intern(TyKind::Slice { elem })
    }

    pub fn array_ty(&mut self, elem: TyId, size: Option<usize>) -> TyId {
        self.intern(TyKind::Array { elem, size })
    }

    pub fn struct_ty(&mut self, name: &str, field_tys: Vec<TyId>) -> TyId {
        let adt = self.add_adt(AdtData {
            name: SmolStr::new(name),
            kind: AdtKind::Struct { field_tys },
        });
        self.intern(TyKind::Adt(adt))
    }

    /// Declares an enum from `(variant name, field types)` pairs, in
    /// declaration order.
    pub fn enum_ty(&mut self, name: &str, variants: Vec<(&str, Vec<TyId>)>) -> TyId {
        let variants = variants
            .into_iter()
            .map(|(name, field_tys)| VariantData {
                name: SmolStr::new(name),
                field_tys,
            })
            .collect();
        let adt = self.add_adt(AdtData {
            name: SmolStr::new(name),
            kind: AdtKind::Enum { variants },
        });
        self.intern(TyKind::Adt(adt))
    }
}

impl TyDb for TyStore {
    fn ty_kind(&self, ty: TyId) -> &TyKind {
        &self.tys[ty.0 as usize]
    }

    fn adt_data(&self, adt: AdtId) -> &AdtData {
        &self.adts[adt.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups_structural_kinds() {
        let mut store = TyStore::new();
        let bool_ty = store.bool_ty();
        assert_eq!(bool_ty, store.bool_ty());

        let pair = store.tuple_ty(vec![bool_ty, bool_ty]);
        assert_eq!(pair, store.tuple_ty(vec![bool_ty, bool_ty]));
        assert_ne!(pair, store.tuple_ty(vec![bool_ty]));
    }

    #[test]
    fn adts_are_nominal() {
        let mut store = TyStore::new();
        let a = store.struct_ty("Point", vec![]);
        let b = store.struct_ty("Point", vec![]);
        // Two declarations are two types even with identical shapes.
        assert_ne!(a, b);
    }

    #[test]
    fn pretty_print_shapes() {
        let mut store = TyStore::new();
        let int = store.other_ty("i32");
        let pair = store.tuple_ty(vec![int, int]);
        let r = store.ref_ty(pair);
        assert_eq!(r.pretty_print(&store), "&(i32, i32)");

        let slice = store.slice_ty(int);
        assert_eq!(slice.pretty_print(&store), "[i32]");
        let arr = store.array_ty(int, Some(4));
        assert_eq!(arr.pretty_print(&store), "[i32; 4]");
    }
}
