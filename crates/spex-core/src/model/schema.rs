use spex_primitives::{Contracts, TypeGroup};
use std::{collections::BTreeMap, fmt};

///
/// TypeExpr
///
/// Type reference used by fields, elements and step shapes.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TypeExpr {
    List(Box<Self>),
    Named(String),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn list(item: Self) -> Self {
        Self::List(Box::new(item))
    }

    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Item type of a list, `None` for named types.
    #[must_use]
    pub fn item(&self) -> Option<&Self> {
        match self {
            Self::List(item) => Some(item),
            Self::Named(_) => None,
        }
    }

    /// Innermost named type.
    #[must_use]
    pub fn root_name(&self) -> &str {
        match self {
            Self::List(item) => item.root_name(),
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(item) => write!(f, "List<{item}>"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

impl From<&str> for TypeExpr {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

///
/// FieldDef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeExpr,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeExpr>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

///
/// TypeKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeKind {
    Criterion,
    Enum {
        options: Vec<String>,
    },
    Record {
        fields: Vec<FieldDef>,
        is_component: bool,
    },
    Scalar,
}

///
/// TypeDef
///
/// Declarative description of one runtime type: its shape and the
/// contracts it implements. Classification reads only `contracts`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub contracts: Contracts,
}

impl TypeDef {
    pub fn scalar(name: impl Into<String>, contracts: Contracts) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Scalar,
            contracts,
        }
    }

    pub fn enumeration<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: TypeKind::Enum {
                options: options.into_iter().map(Into::into).collect(),
            },
            contracts: Contracts::ENUM,
        }
    }

    /// Structural record type (not independently addressable).
    pub fn record(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Record {
                fields,
                is_component: false,
            },
            contracts: Contracts::ELEMENT,
        }
    }

    /// Addressable record type carrying a `Name`.
    pub fn component(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Record {
                fields,
                is_component: true,
            },
            contracts: Contracts::ELEMENT,
        }
    }

    /// Add contracts on top of the kind's own (models multi-shape types).
    #[must_use]
    pub fn with_contracts(mut self, extra: Contracts) -> Self {
        self.contracts = self.contracts.union(extra);
        self
    }

    #[must_use]
    pub const fn group(&self) -> TypeGroup {
        TypeGroup::classify(self.contracts)
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        match &self.kind {
            TypeKind::Record { fields, .. } => fields,
            _ => &[],
        }
    }

    #[must_use]
    pub const fn is_component(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Record {
                is_component: true,
                ..
            }
        )
    }
}

///
/// Schema
///
/// Catalog of type definitions the element registry builds from.
/// Built-in scalars are always present.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
    types: BTreeMap<String, TypeDef>,
}

/// Variant names of the built-in `Outcome` enum.
pub const OUTCOME_OPTIONS: [&str; 3] = ["Passed", "Failed", "Errored"];

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        let builtins = [
            TypeDef::scalar("Bool", Contracts::BOOLEAN),
            TypeDef::scalar("Int", Contracts::NUMBER),
            TypeDef::scalar("Float", Contracts::NUMBER),
            TypeDef::scalar("Text", Contracts::TEXT),
            TypeDef::scalar("Date", Contracts::DATE),
            TypeDef::scalar("Enum", Contracts::ENUM),
            TypeDef::scalar("Null", Contracts::EMPTY),
            TypeDef {
                name: "Criterion".to_string(),
                kind: TypeKind::Criterion,
                contracts: Contracts::CRITERION,
            },
            TypeDef::enumeration("Outcome", OUTCOME_OPTIONS),
            TypeDef::record(
                "Evaluation",
                vec![
                    FieldDef::new("Outcome", "Outcome"),
                    FieldDef::new("Passed", "Bool"),
                    FieldDef::new("Message", "Text"),
                ],
            ),
        ];

        Self {
            types: builtins
                .into_iter()
                .map(|def| (def.name.clone(), def))
                .collect(),
        }
    }

    /// Builder-style registration; a later definition replaces an earlier one.
    #[must_use]
    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.insert(def);
        self
    }

    pub fn insert(&mut self, def: TypeDef) {
        self.types.insert(def.name.clone(), def);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Whether every named type inside `ty` is declared.
    #[must_use]
    pub fn resolves(&self, ty: &TypeExpr) -> bool {
        self.contains(ty.root_name())
    }

    /// Group of a type expression. Lists are collections; unknown names
    /// fall back to `Default`.
    #[must_use]
    pub fn group_of(&self, ty: &TypeExpr) -> TypeGroup {
        match ty {
            TypeExpr::List(_) => TypeGroup::Collection,
            TypeExpr::Named(name) => self.get(name).map_or(TypeGroup::Default, TypeDef::group),
        }
    }

    /// Legal values for bounded types; empty otherwise.
    #[must_use]
    pub fn options_of(&self, ty: &TypeExpr) -> Vec<String> {
        let TypeExpr::Named(name) = ty else {
            return Vec::new();
        };
        let Some(def) = self.get(name) else {
            return Vec::new();
        };

        match (&def.kind, def.group()) {
            (TypeKind::Enum { options }, _) => options.clone(),
            (_, TypeGroup::Boolean) => vec!["false".to_string(), "true".to_string()],
            _ => Vec::new(),
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}
