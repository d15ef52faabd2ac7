//! Shared type-classification vocabulary for spex.
//!
//! Every runtime type the engine touches declares the shape contracts it
//! implements as a [`Contracts`] set; [`TypeGroup::classify`] folds that set
//! into exactly one semantic group using a fixed precedence table.

#[macro_use]
mod macros;

#[cfg(test)]
mod tests;

use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::BitOr};

///
/// Contracts
///
/// Bitset of shape contracts implemented by one runtime type.
/// A type may implement several (a packed text record is TEXT, COLLECTION
/// and ELEMENT at once); classification resolves the ambiguity.
///

#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Contracts(u16);

impl Contracts {
    pub const EMPTY: Self = Self(0);
    pub const BOOLEAN: Self = Self(1 << 0);
    pub const ENUM: Self = Self(1 << 1);
    pub const NUMBER: Self = Self(1 << 2);
    pub const DATE: Self = Self(1 << 3);
    pub const TEXT: Self = Self(1 << 4);
    pub const COLLECTION: Self = Self(1 << 5);
    pub const ELEMENT: Self = Self(1 << 6);
    pub const CRITERION: Self = Self(1 << 7);

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true when every contract in `other` is present in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of distinct contracts in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitOr for Contracts {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Debug for Contracts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = PRECEDENCE
            .iter()
            .filter(|group| self.contains(group.contract()))
            .map(|group| group.label())
            .collect();

        write!(f, "Contracts({})", names.join(" | "))
    }
}

///
/// TypeGroup
///
/// Closed semantic classification of a runtime type. Operation applicability,
/// argument parsing and document encoding are all keyed on this group.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum TypeGroup {
    Boolean,
    Collection,
    Criterion,
    Date,
    Default,
    Element,
    Enum,
    Number,
    Text,
}

impl TypeGroup {
    /// Classify a contract set into exactly one group.
    ///
    /// Precedence: Boolean > Enum > Number > Date > Text > Collection >
    /// Element > Criterion > Default. An empty set classifies to `Default`.
    #[must_use]
    pub const fn classify(contracts: Contracts) -> Self {
        type_group_registry!(classify_from_registry, contracts)
    }

    /// Return the full metadata descriptor for this group.
    #[must_use]
    pub const fn metadata(self) -> GroupMetadata {
        type_group_registry!(metadata_from_registry, self)
    }

    /// The single contract that selects this group (empty for `Default`).
    #[must_use]
    pub const fn contract(self) -> Contracts {
        self.metadata().contract
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        self.metadata().label
    }

    /// Scalar groups hold one comparable value (no children, no members).
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        self.metadata().is_scalar
    }

    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        self.metadata().supports_ordering
    }

    /// Bounded groups enumerate their legal values as options.
    #[must_use]
    pub const fn is_bounded(self) -> bool {
        self.metadata().is_bounded
    }

    /// Position in the precedence table; `Default` sorts last.
    #[must_use]
    pub fn precedence(self) -> usize {
        PRECEDENCE
            .iter()
            .position(|group| *group == self)
            .unwrap_or(PRECEDENCE.len())
    }
}

///
/// GroupMetadata
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GroupMetadata {
    pub contract: Contracts,
    pub is_scalar: bool,
    pub supports_ordering: bool,
    pub is_bounded: bool,
    pub label: &'static str,
}

/// Classifiable groups in precedence order (highest first).
pub const PRECEDENCE: [TypeGroup; 8] = type_group_registry!(precedence_from_registry);

/// Every group, including the `Default` fallback.
pub const ALL_TYPE_GROUPS: [TypeGroup; 9] = [
    TypeGroup::Boolean,
    TypeGroup::Enum,
    TypeGroup::Number,
    TypeGroup::Date,
    TypeGroup::Text,
    TypeGroup::Collection,
    TypeGroup::Element,
    TypeGroup::Criterion,
    TypeGroup::Default,
];
