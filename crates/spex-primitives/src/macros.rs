///
/// type_group_registry_entries
///
/// Canonical classification table. Row order IS the precedence order used by
/// `TypeGroup::classify`: the first row whose contract is present wins.
/// `Default` has no row; it is the fallback for an empty contract set.
///
#[macro_export]
macro_rules! type_group_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Boolean,
                BOOLEAN,
                is_scalar = true,
                supports_ordering = false,
                is_bounded = true,
                label = "Boolean"
            ),
            (
                Enum,
                ENUM,
                is_scalar = true,
                supports_ordering = false,
                is_bounded = true,
                label = "Enum"
            ),
            (
                Number,
                NUMBER,
                is_scalar = true,
                supports_ordering = true,
                is_bounded = false,
                label = "Number"
            ),
            (
                Date,
                DATE,
                is_scalar = true,
                supports_ordering = true,
                is_bounded = false,
                label = "Date"
            ),
            (
                Text,
                TEXT,
                is_scalar = true,
                supports_ordering = true,
                is_bounded = false,
                label = "Text"
            ),
            (
                Collection,
                COLLECTION,
                is_scalar = false,
                supports_ordering = false,
                is_bounded = false,
                label = "Collection"
            ),
            (
                Element,
                ELEMENT,
                is_scalar = false,
                supports_ordering = false,
                is_bounded = false,
                label = "Element"
            ),
            (
                Criterion,
                CRITERION,
                is_scalar = false,
                supports_ordering = false,
                is_bounded = false,
                label = "Criterion"
            ),
        }
    };
}

#[macro_export]
macro_rules! type_group_registry {
    ($macro:ident) => {
        $crate::type_group_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::type_group_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! classify_from_registry {
    ( @args $contracts:expr; @entries $( ($group:ident, $contract:ident, is_scalar = $is_scalar:expr, supports_ordering = $supports_ordering:expr, is_bounded = $is_bounded:expr, label = $label:expr) ),* $(,)? ) => {{
        let contracts: $crate::Contracts = $contracts;
        $(
            if contracts.contains($crate::Contracts::$contract) {
                return $crate::TypeGroup::$group;
            }
        )*

        $crate::TypeGroup::Default
    }};
}

macro_rules! metadata_from_registry {
    ( @args $group:expr; @entries $( ($name:ident, $contract:ident, is_scalar = $is_scalar:expr, supports_ordering = $supports_ordering:expr, is_bounded = $is_bounded:expr, label = $label:expr) ),* $(,)? ) => {
        match $group {
            $(
                $crate::TypeGroup::$name => $crate::GroupMetadata {
                    contract: $crate::Contracts::$contract,
                    is_scalar: $is_scalar,
                    supports_ordering: $supports_ordering,
                    is_bounded: $is_bounded,
                    label: $label,
                },
            )*
            $crate::TypeGroup::Default => $crate::GroupMetadata {
                contract: $crate::Contracts::EMPTY,
                is_scalar: false,
                supports_ordering: false,
                is_bounded: false,
                label: "Default",
            },
        }
    };
}

macro_rules! precedence_from_registry {
    ( @entries $( ($group:ident, $contract:ident, is_scalar = $is_scalar:expr, supports_ordering = $supports_ordering:expr, is_bounded = $is_bounded:expr, label = $label:expr) ),* $(,)? ) => {
        [ $( $crate::TypeGroup::$group ),* ]
    };
}
