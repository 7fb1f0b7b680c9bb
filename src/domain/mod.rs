//! Domain primitives for the inventory subsystem.
//!
//! Newtypes and closed enums that keep identifiers and classification values
//! from being mixed with free-form strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of an inventory item.
///
/// Items are keyed by a generated UUID string; wrapping it prevents mixing
/// item ids with user or template ids.
///
/// # Examples
///
/// ```rust
/// use stockyard::domain::ItemId;
///
/// let id = ItemId::new("abc");
/// assert_eq!(id.as_str(), "abc");
/// assert_eq!(id.to_string(), "abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// Access level of a user account.
    Role, "role", {
        Admin => "admin",
        Staff => "staff",
        Viewer => "viewer",
    }
);

string_enum!(
    /// Target gender of an apparel item.
    Gender, "gender", {
        Male => "male",
        Female => "female",
    }
);

string_enum!(
    /// Lifecycle status of an inventory item.
    ItemStatus, "status", {
        Active => "active",
        Discontinued => "discontinued",
    }
);

impl Default for Role {
    fn default() -> Self {
        Self::Viewer
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Role {
    /// Roles allowed to create, update and import items.
    pub const WRITERS: &'static [Self] = &[Self::Admin, Self::Staff];

    /// Roles allowed to delete items.
    pub const ADMINS: &'static [Self] = &[Self::Admin];

    #[must_use]
    pub fn is_one_of(&self, allowed: &[Self]) -> bool {
        allowed.contains(self)
    }
}

/// Sort order enumeration to replace boolean blindness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "ascending")]
    Asc,
    #[default]
    #[serde(alias = "descending")]
    Desc,
}

impl FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(UnknownVariant {
                kind: "sort_order",
                value: s.to_string(),
            }),
        }
    }
}

impl SortOrder {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" staff ".parse::<Role>().unwrap(), Role::Staff);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn unknown_variant_names_kind_and_value() {
        let err = "unisex".parse::<Gender>().unwrap_err();
        assert_eq!(err.to_string(), "invalid gender: 'unisex'");
    }

    #[test]
    fn role_gates() {
        assert!(Role::Staff.is_one_of(Role::WRITERS));
        assert!(!Role::Viewer.is_one_of(Role::WRITERS));
        assert!(!Role::Staff.is_one_of(Role::ADMINS));
    }

    #[test]
    fn item_status_serializes_lowercase() {
        let json = serde_json::to_string(&ItemStatus::Discontinued).unwrap();
        assert_eq!(json, "\"discontinued\"");
        assert_eq!(ItemStatus::default(), ItemStatus::Active);
    }

    #[test]
    fn sort_order_defaults_to_descending() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        let asc: SortOrder = serde_json::from_str("\"asc\"").unwrap();
        assert!(asc.is_ascending());
    }
}
