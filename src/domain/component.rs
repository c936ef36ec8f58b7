use std::{fmt, ops::Deref, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// The unique identifier of an inventory component (its registration
/// number).
///
/// Identifiers are opaque strings. Leading zeros are significant, so
/// `"000123"` and `"123"` are different components.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(String);

impl ComponentId {
    /// Creates a new `ComponentId`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidComponentIdError` if the string is empty or consists
    /// only of whitespace.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidComponentIdError> {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(InvalidComponentIdError(s));
        }
        if trimmed.len() == s.len() {
            Ok(Self(s))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ComponentId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ComponentId {
    type Err = InvalidComponentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ComponentId {
    type Error = InvalidComponentIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ComponentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = crate::lenient::text(deserializer)?;
        Self::new(raw).map_err(D::Error::custom)
    }
}

/// Error returned when a component identifier is blank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid component id '{0}': must not be blank")]
pub struct InvalidComponentIdError(String);

/// A physical lab item tracked by the inventory.
///
/// Field names on the wire follow the inventory backend (`reg_no`,
/// `component_name`, `request_to_reserve`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Unique identifier.
    #[serde(rename = "reg_no")]
    pub id: ComponentId,

    /// Display name.
    #[serde(rename = "component_name", default)]
    pub name: String,

    /// Name of the lab that owns the component.
    #[serde(default)]
    pub lab_name: String,

    /// Name of the owning faculty, when the endpoint provides it.
    #[serde(
        default,
        deserialize_with = "crate::lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub faculty_name: Option<String>,

    /// Name of the owning department, when the endpoint provides it.
    #[serde(
        default,
        deserialize_with = "crate::lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub department_name: Option<String>,

    /// Image reference, when the endpoint provides it.
    #[serde(
        default,
        deserialize_with = "crate::lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,

    /// The component is currently borrowed. Only the server knows this.
    #[serde(default, deserialize_with = "crate::lenient::flag")]
    pub is_reserved: bool,

    /// The user has an outstanding request to reserve the component.
    #[serde(
        rename = "request_to_reserve",
        default,
        deserialize_with = "crate::lenient::flag"
    )]
    pub request_pending: bool,
}

impl Component {
    /// The status shown to the user.
    ///
    /// A borrowed component is shown as borrowed regardless of any pending
    /// request.
    #[must_use]
    pub const fn status(&self) -> ReservationStatus {
        if self.is_reserved {
            ReservationStatus::Borrowed
        } else if self.request_pending {
            ReservationStatus::Requested
        } else {
            ReservationStatus::Available
        }
    }
}

/// Display status of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Free to request.
    Available,
    /// The user has asked to reserve it and may cancel the request.
    Requested,
    /// Someone has borrowed it.
    Borrowed,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Available => "Available",
            Self::Requested => "Requested",
            Self::Borrowed => "Borrowed",
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn component(is_reserved: bool, request_pending: bool) -> Component {
        Component {
            id: ComponentId::new("CMP001").unwrap(),
            name: "Oscilloscope".to_string(),
            lab_name: "Electronics Lab".to_string(),
            faculty_name: None,
            department_name: None,
            image: None,
            is_reserved,
            request_pending,
        }
    }

    #[test_case(false, false, ReservationStatus::Available; "available")]
    #[test_case(false, true, ReservationStatus::Requested; "requested")]
    #[test_case(true, false, ReservationStatus::Borrowed; "borrowed")]
    #[test_case(true, true, ReservationStatus::Borrowed; "borrowed wins over requested")]
    fn status(is_reserved: bool, request_pending: bool, expected: ReservationStatus) {
        assert_eq!(component(is_reserved, request_pending).status(), expected);
    }

    #[test]
    fn blank_id_is_rejected() {
        assert!(ComponentId::new("").is_err());
        assert!(ComponentId::new("   ").is_err());
    }

    #[test]
    fn id_is_trimmed_and_keeps_leading_zeros() {
        let id = ComponentId::new(" 000123 ").unwrap();
        assert_eq!(id.as_str(), "000123");
    }

    #[test]
    fn deserializes_backend_row() {
        let row = json!({
            "reg_no": 7,
            "component_name": "Multimeter",
            "lab_name": "Physics Lab 2",
            "faculty_name": "Engineering",
            "department_name": "",
            "is_reserved": "0",
            "request_to_reserve": 1
        });

        let component: Component = serde_json::from_value(row).unwrap();

        assert_eq!(component.id.as_str(), "7");
        assert_eq!(component.name, "Multimeter");
        assert_eq!(component.faculty_name.as_deref(), Some("Engineering"));
        assert_eq!(component.department_name, None);
        assert!(!component.is_reserved);
        assert!(component.request_pending);
    }

    #[test]
    fn row_without_id_is_rejected() {
        let row = json!({"reg_no": "", "component_name": "Nothing"});
        assert!(serde_json::from_value::<Component>(row).is_err());
    }
}
