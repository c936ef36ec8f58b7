use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ComponentId;

/// Timestamp layout used by the backend database.
const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A pending request by some user to borrow a component.
///
/// This is a read-only projection; the client never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// The requested component.
    #[serde(rename = "reg_no")]
    pub component_id: ComponentId,
    /// Name of the requested component.
    #[serde(default)]
    pub component_name: String,
    /// Name of the requester.
    #[serde(default)]
    pub user_name: String,
    /// Email of the requester.
    #[serde(default)]
    pub email: String,
    /// When the request was made, as sent by the server.
    #[serde(default)]
    pub request_date: String,
}

impl ReservationRequest {
    /// The request timestamp, if the server sent one in a recognised format.
    #[must_use]
    pub fn requested_at(&self) -> Option<NaiveDateTime> {
        let raw = self.request_date.trim();
        NaiveDateTime::parse_from_str(raw, REQUEST_DATE_FORMAT)
            .or_else(|_| raw.parse::<NaiveDateTime>())
            .ok()
    }

    /// Whether the component name contains `query`, ignoring case.
    ///
    /// A blank query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty()
            || self
                .component_name
                .to_lowercase()
                .contains(&query.to_lowercase())
    }
}

/// Filters reservation requests by component name.
pub fn filter_by_component_name<'a>(
    requests: &'a [ReservationRequest],
    query: &'a str,
) -> impl Iterator<Item = &'a ReservationRequest> {
    requests.iter().filter(move |request| request.matches(query))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};
    use test_case::test_case;

    use super::*;

    fn request(name: &str, date: &str) -> ReservationRequest {
        ReservationRequest {
            component_id: ComponentId::new("CMP001").unwrap(),
            component_name: name.to_string(),
            user_name: "Ada Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
            request_date: date.to_string(),
        }
    }

    #[test_case("2024-03-05 14:30:00"; "database format")]
    #[test_case("2024-03-05T14:30:00"; "iso format")]
    fn parses_request_date(raw: &str) {
        let at = request("Oscilloscope", raw).requested_at().unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2024, 3, 5));
        assert_eq!((at.hour(), at.minute()), (14, 30));
    }

    #[test]
    fn unparseable_date_is_none() {
        assert_eq!(request("Oscilloscope", "yesterday").requested_at(), None);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let requests = vec![
            request("Digital Oscilloscope", ""),
            request("Multimeter", ""),
            request("Signal generator", ""),
        ];

        let names: Vec<_> = filter_by_component_name(&requests, "SCOPE")
            .map(|r| r.component_name.as_str())
            .collect();
        assert_eq!(names, ["Digital Oscilloscope"]);
    }

    #[test]
    fn blank_filter_matches_everything() {
        let requests = vec![request("Multimeter", ""), request("Soldering iron", "")];
        assert_eq!(filter_by_component_name(&requests, "  ").count(), 2);
    }
}
