//! HTTP DTOs for session endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::booking::{BookingReceipt, SessionView};
use crate::domain::foundation::Category;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Query string for `GET /api/sessions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSessionsParams {
    /// `salsa`, `bachata`, `reggaeton` or `any` (default).
    #[serde(rename = "type")]
    pub session_type: Option<String>,
}

/// Body of `POST /api/sessions/:id/bookings`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSessionRequest {
    pub email: String,
}

/// Body of `POST /api/sessions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `MON`..`SUN`
    pub weekday: String,
    /// `18:30`, `19:30` or `20:30`
    pub start_time: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub level: Option<u8>,
    pub max_spots: u32,
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub session_type: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    pub date: String,
    pub start_time: String,
    pub max_spots: u32,
    pub spots_remaining: u32,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            id: view.id.to_string(),
            session_type: view.category,
            level: view.level,
            date: view.date,
            start_time: view.start_time,
            max_spots: view.max_spots,
            spots_remaining: view.spots_remaining,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
}

impl From<Vec<SessionView>> for SessionListResponse {
    fn from(views: Vec<SessionView>) -> Self {
        Self {
            sessions: views.into_iter().map(SessionResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub session_id: String,
    pub email: String,
    /// RFC 3339, millisecond precision.
    pub booked_at: String,
}

impl From<BookingReceipt> for BookingResponse {
    fn from(receipt: BookingReceipt) -> Self {
        Self {
            session_id: receipt.session_id.to_string(),
            email: receipt.email.into(),
            booked_at: receipt.booked_at.to_rfc3339(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Email, SessionId, StartSlot, Timestamp, Weekday};

    fn view() -> SessionView {
        SessionView {
            id: SessionId::from_parts("2024-12-09", Weekday::Mon, StartSlot::T1830).unwrap(),
            category: Category::Reggaeton,
            level: None,
            date: "2024-12-09".to_string(),
            start_time: "18:30".to_string(),
            max_spots: 20,
            spots_remaining: 18,
        }
    }

    #[test]
    fn session_response_uses_camel_case_and_type_key() {
        let json = serde_json::to_value(SessionResponse::from(view())).unwrap();
        assert_eq!(json["id"], "SESSION#2024-12-09#MON#1830");
        assert_eq!(json["type"], "reggaeton");
        assert_eq!(json["startTime"], "18:30");
        assert_eq!(json["maxSpots"], 20);
        assert_eq!(json["spotsRemaining"], 18);
        assert!(json.get("level").is_none());
    }

    #[test]
    fn booking_response_renders_timestamp() {
        let receipt = BookingReceipt {
            session_id: view().id,
            email: Email::new("a@x.com").unwrap(),
            booked_at: Timestamp::parse_rfc3339("2024-12-01T10:00:00Z").unwrap(),
        };
        let json = serde_json::to_value(BookingResponse::from(receipt)).unwrap();
        assert_eq!(json["sessionId"], "SESSION#2024-12-09#MON#1830");
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["bookedAt"], "2024-12-01T10:00:00.000Z");
    }

    #[test]
    fn create_request_deserializes() {
        let json = r#"{
            "date": "2024-12-09",
            "weekday": "MON",
            "startTime": "18:30",
            "type": "salsa",
            "level": 2,
            "maxSpots": 20
        }"#;
        let req: CreateSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.session_type, "salsa");
        assert_eq!(req.level, Some(2));
        assert_eq!(req.max_spots, 20);
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse::new("SESSION_NOT_FOUND", "gone")).unwrap();
        assert!(json.get("details").is_none());
    }
}
