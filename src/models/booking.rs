use chrono::NaiveDateTime;
use serde_json::Value;

/// Raw `POST /book` payload. Every field is optional on the wire; only
/// non-empty strings count as present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub details: Option<String>,
    pub date: Option<String>,
}

impl BookingRequest {
    /// Pulls the known fields out of an arbitrary JSON document. Non-object
    /// bodies and non-string values yield missing fields.
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            name: field("name"),
            email: field("email"),
            phone: field("phone"),
            details: field("details"),
            date: field("date"),
        }
    }

    /// Returns the contact fields when all four are present.
    pub fn contact(&self) -> Option<ContactDetails> {
        Some(ContactDetails {
            name: self.name.clone()?,
            email: self.email.clone()?,
            phone: self.phone.clone()?,
            details: self.details.clone()?,
        })
    }
}

/// Validated values typed into the booking form.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub details: String,
}

/// The requested slot plus the two labels the scheduling page displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDateTime {
    pub date_time: NaiveDateTime,
    pub date_label: String,
    pub time_label: String,
}
