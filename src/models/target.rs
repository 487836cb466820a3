use super::ContactDetails;

/// Which request value is typed into a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Name,
    Email,
    Phone,
    Details,
}

impl FieldSource {
    pub fn value<'a>(&self, contact: &'a ContactDetails) -> &'a str {
        match self {
            FieldSource::Name => &contact.name,
            FieldSource::Email => &contact.email,
            FieldSource::Phone => &contact.phone,
            FieldSource::Details => &contact.details,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: String,
    pub source: FieldSource,
}

impl FormField {
    fn new(label: &str, source: FieldSource) -> Self {
        Self {
            label: label.to_string(),
            source,
        }
    }
}

/// Everything that differs between scheduling pages: where they live, how
/// their controls are labelled and which fields the contact form asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingTarget {
    pub name: String,
    pub url: String,
    pub headless: bool,
    pub next_month_label: String,
    /// Appended to the long date to form the day cell's label.
    pub date_label_suffix: String,
    /// Prefixed to the time label to form the "continue" control's label.
    pub next_button_prefix: String,
    pub submit_button: String,
    /// Whether the time-slot button must match the time label exactly.
    pub exact_time_match: bool,
    pub fields: Vec<FormField>,
}

impl BookingTarget {
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "processpulse" => Some(Self::processpulse()),
            "rollins" => Some(Self::rollins()),
            _ => None,
        }
    }

    /// 30 minute discovery call; the phone number goes into the free-text
    /// "process" question.
    pub fn processpulse() -> Self {
        Self {
            name: "processpulse".to_string(),
            url: "https://calendly.com/hasan-processpulse/30min".to_string(),
            headless: false,
            fields: vec![
                FormField::new("Name *", FieldSource::Name),
                FormField::new("Email *", FieldSource::Email),
                FormField::new("Is there any process in", FieldSource::Phone),
            ],
            exact_time_match: false,
            ..Self::calendly_defaults()
        }
    }

    /// 15 minute call with phone, notes and SMS reminder number.
    pub fn rollins() -> Self {
        Self {
            name: "rollins".to_string(),
            url: "https://calendly.com/arollins00/15min".to_string(),
            headless: true,
            fields: vec![
                FormField::new("Name *", FieldSource::Name),
                FormField::new("Email *", FieldSource::Email),
                FormField::new("Phone Number *", FieldSource::Phone),
                FormField::new("Please share anything that", FieldSource::Details),
                FormField::new("Send text messages to", FieldSource::Phone),
            ],
            exact_time_match: true,
            ..Self::calendly_defaults()
        }
    }

    fn calendly_defaults() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            headless: true,
            next_month_label: "Go to next month".to_string(),
            date_label_suffix: " - Times".to_string(),
            next_button_prefix: "Next ".to_string(),
            submit_button: "Schedule Event".to_string(),
            exact_time_match: true,
            fields: Vec::new(),
        }
    }

    pub fn date_cell_label(&self, date_label: &str) -> String {
        format!("{date_label}{}", self.date_label_suffix)
    }

    pub fn next_button_label(&self, time_label: &str) -> String {
        format!("{}{time_label}", self.next_button_prefix)
    }
}
