use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use stay_notifier_domain::{DispatchOutcome, DispatchRecord, Stay, ID};

const UNKNOWN_GUEST: &str = "Unknown";
const UNKNOWN_FIELD: &str = "-";

/// A dispatch attempt together with the stay it was made for
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DispatchLogDTO {
    pub stay_id: ID,
    pub trigger_type: String,
    pub day: NaiveDate,
    pub attempted_at: NaiveDateTime,
    pub outcome: DispatchOutcome,
    pub guest_name: String,
    pub property_name: String,
    pub contact: String,
}

impl DispatchLogDTO {
    /// The stay may have been removed since the attempt
    pub fn new(record: DispatchRecord, stay: Option<&Stay>) -> Self {
        let (guest_name, property_name, contact) = match stay {
            Some(stay) => (
                stay.guest_name.clone(),
                stay.property_name.clone(),
                stay.contact.clone(),
            ),
            None => (
                UNKNOWN_GUEST.to_string(),
                UNKNOWN_FIELD.to_string(),
                UNKNOWN_FIELD.to_string(),
            ),
        };
        Self {
            stay_id: record.stay_id,
            trigger_type: record.trigger_type.as_str().to_string(),
            day: record.day,
            attempted_at: record.attempted_at,
            outcome: record.outcome,
            guest_name,
            property_name,
            contact,
        }
    }
}
