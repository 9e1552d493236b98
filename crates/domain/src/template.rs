use crate::shared::entity::{Entity, ID};
use crate::stay::StayPhase;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Stored property name meaning "applies to all properties"
pub const ALL_PROPERTIES_MARKER: &str = "전체공용";
/// Older stored property name with the same meaning as `ALL_PROPERTIES_MARKER`.
/// Rows still carrying it have to keep firing for every property.
pub const LEGACY_UNIVERSAL_MARKER: &str = "공통메세지";

/// The properties a `MessageTemplate` applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyTarget {
    AllProperties,
    Property(String),
}

impl PropertyTarget {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == ALL_PROPERTIES_MARKER || raw == LEGACY_UNIVERSAL_MARKER {
            Self::AllProperties
        } else {
            Self::Property(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AllProperties => ALL_PROPERTIES_MARKER,
            Self::Property(name) => name,
        }
    }

    pub fn includes(&self, property_name: &str) -> bool {
        match self {
            Self::AllProperties => true,
            Self::Property(name) => name == property_name,
        }
    }
}

impl Serialize for PropertyTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PropertyTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// A tag naming the phase and intended send time of a `MessageTemplate`,
/// e.g. `checkin_0900` or `multinight_1900`.
///
/// The tag is used for three things: phase matching (by substring),
/// firing order among the templates of one stay (lexical) and as part of
/// the dispatch deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerType(String);

impl TriggerType {
    pub fn new<T: Into<String>>(tag: T) -> Self {
        Self(tag.into())
    }

    /// Trigger type used to log sends done by an operator outside of a tick
    pub fn manual(kind: &str) -> Self {
        Self(format!("manual_{}", kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn fires_in(&self, phase: StayPhase) -> bool {
        self.0.contains(phase.tag())
    }

    /// Templates that match no phase at all are never resolved
    pub fn is_dead(&self) -> bool {
        ![StayPhase::Arrival, StayPhase::Departure, StayPhase::MidStay]
            .iter()
            .any(|phase| self.fires_in(*phase))
    }
}

impl Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTemplate {
    pub id: ID,
    pub property: PropertyTarget,
    pub trigger_type: TriggerType,
    /// Only hour and minute are significant
    pub send_time: NaiveTime,
    pub subject: Option<String>,
    /// Text with `{name}` and `{accommodation}` placeholders
    pub body: String,
}

impl MessageTemplate {
    pub fn new(
        property: PropertyTarget,
        trigger_type: TriggerType,
        send_time: NaiveTime,
        subject: Option<String>,
        body: String,
    ) -> Self {
        Self {
            id: Default::default(),
            property,
            trigger_type,
            send_time,
            subject,
            body,
        }
    }

    pub fn fires_at(&self, time: NaiveTime) -> bool {
        self.send_time.hour() == time.hour() && self.send_time.minute() == time.minute()
    }
}

impl Entity for MessageTemplate {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Read only snapshot of every `MessageTemplate`, loaded once at the
/// start of a tick and never mutated while the tick runs.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<MessageTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<MessageTemplate>) -> Self {
        Self { templates }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn find(&self, template_id: &ID) -> Option<&MessageTemplate> {
        self.templates.iter().find(|t| &t.id == template_id)
    }

    pub fn dead_templates(&self) -> impl Iterator<Item = &MessageTemplate> {
        self.templates.iter().filter(|t| t.trigger_type.is_dead())
    }
}
