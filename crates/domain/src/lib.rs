mod dispatch;
mod render;
pub mod resolver;
mod shared;
mod stay;
mod template;
mod tick;

pub use chrono_tz::Tz;
pub use dispatch::{
    DispatchKey, DispatchOutcome, DispatchPolicy, DispatchRecord, InvalidDispatchOutcome,
};
pub use render::{
    render, render_text, RenderError, RenderedMessage, GUEST_NAME_PLACEHOLDER,
    PROPERTY_NAME_PLACEHOLDER,
};
pub use resolver::{resolve, resolve_with, Candidate, TemplateComparator};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use stay::{InvalidStayError, Stay, StayPhase};
pub use template::{
    MessageTemplate, PropertyTarget, TemplateCatalog, TriggerType, ALL_PROPERTIES_MARKER,
    LEGACY_UNIVERSAL_MARKER,
};
pub use tick::{ClockOverride, InvalidClockOverride, TickContext};
