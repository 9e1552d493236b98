use chrono::{NaiveDate, NaiveTime};
use stay_notifier_domain::{MessageTemplate, PropertyTarget, Stay, TriggerType};
use stay_notifier_infra::NotifierContext;

fn date(d: &str) -> NaiveDate {
    NaiveDate::parse_from_str(d, "%F").expect("Valid date")
}

pub async fn insert_stay(
    ctx: &NotifierContext,
    property: &str,
    guest: &str,
    contact: &str,
    check_in: &str,
    check_out: &str,
) -> Stay {
    let stay = Stay::new(
        property.into(),
        guest.into(),
        contact.into(),
        date(check_in),
        date(check_out),
    )
    .expect("Stay with at least one night");
    ctx.repos
        .stays
        .insert(&stay)
        .await
        .expect("To insert stay");
    stay
}

pub async fn insert_template(
    ctx: &NotifierContext,
    property: &str,
    trigger_type: &str,
    send_time: &str,
    subject: Option<&str>,
    body: &str,
) -> MessageTemplate {
    let template = MessageTemplate::new(
        PropertyTarget::parse(property),
        TriggerType::new(trigger_type),
        NaiveTime::parse_from_str(send_time, "%H:%M").expect("Valid send time"),
        subject.map(String::from),
        body.into(),
    );
    ctx.repos
        .templates
        .insert(&template)
        .await
        .expect("To insert template");
    template
}
