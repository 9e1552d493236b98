use crate::stay::Stay;
use crate::template::{MessageTemplate, PropertyTarget, TemplateCatalog};
use crate::tick::TickContext;
use std::cmp::Ordering;

/// A (stay, template) pair that fires in the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub stay: &'a Stay,
    pub template: &'a MessageTemplate,
}

/// Decides the firing order of the candidates of one stay
pub type TemplateComparator = fn(&MessageTemplate, &MessageTemplate) -> Ordering;

/// Lexical order on the trigger type. Operators control the firing order
/// among templates of the same phase by naming, e.g. `checkin_0900` is sent
/// before `checkin_0901`. When two templates share a trigger type, the one
/// owned by the property goes before the wildcard one.
pub fn by_trigger_type(t1: &MessageTemplate, t2: &MessageTemplate) -> Ordering {
    t1.trigger_type
        .cmp(&t2.trigger_type)
        .then_with(|| wildcard_rank(&t1.property).cmp(&wildcard_rank(&t2.property)))
}

fn wildcard_rank(target: &PropertyTarget) -> u8 {
    match target {
        PropertyTarget::Property(_) => 0,
        PropertyTarget::AllProperties => 1,
    }
}

/// Computes which templates fire for which stays at the tick's minute.
///
/// Stays are processed in the given order and the candidates of one stay
/// are ordered with `by_trigger_type`. There is no ordering between the
/// candidates of different stays.
pub fn resolve<'a>(
    tick: &TickContext,
    stays: &'a [Stay],
    catalog: &'a TemplateCatalog,
) -> Vec<Candidate<'a>> {
    resolve_with(tick, stays, catalog, by_trigger_type)
}

pub fn resolve_with<'a>(
    tick: &TickContext,
    stays: &'a [Stay],
    catalog: &'a TemplateCatalog,
    comparator: TemplateComparator,
) -> Vec<Candidate<'a>> {
    let today = tick.today();
    let now = tick.time();

    let mut candidates = Vec::new();
    for stay in stays {
        let phase = match stay.phase_on(today) {
            Some(phase) => phase,
            None => continue,
        };

        let mut templates = catalog
            .iter()
            .filter(|t| t.trigger_type.fires_in(phase))
            .filter(|t| t.property.includes(&stay.property_name))
            .filter(|t| t.fires_at(now))
            .collect::<Vec<_>>();
        templates.sort_by(|t1, t2| comparator(t1, t2));

        candidates.extend(templates.into_iter().map(|template| Candidate { stay, template }));
    }

    candidates
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::template::{PropertyTarget, TriggerType, ALL_PROPERTIES_MARKER};
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("Valid date")
    }

    fn tick(s: &str) -> TickContext {
        TickContext::at(s.parse::<NaiveDateTime>().expect("Valid datetime"))
    }

    fn stay(property: &str, check_in: &str, check_out: &str) -> Stay {
        Stay::new(
            property.into(),
            "Kim".into(),
            "010-1111-1111".into(),
            date(check_in),
            date(check_out),
        )
        .expect("Valid stay")
    }

    fn template(property: &str, trigger_type: &str, hour: u32, minute: u32) -> MessageTemplate {
        MessageTemplate::new(
            PropertyTarget::parse(property),
            TriggerType::new(trigger_type),
            NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            None,
            format!("{} for {{name}}", trigger_type),
        )
    }

    fn trigger_types(candidates: &[Candidate]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| c.template.trigger_type.to_string())
            .collect()
    }

    #[test]
    fn it_fires_the_right_template_on_each_day_of_a_stay() {
        let stays = vec![stay("Lodge A", "2025-05-10", "2025-05-12")];
        let catalog = TemplateCatalog::new(vec![
            template("Lodge A", "checkin_0900", 9, 0),
            template(ALL_PROPERTIES_MARKER, "multinight_0900", 9, 0),
        ]);

        let candidates = resolve(&tick("2025-05-10T09:00:00"), &stays, &catalog);
        assert_eq!(trigger_types(&candidates), vec!["checkin_0900"]);

        let candidates = resolve(&tick("2025-05-11T09:00:00"), &stays, &catalog);
        assert_eq!(trigger_types(&candidates), vec!["multinight_0900"]);

        let candidates = resolve(&tick("2025-05-12T09:00:00"), &stays, &catalog);
        assert!(candidates.is_empty());
    }

    #[test]
    fn it_only_matches_the_exact_minute() {
        let stays = vec![stay("Lodge A", "2025-05-10", "2025-05-12")];
        let catalog = TemplateCatalog::new(vec![template("Lodge A", "checkin_0900", 9, 0)]);

        assert!(resolve(&tick("2025-05-10T08:59:00"), &stays, &catalog).is_empty());
        assert_eq!(resolve(&tick("2025-05-10T09:00:59"), &stays, &catalog).len(), 1);
        assert!(resolve(&tick("2025-05-10T09:01:00"), &stays, &catalog).is_empty());
    }

    #[test]
    fn it_skips_templates_of_other_properties() {
        let stays = vec![stay("Lodge A", "2025-05-10", "2025-05-12")];
        let catalog = TemplateCatalog::new(vec![
            template("Lodge B", "checkin_0900", 9, 0),
            template("공통메세지", "checkin_0901", 9, 0),
        ]);

        let candidates = resolve(&tick("2025-05-10T09:00:00"), &stays, &catalog);
        assert_eq!(trigger_types(&candidates), vec!["checkin_0901"]);
    }

    #[test]
    fn it_orders_candidates_by_trigger_type() {
        let stays = vec![stay("Lodge A", "2025-05-10", "2025-05-12")];
        let catalog = TemplateCatalog::new(vec![
            template("Lodge A", "checkin_b", 9, 0),
            template(ALL_PROPERTIES_MARKER, "checkin_c", 9, 0),
            template("Lodge A", "checkin_a", 9, 0),
        ]);

        let candidates = resolve(&tick("2025-05-10T09:00:00"), &stays, &catalog);
        assert_eq!(
            trigger_types(&candidates),
            vec!["checkin_a", "checkin_b", "checkin_c"]
        );
    }

    #[test]
    fn property_template_goes_before_wildcard_with_same_trigger_type() {
        let stays = vec![stay("Lodge A", "2025-05-10", "2025-05-12")];
        let catalog = TemplateCatalog::new(vec![
            template(ALL_PROPERTIES_MARKER, "checkin_0900", 9, 0),
            template("Lodge A", "checkin_0900", 9, 0),
        ]);

        let candidates = resolve(&tick("2025-05-10T09:00:00"), &stays, &catalog);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].template.property,
            PropertyTarget::Property("Lodge A".into())
        );
    }

    #[test]
    fn it_keeps_the_stay_order_and_supports_custom_comparators() {
        let stays = vec![
            stay("Lodge B", "2025-05-09", "2025-05-10"),
            stay("Lodge A", "2025-05-10", "2025-05-12"),
        ];
        let catalog = TemplateCatalog::new(vec![
            template(ALL_PROPERTIES_MARKER, "checkin_a", 9, 0),
            template(ALL_PROPERTIES_MARKER, "checkin_b", 9, 0),
            template(ALL_PROPERTIES_MARKER, "checkout_a", 9, 0),
        ]);

        let candidates = resolve_with(&tick("2025-05-10T09:00:00"), &stays, &catalog, |t1, t2| {
            t2.trigger_type.cmp(&t1.trigger_type)
        });
        assert_eq!(
            trigger_types(&candidates),
            vec!["checkout_a", "checkin_b", "checkin_a"]
        );
        assert_eq!(candidates[0].stay.property_name, "Lodge B");
        assert_eq!(candidates[2].stay.property_name, "Lodge A");
    }

    #[test]
    fn dead_templates_never_fire() {
        let stays = vec![stay("Lodge A", "2025-05-10", "2025-05-12")];
        let catalog = TemplateCatalog::new(vec![template("Lodge A", "common", 9, 0)]);
        assert_eq!(catalog.dead_templates().count(), 1);

        for day in &["2025-05-10", "2025-05-11", "2025-05-12"] {
            let candidates = resolve(&tick(&format!("{}T09:00:00", day)), &stays, &catalog);
            assert!(candidates.is_empty());
        }
    }

    #[test]
    fn inactive_stays_have_no_candidates() {
        let stays = vec![stay("Lodge A", "2025-05-10", "2025-05-12")];
        let catalog = TemplateCatalog::new(vec![
            template("Lodge A", "checkin_0900", 9, 0),
            template("Lodge A", "checkout_0900", 9, 0),
        ]);
        assert!(resolve(&tick("2025-05-13T09:00:00"), &stays, &catalog).is_empty());
        assert!(resolve(&tick("2025-05-09T09:00:00"), &stays, &catalog).is_empty());
    }
}
