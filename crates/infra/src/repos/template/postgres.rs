use super::ITemplateRepo;
use chrono::NaiveTime;
use sqlx::{types::Uuid, FromRow, PgPool};
use stay_notifier_domain::{MessageTemplate, PropertyTarget, TriggerType, ID};
use tracing::error;

pub struct PostgresTemplateRepo {
    pool: PgPool,
}

impl PostgresTemplateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TemplateRaw {
    template_uid: Uuid,
    property_name: String,
    trigger_type: String,
    send_time: NaiveTime,
    subject: Option<String>,
    body: String,
}

impl From<TemplateRaw> for MessageTemplate {
    fn from(e: TemplateRaw) -> Self {
        Self {
            id: e.template_uid.into(),
            property: PropertyTarget::parse(&e.property_name),
            trigger_type: TriggerType::new(e.trigger_type),
            send_time: e.send_time,
            subject: e.subject,
            body: e.body,
        }
    }
}

#[async_trait::async_trait]
impl ITemplateRepo for PostgresTemplateRepo {
    async fn insert(&self, template: &MessageTemplate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO message_templates(template_uid, property_name, trigger_type, send_time, subject, body)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(template.id.inner_ref())
        .bind(template.property.as_str())
        .bind(template.trigger_type.as_str())
        .bind(template.send_time)
        .bind(&template.subject)
        .bind(&template.body)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert template: {:?}. DB returned error: {:?}",
                template, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, template_id: &ID) -> Option<MessageTemplate> {
        let res: Option<TemplateRaw> = sqlx::query_as(
            r#"
            SELECT * FROM message_templates
            WHERE template_uid = $1
            "#,
        )
        .bind(template_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find template with id: {:?} failed. DB returned error: {:?}",
                template_id, e
            );
            e
        })
        .ok()?;
        res.map(|t| t.into())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<MessageTemplate>> {
        let templates: Vec<TemplateRaw> = sqlx::query_as(
            r#"
            SELECT * FROM message_templates
            ORDER BY property_name, trigger_type
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("List templates failed. DB returned error: {:?}", e);
            e
        })?;
        Ok(templates.into_iter().map(|t| t.into()).collect())
    }
}
