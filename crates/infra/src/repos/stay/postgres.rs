use super::IStayRepo;
use chrono::NaiveDate;
use sqlx::{types::Uuid, FromRow, PgPool};
use stay_notifier_domain::{Stay, ID};
use tracing::error;

pub struct PostgresStayRepo {
    pool: PgPool,
}

impl PostgresStayRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StayRaw {
    stay_uid: Uuid,
    property_name: String,
    guest_name: String,
    contact: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl From<StayRaw> for Stay {
    fn from(e: StayRaw) -> Self {
        Self {
            id: e.stay_uid.into(),
            property_name: e.property_name,
            guest_name: e.guest_name,
            contact: e.contact,
            check_in: e.check_in,
            check_out: e.check_out,
        }
    }
}

#[async_trait::async_trait]
impl IStayRepo for PostgresStayRepo {
    async fn insert(&self, stay: &Stay) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stays(stay_uid, property_name, guest_name, contact, check_in, check_out)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(stay.id.inner_ref())
        .bind(&stay.property_name)
        .bind(&stay.guest_name)
        .bind(&stay.contact)
        .bind(stay.check_in)
        .bind(stay.check_out)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert stay: {:?}. DB returned error: {:?}",
                stay, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, stay_id: &ID) -> Option<Stay> {
        let res: Option<StayRaw> = sqlx::query_as(
            r#"
            SELECT * FROM stays
            WHERE stay_uid = $1
            "#,
        )
        .bind(stay_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find stay with id: {:?} failed. DB returned error: {:?}",
                stay_id, e
            );
            e
        })
        .ok()?;
        res.map(|stay| stay.into())
    }

    async fn find_many(&self, stay_ids: &[ID]) -> anyhow::Result<Vec<Stay>> {
        let ids = stay_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let stays: Vec<StayRaw> = sqlx::query_as(
            r#"
            SELECT * FROM stays
            WHERE stay_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find stays with ids: {:?} failed. DB returned error: {:?}",
                stay_ids, e
            );
            e
        })?;
        Ok(stays.into_iter().map(|s| s.into()).collect())
    }

    async fn list_active(&self, as_of: NaiveDate) -> anyhow::Result<Vec<Stay>> {
        let stays: Vec<StayRaw> = sqlx::query_as(
            r#"
            SELECT * FROM stays
            WHERE check_in <= $1 AND check_out >= $1
            ORDER BY check_in, stay_uid
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "List stays active on: {} failed. DB returned error: {:?}",
                as_of, e
            );
            e
        })?;
        Ok(stays.into_iter().map(|s| s.into()).collect())
    }
}
