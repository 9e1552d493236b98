use super::{AppendResult, IDispatchLogRepo};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{types::Uuid, FromRow, PgPool};
use stay_notifier_domain::{DispatchKey, DispatchRecord, TriggerType};
use tracing::error;

pub struct PostgresDispatchLogRepo {
    pool: PgPool,
}

impl PostgresDispatchLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DispatchRecordRaw {
    stay_uid: Uuid,
    trigger_type: String,
    day: NaiveDate,
    attempted_at: NaiveDateTime,
    outcome: String,
}

impl DispatchRecordRaw {
    fn into_record(self) -> anyhow::Result<DispatchRecord> {
        Ok(DispatchRecord {
            stay_id: self.stay_uid.into(),
            trigger_type: TriggerType::new(self.trigger_type),
            day: self.day,
            attempted_at: self.attempted_at,
            outcome: self.outcome.parse()?,
        })
    }
}

#[async_trait::async_trait]
impl IDispatchLogRepo for PostgresDispatchLogRepo {
    async fn exists(&self, key: &DispatchKey) -> anyhow::Result<bool> {
        let res: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT stay_uid FROM dispatch_logs
            WHERE stay_uid = $1 AND trigger_type = $2 AND day = $3
            "#,
        )
        .bind(key.stay_id.inner_ref())
        .bind(key.trigger_type.as_str())
        .bind(key.day)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find dispatch record: {:?} failed. DB returned error: {:?}",
                key, e
            );
            e
        })?;
        Ok(res.is_some())
    }

    async fn append(&self, record: &DispatchRecord) -> anyhow::Result<AppendResult> {
        let res = sqlx::query(
            r#"
            INSERT INTO dispatch_logs(stay_uid, trigger_type, day, attempted_at, outcome)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT (stay_uid, trigger_type, day) DO NOTHING
            "#,
        )
        .bind(record.stay_id.inner_ref())
        .bind(record.trigger_type.as_str())
        .bind(record.day)
        .bind(record.attempted_at)
        .bind(record.outcome.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to append dispatch record: {:?}. DB returned error: {:?}",
                record, e
            );
            e
        })?;

        if res.rows_affected() == 0 {
            Ok(AppendResult::Duplicate)
        } else {
            Ok(AppendResult::Inserted)
        }
    }

    async fn settle(&self, record: &DispatchRecord) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE dispatch_logs
            SET attempted_at = $4, outcome = $5
            WHERE stay_uid = $1 AND trigger_type = $2 AND day = $3
            "#,
        )
        .bind(record.stay_id.inner_ref())
        .bind(record.trigger_type.as_str())
        .bind(record.day)
        .bind(record.attempted_at)
        .bind(record.outcome.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to settle dispatch record: {:?}. DB returned error: {:?}",
                record, e
            );
            e
        })?;

        if res.rows_affected() == 0 {
            anyhow::bail!("No dispatch record to settle for: {:?}", record.key());
        }
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> anyhow::Result<Vec<DispatchRecord>> {
        let records: Vec<DispatchRecordRaw> = sqlx::query_as(
            r#"
            SELECT * FROM dispatch_logs
            ORDER BY attempted_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Find recent dispatch records failed. DB returned error: {:?}", e);
            e
        })?;

        records.into_iter().map(|r| r.into_record()).collect()
    }
}
