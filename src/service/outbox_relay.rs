use crate::repo::outbox_repo::{OutboxEvent, OutboxRepo};
use anyhow::Result;
use chrono::{Duration, Utc};

const BATCH_SIZE: i64 = 100;
const STALE_PROCESSING_SECS: i64 = 60;
/// At 200ms per tick this sweeps stale claims about every 30s.
const REQUEUE_EVERY_TICKS: u64 = 150;

#[derive(Clone)]
pub struct OutboxRelay {
    pub outbox_repo: OutboxRepo,
    pub redis_client: redis::Client,
    pub stream_key: String,
}

impl OutboxRelay {
    pub async fn run(self) {
        let mut ticks: u64 = 0;
        loop {
            if ticks % REQUEUE_EVERY_TICKS == 0 {
                self.requeue_stale().await;
            }
            ticks = ticks.wrapping_add(1);

            if let Err(err) = self.tick().await {
                tracing::error!("outbox relay error: {}", err);
            }
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        }
    }

    async fn requeue_stale(&self) {
        match self.outbox_repo.requeue_stale(STALE_PROCESSING_SECS).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(requeued = n, "requeued stale outbox events"),
            Err(err) => tracing::error!("outbox requeue error: {}", err),
        }
    }

    /// Publishes one claimed batch. Every claimed row leaves this call
    /// either PUBLISHED or rescheduled as PENDING, unless marking it fails,
    /// in which case the periodic stale sweep picks it up.
    pub async fn tick(&self) -> Result<usize> {
        let batch = self.outbox_repo.claim_pending(BATCH_SIZE).await?;
        if batch.is_empty() {
            return Ok(0);
        }

        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("redis unavailable, rescheduling {} outbox events: {}", batch.len(), e);
                for item in &batch {
                    self.reschedule(item).await;
                }
                return Ok(0);
            }
        };

        let mut published = 0;
        for item in batch {
            let payload = match serde_json::to_string(&item.payload_json) {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!("outbox id {} has unserializable payload: {}", item.id, e);
                    self.reschedule(&item).await;
                    continue;
                }
            };

            let add_res: redis::RedisResult<String> = redis::cmd("XADD")
                .arg(&self.stream_key)
                .arg("MAXLEN")
                .arg("~")
                .arg(1_000_000)
                .arg("*")
                .arg("type")
                .arg(&item.event_type)
                .arg("event")
                .arg(payload)
                .query_async(&mut conn)
                .await;

            match add_res {
                Ok(_) => match self.outbox_repo.mark_published(item.id).await {
                    Ok(()) => {
                        published += 1;
                        tracing::debug!(outbox_id = item.id, payment_id = %item.payment_id, "outbox event published");
                    }
                    Err(e) => tracing::error!("failed to mark outbox id {} published: {}", item.id, e),
                },
                Err(e) => {
                    tracing::warn!("xadd failed for outbox id {}: {}", item.id, e);
                    self.reschedule(&item).await;
                }
            }
        }

        Ok(published)
    }

    async fn reschedule(&self, item: &OutboxEvent) {
        let attempts = item.attempts + 1;
        let next_attempt_at = Utc::now() + retry_backoff(attempts);
        if let Err(e) = self.outbox_repo.mark_retry(item.id, attempts, next_attempt_at).await {
            tracing::error!("failed to reschedule outbox id {}: {}", item.id, e);
        }
    }
}

/// Exponential backoff in seconds, capped at five minutes.
pub fn retry_backoff(attempts: i32) -> Duration {
    let exp = attempts.clamp(0, 9) as u32;
    Duration::seconds(i64::min(300, 2_i64.pow(exp)))
}
