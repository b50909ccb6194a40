use crate::database::DbPool;
use crate::error::AppResult;
use crate::models::JobStatus;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

/// 以任务名为键的单飞闸门: 同名任务同一时刻至多一个持有者。
///
/// 存储后端可替换, 生产环境用 voucher_job 状态行 (`PgJobGate`),
/// 测试用进程内集合 (`InMemoryJobGate`)。
pub trait SingleFlightGate {
    /// 尝试占用闸门。已被占用返回 Ok(false), 成功占用返回 Ok(true)。
    fn try_acquire(&self, job_name: &str) -> impl Future<Output = AppResult<bool>> + Send;

    /// 释放闸门, 允许后续任务重新占用
    fn release(&self, job_name: &str) -> impl Future<Output = AppResult<()>> + Send;
}

/// 由 voucher_job 状态行支撑的闸门。读取与置位放在同一个串行化事务里,
/// 两个并发的 try_acquire 不可能都观察到 Inactive 并都成功。
#[derive(Clone)]
pub struct PgJobGate {
    pool: DbPool,
}

impl PgJobGate {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SingleFlightGate for PgJobGate {
    async fn try_acquire(&self, job_name: &str) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM voucher_job WHERE job_name = $1")
                .bind(job_name)
                .fetch_optional(&mut *tx)
                .await?;

        if status.as_deref() == Some(JobStatus::Active.as_str()) {
            tx.commit().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO voucher_job (job_name, status)
            VALUES ($1, $2)
            ON CONFLICT (job_name)
            DO UPDATE SET status = EXCLUDED.status, updated_at = now()
            "#,
        )
        .bind(job_name)
        .bind(JobStatus::Active.as_str())
        .execute(&mut *tx)
        .await?;

        // 提交即占用生效; 出错时 tx 随 drop 回滚, 不会留下 Active 残留
        tx.commit().await?;
        Ok(true)
    }

    async fn release(&self, job_name: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO voucher_job (job_name, status)
            VALUES ($1, $2)
            ON CONFLICT (job_name)
            DO UPDATE SET status = EXCLUDED.status, updated_at = now()
            "#,
        )
        .bind(job_name)
        .bind(JobStatus::Inactive.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// 进程内实现, 供测试替换持久化闸门
#[derive(Clone, Default)]
pub struct InMemoryJobGate {
    active: Arc<tokio::sync::Mutex<HashSet<String>>>,
}

impl InMemoryJobGate {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SingleFlightGate for InMemoryJobGate {
    async fn try_acquire(&self, job_name: &str) -> AppResult<bool> {
        let mut active = self.active.lock().await;
        Ok(active.insert(job_name.to_string()))
    }

    async fn release(&self, job_name: &str) -> AppResult<()> {
        let mut active = self.active.lock().await;
        active.remove(job_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_acquire_is_rejected() {
        let gate = InMemoryJobGate::new();
        assert!(gate.try_acquire("voucherForAll").await.unwrap());
        assert!(!gate.try_acquire("voucherForAll").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_acquires_admit_exactly_one() {
        let gate = InMemoryJobGate::new();
        let (a, b) = tokio::join!(
            {
                let gate = gate.clone();
                tokio::spawn(async move { gate.try_acquire("voucherForAll").await })
            },
            {
                let gate = gate.clone();
                tokio::spawn(async move { gate.try_acquire("voucherForAll").await })
            }
        );

        let a = a.unwrap().unwrap();
        let b = b.unwrap().unwrap();
        assert!(a ^ b, "exactly one of two concurrent starts may win");
    }

    #[tokio::test]
    async fn test_release_reopens_the_gate() {
        let gate = InMemoryJobGate::new();
        assert!(gate.try_acquire("voucherForAll").await.unwrap());
        gate.release("voucherForAll").await.unwrap();
        assert!(gate.try_acquire("voucherForAll").await.unwrap());
    }

    #[tokio::test]
    async fn test_gates_are_per_job_name() {
        let gate = InMemoryJobGate::new();
        assert!(gate.try_acquire("voucherForAll").await.unwrap());
        assert!(gate.try_acquire("otherJob").await.unwrap());
    }
}
