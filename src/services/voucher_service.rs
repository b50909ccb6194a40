use crate::database::DbPool;
use crate::error::AppResult;
use crate::models::*;
use crate::services::{BloomFilterService, PgJobGate, SingleFlightGate};
use crate::utils::{MAX_COUPON_ATTEMPTS, generate_unique_coupon, plan_pages};
use crate::utils::coupon_code::random_coupon_candidate;
use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;
use uuid::Uuid;

#[derive(Clone)]
pub struct VoucherService<G = PgJobGate> {
    pool: DbPool,
    bloom_filter: BloomFilterService,
    job_gate: G,
    voucher_limit: i64,
}

impl<G> VoucherService<G>
where
    G: SingleFlightGate + Clone + Send + Sync + 'static,
{
    pub fn new(
        pool: DbPool,
        bloom_filter: BloomFilterService,
        job_gate: G,
        voucher_limit: i64,
    ) -> Self {
        Self {
            pool,
            bloom_filter,
            job_gate,
            voucher_limit,
        }
    }

    /// 为全部客户启动一次生成任务。
    ///
    /// 闸门占用成功后立即把扫描分离到后台任务, 调用方只等状态位落盘,
    /// 不等待扫描完成。闸门已被占用返回 AlreadyActive; 占用过程中的任何
    /// 持久化错误都折叠为稍后重试状态, 绝不向外抛错。
    pub async fn generate_for_all_customers(
        &self,
        offer_id: Uuid,
        expiration_date: DateTime<Utc>,
    ) -> GenerateStatus {
        match self.job_gate.try_acquire(VOUCHER_JOB_NAME).await {
            Ok(false) => GenerateStatus::AlreadyActive,
            Ok(true) => {
                let service = self.clone();
                tokio::spawn(async move {
                    service.process_coupons(offer_id, expiration_date).await;
                });
                GenerateStatus::Started
            }
            Err(e) => {
                log::error!("Failed to start voucher generation job: {e:?}");
                GenerateStatus::Unavailable
            }
        }
    }

    /// 后台扫描: 按页处理全部客户, 结束后释放闸门。
    ///
    /// 单页失败只回滚该页并继续下一页 (尽力而为策略, 个别坏页不能挡住
    /// 其余客户发券)。客户计数本身失败时任务保持 Active, 留待人工处理。
    async fn process_coupons(&self, offer_id: Uuid, expiration_date: DateTime<Utc>) {
        let customer_count: i64 = match sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                log::error!(
                    "Failed to count customers, generation job stays active until reset: {e:?}"
                );
                return;
            }
        };

        for page in plan_pages(customer_count, self.voucher_limit) {
            if let Err(e) = self
                .process_page(offer_id, expiration_date, page.limit, page.offset)
                .await
            {
                log::error!(
                    "Failed to create vouchers for page at offset {}: {e:?}",
                    page.offset
                );
            }
        }

        if let Err(e) = self.job_gate.release(VOUCHER_JOB_NAME).await {
            log::error!("Failed to deactivate voucher generation job: {e:?}");
        }
    }

    /// 单页的原子工作单元: 读一页客户, 逐个铸码, 批量写入, 一次提交
    async fn process_page(
        &self,
        offer_id: Uuid,
        expiration_date: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> AppResult<()> {
        log::info!("creating coupons from {} to {}", offset, offset + limit);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let customers: Vec<Customer> = sqlx::query_as(
            r#"
            SELECT id, name, email, created_at, updated_at
            FROM customers
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;

        if customers.is_empty() {
            tx.commit().await?;
            return Ok(());
        }

        let mut rows = Vec::with_capacity(customers.len());
        for customer in &customers {
            let code = self.generate_coupon()?;
            rows.push((code, customer.id));
        }

        let mut query_builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "INSERT INTO vouchers (voucher_code, customer_id, offer_id, expiration_date) ",
        );
        query_builder.push_values(rows, |mut b, (code, customer_id)| {
            b.push_bind(code)
                .push_bind(customer_id)
                .push_bind(offer_id)
                .push_bind(expiration_date);
        });
        query_builder.build().execute(&mut *tx).await?;

        tx.commit().await?;
        log::info!("created coupons from {} to {}", offset, offset + limit);
        Ok(())
    }

    fn generate_coupon(&self) -> AppResult<String> {
        generate_unique_coupon(
            &self.bloom_filter,
            MAX_COUPON_ATTEMPTS,
            random_coupon_candidate,
        )
    }

    /// 核销优惠码。
    ///
    /// 在一个串行化事务里查视图并更新底表, 第二个并发核销在第一个提交后
    /// 只会看到 used = true, 查不到行, 得到 Invalid。"从未存在"与"已用过"
    /// 对外不可区分。
    pub async fn verify_coupon(&self, request: &VerifyVoucherRequest) -> AppResult<VerifyOutcome> {
        // 存储形态是大写无分隔符, 先把来码规整成同一形态
        let voucher_code = request.voucher_code.trim().to_uppercase();

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let voucher: Option<VoucherView> = sqlx::query_as(
            r#"
            SELECT id, voucher_code, customer_id, offer_id, expiration_date,
                   used, used_date, customer_name, email, special_offer, discount
            FROM voucher_view
            WHERE voucher_code = $1 AND email = $2 AND used = FALSE
            "#,
        )
        .bind(&voucher_code)
        .bind(&request.email)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(voucher) = voucher else {
            tx.commit().await?;
            return Ok(VerifyOutcome::Invalid);
        };

        let now = Utc::now();
        if is_expired(voucher.expiration_date, now) {
            tx.commit().await?;
            return Ok(VerifyOutcome::Expired);
        }

        sqlx::query(
            "UPDATE vouchers SET used = TRUE, used_date = $1, updated_at = now() WHERE id = $2",
        )
        .bind(now)
        .bind(voucher.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(VerifyOutcome::Discount(voucher.discount))
    }

    /// 按邮箱列出未使用且未过期的优惠码, 只读查询, 容忍快照略旧
    pub async fn get_coupons_by_email(&self, email: &str) -> AppResult<Vec<ValidCoupon>> {
        let coupons = sqlx::query_as::<_, ValidCoupon>(
            r#"
            SELECT voucher_code, special_offer
            FROM voucher_view
            WHERE email = $1 AND used = FALSE AND expiration_date > $2
            ORDER BY expiration_date
            "#,
        )
        .bind(email)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }
}
