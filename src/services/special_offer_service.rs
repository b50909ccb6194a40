use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreateSpecialOfferRequest, SpecialOffer};

#[derive(Clone)]
pub struct SpecialOfferService {
    pool: DbPool,
}

impl SpecialOfferService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_special_offer(
        &self,
        request: CreateSpecialOfferRequest,
    ) -> AppResult<SpecialOffer> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        if !(0..=100).contains(&request.discount) {
            return Err(AppError::ValidationError(
                "Discount must be between 0 and 100".to_string(),
            ));
        }

        let offer = sqlx::query_as::<_, SpecialOffer>(
            r#"
            INSERT INTO special_offers (name, discount)
            VALUES ($1, $2)
            RETURNING id, name, discount, created_at, updated_at
            "#,
        )
        .bind(request.name.trim())
        .bind(request.discount)
        .fetch_one(&self.pool)
        .await?;

        Ok(offer)
    }
}
