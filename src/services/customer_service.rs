use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreateCustomerRequest, Customer};

#[derive(Clone)]
pub struct CustomerService {
    pool: DbPool,
}

impl CustomerService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create_customer(&self, request: CreateCustomerRequest) -> AppResult<Customer> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        if !request.email.contains('@') {
            return Err(AppError::ValidationError(
                "A valid email is required".to_string(),
            ));
        }

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(request.name.trim())
        .bind(request.email.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }
}
