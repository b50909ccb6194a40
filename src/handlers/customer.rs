use crate::models::{CreateCustomerRequest, Customer};
use crate::services::CustomerService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/customers",
    tag = "customer",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "客户创建成功", body = Customer),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_customer(
    customer_service: web::Data<CustomerService>,
    request: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse> {
    match customer_service.create_customer(request.into_inner()).await {
        Ok(customer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": customer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn customer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/customers").route("", web::post().to(create_customer)));
}
