use crate::models::*;
use crate::services::VoucherService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/vouchers/create",
    tag = "voucher",
    request_body = GenerateVouchersRequest,
    responses(
        (status = 200, description = "返回生成任务状态: Active / success / 稍后重试"),
    )
)]
pub async fn create_vouchers(
    voucher_service: web::Data<VoucherService>,
    request: web::Json<GenerateVouchersRequest>,
) -> Result<HttpResponse> {
    // 该接口永远返回三种状态之一, 不向外抛错
    let status = voucher_service
        .generate_for_all_customers(request.special_offer_id, request.expiration_date)
        .await;

    Ok(HttpResponse::Ok().json(json!({ "status": status.as_str() })))
}

#[utoipa::path(
    post,
    path = "/vouchers/verify",
    tag = "voucher",
    request_body = VerifyVoucherRequest,
    responses(
        (status = 200, description = "核销结果: 折扣数值或失效原因"),
        (status = 500, description = "内部错误")
    )
)]
pub async fn verify_voucher(
    voucher_service: web::Data<VoucherService>,
    request: web::Json<VerifyVoucherRequest>,
) -> Result<HttpResponse> {
    match voucher_service.verify_coupon(&request).await {
        Ok(VerifyOutcome::Discount(discount)) => {
            Ok(HttpResponse::Ok().json(json!({ "discount": discount })))
        }
        Ok(VerifyOutcome::Expired) => Ok(HttpResponse::Ok().json("Coupon has expired")),
        Ok(VerifyOutcome::Invalid) => Ok(HttpResponse::Ok().json("Coupon is not valid")),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/vouchers/coupons",
    tag = "voucher",
    request_body = CouponsByEmailRequest,
    responses(
        (status = 200, description = "该邮箱所有未使用且未过期的优惠码", body = [ValidCoupon]),
        (status = 500, description = "内部错误")
    )
)]
pub async fn get_coupons_by_email(
    voucher_service: web::Data<VoucherService>,
    request: web::Json<CouponsByEmailRequest>,
) -> Result<HttpResponse> {
    match voucher_service.get_coupons_by_email(&request.email).await {
        Ok(coupons) => Ok(HttpResponse::Ok().json(coupons)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn voucher_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vouchers")
            .route("/create", web::post().to(create_vouchers))
            .route("/verify", web::post().to(verify_voucher))
            .route("/coupons", web::post().to(get_coupons_by_email)),
    );
}
