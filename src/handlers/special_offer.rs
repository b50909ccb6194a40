use crate::models::{CreateSpecialOfferRequest, SpecialOffer};
use crate::services::SpecialOfferService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/special-offers",
    tag = "special_offer",
    request_body = CreateSpecialOfferRequest,
    responses(
        (status = 200, description = "特惠活动创建成功", body = SpecialOffer),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn create_special_offer(
    special_offer_service: web::Data<SpecialOfferService>,
    request: web::Json<CreateSpecialOfferRequest>,
) -> Result<HttpResponse> {
    match special_offer_service
        .create_special_offer(request.into_inner())
        .await
    {
        Ok(offer) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": offer
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn special_offer_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/special-offers").route("", web::post().to(create_special_offer)));
}
