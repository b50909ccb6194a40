use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::customer::create_customer,
        handlers::special_offer::create_special_offer,
        handlers::voucher::create_vouchers,
        handlers::voucher::verify_voucher,
        handlers::voucher::get_coupons_by_email,
    ),
    components(
        schemas(
            Customer,
            CreateCustomerRequest,
            SpecialOffer,
            CreateSpecialOfferRequest,
            Voucher,
            VoucherView,
            GenerateVouchersRequest,
            VerifyVoucherRequest,
            CouponsByEmailRequest,
            ValidCoupon,
            JobStatus,
        )
    ),
    tags(
        (name = "customer", description = "Customer API"),
        (name = "special_offer", description = "Special offer API"),
        (name = "voucher", description = "Voucher generation and redemption API"),
    ),
    info(
        title = "Voucher Backend API",
        version = "1.0.0",
        description = "Voucher issuing and redemption REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
