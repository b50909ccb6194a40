use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Voucher {
    pub id: Uuid,
    pub voucher_code: String,
    pub customer_id: Uuid,
    pub offer_id: Uuid,
    pub expiration_date: DateTime<Utc>,
    pub used: bool,
    pub used_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// voucher_view 的一行: 优惠券连同客户与活动信息
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VoucherView {
    pub id: Uuid,
    pub voucher_code: String,
    pub customer_id: Uuid,
    pub offer_id: Uuid,
    pub expiration_date: DateTime<Utc>,
    pub used: bool,
    pub used_date: Option<DateTime<Utc>>,
    pub customer_name: String,
    pub email: String,
    pub special_offer: String,
    pub discount: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateVouchersRequest {
    pub special_offer_id: Uuid,
    pub expiration_date: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyVoucherRequest {
    pub voucher_code: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CouponsByEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ValidCoupon {
    pub voucher_code: String,
    pub special_offer: String,
}

/// 生成接口的三种对外状态, 字符串即线上契约, 不可改动
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateStatus {
    AlreadyActive,
    Started,
    Unavailable,
}

impl GenerateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerateStatus::AlreadyActive => "Active",
            GenerateStatus::Started => "success",
            GenerateStatus::Unavailable => {
                "unable to create coupon at this time try aftersometime"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Discount(i32),
    Expired,
    Invalid,
}

/// 过期判定: 到期时间不晚于当前时间即视为过期
pub fn is_expired(expiration_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expiration_date <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generate_status_strings() {
        assert_eq!(GenerateStatus::AlreadyActive.as_str(), "Active");
        assert_eq!(GenerateStatus::Started.as_str(), "success");
        assert_eq!(
            GenerateStatus::Unavailable.as_str(),
            "unable to create coupon at this time try aftersometime"
        );
    }

    #[test]
    fn test_is_expired_in_the_past() {
        let now = Utc::now();
        assert!(is_expired(now - Duration::days(1), now));
    }

    #[test]
    fn test_is_expired_at_the_boundary() {
        // 恰好等于当前时间 => 已过期
        let now = Utc::now();
        assert!(is_expired(now, now));
    }

    #[test]
    fn test_not_expired_in_the_future() {
        let now = Utc::now();
        assert!(!is_expired(now + Duration::seconds(1), now));
    }

    #[test]
    fn test_generate_vouchers_request_deserializes() {
        let request: GenerateVouchersRequest = serde_json::from_str(
            r#"{
                "special_offer_id": "7f8a6e0a-3c64-4e2a-9a5e-0f6d2b1a8c33",
                "expiration_date": "2026-12-31T23:59:59Z"
            }"#,
        )
        .unwrap();
        assert_eq!(request.expiration_date.timezone(), Utc);
    }

    #[test]
    fn test_verify_voucher_request_deserializes() {
        let request: VerifyVoucherRequest = serde_json::from_str(
            r#"{"voucher_code": "ABCDEF0123456789ABCDEF0123456789", "email": "a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.voucher_code.len(), 32);
    }
}
