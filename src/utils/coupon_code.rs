use crate::error::{AppError, AppResult};
use crate::services::BloomFilterService;
use uuid::Uuid;

/// 生成唯一优惠码的最大尝试次数
pub const MAX_COUPON_ATTEMPTS: usize = 10;

/// 把 128 位随机标识规整成优惠码: 去掉连字符并转大写, 固定 32 个十六进制字符
pub fn canonical_coupon_code(id: Uuid) -> String {
    id.simple().to_string().to_uppercase()
}

/// 生成一个布隆过滤器认为未出现过的优惠码。
///
/// 每次尝试取一个新候选码并对过滤器做探测; 探测到"确定不存在"即注册并返回。
/// `max_attempts` 次尝试全部碰撞时返回 `CouponExhausted`,
/// 绝不返回可能重复的码。候选码来源作为闭包注入, 便于测试注入确定序列。
pub fn generate_unique_coupon<F>(
    filter: &BloomFilterService,
    max_attempts: usize,
    mut next_candidate: F,
) -> AppResult<String>
where
    F: FnMut() -> String,
{
    for _ in 0..max_attempts {
        let code = next_candidate();
        // 探测与注册在过滤器内部同一临界区完成
        if filter.check_and_add(&code) {
            return Ok(code);
        }
    }

    Err(AppError::CouponExhausted)
}

/// 生产路径使用的候选码来源
pub fn random_coupon_candidate() -> String {
    canonical_coupon_code(Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_filter() -> BloomFilterService {
        let filter = BloomFilterService::new(10_000, 0.01);
        filter.install(std::iter::empty());
        filter
    }

    #[test]
    fn test_canonical_coupon_code_shape() {
        let code = canonical_coupon_code(Uuid::new_v4());
        assert_eq!(code.len(), 32);
        assert!(!code.contains('-'));
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(code, code.to_uppercase());
    }

    #[test]
    fn test_generated_code_is_registered() {
        let filter = empty_filter();
        let code = generate_unique_coupon(&filter, MAX_COUPON_ATTEMPTS, random_coupon_candidate)
            .unwrap();
        // 返回过的码在同一个过滤器上必定命中
        assert!(filter.might_contain(&code));
    }

    #[test]
    fn test_returns_first_non_colliding_candidate() {
        let filter = empty_filter();
        // 前两个候选码预先注册, 模拟 K=2 次碰撞
        filter.add("CANDIDATE0");
        filter.add("CANDIDATE1");

        let mut probes = 0usize;
        let code = generate_unique_coupon(&filter, MAX_COUPON_ATTEMPTS, || {
            let candidate = format!("CANDIDATE{probes}");
            probes += 1;
            candidate
        })
        .unwrap();

        assert_eq!(code, "CANDIDATE2");
        assert_eq!(probes, 3);
    }

    #[test]
    fn test_exhaustion_after_max_attempts() {
        let filter = empty_filter();
        for i in 0..MAX_COUPON_ATTEMPTS {
            filter.add(&format!("CANDIDATE{i}"));
        }

        let mut probes = 0usize;
        let result = generate_unique_coupon(&filter, MAX_COUPON_ATTEMPTS, || {
            let candidate = format!("CANDIDATE{probes}");
            probes += 1;
            candidate
        });

        assert!(matches!(result, Err(AppError::CouponExhausted)));
        assert_eq!(probes, MAX_COUPON_ATTEMPTS);
        // 未注册任何新码
        assert!(!filter.might_contain("CANDIDATE10"));
    }
}
