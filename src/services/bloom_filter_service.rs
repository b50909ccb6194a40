use crate::database::DbPool;
use crate::error::AppResult;
use bloomfilter::Bloom;
use std::sync::{Arc, Mutex};

/// 已发放优惠码的概率集合。
///
/// 只增不删: `might_contain` 返回 false 表示码一定没出现过, 返回 true 表示
/// 可能出现过 (误判率随插入量上升, 不做再平衡)。服务启动时必须先
/// `initialize` 从库里已有的码预热; 预热前调用查询或插入属编程错误, 直接 panic。
#[derive(Clone)]
pub struct BloomFilterService {
    filter: Arc<Mutex<Option<Bloom<str>>>>,
    capacity: usize,
    fp_rate: f64,
}

impl BloomFilterService {
    pub fn new(capacity: usize, fp_rate: f64) -> Self {
        Self {
            filter: Arc::new(Mutex::new(None)),
            capacity,
            fp_rate,
        }
    }

    /// 从 vouchers 表加载全部已发放的码。读取失败时向上传播,
    /// 服务不得在过滤器未就绪的情况下开始对外服务。
    pub async fn initialize(&self, pool: &DbPool) -> AppResult<()> {
        let codes: Vec<String> = sqlx::query_scalar("SELECT voucher_code FROM vouchers")
            .fetch_all(pool)
            .await?;

        let count = codes.len();
        self.install(codes);

        log::info!("Bloom filter loaded with {count} entries");
        Ok(())
    }

    /// 用给定的码集合重建并安装过滤器
    pub fn install<I>(&self, codes: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut filter: Bloom<str> = Bloom::new_for_fp_rate(self.capacity, self.fp_rate);
        for code in codes {
            filter.set(&code);
        }

        let mut guard = self.lock();
        *guard = Some(filter);
    }

    pub fn add(&self, code: &str) {
        let mut guard = self.lock();
        Self::get_mut(&mut guard).set(code);
    }

    pub fn might_contain(&self, code: &str) -> bool {
        let mut guard = self.lock();
        Self::get_mut(&mut guard).check(code)
    }

    /// 探测并注册, 同一临界区内完成。
    /// 返回 true 表示该码此前一定不存在且现已注册, false 表示可能已存在。
    pub fn check_and_add(&self, code: &str) -> bool {
        let mut guard = self.lock();
        !Self::get_mut(&mut guard).check_and_set(code)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Bloom<str>>> {
        self.filter
            .lock()
            .expect("bloom filter mutex poisoned")
    }

    fn get_mut<'a>(
        guard: &'a mut std::sync::MutexGuard<'_, Option<Bloom<str>>>,
    ) -> &'a mut Bloom<str> {
        guard
            .as_mut()
            .expect("bloom filter used before initialization")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized(codes: &[&str]) -> BloomFilterService {
        let service = BloomFilterService::new(10_000, 0.01);
        service.install(codes.iter().map(|c| c.to_string()));
        service
    }

    #[test]
    fn test_no_false_negatives() {
        let service = initialized(&["AAAA1111", "BBBB2222"]);
        assert!(service.might_contain("AAAA1111"));
        assert!(service.might_contain("BBBB2222"));

        service.add("CCCC3333");
        assert!(service.might_contain("CCCC3333"));
    }

    #[test]
    fn test_definitely_absent() {
        let service = initialized(&["AAAA1111"]);
        assert!(!service.might_contain("ZZZZ9999"));
    }

    #[test]
    fn test_check_and_add_is_single_shot() {
        let service = initialized(&[]);
        assert!(service.check_and_add("DDDD4444"));
        // 第二次同一个码必然被判定为可能存在
        assert!(!service.check_and_add("DDDD4444"));
        assert!(service.might_contain("DDDD4444"));
    }

    #[test]
    #[should_panic(expected = "bloom filter used before initialization")]
    fn test_uninitialized_use_panics() {
        let service = BloomFilterService::new(10_000, 0.01);
        service.might_contain("AAAA1111");
    }
}
