//! 订阅状态（仅客户端标记）
//!
//! 支付成功后在本地记录 premium 标记与订单信息。
//! 该标记没有服务端校验，只用于界面展示。

use litreview_shared::date::Timestamp;
use litreview_shared::{
    PaymentResponse, PlanId, STORAGE_PLAN_ACTIVATED_AT_KEY, STORAGE_PLAN_AMOUNT_KEY,
    STORAGE_PLAN_KEY, STORAGE_PREMIUM_KEY, STORAGE_TXN_ID_KEY,
};

use crate::web::KeyValueStorage;

const ALL_KEYS: [&str; 5] = [
    STORAGE_PREMIUM_KEY,
    STORAGE_PLAN_KEY,
    STORAGE_PLAN_AMOUNT_KEY,
    STORAGE_TXN_ID_KEY,
    STORAGE_PLAN_ACTIVATED_AT_KEY,
];

/// 已激活的订阅信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumPlan {
    pub plan: String,
    pub amount: String,
    pub transaction_id: String,
    pub activated_at: Option<Timestamp>,
}

pub struct PremiumStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> PremiumStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn is_premium(&self) -> bool {
        self.storage.get(STORAGE_PREMIUM_KEY).as_deref() == Some("true")
    }

    pub fn plan(&self) -> Option<PremiumPlan> {
        if !self.is_premium() {
            return None;
        }
        Some(PremiumPlan {
            plan: self.storage.get(STORAGE_PLAN_KEY).unwrap_or_default(),
            amount: self.storage.get(STORAGE_PLAN_AMOUNT_KEY).unwrap_or_default(),
            transaction_id: self.storage.get(STORAGE_TXN_ID_KEY).unwrap_or_default(),
            activated_at: self
                .storage
                .get(STORAGE_PLAN_ACTIVATED_AT_KEY)
                .and_then(|raw| Timestamp::parse(&raw)),
        })
    }

    /// 记录一次成功的支付；返回是否全部写入成功
    pub fn activate(&self, result: &PaymentResponse, chosen: PlanId, now: Timestamp) -> bool {
        let plan = result
            .plan
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| chosen.as_str().to_string());

        let writes = [
            (STORAGE_PREMIUM_KEY, "true".to_string()),
            (STORAGE_PLAN_KEY, plan),
            (
                STORAGE_PLAN_AMOUNT_KEY,
                result.amount.clone().unwrap_or_default(),
            ),
            (
                STORAGE_TXN_ID_KEY,
                result.transaction_id.clone().unwrap_or_default(),
            ),
            (STORAGE_PLAN_ACTIVATED_AT_KEY, now.to_rfc3339()),
        ];

        writes
            .iter()
            .fold(true, |ok, (key, value)| self.storage.set(key, value) && ok)
    }

    pub fn clear(&self) {
        for key in ALL_KEYS {
            self.storage.delete(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::MemoryStorage;

    fn paid() -> PaymentResponse {
        PaymentResponse {
            success: true,
            transaction_id: Some("TXN_1A2B3C4D".into()),
            plan: Some("enterprise".into()),
            amount: Some("39".into()),
            message: None,
        }
    }

    #[test]
    fn test_activate_and_read_back() {
        let storage = MemoryStorage::new();
        let store = PremiumStore::new(storage.clone());
        assert!(!store.is_premium());
        assert_eq!(store.plan(), None);

        let now = Timestamp::from_millis(1_714_566_600_000).unwrap();
        assert!(store.activate(&paid(), PlanId::Pro, now));

        assert!(store.is_premium());
        assert_eq!(storage.raw("nzeru_is_premium").as_deref(), Some("true"));
        let plan = store.plan().unwrap();
        assert_eq!(plan.plan, "enterprise");
        assert_eq!(plan.amount, "39");
        assert_eq!(plan.transaction_id, "TXN_1A2B3C4D");
        assert_eq!(plan.activated_at, Some(now));
    }

    #[test]
    fn test_plan_falls_back_to_chosen_plan() {
        let store = PremiumStore::new(MemoryStorage::new());
        let result = PaymentResponse {
            success: true,
            ..Default::default()
        };
        store.activate(&result, PlanId::Pro, Timestamp::from_millis(0).unwrap());
        let plan = store.plan().unwrap();
        assert_eq!(plan.plan, "pro");
        assert_eq!(plan.amount, "");
    }

    #[test]
    fn test_clear_removes_every_key() {
        let storage = MemoryStorage::new();
        let store = PremiumStore::new(storage.clone());
        store.activate(&paid(), PlanId::Pro, Timestamp::from_millis(0).unwrap());
        store.clear();
        assert!(!store.is_premium());
        for key in ALL_KEYS {
            assert_eq!(storage.raw(key), None);
        }
    }

    #[test]
    fn test_activate_reports_failed_writes() {
        let storage = MemoryStorage::new();
        storage.fail_writes(true);
        let store = PremiumStore::new(storage);
        assert!(!store.activate(&paid(), PlanId::Pro, Timestamp::from_millis(0).unwrap()));
        assert!(!store.is_premium());
    }
}
