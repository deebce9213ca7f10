//! 支付流程
//!
//! 卡片输入格式化、提交前校验、单次支付请求，成功后写入本地订阅标记。

use leptos::logging::error;
use litreview_shared::date::Timestamp;
use litreview_shared::validation::{digits_only, is_blank, is_valid_email};
use litreview_shared::{BillingCycle, PaymentRequest, PaymentResponse, PlanId};

use crate::api::{ApiError, ReviewApi};
use crate::entitlement::PremiumStore;
use crate::web::KeyValueStorage;

const MIN_CARD_DIGITS: usize = 13;
const MAX_CVV_DIGITS: usize = 4;

// =========================================================
// 输入格式化
// =========================================================

/// `4242424242424242` → `4242 4242 4242 4242`
pub fn format_card_number(raw: &str) -> String {
    let digits: Vec<char> = digits_only(raw).chars().collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `0829` → `08/29`
pub fn format_expiry(raw: &str) -> String {
    let digits = digits_only(raw);
    if digits.len() >= 2 {
        let tail: String = digits.chars().skip(2).take(2).collect();
        format!("{}/{}", &digits[..2], tail)
    } else {
        digits
    }
}

/// 仅数字，最多 4 位
pub fn format_cvv(raw: &str) -> String {
    digits_only(raw).chars().take(MAX_CVV_DIGITS).collect()
}

// =========================================================
// 套餐选择
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSelection {
    pub plan: PlanId,
    pub billing: BillingCycle,
}

impl PlanSelection {
    pub fn price(&self) -> u32 {
        self.plan.monthly_price(self.billing)
    }

    /// `$19`
    pub fn price_label(&self) -> String {
        format!("${}", self.price())
    }
}

// =========================================================
// 表单与校验
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Please fill in all required fields correctly.")]
    Invalid,
    #[error("{0}")]
    Declined(String),
    #[error("Network error. Please check your connection and try again.")]
    Network,
}

impl From<ApiError> for PaymentError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Network(_) => PaymentError::Network,
            other => PaymentError::Declined(
                other
                    .detail()
                    .unwrap_or_else(|| "Payment processing failed".to_string()),
            ),
        }
    }
}

pub fn validate_payment(form: &PaymentForm) -> Result<(), PaymentError> {
    let required = [
        &form.first_name,
        &form.last_name,
        &form.email,
        &form.phone,
        &form.expiry_date,
        &form.cvv,
    ];
    if required.iter().any(|v| is_blank(v)) {
        return Err(PaymentError::Invalid);
    }
    if digits_only(&form.card_number).len() < MIN_CARD_DIGITS {
        return Err(PaymentError::Invalid);
    }
    if !is_valid_email(&form.email) {
        return Err(PaymentError::Invalid);
    }
    Ok(())
}

pub fn build_request(form: &PaymentForm, selection: PlanSelection) -> PaymentRequest {
    PaymentRequest {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        card_number: form.card_number.split_whitespace().collect(),
        expiry_date: form.expiry_date.trim().to_string(),
        cvv: form.cvv.trim().to_string(),
        plan: selection.plan,
        price: selection.price().to_string(),
        billing: selection.billing,
    }
}

// =========================================================
// 提交
// =========================================================

/// 成功弹窗上展示的回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub plan: String,
    pub amount: String,
}

impl PaymentReceipt {
    fn new(resp: &PaymentResponse, selection: PlanSelection) -> Self {
        Self {
            transaction_id: resp.transaction_id.clone().unwrap_or_default(),
            plan: resp
                .plan
                .clone()
                .unwrap_or_else(|| selection.plan.as_str().to_string()),
            amount: format!(
                "${}",
                resp.amount
                    .clone()
                    .unwrap_or_else(|| selection.price().to_string())
            ),
        }
    }
}

/// 校验 → 单次请求 → 记录订阅
pub async fn submit_payment<A, S>(
    api: &A,
    premium: &PremiumStore<S>,
    form: &PaymentForm,
    selection: PlanSelection,
    now: Timestamp,
) -> Result<PaymentReceipt, PaymentError>
where
    A: ReviewApi + ?Sized,
    S: KeyValueStorage,
{
    validate_payment(form)?;

    let resp = api
        .process_payment(&build_request(form, selection))
        .await
        .inspect_err(|e| error!("Payment processing error: {}", e))?;

    if !resp.success {
        return Err(PaymentError::Declined(
            resp.message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Payment failed. Please try again.".to_string()),
        ));
    }

    premium.activate(&resp, selection.plan, now);
    Ok(PaymentReceipt::new(&resp, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::MockApi;
    use crate::web::MemoryStorage;

    fn form() -> PaymentForm {
        PaymentForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+254700000000".into(),
            card_number: "4242 4242 4242 4242".into(),
            expiry_date: "08/29".into(),
            cvv: "123".into(),
        }
    }

    fn yearly_pro() -> PlanSelection {
        PlanSelection {
            plan: PlanId::Pro,
            billing: BillingCycle::Yearly,
        }
    }

    fn now() -> Timestamp {
        Timestamp::from_millis(1_714_566_600_000).unwrap()
    }

    #[test]
    fn test_format_card_number() {
        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number("4242-42a42 42"), "4242 4242 42");
        assert_eq!(format_card_number(""), "");
    }

    #[test]
    fn test_format_expiry() {
        assert_eq!(format_expiry("0829"), "08/29");
        assert_eq!(format_expiry("08/29"), "08/29");
        assert_eq!(format_expiry("082"), "08/2");
        assert_eq!(format_expiry("08"), "08/");
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("082912"), "08/29");
    }

    #[test]
    fn test_format_cvv() {
        assert_eq!(format_cvv("12a345"), "1234");
        assert_eq!(format_cvv("99"), "99");
    }

    #[test]
    fn test_validation() {
        assert_eq!(validate_payment(&form()), Ok(()));

        let mut short_card = form();
        short_card.card_number = "4242 4242 4242".into();
        assert_eq!(validate_payment(&short_card), Err(PaymentError::Invalid));

        let mut bad_email = form();
        bad_email.email = "ada.example.com".into();
        assert_eq!(validate_payment(&bad_email), Err(PaymentError::Invalid));

        let mut missing = form();
        missing.phone = " ".into();
        assert_eq!(validate_payment(&missing), Err(PaymentError::Invalid));
    }

    #[test]
    fn test_request_shape() {
        let req = build_request(&form(), yearly_pro());
        assert_eq!(req.card_number, "4242424242424242");
        assert_eq!(req.price, "15");
        assert_eq!(req.billing, BillingCycle::Yearly);
        assert_eq!(yearly_pro().price_label(), "$15");
    }

    #[tokio::test]
    async fn test_success_persists_premium_flag() {
        let api = MockApi::new().with_payment(Ok(PaymentResponse {
            success: true,
            transaction_id: Some("TXN_ABCD1234".into()),
            plan: Some("pro".into()),
            amount: Some("15".into()),
            message: Some("Payment processed successfully (test mode)".into()),
        }));
        let storage = MemoryStorage::new();
        let premium = PremiumStore::new(storage.clone());

        let receipt = submit_payment(&api, &premium, &form(), yearly_pro(), now())
            .await
            .unwrap();

        assert_eq!(receipt.transaction_id, "TXN_ABCD1234");
        assert_eq!(receipt.amount, "$15");
        assert!(premium.is_premium());
        assert_eq!(premium.plan().unwrap().activated_at, Some(now()));
        assert_eq!(api.payment_requests.borrow()[0].plan, PlanId::Pro);
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let api = MockApi::new();
        let premium = PremiumStore::new(MemoryStorage::new());
        let mut bad = form();
        bad.cvv = String::new();

        let err = submit_payment(&api, &premium, &bad, yearly_pro(), now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all required fields correctly.");
        assert!(api.payment_requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_declined_shows_server_detail() {
        let api = MockApi::new().with_payment(Err(ApiError::Status {
            status: 400,
            body: r#"{"detail":"Payment failed: Card declined","code":"PAYMENT_DECLINED"}"#.into(),
        }));
        let premium = PremiumStore::new(MemoryStorage::new());

        let err = submit_payment(&api, &premium, &form(), yearly_pro(), now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Payment failed: Card declined");
        assert!(!premium.is_premium());
    }

    #[tokio::test]
    async fn test_non_json_failure_and_network_error() {
        let premium = PremiumStore::new(MemoryStorage::new());

        let api = MockApi::new().with_payment(Err(ApiError::Status {
            status: 502,
            body: "Bad Gateway".into(),
        }));
        let err = submit_payment(&api, &premium, &form(), yearly_pro(), now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Payment processing failed");

        let api = MockApi::new().with_payment(Err(ApiError::Network("offline".into())));
        let err = submit_payment(&api, &premium, &form(), yearly_pro(), now())
            .await
            .unwrap_err();
        assert_eq!(err, PaymentError::Network);
    }

    #[tokio::test]
    async fn test_unsuccessful_body_is_an_error() {
        let api = MockApi::new().with_payment(Ok(PaymentResponse {
            success: false,
            ..Default::default()
        }));
        let premium = PremiumStore::new(MemoryStorage::new());
        let err = submit_payment(&api, &premium, &form(), yearly_pro(), now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Payment failed. Please try again.");
        assert!(!premium.is_premium());
    }
}
