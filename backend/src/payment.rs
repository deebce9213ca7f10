use litreview_shared::{PaymentRequest, PaymentResponse};
use serde_json::json;

use crate::error::{ServiceError, ServiceResult};
use crate::utils::request::{HttpClient, HttpRequest};

pub const INTASEND_CHARGES_URL: &str = "https://api.intasend.com/v1/charges/";
const CHARGE_DESCRIPTION: &str = "LitReview AI Literature Review";

/// `MM/YY` → (month, 四位年份)
pub fn parse_expiry(raw: &str) -> Option<(u32, u32)> {
    let (month, year) = raw.trim().split_once('/')?;
    if month.len() != 2 || year.len() != 2 {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: u32 = year.parse().ok()?;
    (1..=12).contains(&month).then_some((month, 2000 + year))
}

pub fn test_transaction_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("TXN_{}", hex[..8].to_uppercase())
}

struct ValidCharge {
    amount: f64,
    expiry_month: u32,
    expiry_year: u32,
}

fn validate(req: &PaymentRequest) -> ServiceResult<ValidCharge> {
    let required = [
        ("firstName", &req.first_name),
        ("lastName", &req.last_name),
        ("email", &req.email),
        ("phone", &req.phone),
        ("cardNumber", &req.card_number),
        ("expiryDate", &req.expiry_date),
        ("cvv", &req.cvv),
        ("price", &req.price),
    ];
    if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(
            ServiceError::invalid_input(format!("Missing required field: {}", name))
                .in_op("payment.validate"),
        );
    }

    let (expiry_month, expiry_year) = parse_expiry(&req.expiry_date).ok_or_else(|| {
        ServiceError::invalid_input("Invalid expiry date, expected MM/YY").in_op("payment.validate")
    })?;
    let amount = req
        .price
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| {
            ServiceError::invalid_input(format!("Invalid price: {}", req.price))
                .in_op("payment.validate")
        })?;

    Ok(ValidCharge {
        amount,
        expiry_month,
        expiry_year,
    })
}

/// 支付代理；未配置网关 key 时运行在测试模式
pub struct PaymentService<'a, C: HttpClient> {
    client: &'a C,
    api_key: Option<String>,
}

impl<'a, C: HttpClient> PaymentService<'a, C> {
    pub fn new(client: &'a C, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    pub async fn process(&self, req: PaymentRequest) -> ServiceResult<PaymentResponse> {
        let charge = validate(&req)?;

        let Some(api_key) = self.api_key.as_deref() else {
            let transaction_id = test_transaction_id();
            log_info!(
                "[Payment] test mode plan={} txn={}",
                req.plan.as_str(),
                transaction_id
            );
            return Ok(PaymentResponse {
                success: true,
                transaction_id: Some(transaction_id),
                plan: Some(req.plan.as_str().to_string()),
                amount: Some(req.price),
                message: Some("Payment processed successfully (test mode)".to_string()),
            });
        };

        let body = json!({
            "amount": charge.amount,
            "currency": "USD",
            "payment_method": {
                "type": "card",
                "card": {
                    "number": litreview_shared::validation::digits_only(&req.card_number),
                    "expiry_month": charge.expiry_month,
                    "expiry_year": charge.expiry_year,
                    "cvv": req.cvv,
                }
            },
            "customer": {
                "first_name": req.first_name,
                "last_name": req.last_name,
                "email": req.email,
                "phone": req.phone,
            },
            "metadata": {
                "plan": req.plan.as_str(),
                "billing": req.billing.as_str(),
                "service": CHARGE_DESCRIPTION,
            }
        });

        let resp = self
            .client
            .send(
                HttpRequest::post(INTASEND_CHARGES_URL)
                    .with_bearer(api_key)
                    .with_body(body),
            )
            .await
            .map_err(|e| e.in_op("payment.charge"))?;

        if resp.status != 201 {
            let detail = serde_json::from_str::<serde_json::Value>(&resp.body)
                .ok()
                .and_then(|v| v.get("detail").map(value_text))
                .unwrap_or_else(|| "Unknown error".to_string());
            log_error!("[Payment] declined status={} detail={}", resp.status, detail);
            return Err(
                ServiceError::payment_declined(format!("Payment failed: {}", detail))
                    .in_op_with("payment.charge", resp.status.to_string()),
            );
        }

        let result: serde_json::Value = resp.json().map_err(|e| e.in_op("payment.decode"))?;
        Ok(PaymentResponse {
            success: true,
            transaction_id: result.get("id").map(value_text),
            plan: Some(req.plan.as_str().to_string()),
            amount: Some(req.price),
            message: Some("Payment processed successfully".to_string()),
        })
    }
}

fn value_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::request::MockHttpClient;
    use litreview_shared::{BillingCycle, PlanId};

    fn request() -> PaymentRequest {
        PaymentRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+254700000000".into(),
            card_number: "4242 4242 4242 4242".into(),
            expiry_date: "08/29".into(),
            cvv: "123".into(),
            plan: PlanId::Pro,
            price: "19".into(),
            billing: BillingCycle::Monthly,
        }
    }

    #[test]
    fn test_parse_expiry() {
        assert_eq!(parse_expiry("08/29"), Some((8, 2029)));
        assert_eq!(parse_expiry("13/29"), None);
        assert_eq!(parse_expiry("0829"), None);
        assert_eq!(parse_expiry("8/29"), None);
    }

    #[test]
    fn test_transaction_id_shape() {
        let id = test_transaction_id();
        assert_eq!(id.len(), 12);
        assert!(id.starts_with("TXN_"));
        assert!(
            id[4..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
    }

    #[tokio::test]
    async fn test_test_mode_without_key() {
        let client = MockHttpClient::new();
        let service = PaymentService::new(&client, None);

        let resp = service.process(request()).await.unwrap();
        assert!(resp.success);
        assert_eq!(resp.plan.as_deref(), Some("pro"));
        assert_eq!(resp.amount.as_deref(), Some("19"));
        assert_eq!(
            resp.message.as_deref(),
            Some("Payment processed successfully (test mode)")
        );
        assert!(resp.transaction_id.unwrap().starts_with("TXN_"));
        assert!(client.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_validation_runs_before_gateway() {
        let client = MockHttpClient::new();
        let service = PaymentService::new(&client, Some("key".into()));

        let mut req = request();
        req.last_name = " ".into();
        let err = service.process(req).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Missing required field: lastName");

        let mut req = request();
        req.price = "nineteen".into();
        assert_eq!(service.process(req).await.unwrap_err().status_code(), 400);

        assert!(client.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_live_charge_success() {
        let client = MockHttpClient::new();
        client.mock_response(
            INTASEND_CHARGES_URL,
            201,
            serde_json::json!({"id": "ch_9f2", "state": "COMPLETE"}),
        );
        let service = PaymentService::new(&client, Some("ISSecretKey".into()));

        let resp = service.process(request()).await.unwrap();
        assert_eq!(resp.transaction_id.as_deref(), Some("ch_9f2"));
        assert_eq!(resp.message.as_deref(), Some("Payment processed successfully"));

        let sent = client.requests.borrow();
        assert_eq!(
            sent[0].headers.get("Authorization").map(String::as_str),
            Some("Bearer ISSecretKey")
        );
        let body: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["amount"], 19.0);
        assert_eq!(body["payment_method"]["card"]["number"], "4242424242424242");
        assert_eq!(body["payment_method"]["card"]["expiry_month"], 8);
        assert_eq!(body["payment_method"]["card"]["expiry_year"], 2029);
        assert_eq!(body["metadata"]["billing"], "monthly");
    }

    #[tokio::test]
    async fn test_live_charge_declined() {
        let client = MockHttpClient::new();
        client.mock_response(
            INTASEND_CHARGES_URL,
            400,
            serde_json::json!({"detail": "Card declined"}),
        );
        let service = PaymentService::new(&client, Some("k".into()));

        let err = service.process(request()).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Payment failed: Card declined");
    }

    #[tokio::test]
    async fn test_declined_without_detail() {
        let client = MockHttpClient::new();
        client.mock_text(INTASEND_CHARGES_URL, 500, "<html>oops</html>");
        let service = PaymentService::new(&client, Some("k".into()));

        let err = service.process(request()).await.unwrap_err();
        assert_eq!(err.message(), "Payment failed: Unknown error");
    }

    #[tokio::test]
    async fn test_transport_failure_is_upstream_error() {
        let client = MockHttpClient::new();
        client.mock_failure(INTASEND_CHARGES_URL, "connection refused");
        let service = PaymentService::new(&client, Some("k".into()));

        let err = service.process(request()).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }
}
