use worker::*;

// =========================================================
// 宏定义 (日志)
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info { ($($t:tt)*) => (worker::console_log!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info { ($($t:tt)*) => (println!($($t)*)) }

#[cfg(target_arch = "wasm32")]
macro_rules! log_error { ($($t:tt)*) => (worker::console_error!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error { ($($t:tt)*) => (eprintln!($($t)*)) }

pub mod citation;
pub mod config;
pub mod error;
pub mod literature;
pub mod llm;
pub mod payment;
pub mod prompts;
pub mod review;

pub(crate) mod utils {
    pub mod request;
}

use config::{RuntimeConfig, WorkerEnv};
use error::ServiceError;
use litreview_shared::{
    GenerateReviewRequest, HealthResponse, PaymentRequest,
    protocol::{ApiRequest, HealthRequest},
};
use llm::GroqChat;
use payment::PaymentService;
use review::ReviewService;
use utils::request::WorkerHttpClient;

// =========================================================
// 响应辅助
// =========================================================

// 将 ServiceError 映射为 JSON 错误响应 `{detail, code}`
fn map_error_to_response(e: ServiceError) -> Result<Response> {
    let status = e.status_code();

    // 5xx 记录完整追踪栈
    if status >= 500 {
        log_error!("Internal Error [{}]: {}", e.error_code(), e);
    }

    Ok(Response::from_json(&e.to_body())?.with_status(status))
}

// 统一响应宏
macro_rules! respond {
    (json, $expr:expr) => {
        match $expr {
            Ok(v) => Response::from_json(&v),
            Err(e) => map_error_to_response(e),
        }
    };
}

// 辅助宏：解析失败时直接返回错误响应
macro_rules! unwrap_or_resp {
    ($expr:expr, $err_mapper:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return map_error_to_response($err_mapper(e.to_string())),
        }
    };
}

fn invalid_body(e: String) -> ServiceError {
    ServiceError::serialization(format!("Invalid JSON Body: {}", e))
}

// =========================================================
// API Controllers (适配层)
// =========================================================

async fn generate_review(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let cfg = RuntimeConfig::from_env(&WorkerEnv(&ctx.env));
    let body: GenerateReviewRequest = unwrap_or_resp!(req.json().await, invalid_body);

    let search_client = WorkerHttpClient::new(cfg.search_timeout);
    let model_client = WorkerHttpClient::new(cfg.model_timeout);
    let model = GroqChat::new(&model_client, cfg.groq_api_key.clone(), cfg.groq_model.clone());
    let service = ReviewService::new(&search_client, &model);

    respond!(json, service.generate(body).await)
}

async fn process_payment(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let cfg = RuntimeConfig::from_env(&WorkerEnv(&ctx.env));
    let body: PaymentRequest = unwrap_or_resp!(req.json().await, invalid_body);

    let client = WorkerHttpClient::new(cfg.search_timeout);
    let service = PaymentService::new(&client, cfg.intasend_api_key.clone());

    respond!(json, service.process(body).await)
}

async fn health(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    Response::from_json(&HealthResponse::healthy())
}

/// 已注册的 API 路径
const ROUTES: [&str; 3] = [
    GenerateReviewRequest::PATH,
    PaymentRequest::PATH,
    HealthRequest::PATH,
];

fn is_known_route(path: &str) -> bool {
    ROUTES.contains(&path)
}

fn route_not_found(path: &str) -> ServiceError {
    ServiceError::not_found(format!("No route for {}", path)).in_op("route")
}

// =========================================================
// Entry Points
// =========================================================

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let cfg = RuntimeConfig::from_env(&WorkerEnv(&env));
    let cors = Cors::new()
        .with_origins(cfg.allowed_origins.clone())
        .with_methods(vec![Method::Get, Method::Post, Method::Options])
        .with_allowed_headers(vec!["Content-Type", "Authorization"])
        .with_max_age(86400);

    let path = req.path();
    if !is_known_route(&path) {
        log_info!("[Router] unknown path {:?} {}", req.method(), path);
        return map_error_to_response(route_not_found(&path))?.with_cors(&cors);
    }

    let router = Router::new();
    router
        .post_async(GenerateReviewRequest::PATH, generate_review)
        .post_async(PaymentRequest::PATH, process_payment)
        .get_async(HealthRequest::PATH, health)
        .options_async(GenerateReviewRequest::PATH, |_, _| async { Response::empty() })
        .options_async(PaymentRequest::PATH, |_, _| async { Response::empty() })
        .options_async(HealthRequest::PATH, |_, _| async { Response::empty() })
        .run(req, env)
        .await?
        .with_cors(&cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes() {
        assert!(is_known_route("/api/generate-review"));
        assert!(is_known_route("/api/process-payment"));
        assert!(is_known_route("/api/health"));
        assert!(!is_known_route("/"));
        assert!(!is_known_route("/api/generate"));
    }

    #[test]
    fn test_unknown_route_maps_to_404_body() {
        let err = route_not_found("/api/nope");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "RESOURCE_NOT_FOUND");
        assert!(err.to_body().detail.contains("/api/nope"));
    }
}
