use card_tokenizer::utils::{logger, validation::Validate};
use card_tokenizer::{CardStore, RedisCardStore, ServiceConfig, ServiceResponse, TokenService};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// API Gateway proxy 事件中用得到的欄位
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpContext {
    #[serde(default)]
    pub method: Option<String>,
}

impl ProxyRequest {
    /// REST API 用 `httpMethod`，HTTP API 用 `requestContext.http.method`
    fn method(&self) -> Option<&str> {
        self.http_method.as_deref().or_else(|| {
            self.request_context
                .as_ref()
                .and_then(|ctx| ctx.http.as_ref())
                .and_then(|http| http.method.as_deref())
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl From<ServiceResponse> for ProxyResponse {
    fn from(response: ServiceResponse) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code: response.status_code,
            headers,
            body: response.body,
        }
    }
}

async fn function_handler<S: CardStore>(
    service: &TokenService<S>,
    event: LambdaEvent<ProxyRequest>,
) -> Result<ProxyResponse, Error> {
    let request = event.payload;
    let method = request.method().unwrap_or("GET").to_ascii_uppercase();
    tracing::info!(request_id = %event.context.request_id, %method, "Handling card token request");

    let response = match method.as_str() {
        "POST" => service.issue(request.body.as_deref()).await,
        "GET" => {
            let headers = request.headers.unwrap_or_default();
            service.redeem(&headers).await
        }
        other => {
            tracing::warn!("Unsupported method: {}", other);
            ServiceResponse {
                status_code: 405,
                body: serde_json::json!({ "error": "Method Not Allowed" }).to_string(),
            }
        }
    };

    Ok(response.into())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = ServiceConfig::from_env()?;
    config.validate()?;

    let store = RedisCardStore::connect(&config.redis_url()).await?;
    let service = config.build_service(store);
    let service = &service;

    run(service_fn(move |event: LambdaEvent<ProxyRequest>| async move {
        function_handler(service, event).await
    }))
    .await
}
