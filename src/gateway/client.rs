use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::gateway::provider::{Dialect, ModelRoute};
use crate::gateway::{CompletionGateway, CompletionRequest, anthropic, openai};

/// Upper bound on a single request.  Not user-tunable.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Completion gateway that talks to providers over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: ReqwestClient,
    api_base: Option<Url>,
    timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway that uses each provider's default base URL.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a gateway with custom settings.
    ///
    /// `api_base` replaces the routed provider's base URL for every request,
    /// which is how local or self-hosted OpenAI-compatible servers are reached.
    pub fn with_options(api_base: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let api_base = api_base.map(parse_base_url).transpose()?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            api_base,
            timeout,
        })
    }

    /// Returns the base URL override, if any.
    pub fn api_base(&self) -> Option<&Url> {
        self.api_base.as_ref()
    }

    /// Resolves the endpoint a route is sent to.
    pub fn endpoint(&self, route: &ModelRoute) -> Result<Url> {
        let base = match &self.api_base {
            Some(base) => base.clone(),
            None => parse_base_url(route.provider.default_base_url())?,
        };
        let path = match route.provider.dialect() {
            Dialect::OpenAiChat => openai::CHAT_COMPLETIONS_PATH,
            Dialect::AnthropicMessages => anthropic::MESSAGES_PATH,
        };
        Ok(base.join(path)?)
    }

    fn headers(dialect: Dialect, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        match dialect {
            Dialect::OpenAiChat => {
                headers.insert(
                    header::AUTHORIZATION,
                    header_value(&format!("Bearer {api_key}"))?,
                );
            }
            Dialect::AnthropicMessages => {
                headers.insert("x-api-key", header_value(api_key)?);
                headers.insert(
                    "anthropic-version",
                    HeaderValue::from_static(anthropic::ANTHROPIC_API_VERSION),
                );
            }
        }
        Ok(headers)
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }
}

#[async_trait::async_trait]
impl CompletionGateway for HttpGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let route = ModelRoute::parse(&request.model);
        let dialect = route.provider.dialect();
        let url = self.endpoint(&route)?;
        let headers = Self::headers(dialect, &request.api_key)?;

        tracing::debug!(
            provider = %route.provider,
            model = %route.model,
            %url,
            messages = request.messages.len(),
            "sending completion request"
        );

        let builder = self.client.post(url).headers(headers);
        let builder = match dialect {
            Dialect::OpenAiChat => {
                builder.json(&openai::ChatCompletionBody::new(&route.model, request))
            }
            Dialect::AnthropicMessages => {
                builder.json(&anthropic::MessagesBody::new(&route.model, request))
            }
        };
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(process_error_response(response, &route).await);
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        match dialect {
            Dialect::OpenAiChat => openai::parse_reply(&body),
            Dialect::AnthropicMessages => anthropic::parse_reply(&body),
        }
    }
}

fn parse_base_url(base: &str) -> Result<Url> {
    // Without a trailing slash `join` would replace the last path segment.
    if base.ends_with('/') {
        Ok(Url::parse(base)?)
    } else {
        Ok(Url::parse(&format!("{base}/"))?)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        Error::validation(
            "API key contains characters that cannot be sent in a header",
            Some("api_key".to_string()),
        )
    })
}

/// Turn a non-success response into an error.
async fn process_error_response(response: Response, route: &ModelRoute) -> Error {
    let status_code = response.status().as_u16();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.parse::<u64>().ok());

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            return Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            );
        }
    };
    error_from_status(status_code, &body, retry_after, route)
}

/// Map a status code and provider error body to an [`Error`].
pub(crate) fn error_from_status(
    status_code: u16,
    body: &str,
    retry_after: Option<u64>,
    route: &ModelRoute,
) -> Error {
    let detail = ErrorDetail::parse(body);
    let message = detail.message.unwrap_or_else(|| {
        if body.trim().is_empty() {
            format!("{} returned HTTP {status_code}", route.provider)
        } else {
            body.trim().to_string()
        }
    });

    match status_code {
        400 => Error::bad_request(message, detail.param),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message, Some(route.to_string())),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, detail.error_type, message),
    }
}

/// The useful parts of a provider error body.
///
/// Providers disagree on the shape: OpenAI and Anthropic nest an object under
/// `error`, Ollama puts a bare string there, and some proxies use a top-level
/// `message` or `detail`.
#[derive(Debug, Default, PartialEq)]
struct ErrorDetail {
    message: Option<String>,
    error_type: Option<String>,
    param: Option<String>,
}

impl ErrorDetail {
    fn parse(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return Self::default();
        };
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
        match value.get("error") {
            Some(Value::Object(error)) => Self {
                message: text(error.get("message")),
                error_type: text(error.get("type")).or_else(|| text(error.get("code"))),
                param: text(error.get("param")),
            },
            Some(Value::String(message)) => Self {
                message: Some(message.clone()),
                ..Self::default()
            },
            _ => Self {
                message: text(value.get("message")).or_else(|| text(value.get("detail"))),
                ..Self::default()
            },
        }
    }
}
