//! HTTP client for the background removal API

use crate::classifier;
use crate::config::{ClientConfig, ProcessingOptions, API_KEY_HEADER};
use crate::error::{ApiError, BgRemovalError, Result};
use crate::services::format;
use crate::services::InputNormalizer;
use crate::tracing_config::spans;
use crate::types::{
    AccountInfo, ImageInput, NormalizedPayload, ProcessingMetadata, ProcessingResult,
};
use bytes::Bytes;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, RequestBuilder, StatusCode};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

const REMOVE_PATH: &str = "remove";
const ACCOUNT_PATH: &str = "me";

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image_file";

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const PROCESSING_TIME_HEADER: &str = "x-processing-time-ms";
pub const IMAGE_WIDTH_HEADER: &str = "x-image-width";
pub const IMAGE_HEIGHT_HEADER: &str = "x-image-height";

/// Status, headers and full body of one exchange
struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

/// Client for the background removal API.
///
/// Cheap to clone; clones share the connection pool and the read-only
/// configuration, so one client can serve concurrent calls.
///
/// # Examples
///
/// ```rust,no_run
/// use bgremove_api::{BgRemoveClient, ImageInput, OutputFormat, ProcessingOptions};
///
/// # async fn example() -> bgremove_api::Result<()> {
/// let client = BgRemoveClient::new("sk_live_xxx")?;
/// let options = ProcessingOptions::builder()
///     .format(OutputFormat::Webp)
///     .crop(true)
///     .build();
///
/// let result = client
///     .remove_background(ImageInput::from_path("portrait.jpg"), &options)
///     .await?;
/// result.save("portrait-nobg.webp").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BgRemoveClient {
    http: reqwest::Client,
    config: ClientConfig,
    normalizer: InputNormalizer,
}

impl BgRemoveClient {
    /// Client with default endpoint and timeout
    ///
    /// # Errors
    /// - Empty API key
    /// - Failed to create HTTP client
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key)?)
    }

    /// Client for an explicit configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Client reusing an existing `reqwest` client (and its pool/TLS settings)
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        let normalizer = InputNormalizer::new(config.filesystem());
        Self {
            http,
            config,
            normalizer,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Remove the background of one image.
    ///
    /// Sends exactly one multipart `POST {base_url}/remove`. No retries.
    ///
    /// # Errors
    /// - Input normalization errors (unsupported input, missing filesystem, I/O)
    /// - [`BgRemovalError::Api`] for non-success responses and timeouts
    /// - [`BgRemovalError::Transport`] for connection level failures
    pub async fn remove_background(
        &self,
        input: ImageInput,
        options: &ProcessingOptions,
    ) -> Result<ProcessingResult> {
        let url = self.config.endpoint(REMOVE_PATH);
        let span = spans::api_request("remove_background", &url);

        async move {
            let started = Instant::now();
            let payload = self.normalizer.normalize(input).await?;
            let form = Self::build_form(payload, options)?;

            let request = self
                .http
                .post(&url)
                .header(API_KEY_HEADER, self.config.api_key())
                .multipart(form);

            let raw = self.execute(request).await?;
            Self::check_status(&raw)?;

            let metadata = metadata_from_headers(&raw.headers);
            tracing::Span::current().record("request_id", metadata.request_id.as_str());
            info!(
                status = raw.status.as_u16(),
                request_id = %metadata.request_id,
                processing_time_ms = metadata.processing_time_ms,
                width = metadata.width,
                height = metadata.height,
                elapsed_ms = (started.elapsed().as_millis() as u64),
                "Background removed"
            );

            Ok::<_, BgRemovalError>(ProcessingResult::new(raw.body, metadata))
        }
        .instrument(span)
        .await
    }

    /// Remove the background and write the output image to `output`
    pub async fn remove_background_to_file<P: AsRef<Path>>(
        &self,
        input: ImageInput,
        options: &ProcessingOptions,
        output: P,
    ) -> Result<ProcessingResult> {
        let result = self.remove_background(input, options).await?;
        result.save(output).await?;
        Ok(result)
    }

    /// Fetch account details for the configured API key (`GET {base_url}/me`)
    pub async fn me(&self) -> Result<AccountInfo> {
        let url = self.config.endpoint(ACCOUNT_PATH);
        let span = spans::api_request("account_info", &url);

        async move {
            let request = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, self.config.api_key())
                .header(ACCEPT, "application/json");

            let raw = self.execute(request).await?;
            Self::check_status(&raw)?;

            let account: AccountInfo = serde_json::from_slice(&raw.body)?;
            info!(
                organization_id = %account.organization_id,
                plan = %account.plan,
                "Fetched account info"
            );
            Ok::<_, BgRemovalError>(account)
        }
        .instrument(span)
        .await
    }

    fn build_form(payload: NormalizedPayload, options: &ProcessingOptions) -> Result<Form> {
        let length = payload.data.len() as u64;
        let part = Part::stream_with_length(Body::from(payload.data), length)
            .file_name(payload.filename)
            .mime_str(&payload.content_type)
            .map_err(|e| {
                BgRemovalError::unsupported_input(format!(
                    "Content type '{}' rejected: {}",
                    payload.content_type, e
                ))
            })?;

        let fields = options.form_fields();
        let field_names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        debug!(
            bytes = length,
            content_type = %payload.content_type,
            fields = ?field_names,
            "Built multipart request"
        );

        let form = fields
            .into_iter()
            .fold(Form::new().part(IMAGE_FIELD, part), |form, (name, value)| {
                form.text(name, value)
            });
        Ok(form)
    }

    /// Send the request and read the full body, bounded by the configured timeout.
    ///
    /// Dropping the exchange future on expiry aborts the in-flight request.
    async fn execute(&self, request: RequestBuilder) -> Result<RawResponse> {
        let timeout = self.config.timeout();
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(RawResponse {
                status,
                headers,
                body,
            })
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) if e.is_timeout() => {
                warn!(error = %e, "Transport reported a timeout");
                Err(ApiError::timeout(timeout).into())
            },
            Ok(Err(e)) => Err(BgRemovalError::Transport(e)),
            Err(_) => {
                warn!(timeout_ms = (timeout.as_millis() as u64), "Request timed out");
                Err(ApiError::timeout(timeout).into())
            },
        }
    }

    fn check_status(raw: &RawResponse) -> Result<()> {
        if raw.status.is_success() {
            return Ok(());
        }

        let status_text = raw.status.canonical_reason().unwrap_or("");
        let error = classifier::classify_body(&raw.body, raw.status.as_u16(), status_text);
        let request_id = error
            .request_id
            .as_deref()
            .or_else(|| header_str(&raw.headers, REQUEST_ID_HEADER));
        if let Some(request_id) = request_id {
            tracing::Span::current().record("request_id", request_id);
        }
        warn!(
            status = raw.status.as_u16(),
            code = %error.code,
            kind = %error.kind,
            request_id = request_id.unwrap_or(""),
            "API request failed"
        );
        Err(error.into())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn header_number<T: FromStr + Default>(headers: &HeaderMap, name: &str) -> T {
    header_str(headers, name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_default()
}

/// Result metadata from response headers, with defaults for missing values
pub(crate) fn metadata_from_headers(headers: &HeaderMap) -> ProcessingMetadata {
    ProcessingMetadata {
        request_id: header_str(headers, REQUEST_ID_HEADER)
            .unwrap_or_default()
            .to_string(),
        processing_time_ms: header_number(headers, PROCESSING_TIME_HEADER),
        width: header_number(headers, IMAGE_WIDTH_HEADER),
        height: header_number(headers, IMAGE_HEIGHT_HEADER),
        content_type: header_str(headers, CONTENT_TYPE.as_str())
            .unwrap_or(format::PNG)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_metadata_defaults_when_headers_missing() {
        let metadata = metadata_from_headers(&HeaderMap::new());
        assert_eq!(metadata.request_id, "");
        assert_eq!(metadata.processing_time_ms, 0);
        assert_eq!(metadata.width, 0);
        assert_eq!(metadata.height, 0);
        assert_eq!(metadata.content_type, "image/png");
    }

    #[test]
    fn test_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req_42"));
        headers.insert("x-processing-time-ms", HeaderValue::from_static("1234"));
        headers.insert("x-image-width", HeaderValue::from_static("800"));
        headers.insert("x-image-height", HeaderValue::from_static("600"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/webp"));

        let metadata = metadata_from_headers(&headers);
        assert_eq!(metadata.request_id, "req_42");
        assert_eq!(metadata.processing_time_ms, 1234);
        assert_eq!(metadata.width, 800);
        assert_eq!(metadata.height, 600);
        assert_eq!(metadata.content_type, "image/webp");
    }

    #[test]
    fn test_unparseable_numeric_headers_default_to_zero() {
        let mut headers = HeaderMap::new();
        headers.insert("x-image-width", HeaderValue::from_static("wide"));
        headers.insert("x-processing-time-ms", HeaderValue::from_static("-5"));

        let metadata = metadata_from_headers(&headers);
        assert_eq!(metadata.width, 0);
        assert_eq!(metadata.processing_time_ms, 0);
    }

    #[cfg(feature = "cli")]
    mod span_fields {
        use super::*;
        use std::fmt;
        use std::sync::{Arc, Mutex};
        use tracing::field::{Field, Visit};
        use tracing::span::{Id, Record};
        use tracing::Subscriber;
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        /// Collects every value recorded on a span after creation
        #[derive(Clone, Default)]
        struct RecordedFields(Arc<Mutex<Vec<(String, String)>>>);

        impl RecordedFields {
            fn get(&self, name: &str) -> Option<String> {
                self.0
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|(field, _)| field == name)
                    .map(|(_, value)| value.clone())
            }
        }

        struct Collector<'a>(&'a Mutex<Vec<(String, String)>>);

        impl Visit for Collector<'_> {
            fn record_str(&mut self, field: &Field, value: &str) {
                self.0
                    .lock()
                    .unwrap()
                    .push((field.name().to_string(), value.to_string()));
            }

            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                self.0
                    .lock()
                    .unwrap()
                    .push((field.name().to_string(), format!("{:?}", value)));
            }
        }

        impl<S: Subscriber> Layer<S> for RecordedFields {
            fn on_record(&self, _id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
                values.record(&mut Collector(&self.0));
            }
        }

        fn failing_response(body: &'static [u8], header_id: Option<&'static str>) -> RawResponse {
            let mut headers = HeaderMap::new();
            if let Some(id) = header_id {
                headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(id));
            }
            RawResponse {
                status: StatusCode::PAYMENT_REQUIRED,
                headers,
                body: Bytes::from_static(body),
            }
        }

        fn check_in_span(raw: &RawResponse) -> (Result<()>, RecordedFields) {
            let fields = RecordedFields::default();
            let subscriber = tracing_subscriber::registry().with(fields.clone());
            let outcome = tracing::subscriber::with_default(subscriber, || {
                let span = spans::api_request("remove_background", "http://localhost/remove");
                let _entered = span.enter();
                BgRemoveClient::check_status(raw)
            });
            (outcome, fields)
        }

        #[test]
        fn test_failure_records_payload_request_id() {
            let raw = failing_response(
                br#"{"code":"payment_required","message":"No credits","request_id":"r1"}"#,
                Some("hdr_1"),
            );
            let (outcome, fields) = check_in_span(&raw);

            assert_eq!(outcome.unwrap_err().request_id(), Some("r1"));
            assert_eq!(fields.get("request_id").as_deref(), Some("r1"));
        }

        #[test]
        fn test_failure_without_payload_id_records_header() {
            let raw = failing_response(b"not json", Some("hdr_2"));
            let (outcome, fields) = check_in_span(&raw);

            assert_eq!(outcome.unwrap_err().request_id(), None);
            assert_eq!(fields.get("request_id").as_deref(), Some("hdr_2"));
        }
    }

    #[test]
    fn test_client_construction_validates_key() {
        let err = BgRemoveClient::new("").unwrap_err();
        assert!(matches!(err, BgRemovalError::InvalidConfig(_)));
    }

    #[test]
    fn test_client_uses_configured_endpoint() {
        let config = ClientConfig::builder("k")
            .base_url("http://127.0.0.1:9/v2/")
            .build()
            .unwrap();
        let client = BgRemoveClient::with_config(config).unwrap();
        assert_eq!(client.config().endpoint(REMOVE_PATH), "http://127.0.0.1:9/v2/remove");
        assert_eq!(client.config().endpoint(ACCOUNT_PATH), "http://127.0.0.1:9/v2/me");
    }
}
