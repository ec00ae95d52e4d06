use std::sync::Arc;

use chrono::Utc;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    multipart::Form,
    Client, Method, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    api::{
        error::{ApiError, Failure},
        types::RequestOptions,
    },
    config::ClientConfig,
    notify::{LogNotifier, Notification, Notifier},
    session::{Anonymous, CredentialStore},
};

/// Query parameter carrying the send time of every `GET`, so intermediate
/// caches never answer from a stale copy.
pub const CACHE_BUST_PARAM: &str = "_t";

enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

pub struct ApiClient {
    http: Client,
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
}

pub struct ApiClientBuilder {
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClientBuilder {
    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn build(self) -> Result<ApiClient, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .timeout(self.config.timeout)
            .default_headers(headers)
            .build()?;
        Ok(ApiClient {
            http,
            config: self.config,
            credentials: self.credentials,
            notifier: self.notifier,
        })
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            credentials: Arc::new(Anonymous),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with(path, RequestOptions::default()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, Ok(Payload::Empty), options).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_with(path, body, RequestOptions::default()).await
    }

    pub async fn post_with<T, B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, json_payload(body), options).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put_with(path, body, RequestOptions::default()).await
    }

    pub async fn put_with<T, B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, json_payload(body), options).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.patch_with(path, body, RequestOptions::default()).await
    }

    pub async fn patch_with<T, B>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, path, json_payload(body), options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.delete_with(path, RequestOptions::default()).await
    }

    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, Ok(Payload::Empty), options).await
    }

    /// Multipart `POST`.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        self.upload_with(Method::POST, path, form, RequestOptions::default())
            .await
    }

    /// Multipart request with an explicit method. A caller-supplied
    /// `Content-Type` is discarded so the multipart boundary header always
    /// goes out.
    pub async fn upload_with<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Form,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(method, path, Ok(Payload::Multipart(form)), options)
            .await
    }

    /// Absolute URL for a media path. Already-absolute URLs are returned as is.
    pub fn media_url(&self, path: Option<&str>) -> String {
        match path {
            None | Some("") => String::new(),
            Some(path) if path.starts_with("http") => path.to_string(),
            Some(path) => join_url(&self.config.media_base_url, path),
        }
    }

    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.config.api_base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Result<Payload, ApiError>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let result = match payload {
            Ok(payload) => self.execute(method.clone(), path, payload, options).await,
            Err(error) => Err(error),
        };
        result.map_err(|error| self.report(&method, path, error))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(&method, path, &options)?;
        log::debug!("{} {}", method, url);

        let mut headers = options.headers;
        let mut request = self.http.request(method, url);
        if let Some(token) = self.credentials.token() {
            headers.remove(AUTHORIZATION);
            request = request.bearer_auth(token);
        }
        let request = match payload {
            Payload::Empty => request.headers(headers),
            Payload::Json(body) => request.headers(headers).json(&body),
            Payload::Multipart(form) => {
                headers.remove(CONTENT_TYPE);
                request.headers(headers).multipart(form)
            }
        };

        let response = request.send().await.map_err(|err| transport_error(&err))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|_| ApiError::network())?;

        if !status.is_success() {
            return Err(ApiError::classify(Failure::Response {
                status: status.as_u16(),
                body: &body[..],
            }));
        }
        decode_body(status.as_u16(), &body)
    }

    fn endpoint(&self, method: &Method, path: &str, options: &RequestOptions) -> Result<Url, ApiError> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            join_url(&self.config.api_base_url, path)
        };
        let mut url = Url::parse(&raw)
            .map_err(|err| ApiError::classify(Failure::NotSent(Some(&format!("{}: {}", err, raw)))))?;

        let mut extra: Vec<(String, String)> = options
            .query
            .pairs()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        if *method == Method::GET {
            extra.push((
                CACHE_BUST_PARAM.to_string(),
                Utc::now().timestamp_millis().to_string(),
            ));
        }
        if !extra.is_empty() {
            url.query_pairs_mut().extend_pairs(extra);
        }
        Ok(url)
    }

    fn report(&self, method: &Method, path: &str, error: ApiError) -> ApiError {
        log::warn!(
            "{} {} failed with status {}: {}",
            method,
            path,
            error.status,
            error.message
        );
        if error.should_notify() {
            self.notifier.notify(Notification::error(error.message.clone()));
        }
        error
    }
}

fn json_payload<B: Serialize + ?Sized>(body: &B) -> Result<Payload, ApiError> {
    serde_json::to_value(body)
        .map(Payload::Json)
        .map_err(|err| ApiError::not_sent(err.to_string()))
}

fn transport_error(err: &reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::not_sent(err.to_string())
    } else {
        ApiError::network()
    }
}

/// Empty success bodies (204, bare 200) decode as JSON `null`.
fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    let decoded = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    decoded.map_err(|err| ApiError::decode(status, &err))
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
