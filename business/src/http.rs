//! Platform-abstracted HTTP client with Send-safe futures.
//!
//! On wasm, `reqwest::Response` is not `Send` because it wraps JS types that
//! are pinned to the single JS thread. Command futures, however, must be
//! `Send` on every platform. The trick: on wasm the actual request runs on
//! the JS thread via `wasm_bindgen_futures::spawn_local`, and only Send-safe
//! data comes back through a `flume` channel. On native, reqwest is used
//! directly.
//!
//! The same channel trick backs [`sleep`] and per-request timeouts, which the
//! submission services need for their retry loops.

use std::collections::HashMap;
use std::time::Duration;

/// HTTP method for requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

/// A response reduced to Send-safe data.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Response headers, keys lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    /// True when the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Transport-level failure: connection problems, aborted requests, timeouts.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub message: String,
    timed_out: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self {
            message: format!("request exceeded {} s", limit.as_secs()),
            timed_out: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP error: {}", self.message)
    }
}

impl std::error::Error for HttpError {}

pub type HttpResult<T> = Result<T, HttpError>;

/// Builder for a single request.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: String,
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Serialize `value` as the JSON body and set the content type.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(value)?);
        self.headers
            .insert("content-type".to_owned(), "application/json".to_owned());
        Ok(self)
    }

    /// Abort the request when no response arrived within `limit`; surfaces as
    /// a timeout [`HttpError`].
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Send the request. The returned future is Send on all platforms.
    pub async fn send(self) -> HttpResult<Response> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.send_native().await
        }

        #[cfg(target_arch = "wasm32")]
        {
            self.send_wasm().await
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn send_native(self) -> HttpResult<Response> {
        let limit = self.timeout;
        let fut = Self::execute(self.method, self.url, self.headers, self.body);
        match limit {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| HttpError::timeout(limit))?,
            None => fut.await,
        }
    }

    #[cfg(target_arch = "wasm32")]
    async fn send_wasm(self) -> HttpResult<Response> {
        // flume channels are Send-safe, so the outer future is Send even
        // though the request itself runs on the JS thread.
        let (tx, rx) = flume::bounded::<HttpResult<Response>>(1);

        if let Some(limit) = self.timeout {
            let timer_tx = tx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                js_sleep(limit).await;
                let _ = timer_tx.send_async(Err(HttpError::timeout(limit))).await;
            });
        }

        let Self {
            method,
            url,
            headers,
            body,
            ..
        } = self;
        wasm_bindgen_futures::spawn_local(async move {
            let result = Self::execute(method, url, headers, body).await;
            // Ignore send errors: the timer may already have won the race.
            let _ = tx.send_async(result).await;
        });

        // First message wins: either the response or the timeout.
        rx.recv_async()
            .await
            .map_err(|_| HttpError::new("request cancelled"))?
    }

    async fn execute(
        method: Method,
        url: String,
        headers: HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> HttpResult<Response> {
        let client = reqwest::Client::new();

        let mut request = match method {
            Method::Get => client.get(&url),
            Method::Post => client.post(&url),
            Method::Put => client.put(&url),
        };

        for (name, value) in &headers {
            request = request.header(name, value);
        }

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                response_headers.insert(name.as_str().to_lowercase(), v.to_owned());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::new(e.to_string()))?
            .to_vec();

        Ok(Response {
            status,
            headers: response_headers,
            body,
        })
    }
}

/// Entry points mirroring the backend verbs this client uses.
pub struct Client;

impl Client {
    pub fn get(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Method::Put, url)
    }
}

/// Platform sleep with a Send future; backs the fixed retry delay.
pub async fn sleep(duration: Duration) {
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;

    #[cfg(target_arch = "wasm32")]
    {
        let (tx, rx) = flume::bounded::<()>(1);
        wasm_bindgen_futures::spawn_local(async move {
            js_sleep(duration).await;
            let _ = tx.send_async(()).await;
        });
        let _ = rx.recv_async().await;
    }
}

#[cfg(target_arch = "wasm32")]
async fn js_sleep(duration: Duration) {
    use wasm_bindgen_futures::JsFuture;
    use web_sys::js_sys::Promise;

    let millis = duration.as_millis().min(i32::MAX as u128) as i32;
    let promise = Promise::new(&mut |resolve, _reject| {
        let window = web_sys::window().expect("no window");
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            .expect("setTimeout failed");
    });
    let _ = JsFuture::from(promise).await;
}
