#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    pub(crate) fn http(status: u16, body: &str, ctx: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("{ctx} ({status})")
        } else {
            format!("{ctx} ({status}): {body}")
        };
        Self {
            kind: ApiErrorKind::Http,
            message,
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub(crate) enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Map a form's `method` attribute; anything unrecognised submits as GET.
    pub fn from_form_attr(method: &str) -> Self {
        match method.trim().to_ascii_uppercase().as_str() {
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            _ => Self::Get,
        }
    }
}

/// What the server is expected to answer with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResponseKind {
    /// A script the page executes after a successful submission.
    Script,
    /// Body is not consumed.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OutgoingRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Parameters in send order; form-encoded (or appended to the query for GET).
    pub body: Vec<(String, String)>,
    pub expect: ResponseKind,
}

/// Sends requests to the wiki server.
///
/// Implementations resolve with the response text on a 2xx status.
pub(crate) trait Transport {
    async fn send(&self, req: &OutgoingRequest) -> ApiResult<String>;
}

#[derive(Clone)]
pub(crate) struct ReqwestTransport {
    /// Relative action URLs are resolved against this (the page URL).
    pub(crate) base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub(crate) fn resolve(&self, url: &str) -> ApiResult<reqwest::Url> {
        match reqwest::Url::parse(url) {
            Ok(u) => Ok(u),
            Err(_) => reqwest::Url::parse(&self.base_url)
                .and_then(|base| base.join(url))
                .map_err(|e| ApiError::parse(format!("Invalid URL {url:?}: {e}"))),
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, req: &OutgoingRequest) -> ApiResult<String> {
        let url = self.resolve(&req.url)?;
        let method = reqwest::Method::from_bytes(req.method.as_ref().as_bytes())
            .map_err(ApiError::parse)?;

        let mut builder = self.client.request(method, url);
        builder = match req.method {
            HttpMethod::Get => builder.query(&req.body),
            _ => builder.form(&req.body),
        };
        if req.expect == ResponseKind::Script {
            builder = builder.header(
                "Accept",
                "text/javascript, application/javascript, */*; q=0.01",
            );
        }

        let res = builder.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            res.text().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status.as_u16(), &body, "Request failed"))
        }
    }
}
