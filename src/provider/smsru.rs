//! SMS.RU provider: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SmsConfig;
use crate::domain::{
    ApiId, Login, MessageText, Password, PhoneNumber, SendOptions, SendSms, SendSmsResponse,
    SenderId, Status, ValidationError,
};
use crate::provider::{Provider, ProviderError};

const DEFAULT_SEND_ENDPOINT: &str = "https://sms.ru/sms/send";

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_form(
        &self,
        url: &str,
        params: Vec<(String, String)>,
    ) -> Result<HttpResponse, Box<dyn StdError + Send + Sync>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form(
        &self,
        url: &str,
        params: Vec<(String, String)>,
    ) -> Result<HttpResponse, Box<dyn StdError + Send + Sync>> {
        let response = self.client.post(url).form(&params).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Clone)]
/// Authentication credentials for SMS.RU API calls.
///
/// Use [`Auth::api_id`] when you have an `api_id` token, or [`Auth::login_password`]
/// if you authenticate with a login/password pair.
pub enum Auth {
    /// Authenticate via SMS.RU `api_id`.
    ApiId(ApiId),
    /// Authenticate via SMS.RU `login` + `password`.
    LoginPassword { login: Login, password: Password },
}

impl Auth {
    /// Create [`Auth::ApiId`] and validate that the value is non-empty after trimming.
    pub fn api_id(value: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self::ApiId(ApiId::new(value)?))
    }

    /// Create [`Auth::LoginPassword`] and validate that both parts are non-empty.
    pub fn login_password(
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self::LoginPassword {
            login: Login::new(login)?,
            password: Password::new(password)?,
        })
    }

    fn push_form_params(&self, params: &mut Vec<(String, String)>) {
        match self {
            Self::ApiId(api_id) => {
                params.push((ApiId::FIELD.to_owned(), api_id.as_str().to_owned()));
            }
            Self::LoginPassword { login, password } => {
                params.push((Login::FIELD.to_owned(), login.as_str().to_owned()));
                params.push((Password::FIELD.to_owned(), password.as_str().to_owned()));
            }
        }
    }
}

#[derive(Debug, Clone)]
/// Builder for [`SmsRuProvider`].
pub struct SmsRuProviderBuilder {
    auth: Auth,
    options: SendOptions,
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl SmsRuProviderBuilder {
    pub fn new(auth: Auth) -> Self {
        Self {
            auth,
            options: SendOptions::default(),
            endpoint: DEFAULT_SEND_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Sender signature put into `from` on every message.
    pub fn sender(mut self, sender: SenderId) -> Self {
        self.options.from = Some(sender);
        self
    }

    /// Ask SMS.RU to accept requests without delivering them (`test=1`).
    pub fn test_mode(mut self, test: bool) -> Self {
        self.options.test = test;
        self
    }

    /// Override the `sms/send` endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<SmsRuProvider, ProviderError> {
        url::Url::parse(&self.endpoint).map_err(|source| ProviderError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })?;

        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| ProviderError::Transport(Box::new(err)))?;

        Ok(SmsRuProvider {
            auth: self.auth,
            options: self.options,
            endpoint: self.endpoint,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// [`Provider`] that delivers through the SMS.RU `sms/send` method.
///
/// Every call posts one form request with `json=1` and treats anything but a
/// top-level `OK` as a failure. Per-recipient rejections inside an `OK` answer
/// are logged, not raised: the batch as a whole was accepted.
pub struct SmsRuProvider {
    auth: Auth,
    options: SendOptions,
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl SmsRuProvider {
    pub fn builder(auth: Auth) -> SmsRuProviderBuilder {
        SmsRuProviderBuilder::new(auth)
    }

    /// Default provider built from login, password and sign in `config`.
    pub fn from_config(config: &SmsConfig) -> Result<Self, ProviderError> {
        let auth = Auth::login_password(config.login.as_str(), config.password.as_str())?;
        let mut builder = Self::builder(auth).test_mode(config.test_mode);
        if let Some(sign) = config.sign.as_deref() {
            builder = builder.sender(SenderId::new(sign)?);
        }
        if let Some(endpoint) = config.endpoint.as_deref() {
            builder = builder.endpoint(endpoint);
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a prepared request and return the decoded answer.
    ///
    /// Errors:
    /// - [`ProviderError::HttpStatus`] for non-2xx HTTP responses,
    /// - [`ProviderError::Parse`] when the body is not the expected JSON,
    /// - [`ProviderError::Api`] when SMS.RU returns a top-level `ERROR`.
    pub fn send_sms(&self, request: &SendSms) -> Result<SendSmsResponse, ProviderError> {
        let mut params = Vec::<(String, String)>::new();
        self.auth.push_form_params(&mut params);
        params.extend(crate::transport::encode_send_sms_form(request));

        tracing::debug!(
            endpoint = %self.endpoint,
            recipients = request.recipients().len(),
            "posting sms.ru send request"
        );
        let response = self
            .http
            .post_form(&self.endpoint, params)
            .map_err(ProviderError::Transport)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(ProviderError::HttpStatus {
                status: response.status,
                body,
            });
        }

        let parsed = crate::transport::decode_send_sms_json_response(request, &response.body)
            .map_err(|err| ProviderError::Parse(Box::new(err)))?;

        if parsed.status != Status::Ok {
            return Err(ProviderError::Api {
                status_code: parsed.status_code,
                status_text: parsed.status_text,
            });
        }

        Ok(parsed)
    }
}

impl Provider for SmsRuProvider {
    fn send(&self, recipients: &[PhoneNumber], message: &str) -> Result<(), ProviderError> {
        let request = SendSms::to_many(
            recipients.to_vec(),
            MessageText::new(message)?,
            self.options.clone(),
        )?;
        let response = self.send_sms(&request)?;

        for (phone, result) in &response.sms {
            if result.status != Status::Ok {
                tracing::warn!(
                    phone = %phone,
                    status_code = result.status_code.as_i32(),
                    status_text = result.status_text.as_deref().unwrap_or(""),
                    "sms.ru rejected recipient"
                );
            }
        }
        tracing::info!(
            recipients = recipients.len(),
            balance = response.balance.as_deref().unwrap_or("unknown"),
            "sms.ru accepted message"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::config::Environment;
    use crate::domain::StatusCode;

    use super::*;

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        calls: usize,
        last_url: Option<String>,
        last_params: Vec<(String, String)>,
        response_status: u16,
        response_body: String,
    }

    impl FakeTransport {
        fn new(response_status: u16, response_body: impl Into<String>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    calls: 0,
                    last_url: None,
                    last_params: Vec::new(),
                    response_status,
                    response_body: response_body.into(),
                })),
            }
        }

        fn calls(&self) -> usize {
            self.state.lock().unwrap().calls
        }

        fn last_request(&self) -> (Option<String>, Vec<(String, String)>) {
            let state = self.state.lock().unwrap();
            (state.last_url.clone(), state.last_params.clone())
        }
    }

    impl HttpTransport for FakeTransport {
        fn post_form(
            &self,
            url: &str,
            params: Vec<(String, String)>,
        ) -> Result<HttpResponse, Box<dyn StdError + Send + Sync>> {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            state.last_url = Some(url.to_owned());
            state.last_params = params;
            Ok(HttpResponse {
                status: state.response_status,
                body: state.response_body.clone(),
            })
        }
    }

    fn assert_param(params: &[(String, String)], key: &str, value: &str) {
        assert!(
            params.iter().any(|(k, v)| k == key && v == value),
            "missing param {key}={value}; got: {params:?}"
        );
    }

    fn make_provider(auth: Auth, options: SendOptions, transport: FakeTransport) -> SmsRuProvider {
        SmsRuProvider {
            auth,
            options,
            endpoint: "https://example.invalid/sms/send".to_owned(),
            http: Arc::new(transport),
        }
    }

    fn phones(numbers: &[&str]) -> Vec<PhoneNumber> {
        numbers.iter().map(|n| PhoneNumber::new(*n).unwrap()).collect()
    }

    #[test]
    fn send_posts_login_password_and_recipients() {
        let json = r#"
        {
          "status": "OK",
          "status_code": 100,
          "balance": "10.00",
          "sms": {
            "79045342314": { "status": "OK", "status_code": 100, "sms_id": "abc123" },
            "9045344321": { "status": "ERROR", "status_code": 207, "status_text": "no route" }
          }
        }
        "#;
        let transport = FakeTransport::new(200, json);
        let provider = make_provider(
            Auth::login_password("user", "pass").unwrap(),
            SendOptions {
                from: Some(SenderId::new("SHOP").unwrap()),
                test: false,
            },
            transport.clone(),
        );

        provider
            .send(&phones(&["9045344321", "79045342314"]), "hello")
            .unwrap();

        let (url, params) = transport.last_request();
        assert_eq!(url.as_deref(), Some("https://example.invalid/sms/send"));
        assert_param(&params, "login", "user");
        assert_param(&params, "password", "pass");
        assert_param(&params, "json", "1");
        assert_param(&params, "to", "9045344321,79045342314");
        assert_param(&params, "msg", "hello");
        assert_param(&params, "from", "SHOP");
    }

    #[test]
    fn send_sms_includes_api_id_and_parses_ok_response() {
        let json = r#"{"status":"OK","status_code":100,"balance":4.5,"sms":{}}"#;
        let transport = FakeTransport::new(200, json);
        let provider = make_provider(
            Auth::api_id("test_key").unwrap(),
            SendOptions::default(),
            transport.clone(),
        );

        let request = SendSms::to_many(
            phones(&["79251234567"]),
            MessageText::new("hi").unwrap(),
            SendOptions::default(),
        )
        .unwrap();
        let response = provider.send_sms(&request).unwrap();
        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.balance.as_deref(), Some("4.5"));

        let (_, params) = transport.last_request();
        assert_param(&params, "api_id", "test_key");
    }

    #[test]
    fn send_maps_top_level_error_to_api_error() {
        let json = r#"
        {
          "status": "ERROR",
          "status_code": 301,
          "status_text": "Invalid login or password"
        }
        "#;
        let transport = FakeTransport::new(200, json);
        let provider = make_provider(
            Auth::login_password("user", "bad").unwrap(),
            SendOptions::default(),
            transport,
        );

        let err = provider.send(&phones(&["9045344321"]), "hello").unwrap_err();
        match err {
            ProviderError::Api {
                status_code,
                status_text,
            } => {
                assert!(status_code.is_auth_error());
                assert_eq!(status_text.as_deref(), Some("Invalid login or password"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn send_maps_non_success_http_status() {
        let transport = FakeTransport::new(500, "oops");
        let provider = make_provider(
            Auth::api_id("key").unwrap(),
            SendOptions::default(),
            transport,
        );

        let err = provider.send(&phones(&["9045344321"]), "hello").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::HttpStatus {
                status: 500,
                body: Some(_)
            }
        ));
    }

    #[test]
    fn send_maps_empty_http_body_to_none() {
        let transport = FakeTransport::new(503, "   ");
        let provider = make_provider(
            Auth::api_id("key").unwrap(),
            SendOptions::default(),
            transport,
        );

        let err = provider.send(&phones(&["9045344321"]), "hello").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::HttpStatus {
                status: 503,
                body: None
            }
        ));
    }

    #[test]
    fn send_maps_invalid_json_to_parse_error() {
        let transport = FakeTransport::new(200, "{ not json }");
        let provider = make_provider(
            Auth::api_id("key").unwrap(),
            SendOptions::default(),
            transport,
        );

        let err = provider.send(&phones(&["9045344321"]), "hello").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn send_rejects_blank_message_before_posting() {
        let transport = FakeTransport::new(200, "{}");
        let provider = make_provider(
            Auth::api_id("key").unwrap(),
            SendOptions::default(),
            transport.clone(),
        );

        let err = provider.send(&phones(&["9045344321"]), "   ").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Validation(ValidationError::Empty { field: "msg" })
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn auth_constructors_validate_inputs() {
        assert!(Auth::api_id("   ").is_err());
        assert!(Auth::login_password("", "pass").is_err());
        assert!(Auth::login_password("user", "").is_err());
    }

    #[test]
    fn builder_rejects_invalid_endpoint() {
        let err = SmsRuProvider::builder(Auth::api_id("key").unwrap())
            .endpoint("not a url")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::InvalidEndpoint { .. }));
    }

    #[test]
    fn from_config_applies_sign_endpoint_and_test_mode() {
        let mut config = SmsConfig::new("user", "secret")
            .with_sign("SHOP")
            .with_environment(Environment::Production);
        config.endpoint = Some("https://example.invalid/custom".to_owned());
        config.test_mode = true;

        let provider = SmsRuProvider::from_config(&config).unwrap();
        assert_eq!(provider.endpoint(), "https://example.invalid/custom");
        assert_eq!(
            provider.options.from.as_ref().map(SenderId::as_str),
            Some("SHOP")
        );
        assert!(provider.options.test);
    }

    #[test]
    fn from_config_rejects_missing_credentials() {
        let err = SmsRuProvider::from_config(&SmsConfig::new("user", ""))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ProviderError::Validation(ValidationError::Empty { field: "password" })
        ));
    }
}
