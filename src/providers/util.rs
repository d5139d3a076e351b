use crate::core::source::FetchError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use tracing::debug;

/// Fixed per-request timeout for rate fetches.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("ratepad/", env!("CARGO_PKG_VERSION"));

/// Sends one JSON GET request and decodes the body into `T`.
///
/// # Parameters
/// - `url`: Fully formed request URL
/// - `timeout`: Whole-request timeout
///
/// # Returns
/// The decoded body, or the classified reason the request failed
pub async fn get_json<T: DeserializeOwned>(url: &Url, timeout: Duration) -> Result<T, FetchError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| FetchError::Other(format!("Failed to build HTTP client: {e}")))?;

    debug!("Requesting exchange rates from {}", without_query(url));
    let response = client
        .get(url.clone())
        .header(CONTENT_TYPE, "application/json")
        .send()
        .await
        .map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Other(format!("HTTP error: {status}")));
    }

    let text = response.text().await.map_err(classify)?;
    serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Parses a configured URL, reporting failures as [`FetchError::InvalidUrl`].
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))
}

/// The URL with its query string removed. Query parameters may carry keys.
pub fn without_query(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_query(None);
    url
}

/// Maps a transport error onto the fetch error taxonomy. The request URL is
/// stripped before anything is formatted.
pub fn classify(err: reqwest::Error) -> FetchError {
    let err = err.without_url();
    let message = describe(&err);
    if err.is_builder() {
        return FetchError::InvalidUrl(message);
    }
    if err.is_timeout() {
        return FetchError::Timeout;
    }
    if is_resolver_failure(&err) {
        return FetchError::NoConnectivity(message);
    }
    if let Some(classified) = io_error_kind(&err).and_then(|kind| classify_io(kind, &message)) {
        return classified;
    }
    if err.is_connect() {
        return FetchError::HostUnreachable(message);
    }
    if err.is_decode() {
        return FetchError::Decode(message);
    }
    FetchError::Other(message)
}

/// Classification for the I/O error at the bottom of a transport failure.
pub fn classify_io(kind: io::ErrorKind, message: &str) -> Option<FetchError> {
    use io::ErrorKind::*;
    match kind {
        NetworkUnreachable | NetworkDown => Some(FetchError::NoConnectivity(message.to_string())),
        ConnectionReset | ConnectionAborted | BrokenPipe | UnexpectedEof => {
            Some(FetchError::ConnectionLost(message.to_string()))
        }
        ConnectionRefused | HostUnreachable | AddrNotAvailable => {
            Some(FetchError::HostUnreachable(message.to_string()))
        }
        TimedOut => Some(FetchError::Timeout),
        _ => None,
    }
}

/// Markers the resolver layers put in their error text. The I/O error they
/// wrap has no dedicated kind.
const RESOLVER_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name resolution",
    "Name or service not known",
    "No address associated with hostname",
    "nodename nor servname",
];

/// True when the host name could not be resolved.
///
/// Without a network the resolver cannot reach any server, and the system
/// reports that the same way as an unknown name. Both count as no
/// connectivity.
pub fn is_resolver_failure(err: &(dyn StdError + 'static)) -> bool {
    sources(err).any(|cause| {
        let text = cause.to_string();
        RESOLVER_MARKERS.iter().any(|marker| text.contains(marker))
    })
}

fn sources<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(err.source(), |&cause: &&'a (dyn StdError + 'static)| cause.source())
}

fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    sources(err).find_map(|cause| cause.downcast_ref::<io::Error>().map(io::Error::kind))
}

/// `outer: cause: root`, so the message says more than "error sending request".
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    for cause in sources(err) {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Body {
        value: i32,
    }

    async fn mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates.json"))
            .and(header("content-type", "application/json"))
            .respond_with(template)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn url(server: &MockServer) -> Url {
        parse_url(&format!("{}/rates.json", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = mock_server(ResponseTemplate::new(200).set_body_string(r#"{"value": 7}"#)).await;
        let body: Body = get_json(&url(&server), REQUEST_TIMEOUT).await.unwrap();
        assert_eq!(body, Body { value: 7 });
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let server = mock_server(ResponseTemplate::new(200).set_body_string("<html>")).await;
        let result: Result<Body, _> = get_json(&url(&server), REQUEST_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_get_json_http_error() {
        let server = mock_server(ResponseTemplate::new(503)).await;
        let result: Result<Body, _> = get_json(&url(&server), REQUEST_TIMEOUT).await;
        match result {
            Err(FetchError::Other(message)) => assert!(message.contains("503")),
            other => panic!("expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_json_timeout() {
        let server = mock_server(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"value": 7}"#)
                .set_delay(Duration::from_millis(500)),
        )
        .await;
        let result: Result<Body, _> = get_json(&url(&server), Duration::from_millis(50)).await;
        assert_eq!(result.unwrap_err(), FetchError::Timeout);
    }

    #[tokio::test]
    async fn test_refused_connection_is_host_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = parse_url(&format!("http://127.0.0.1:{port}/rates.json")).unwrap();
        let result: Result<Body, _> = get_json(&url, REQUEST_TIMEOUT).await;
        assert!(matches!(result, Err(FetchError::HostUnreachable(_))));
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_no_connectivity() {
        let url = parse_url("http://rates.ratepad.invalid/rates.json").unwrap();
        let result: Result<Body, _> = get_json(&url, REQUEST_TIMEOUT).await;
        let error = result.unwrap_err();
        assert!(
            matches!(error, FetchError::NoConnectivity(_)),
            "got {error:?}"
        );
        assert!(error.is_offline());
    }

    #[tokio::test]
    async fn test_error_message_omits_query() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = parse_url(&format!(
            "http://127.0.0.1:{port}/rates.json?authkey=top-secret"
        ))
        .unwrap();
        let error = get_json::<Body>(&url, REQUEST_TIMEOUT).await.unwrap_err();
        assert!(!error.to_string().contains("top-secret"));
        assert!(!format!("{error:?}").contains("top-secret"));
    }

    #[derive(Debug)]
    struct Layer {
        text: &'static str,
        source: io::Error,
    }

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.text)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.source)
        }
    }

    #[derive(Debug)]
    struct Outer(Layer);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("error sending request")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_resolver_failure_detection() {
        let lookup = Outer(Layer {
            text: "dns error",
            source: io::Error::other(
                "failed to lookup address information: Name or service not known",
            ),
        });
        assert!(is_resolver_failure(&lookup));
        assert_eq!(io_error_kind(&lookup), Some(io::ErrorKind::Other));
        assert_eq!(
            describe(&lookup),
            "error sending request: dns error: failed to lookup address information: \
             Name or service not known"
        );

        let refused = Outer(Layer {
            text: "tcp connect error",
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        });
        assert!(!is_resolver_failure(&refused));
        assert_eq!(
            io_error_kind(&refused),
            Some(io::ErrorKind::ConnectionRefused)
        );
    }

    #[test]
    fn test_without_query() {
        let url = parse_url("https://example.com/rates?authkey=k&data=AP01").unwrap();
        assert_eq!(without_query(&url).as_str(), "https://example.com/rates");
    }

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com/rates.json").is_ok());
        assert!(matches!(
            parse_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_classify_io() {
        assert!(matches!(
            classify_io(io::ErrorKind::NetworkUnreachable, "x"),
            Some(FetchError::NoConnectivity(_))
        ));
        assert!(matches!(
            classify_io(io::ErrorKind::ConnectionReset, "x"),
            Some(FetchError::ConnectionLost(_))
        ));
        assert!(matches!(
            classify_io(io::ErrorKind::ConnectionRefused, "x"),
            Some(FetchError::HostUnreachable(_))
        ));
        assert_eq!(
            classify_io(io::ErrorKind::TimedOut, "x"),
            Some(FetchError::Timeout)
        );
        assert_eq!(classify_io(io::ErrorKind::InvalidData, "x"), None);
    }
}
