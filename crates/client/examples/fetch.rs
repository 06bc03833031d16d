use bytes::Bytes;
use http::Method;
use micro_http_client::options::TransferOptions;
use micro_http_client::CurlClient;
use micro_http_message::factory::{DefaultStreamFactory, StreamFactory};
use micro_http_message::message::{Message, Request};
use micro_http_message::stream::StreamMetadata;
use micro_http_message::uri::UriFactory;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

// cargo run --example fetch -- https://example.com/
fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let url = std::env::args().nth(1).unwrap_or_else(|| "http://127.0.0.1:8080/".to_owned());
    let uri = match UriFactory.create_uri(&url) {
        Ok(uri) => uri,
        Err(e) => {
            error!(cause = %e, %url, "invalid url");
            return;
        }
    };

    let body = DefaultStreamFactory.create_stream(Bytes::new(), StreamMetadata::default());
    let request = Request::new(Method::GET, uri, body).with_header("Accept", "text/html;application/json");

    let options = TransferOptions { timeout: Some(10), user_agent: Some("micro-http-client".to_owned()), ..Default::default() };
    let mut client = CurlClient::builder().options(options).build();

    let response = match client.send_request(&request) {
        Ok(response) => response,
        Err(e) if e.is_network() => {
            warn!(cause = %e, code = e.code(), "network failure");
            return;
        }
        Err(e) => {
            error!(cause = %e, code = e.code(), "request failure");
            return;
        }
    };

    info!(status = response.status_code(), reason = response.reason_phrase(), version = response.protocol_version(), "received");
    for (name, values) in response.headers().iter() {
        println!("{name}: {}", values.join(", "));
    }
    println!();
    println!("{}", String::from_utf8_lossy(&response.body().to_bytes()));
}
