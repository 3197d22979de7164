use std::process::ExitCode;

use micro_http_response::connection::connect;
use micro_http_response::parser::ResponseParser;
use micro_http_response::protocol::{HttpError, Response};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_HOST: &str = "nothings.org";
const DEFAULT_PORT: u16 = 80;

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match args.next().map(|port| port.parse::<u16>()) {
        None => DEFAULT_PORT,
        Some(Ok(port)) => port,
        Some(Err(e)) => {
            error!(cause = %e, "invalid port");
            return ExitCode::FAILURE;
        }
    };

    match fetch(&host, port).await {
        Ok(response) => {
            println!("Response: {}", response.code());
            if !response.body().is_empty() {
                println!("{}", String::from_utf8_lossy(response.body()));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(cause = %e, host, port, "fetch failed");
            ExitCode::FAILURE
        }
    }
}

async fn fetch(host: &str, port: u16) -> Result<Response, HttpError> {
    let mut connection = connect(host, port).await?;
    connection.send_simple_get().await?;

    let mut parser = ResponseParser::new(Response::default());
    connection.read_response(&mut parser).await?;

    info!(code = parser.status_code(), chunked = parser.is_chunked(), "response received");
    Ok(parser.into_handler())
}
