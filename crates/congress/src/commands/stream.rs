//! `congress stream`: print live device data as JSON lines.

use congress_api::Client;
use tracing::info;

use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, app: &str, count: Option<usize>) -> Result<(), CliError> {
    let (mut data_rx, mut error_rx) = client.data_stream(app).await?.into_parts();
    info!(app, "following data stream");

    let mut seen = 0_usize;
    while let Some(msg) = data_rx.recv().await {
        output::print_json_line(&msg)?;
        seen += 1;
        if count.is_some_and(|n| seen >= n) {
            return Ok(());
        }
    }

    match error_rx.recv().await {
        Some(err) => Err(err.into()),
        None => {
            output::done("Data stream closed by the server");
            Ok(())
        }
    }
}
