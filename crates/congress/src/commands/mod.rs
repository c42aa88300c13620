//! Command dispatch: bridges CLI args -> client calls -> JSON output.

pub mod apps;
pub mod devices;
pub mod gateways;
pub mod outputs;
pub mod stream;
pub mod util;

use congress_api::Client;

use crate::cli::Command;
use crate::error::CliError;
use crate::output;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, client: &Client) -> Result<(), CliError> {
    match cmd {
        Command::Ping => {
            client.ping().await?;
            output::done(&format!("{} is reachable", client.base_url()));
            Ok(())
        }
        Command::Apps(args) => apps::handle(client, args).await,
        Command::Devices(args) => devices::handle(client, args).await,
        Command::Gateways(args) => gateways::handle(client, args).await,
        Command::Outputs(args) => outputs::handle(client, args).await,
        Command::Stream { app, count } => stream::handle(client, &app, count).await,
    }
}
