//! Gateway command handlers.

use congress_api::{Client, Position};

use crate::cli::{GatewaysArgs, GatewaysCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: GatewaysArgs) -> Result<(), CliError> {
    match args.command {
        GatewaysCommand::List => output::print_json(&client.gateways().await?),

        GatewaysCommand::Get { eui } => output::print_json(&client.gateway(&eui).await?),

        GatewaysCommand::Create {
            eui,
            ip,
            strict_ip,
            latitude,
            longitude,
            altitude,
        } => {
            // clap guarantees all three or none
            let position = match (latitude, longitude, altitude) {
                (Some(latitude), Some(longitude), Some(altitude)) => Some(Position {
                    latitude,
                    longitude,
                    altitude,
                }),
                _ => None,
            };
            let gw = client.create_gateway(&eui, ip, strict_ip, position).await?;
            output::print_json(&gw)
        }

        GatewaysCommand::Delete { eui } => {
            client.delete_gateway(&eui).await?;
            output::done(&format!("Gateway {eui} deleted"));
            Ok(())
        }
    }
}
