//! Device and message command handlers.

use congress_api::Client;

use crate::cli::{DevicesArgs, DevicesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(client: &Client, args: DevicesArgs) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { app } => output::print_json(&client.devices(&app).await?),

        DevicesCommand::Get { app, eui } => output::print_json(&client.device(&app, &eui).await?),

        DevicesCommand::Create {
            app,
            device_type,
            tags,
        } => {
            let mut device = client.create_device(&app, device_type).await?;
            if !tags.is_empty() {
                util::apply_tags(&mut device, &tags)?;
                device = client.update_device(&device).await?;
            }
            output::print_json(&device)
        }

        DevicesCommand::Delete { app, eui } => {
            let device = client.device(&app, &eui).await?;
            client.delete_device(&device).await?;
            output::done(&format!("Device {eui} deleted"));
            Ok(())
        }

        DevicesCommand::Send {
            app,
            eui,
            data,
            port,
            ack,
        } => {
            let payload = hex::decode(data.trim()).map_err(|e| CliError::Validation {
                field: "data".into(),
                reason: format!("not a hex string: {e}"),
            })?;
            let device = client.device(&app, &eui).await?;
            let queued = client.enqueue_message(&device, &payload, port, ack).await?;
            output::print_json(&queued)
        }

        DevicesCommand::Queued { app, eui } => {
            let device = client.device(&app, &eui).await?;
            output::print_json(&client.queued_message(&device).await?)
        }

        DevicesCommand::Clear { app, eui } => {
            let device = client.device(&app, &eui).await?;
            client.clear_queued_message(&device).await?;
            output::done(&format!("Queued message for {eui} cleared"));
            Ok(())
        }

        DevicesCommand::Messages { app, eui, limit } => {
            let device = client.device(&app, &eui).await?;
            output::print_json(&client.messages(&device, limit).await?)
        }
    }
}
