//! Application command handlers.

use congress_api::{Application, Client, Tagged};

use crate::cli::{AppsArgs, AppsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(client: &Client, args: AppsArgs) -> Result<(), CliError> {
    match args.command {
        AppsCommand::List => output::print_json(&client.applications().await?),

        AppsCommand::Get { eui } => output::print_json(&client.application(&eui).await?),

        AppsCommand::Create { tags } => {
            let mut app = Application::new();
            util::apply_tags(&mut app, &tags)?;
            output::print_json(&client.create_application(&app).await?)
        }

        AppsCommand::Delete { eui } => {
            client.delete_application(&eui).await?;
            output::done(&format!("Application {eui} deleted"));
            Ok(())
        }

        AppsCommand::Tag { eui, key, value } => {
            let mut app = client.application(&eui).await?;
            if !app.set_tag(&key, &value) {
                return Err(util::invalid_tag(&key, &value));
            }
            output::print_json(&client.update_application(&app).await?)
        }
    }
}
