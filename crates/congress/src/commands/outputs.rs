//! Output command handlers.

use congress_api::{Client, MqttConfig, Output};

use crate::cli::{MqttArgs, OutputsArgs, OutputsCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(client: &Client, args: OutputsArgs) -> Result<(), CliError> {
    match args.command {
        OutputsCommand::List { app } => output::print_json(&client.outputs(&app).await?),

        OutputsCommand::CreateMqtt(args) => {
            let config = mqtt_config(&args);
            output::print_json(&client.create_output(&args.app, &config).await?)
        }

        OutputsCommand::Delete { app, eui } => {
            let target = Output {
                eui: eui.clone(),
                application_eui: app,
                ..Output::default()
            };
            client.delete_output(&target).await?;
            output::done(&format!("Output {eui} deleted"));
            Ok(())
        }
    }
}

fn mqtt_config(args: &MqttArgs) -> MqttConfig {
    MqttConfig {
        endpoint: args.endpoint.clone(),
        port: args.port,
        tls: args.tls,
        certificate_check: !args.no_cert_check,
        username: args.username.clone(),
        password: args.password.clone(),
        client_id: args.client_id.clone(),
        topic_name: args.topic.clone(),
    }
}
