// Application output endpoints
//
// `/applications/{app}/outputs[/{eui}]`. Configuration travels as the
// open map produced by an `OutputConfig`.

use tracing::debug;

use crate::applications::application_path;
use crate::client::Client;
use crate::error::Error;
use crate::models::{Output, OutputList};
use crate::output_config::OutputConfig;

fn outputs_path(application_eui: &str) -> String {
    format!("{}/outputs", application_path(application_eui))
}

fn output_path(output: &Output) -> Result<String, Error> {
    if output.application_eui.is_empty() {
        return Err(Error::NoApplication {
            kind: "output",
            eui: output.eui.clone(),
        });
    }
    Ok(format!("{}/{}", outputs_path(&output.application_eui), output.eui))
}

/// Outputs returned by the backend may omit `appEUI`; the path knows it.
fn in_application(mut output: Output, application_eui: &str) -> Output {
    if output.application_eui.is_empty() {
        application_eui.clone_into(&mut output.application_eui);
    }
    output
}

impl Client {
    /// List the outputs configured for an application.
    ///
    /// `GET /applications/{app}/outputs`
    pub async fn outputs(&self, application_eui: &str) -> Result<Vec<Output>, Error> {
        let list: OutputList = self.get(&outputs_path(application_eui)).await?;
        Ok(list
            .outputs
            .into_iter()
            .map(|o| in_application(o, application_eui))
            .collect())
    }

    /// Create an output for an application.
    ///
    /// `POST /applications/{app}/outputs`
    pub async fn create_output(
        &self,
        application_eui: &str,
        config: &impl OutputConfig,
    ) -> Result<Output, Error> {
        let body = Output {
            application_eui: application_eui.to_owned(),
            config: config.to_config(),
            ..Output::default()
        };
        let created: Output = self.post(&outputs_path(application_eui), &body).await?;
        debug!(eui = %created.eui, kind = ?created.kind(), "created output");
        Ok(in_application(created, application_eui))
    }

    /// Store `output` and return the backend's copy. `output` must carry
    /// its application EUI.
    ///
    /// `PUT /applications/{app}/outputs/{eui}`
    pub async fn update_output(&self, output: &Output) -> Result<Output, Error> {
        let updated: Output = self.put(&output_path(output)?, output).await?;
        Ok(in_application(updated, &output.application_eui))
    }

    /// Delete an output. Deleting it again reports not found.
    ///
    /// `DELETE /applications/{app}/outputs/{eui}`
    pub async fn delete_output(&self, output: &Output) -> Result<(), Error> {
        debug!(eui = %output.eui, "deleting output");
        self.delete(&output_path(output)?).await
    }
}
