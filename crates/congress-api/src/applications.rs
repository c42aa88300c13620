// Application endpoints
//
// `/applications` and `/applications/{eui}`. Applications are created
// empty and get their EUI from the backend.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Application, ApplicationList};

pub(crate) fn application_path(eui: &str) -> String {
    format!("/applications/{eui}")
}

impl Client {
    /// List all applications owned by the token.
    ///
    /// `GET /applications`
    pub async fn applications(&self) -> Result<Vec<Application>, Error> {
        let list: ApplicationList = self.get("/applications").await?;
        Ok(list.applications)
    }

    /// Fetch one application.
    ///
    /// `GET /applications/{eui}`
    pub async fn application(&self, eui: &str) -> Result<Application, Error> {
        self.get(&application_path(eui)).await
    }

    /// Create an application. Tags on `app` are sent along; any EUI is
    /// ignored by the backend.
    ///
    /// `POST /applications`
    pub async fn create_application(&self, app: &Application) -> Result<Application, Error> {
        let created: Application = self.post("/applications", app).await?;
        debug!(eui = %created.eui, "created application");
        Ok(created)
    }

    /// Store `app` and return the backend's copy.
    ///
    /// `PUT /applications/{eui}`
    pub async fn update_application(&self, app: &Application) -> Result<Application, Error> {
        self.put(&application_path(&app.eui), app).await
    }

    /// Delete an application. Deleting it again reports not found.
    ///
    /// `DELETE /applications/{eui}`
    pub async fn delete_application(&self, eui: &str) -> Result<(), Error> {
        debug!(eui, "deleting application");
        self.delete(&application_path(eui)).await
    }
}
