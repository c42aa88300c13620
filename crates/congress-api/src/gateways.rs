// Gateway endpoints
//
// Unlike applications and devices, gateways are registered under an EUI
// chosen by the caller.

use std::net::IpAddr;

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Gateway, GatewayList, Position};

fn gateway_path(eui: &str) -> String {
    format!("/gateways/{eui}")
}

impl Client {
    /// List all gateways owned by the token.
    ///
    /// `GET /gateways`
    pub async fn gateways(&self) -> Result<Vec<Gateway>, Error> {
        let list: GatewayList = self.get("/gateways").await?;
        Ok(list.gateways)
    }

    /// Fetch one gateway.
    ///
    /// `GET /gateways/{eui}`
    pub async fn gateway(&self, eui: &str) -> Result<Gateway, Error> {
        self.get(&gateway_path(eui)).await
    }

    /// Register a gateway. With `strict_ip` set the backend only accepts
    /// packets for this EUI from `ip`.
    ///
    /// `POST /gateways`
    pub async fn create_gateway(
        &self,
        eui: &str,
        ip: IpAddr,
        strict_ip: bool,
        position: Option<Position>,
    ) -> Result<Gateway, Error> {
        let mut gw = Gateway {
            eui: eui.to_owned(),
            ip: ip.to_string(),
            strict_ip,
            ..Gateway::default()
        };
        gw.set_position(position);

        debug!(eui, %ip, strict_ip, "registering gateway");
        self.post("/gateways", &gw).await
    }

    /// Store `gateway` and return the backend's copy.
    ///
    /// `PUT /gateways/{eui}`
    pub async fn update_gateway(&self, gateway: &Gateway) -> Result<Gateway, Error> {
        self.put(&gateway_path(&gateway.eui), gateway).await
    }

    /// Delete a gateway. Deleting it again reports not found.
    ///
    /// `DELETE /gateways/{eui}`
    pub async fn delete_gateway(&self, eui: &str) -> Result<(), Error> {
        debug!(eui, "deleting gateway");
        self.delete(&gateway_path(eui)).await
    }
}
