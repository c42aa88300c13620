// Device endpoints
//
// Devices live under `/applications/{app}/devices/{eui}`, along with the
// single downstream message slot (`.../message`) and the upstream history
// (`.../data`). Returned devices get their application EUI filled in from
// the request path.

use std::ops::RangeInclusive;

use tracing::debug;

use crate::applications::application_path;
use crate::client::Client;
use crate::error::Error;
use crate::models::{Device, DeviceList, DeviceType, DownstreamMessage, MessageList, UpstreamMessage};

/// LoRaWAN application ports usable for downstream messages.
pub const DOWNSTREAM_PORTS: RangeInclusive<u8> = 1..=224;

fn devices_path(application_eui: &str) -> String {
    format!("{}/devices", application_path(application_eui))
}

fn device_path(application_eui: &str, eui: &str) -> String {
    format!("{}/{eui}", devices_path(application_eui))
}

/// Path of a device value, which must know its application.
fn existing_device_path(device: &Device) -> Result<String, Error> {
    if device.application_eui().is_empty() {
        return Err(Error::NoApplication {
            kind: "device",
            eui: device.eui.clone(),
        });
    }
    Ok(device_path(device.application_eui(), &device.eui))
}

fn message_path(device: &Device) -> Result<String, Error> {
    Ok(format!("{}/message", existing_device_path(device)?))
}

impl Client {
    /// List the devices of an application.
    ///
    /// `GET /applications/{app}/devices`
    pub async fn devices(&self, application_eui: &str) -> Result<Vec<Device>, Error> {
        let list: DeviceList = self.get(&devices_path(application_eui)).await?;
        Ok(list
            .devices
            .into_iter()
            .map(|d| d.in_application(application_eui))
            .collect())
    }

    /// Fetch one device.
    ///
    /// `GET /applications/{app}/devices/{eui}`
    pub async fn device(&self, application_eui: &str, eui: &str) -> Result<Device, Error> {
        let device: Device = self.get(&device_path(application_eui, eui)).await?;
        Ok(device.in_application(application_eui))
    }

    /// Create a device in an application. The backend generates the EUI
    /// and key material; the type can't be changed afterwards.
    ///
    /// `POST /applications/{app}/devices`
    pub async fn create_device(
        &self,
        application_eui: &str,
        device_type: DeviceType,
    ) -> Result<Device, Error> {
        let body = Device::new(application_eui, device_type);
        let created: Device = self.post(&devices_path(application_eui), &body).await?;
        debug!(eui = %created.eui, %device_type, "created device");
        Ok(created.in_application(application_eui))
    }

    /// Store `device` and return the backend's copy.
    ///
    /// This and the other methods taking a `&Device` need one returned by
    /// the client; a device without an application EUI is rejected with
    /// [`Error::NoApplication`] before any request.
    ///
    /// `PUT /applications/{app}/devices/{eui}`
    pub async fn update_device(&self, device: &Device) -> Result<Device, Error> {
        let path = existing_device_path(device)?;
        let updated: Device = self.put(&path, device).await?;
        Ok(updated.in_application(device.application_eui()))
    }

    /// Delete a device. Deleting it again reports not found.
    ///
    /// `DELETE /applications/{app}/devices/{eui}`
    pub async fn delete_device(&self, device: &Device) -> Result<(), Error> {
        debug!(eui = %device.eui, "deleting device");
        self.delete(&existing_device_path(device)?).await
    }

    // ── Downstream messages ──────────────────────────────────────────

    /// Queue a message for the device. It is sent the next time the device
    /// sends something upstream. Ports outside 1..=224 are rejected before
    /// any request is made.
    ///
    /// `POST /applications/{app}/devices/{eui}/message`
    pub async fn enqueue_message(
        &self,
        device: &Device,
        data: &[u8],
        port: u8,
        ack: bool,
    ) -> Result<DownstreamMessage, Error> {
        if !DOWNSTREAM_PORTS.contains(&port) {
            return Err(Error::InvalidPort(port));
        }
        let msg = DownstreamMessage::new(data, port, ack);
        self.post(&message_path(device)?, &msg).await
    }

    /// The message currently queued for the device.
    ///
    /// `GET /applications/{app}/devices/{eui}/message`
    pub async fn queued_message(&self, device: &Device) -> Result<DownstreamMessage, Error> {
        self.get(&message_path(device)?).await
    }

    /// Drop the queued message.
    ///
    /// `DELETE /applications/{app}/devices/{eui}/message`
    pub async fn clear_queued_message(&self, device: &Device) -> Result<(), Error> {
        self.delete(&message_path(device)?).await
    }

    // ── Upstream history ─────────────────────────────────────────────

    /// The most recent upstream messages, at most `limit` of them.
    ///
    /// `GET /applications/{app}/devices/{eui}/data?limit={limit}`
    pub async fn messages(
        &self,
        device: &Device,
        limit: u32,
    ) -> Result<Vec<UpstreamMessage>, Error> {
        let path = format!("{}/data?limit={limit}", existing_device_path(device)?);
        let list: MessageList = self.get(&path).await?;
        Ok(list.messages)
    }
}
