//! SolusVM response and snapshot models.

use crate::client::VirtualMachineClient;
use crate::decode::{parse_usage, split_addresses};
use crate::Result;
use serde::Serialize;
use solusvm_core::units::format_signed_bytes;
use solusvm_core::Error;

/// Value of the `status` element on a successful call.
pub const STATUS_SUCCESS: &str = "success";

/// Decoded response of one API call, before it is mapped into a snapshot.
///
/// Every field is the element's text, or empty when the element was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStatusResponse {
    /// `hostname`
    pub hostname: String,
    /// `ipaddress`: the main IP address.
    pub ip_address: String,
    /// `ipaddr`: every assigned address, comma-joined.
    pub ip_addresses: String,
    /// `hdd` usage quadruple.
    pub hdd: String,
    /// `mem` usage quadruple.
    pub mem: String,
    /// `bw` usage quadruple.
    pub bw: String,
    /// `stat` (also accepted as `vmstat`): run state of the virtual server.
    pub vm_state: String,
    /// `status`: outcome of the API call (`success` or `error`).
    pub status: String,
    /// `statusmsg`: human-readable message, set on failure.
    pub status_message: String,
}

impl RawStatusResponse {
    /// Whether the panel reported the call as successful.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Turn a non-success response into [`Error::Remote`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] carrying `statusmsg` verbatim unless `status` is `success`.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::remote(self.status, self.status_message))
        }
    }

    pub(crate) fn slot_mut(&mut self, element: &str) -> Option<&mut String> {
        match element {
            "hostname" => Some(&mut self.hostname),
            "ipaddress" => Some(&mut self.ip_address),
            "ipaddr" => Some(&mut self.ip_addresses),
            "hdd" => Some(&mut self.hdd),
            "mem" => Some(&mut self.mem),
            "bw" => Some(&mut self.bw),
            "stat" | "vmstat" => Some(&mut self.vm_state),
            "status" => Some(&mut self.status),
            "statusmsg" => Some(&mut self.status_message),
            _ => None,
        }
    }
}

/// Usage of one resource (disk, memory or bandwidth), in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HardwareUsage {
    /// Total capacity.
    pub total: i64,
    /// Amount in use.
    pub used: i64,
    /// Amount left.
    pub free: i64,
    /// Percentage in use, as reported by the panel.
    pub percent_used: i64,
}

impl HardwareUsage {
    /// Presentation form with unit suffixes and a `%` sign.
    #[must_use]
    pub fn display(&self) -> HardwareUsageDisplay {
        HardwareUsageDisplay {
            total: format_signed_bytes(self.total),
            used: format_signed_bytes(self.used),
            free: format_signed_bytes(self.free),
            percent_used: format!("{}%", self.percent_used),
        }
    }
}

/// [`HardwareUsage`] rendered for people, e.g. `{"total": "10.00GB", "percent_used": "40%"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardwareUsageDisplay {
    /// Total capacity with unit.
    pub total: String,
    /// Amount in use with unit.
    pub used: String,
    /// Amount left with unit.
    pub free: String,
    /// Percentage in use followed by `%`.
    pub percent_used: String,
}

/// Point-in-time view of a virtual server, returned by
/// [`VirtualMachineClient::status`].
///
/// A snapshot is not kept in sync; call [`refresh`](Self::refresh) to replace its contents with
/// a fresh query.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualMachineSnapshot {
    #[serde(skip)]
    client: VirtualMachineClient,
    /// Hostname of the virtual server.
    pub hostname: String,
    /// Main IP address.
    pub main_ip: String,
    /// Every assigned IP address.
    #[serde(rename = "ipaddress")]
    pub ip_addresses: Vec<String>,
    /// Disk usage.
    #[serde(rename = "hdd")]
    pub disk: HardwareUsage,
    /// Bandwidth usage.
    #[serde(rename = "bandwith")]
    pub bandwidth: HardwareUsage,
    /// Memory usage.
    pub memory: HardwareUsage,
    /// Run state of the virtual server (e.g. `online`, `offline`).
    pub status: String,
}

impl VirtualMachineSnapshot {
    /// Map a successful `info` response into a snapshot bound to `client`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Remote`] if the response is not a success and
    /// [`Error::MalformedUsage`] if any usage quadruple cannot be parsed.
    pub fn from_response(client: VirtualMachineClient, response: RawStatusResponse) -> Result<Self> {
        let response = response.into_result()?;

        Ok(Self {
            disk: parse_usage("hdd", &response.hdd)?,
            bandwidth: parse_usage("bw", &response.bw)?,
            memory: parse_usage("mem", &response.mem)?,
            ip_addresses: split_addresses(&response.ip_addresses),
            main_ip: response.ip_address,
            hostname: response.hostname,
            status: response.vm_state,
            client,
        })
    }

    /// The client this snapshot was fetched with.
    #[must_use]
    pub fn client(&self) -> &VirtualMachineClient {
        &self.client
    }

    /// Re-query the panel and replace every field with the new values.
    ///
    /// On error the snapshot is left unchanged.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`VirtualMachineClient::status`].
    pub async fn refresh(&mut self) -> Result<()> {
        let fresh = self.client.status().await?;
        *self = fresh;
        Ok(())
    }

    /// Presentation view: sizes with unit suffixes, percentages with `%`.
    #[must_use]
    pub fn display(&self) -> SnapshotDisplay<'_> {
        SnapshotDisplay {
            hostname: &self.hostname,
            main_ip: &self.main_ip,
            ip_addresses: &self.ip_addresses,
            disk: self.disk.display(),
            bandwidth: self.bandwidth.display(),
            memory: self.memory.display(),
            status: &self.status,
        }
    }

    /// Compact JSON with raw numbers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON of the [`display`](Self::display) view, one element per line and no indentation.
    ///
    /// Same as `to_display_json_indent("", "")`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_display_json(&self) -> Result<String> {
        self.to_display_json_indent("", "")
    }

    /// Indented JSON of the [`display`](Self::display) view.
    ///
    /// Each element starts on a new line; every line after the first begins with `prefix`
    /// followed by one `indent` per nesting level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_display_json_indent(&self, prefix: &str, indent: &str) -> Result<String> {
        to_json_indent(&self.display(), prefix, indent)
    }
}

/// Borrowed presentation view of a [`VirtualMachineSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDisplay<'a> {
    /// Hostname of the virtual server.
    pub hostname: &'a str,
    /// Main IP address.
    pub main_ip: &'a str,
    /// Every assigned IP address.
    #[serde(rename = "ipaddress")]
    pub ip_addresses: &'a [String],
    /// Disk usage.
    #[serde(rename = "hdd")]
    pub disk: HardwareUsageDisplay,
    /// Bandwidth usage.
    #[serde(rename = "bandwith")]
    pub bandwidth: HardwareUsageDisplay,
    /// Memory usage.
    pub memory: HardwareUsageDisplay,
    /// Run state of the virtual server.
    pub status: &'a str,
}

fn to_json_indent<T: Serialize>(value: &T, prefix: &str, indent: &str) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let pretty = String::from_utf8(buffer).map_err(|err| Error::Serialization(err.to_string()))?;
    if prefix.is_empty() {
        return Ok(pretty);
    }
    // Newlines inside strings are escaped, so every raw '\n' is a line break.
    Ok(pretty.replace('\n', &format!("\n{prefix}")))
}
