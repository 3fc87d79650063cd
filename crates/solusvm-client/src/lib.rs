//! Client and data models for the SolusVM client API.
//!
//! Provides an asynchronous client that boots, reboots and shuts down a virtual server and
//! queries its status, decoding the panel's XML answers into typed snapshots.
//!
//! ```no_run
//! # async fn run() -> solusvm_client::Result<()> {
//! use solusvm_client::VirtualMachineClient;
//!
//! let client = VirtualMachineClient::new("https://panel.example.com:5656", "KEY", "HASH")?;
//! let snapshot = client.status().await?;
//! println!("{} is {}", snapshot.hostname, snapshot.status);
//! println!("{}", snapshot.to_display_json_indent("", "  ")?);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod decode;
pub mod models;
pub mod transport;

pub use client::{Action, VirtualMachineClient, VirtualMachineClientBuilder};
pub use decode::{decode_response, parse_usage};
pub use models::{
    HardwareUsage, HardwareUsageDisplay, RawStatusResponse, SnapshotDisplay,
    VirtualMachineSnapshot,
};
pub use transport::{HttpTransport, Transport};

/// Convenient result alias that reuses the shared SolusVM error type.
pub type Result<T> = solusvm_core::Result<T>;
