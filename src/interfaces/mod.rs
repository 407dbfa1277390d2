//! Resource adapters for network interfaces
//!
//! Each adapter translates typed configuration into ONTAP REST calls through
//! the [`crate::ontap::client::RestClient`] seam and decodes the JSON answer
//! back into typed records. Every failure is reported through
//! [`crate::error::ErrorHandler`].
//!
//! - [`ip_interface`] - IP interfaces (LIFs) under `network/ip/interfaces`

pub mod ip_interface;

pub use ip_interface::{
    create_ip_interface, delete_ip_interface, get_ip_interface, get_ip_interfaces, HomePort,
    IpAddressMask, IpInterfaceBody, IpInterfaceFilter, IpInterfaceRecord, Location, NamedRef,
    Scope,
};
