//! ONTAP API interaction module
//!
//! This module provides the REST plumbing for talking to an ONTAP cluster's
//! management API: credentials, the HTTP client, query construction and
//! the [`client::RestClient`] seam used by the resource adapters.
//!
//! # Module Structure
//!
//! - [`auth`] - Cluster address and basic-auth credential resolution
//! - [`client`] - `RestClient` trait and the reqwest-backed `OntapClient`
//! - [`http`] - HTTP utilities for REST API calls
//! - [`query`] - Query parameter builder
//!
//! # Example
//!
//! ```ignore
//! use lifctl::ontap::{auth::Credentials, client::{OntapClient, RestClient}};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let creds = Credentials::resolve("admin", None)?;
//!     let client = OntapClient::new("cluster1", creds, true, Duration::from_secs(60))?;
//!     let mut query = client.new_query();
//!     query.set("scope", "cluster");
//!     let (_, records) = client.get_zero_or_more_records("network/ip/interfaces", &query).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod query;

pub use client::{OntapClient, RestClient, RestResponse};
pub use http::RestError;
pub use query::Query;
