//! AccessKey request signing and proxy dispatch: derive an HMAC-SHA512 `Authorization` header
//! for every outbound call and route inbound verbs to the token-issuance or role-lookup
//! endpoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod obs;
pub mod router;
pub mod signing;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)]
use {
	color_eyre as _, httpmock as _, parking_lot as _, tokio as _, tracing_subscriber as _,
};
