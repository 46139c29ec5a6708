//! Resolves configuration from the environment and routes one POST and one GET.
//!
//! 1. Export `ACCESSKEY_PROXY_SECRET_KEY`, `ACCESSKEY_PROXY_SHARED_KEY`, and
//!    `ACCESSKEY_PROXY_ORGANIZATION` (and optionally `ACCESSKEY_PROXY_BASE_URL`).
//! 2. Run `cargo run --example issue_token`.
//! 3. The POST relies on the operator defaults; the GET passes them explicitly as a query.

// crates.io
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
use url::form_urlencoded;
// self
use accesskey_proxy::{
	config::ProxyConfig,
	router::{InboundRequest, Router},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
		.init();

	let config = ProxyConfig::from_env()?;
	let router = Router::from_config(&config)?;
	let issued = router.respond(&InboundRequest::post("{}")).await;

	println!("POST -> {} {}", issued.status, issued.body_json()?);

	let defaults = &config.defaults;
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("secretKey", defaults.secret_key.as_ref().map_or("", |s| s.expose()))
		.append_pair("sharedKey", defaults.shared_key.as_deref().unwrap_or_default())
		.append_pair("nepOrganization", defaults.organization.as_deref().unwrap_or_default())
		.finish();
	let roles = router.respond(&InboundRequest::get(&query)).await;

	println!("GET  -> {} {}", roles.status, roles.body_json()?);

	Ok(())
}
