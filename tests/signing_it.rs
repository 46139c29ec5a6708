mod support;

// crates.io
use time::Duration;
// self
use accesskey_proxy::{
	auth::Credentials,
	signing::{self, CanonicalHeaders, HttpMethod, SignedRequestSpec},
	url::Url,
};
use support::*;

fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse signing test URL.")
}

fn token_spec() -> SignedRequestSpec {
	SignedRequestSpec::new(
		HttpMethod::Post,
		url("https://api.ncr.com/security/security-tokens"),
		fixed_instant(),
	)
	.content_type("application/json")
	.organization(ORGANIZATION)
}

fn digest(credentials: &Credentials, spec: &SignedRequestSpec) -> String {
	signing::sign(credentials, spec).expect("Signing should succeed for valid input.").digest_base64
}

#[test]
fn known_answer_vectors_match() {
	let credentials = credentials();
	let roles = SignedRequestSpec::new(
		HttpMethod::Get,
		url("https://api.ncr.com/security/role-grants/user-grants/self/effective-roles"),
		fixed_instant(),
	)
	.content_type("application/json")
	.organization(ORGANIZATION);
	let with_query = SignedRequestSpec::new(
		HttpMethod::Get,
		url("https://host.test/a/b?x=1&y=2"),
		fixed_instant(),
	)
	.organization(ORGANIZATION);

	assert_eq!(digest(&credentials, &token_spec()), TOKEN_DIGEST);
	assert_eq!(digest(&credentials, &roles), ROLES_DIGEST);
	assert_eq!(
		digest(&credentials, &with_query),
		"65ky81bK5mUm+f5pvojxOMn2pHw/ow4vx3zot/wrTnerCN2ZSgndnCW5gxc3gOC74BcOR6kSK/b1nfg9Vu+VRA=="
	);
}

#[test]
fn signing_is_deterministic() {
	let credentials = credentials();
	let first = signing::sign(&credentials, &token_spec()).expect("First signature should build.");
	let second =
		signing::sign(&credentials, &token_spec()).expect("Second signature should build.");

	assert_eq!(first, second);
	assert_eq!(first.to_string(), format!("{SHARED_KEY}:{TOKEN_DIGEST}"));
	assert_eq!(first.authorization_header(), format!("AccessKey {SHARED_KEY}:{TOKEN_DIGEST}"));
}

#[test]
fn every_input_changes_the_digest() {
	let credentials = credentials();
	let baseline = digest(&credentials, &token_spec());
	let mut get = token_spec();

	get.method = HttpMethod::Get;

	let variants = [
		("method", digest(&credentials, &get)),
		(
			"path",
			digest(&credentials, &SignedRequestSpec {
				url: url("https://api.ncr.com/security/security-token"),
				..token_spec()
			}),
		),
		(
			"query",
			digest(&credentials, &SignedRequestSpec {
				url: url("https://api.ncr.com/security/security-tokens?a=1"),
				..token_spec()
			}),
		),
		("content type", digest(&credentials, &token_spec().content_type("application/xml"))),
		("organization", digest(&credentials, &token_spec().organization("test-orh"))),
		(
			"timestamp",
			digest(&credentials, &SignedRequestSpec {
				timestamp: fixed_instant() + Duration::seconds(1),
				..token_spec()
			}),
		),
		(
			"secret key",
			digest(
				&Credentials::new("s3cr3u", SHARED_KEY, ORGANIZATION)
					.expect("Variant credentials should be valid."),
				&token_spec(),
			),
		),
	];

	for (input, variant) in variants {
		assert_ne!(variant, baseline, "Changing the {input} must change the digest.");
	}

	let other_shared = Credentials::new(SECRET_KEY, "shared-kez", ORGANIZATION)
		.expect("Variant credentials should be valid.");
	let signature =
		signing::sign(&other_shared, &token_spec()).expect("Variant signature should build.");

	assert_ne!(signature.to_string(), format!("{SHARED_KEY}:{baseline}"));
}

#[test]
fn every_optional_header_changes_the_digest() {
	let credentials = credentials();
	let full = CanonicalHeaders {
		content_type: Some("application/json".into()),
		content_md5: Some("md5-a".into()),
		application_key: Some("app-a".into()),
		correlation_id: Some("corr-a".into()),
		organization: Some(ORGANIZATION.into()),
		service_version: Some("1".into()),
	};
	let baseline = digest(&credentials, &token_spec().headers(full.clone()));
	let variants = [
		(
			"content-md5",
			CanonicalHeaders { content_md5: Some("md5-b".into()), ..full.clone() },
		),
		(
			"application-key",
			CanonicalHeaders { application_key: Some("app-b".into()), ..full.clone() },
		),
		(
			"correlation-id",
			CanonicalHeaders { correlation_id: Some("corr-b".into()), ..full.clone() },
		),
		(
			"service-version",
			CanonicalHeaders { service_version: Some("2".into()), ..full.clone() },
		),
		("content-md5 removal", CanonicalHeaders { content_md5: None, ..full.clone() }),
	];

	for (header, headers) in variants {
		assert_ne!(
			digest(&credentials, &token_spec().headers(headers)),
			baseline,
			"Changing the {header} header must change the digest."
		);
	}
	assert_eq!(
		signing::canonical_string(&token_spec().headers(full)),
		"POST\n/security/security-tokens\napplication/json\nmd5-a\napp-a\ncorr-a\ntest-org\n1"
	);
}

#[test]
fn empty_header_matches_absent_header() {
	let credentials = credentials();
	let empty = SignedRequestSpec::new(
		HttpMethod::Post,
		url("https://api.ncr.com/security/security-tokens"),
		fixed_instant(),
	)
	.content_type("")
	.organization(ORGANIZATION);
	let absent = SignedRequestSpec::new(
		HttpMethod::Post,
		url("https://api.ncr.com/security/security-tokens"),
		fixed_instant(),
	)
	.organization(ORGANIZATION);

	assert_eq!(signing::canonical_string(&empty), signing::canonical_string(&absent));
	assert_eq!(digest(&credentials, &empty), digest(&credentials, &absent));
}

#[test]
fn later_header_shifts_up_when_earlier_ones_are_absent() {
	let spec = token_spec().headers(CanonicalHeaders {
		correlation_id: Some("corr-1".into()),
		service_version: Some("2".into()),
		..Default::default()
	});

	assert_eq!(signing::canonical_string(&spec), "POST\n/security/security-tokens\ncorr-1\n2");
}

#[test]
fn subsecond_precision_does_not_affect_signature() {
	let credentials = credentials();
	let truncated = SignedRequestSpec {
		timestamp: fixed_instant().replace_millisecond(0).expect("Zero milliseconds is valid."),
		..token_spec()
	};

	assert_eq!(digest(&credentials, &truncated), TOKEN_DIGEST);
}
