//! Provider configuration
//!
//! Every setting is read from the provider block first and falls back to a
//! `GENESYSCLOUD_*` environment variable.

use thiserror::Error;
use tfcore::{AttributePath, DynamicValue};

use crate::api::{ApiError, Client, Credentials};

pub const ACCESS_TOKEN_ENV: &str = "GENESYSCLOUD_ACCESS_TOKEN";
pub const CLIENT_ID_ENV: &str = "GENESYSCLOUD_OAUTHCLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "GENESYSCLOUD_OAUTHCLIENT_SECRET";
pub const REGION_ENV: &str = "GENESYSCLOUD_REGION";
pub const GATEWAY_PROTOCOL_ENV: &str = "GENESYSCLOUD_GATEWAY_PROTOCOL";
pub const GATEWAY_HOST_ENV: &str = "GENESYSCLOUD_GATEWAY_HOST";
pub const GATEWAY_PORT_ENV: &str = "GENESYSCLOUD_GATEWAY_PORT";
pub const BYPASS_CONSISTENCY_CHECKER_ENV: &str = "BYPASS_CONSISTENCY_CHECKER";

pub const DEFAULT_REGION: &str = "us-east-1";

const REGIONS: &[(&str, &str)] = &[
    ("dca", "inindca.com"),
    ("tca", "inintca.com"),
    ("us-east-1", "mypurecloud.com"),
    ("us-east-2", "use2.us-gov-pure.cloud"),
    ("us-west-2", "usw2.pure.cloud"),
    ("eu-west-1", "mypurecloud.ie"),
    ("eu-west-2", "euw2.pure.cloud"),
    ("ap-southeast-2", "mypurecloud.com.au"),
    ("ap-northeast-1", "mypurecloud.jp"),
    ("eu-central-1", "mypurecloud.de"),
    ("ca-central-1", "cac1.pure.cloud"),
    ("ap-northeast-2", "apne2.pure.cloud"),
    ("ap-south-1", "aps1.pure.cloud"),
    ("sa-east-1", "sae1.pure.cloud"),
    ("ap-northeast-3", "apne3.pure.cloud"),
    ("eu-central-2", "euc2.pure.cloud"),
    ("me-central-1", "mec1.pure.cloud"),
    ("mx-central-1", "mxc1.pure.cloud"),
    ("ap-southeast-1", "apse1.pure.cloud"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("access_token or both oauthclient_id and oauthclient_secret are required (set in provider config or {ACCESS_TOKEN_ENV} / {CLIENT_ID_ENV} / {CLIENT_SECRET_ENV} env vars)")]
    MissingCredentials,

    #[error("aws_region {0} is not a known Genesys Cloud region")]
    UnknownRegion(String),

    #[error("gateway {0} is required when a gateway is configured")]
    IncompleteGateway(&'static str),

    #[error("gateway {0} is not a valid base URL: {1}")]
    InvalidGateway(String, url::ParseError),

    #[error("Failed to create API client: {0}")]
    Client(#[from] ApiError),
}

pub fn allowed_regions() -> Vec<&'static str> {
    REGIONS.iter().map(|(region, _)| *region).collect()
}

pub fn region_domain(region: &str) -> Option<&'static str> {
    let region = region.to_lowercase();
    REGIONS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, domain)| *domain)
}

/// Replaces both the API and the login host, typically for a local proxy
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub protocol: String,
    pub host: String,
    pub port: Option<String>,
}

impl GatewayConfig {
    pub fn base_url(&self) -> String {
        match &self.port {
            Some(port) => format!("{}://{}:{}", self.protocol, self.host, port),
            None => format!("{}://{}", self.protocol, self.host),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub credentials: Credentials,
    pub aws_region: String,
    pub gateway: Option<GatewayConfig>,
    pub consistency_checks: bool,
}

fn setting(config: &DynamicValue, path: &AttributePath, env: &str) -> Option<String> {
    config
        .get_string(path)
        .ok()
        .or_else(|| std::env::var(env).ok())
        .filter(|v| !v.is_empty())
}

fn gateway_path(name: &str) -> AttributePath {
    AttributePath::new("gateway").index(0).attribute(name)
}

impl ProviderConfig {
    /// Reads the provider block, falling back to the environment
    pub fn from_config(config: &DynamicValue) -> Result<Self, ConfigError> {
        let access_token = setting(config, &AttributePath::new("access_token"), ACCESS_TOKEN_ENV);
        let client_id = setting(config, &AttributePath::new("oauthclient_id"), CLIENT_ID_ENV);
        let client_secret = setting(
            config,
            &AttributePath::new("oauthclient_secret"),
            CLIENT_SECRET_ENV,
        );

        let credentials = match (access_token, client_id, client_secret) {
            (Some(token), _, _) => Credentials::AccessToken(token),
            (None, Some(client_id), Some(client_secret)) => Credentials::ClientCredentials {
                client_id,
                client_secret,
            },
            _ => return Err(ConfigError::MissingCredentials),
        };

        let aws_region = setting(config, &AttributePath::new("aws_region"), REGION_ENV)
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
            .to_lowercase();
        if region_domain(&aws_region).is_none() {
            return Err(ConfigError::UnknownRegion(aws_region));
        }

        let protocol = setting(config, &gateway_path("protocol"), GATEWAY_PROTOCOL_ENV);
        let host = setting(config, &gateway_path("host"), GATEWAY_HOST_ENV);
        let port = setting(config, &gateway_path("port"), GATEWAY_PORT_ENV);
        let gateway = match (protocol, host) {
            (None, None) if port.is_none() => None,
            (Some(protocol), Some(host)) => {
                let gateway = GatewayConfig {
                    protocol,
                    host,
                    port,
                };
                let base_url = gateway.base_url();
                if let Err(e) = url::Url::parse(&base_url) {
                    return Err(ConfigError::InvalidGateway(base_url, e));
                }
                Some(gateway)
            }
            (None, _) => return Err(ConfigError::IncompleteGateway("protocol")),
            (_, None) => return Err(ConfigError::IncompleteGateway("host")),
        };

        let consistency_checks = config
            .get_bool(&AttributePath::new("consistency_checks"))
            .ok()
            .or_else(|| {
                std::env::var(BYPASS_CONSISTENCY_CHECKER_ENV)
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok())
                    .map(|bypass| !bypass)
            })
            .unwrap_or(true);

        Ok(Self {
            credentials,
            aws_region,
            gateway,
            consistency_checks,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_config(&DynamicValue::object())
    }

    pub fn api_url(&self) -> String {
        match &self.gateway {
            Some(gateway) => gateway.base_url(),
            None => format!("https://api.{}", self.domain()),
        }
    }

    pub fn login_url(&self) -> String {
        match &self.gateway {
            Some(gateway) => gateway.base_url(),
            None => format!("https://login.{}", self.domain()),
        }
    }

    fn domain(&self) -> &'static str {
        region_domain(&self.aws_region).unwrap_or("mypurecloud.com")
    }

    pub fn build_client(&self) -> Result<Client, ConfigError> {
        tracing::debug!(
            "Creating API client for {} (login {})",
            self.api_url(),
            self.login_url()
        );
        Ok(Client::new(
            &self.api_url(),
            &self.login_url(),
            self.credentials.clone(),
        )?)
    }
}
