use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_DB_NAME: &str = "movies-reviews";
pub const DEFAULT_NLU_VERSION: &str = "2020-08-01";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// Printed in place of credentials when configuration is formatted with `{:?}`.
pub const REDACTED: &str = "<redacted>";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("VCAP_SERVICES is not valid JSON: {0}")]
    Binding(#[from] serde_json::Error),
}

/// Credentials and endpoint of the sentiment service.
#[derive(Clone, PartialEq)]
pub struct NluConfig {
    pub url: String,
    pub apikey: String,
    pub version: String,
}

impl fmt::Debug for NluConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NluConfig")
            .field("url", &self.url)
            .field("apikey", &REDACTED)
            .field("version", &self.version)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub enum CloudantAuth {
    Basic { username: String, password: String },
    ApiKey(String),
}

impl fmt::Debug for CloudantAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudantAuth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            CloudantAuth::ApiKey(_) => f.debug_tuple("ApiKey").field(&REDACTED).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloudantConfig {
    pub url: String,
    pub auth: CloudantAuth,
}

/// Everything the server needs, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub page_size: usize,
    pub request_timeout: Duration,
    pub iam_url: String,
    pub assets_dir: String,
    pub nlu: Option<NluConfig>,
    pub cloudant: Option<CloudantConfig>,
    pub sqlite_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let binding = match var("VCAP_SERVICES") {
            Some(raw) => serde_json::from_str::<ServiceBinding>(&raw)?,
            None => ServiceBinding::default(),
        };

        let nlu = match (var("NLU_APIKEY"), var("NLU_URL")) {
            (Some(apikey), Some(url)) => Some((apikey, url)),
            _ => binding.nlu_credentials(),
        }
        .map(|(apikey, url)| NluConfig {
            url: url.trim_end_matches('/').to_string(),
            apikey,
            version: var("NLU_VERSION").unwrap_or_else(|| DEFAULT_NLU_VERSION.to_string()),
        });

        let cloudant = cloudant_from_vars(&var).or_else(|| binding.cloudant_config());

        Ok(AppConfig {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(var("PORT"), "PORT", "a port number", DEFAULT_PORT)?,
            database_name: var("REVIEWS_DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            page_size: parse_or(var("PAGE_SIZE"), "PAGE_SIZE", "a positive integer", DEFAULT_PAGE_SIZE)?
                .max(1),
            request_timeout: Duration::from_secs(parse_or(
                var("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                "a number of seconds",
                10u64,
            )?),
            iam_url: var("IAM_URL").unwrap_or_else(|| DEFAULT_IAM_URL.to_string()),
            assets_dir: var("ASSETS_DIR").unwrap_or_else(|| "assets".to_string()),
            nlu,
            cloudant,
            sqlite_path: var("REVIEWS_SQLITE_PATH"),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
            expected,
        }),
    }
}

fn cloudant_from_vars<F>(var: &F) -> Option<CloudantConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let url = var("CLOUDANT_URL")?;
    let auth = match (var("CLOUDANT_USERNAME"), var("CLOUDANT_PASSWORD"), var("CLOUDANT_APIKEY")) {
        (Some(username), Some(password), _) => CloudantAuth::Basic { username, password },
        (_, _, Some(apikey)) => CloudantAuth::ApiKey(apikey),
        _ => return None,
    };
    Some(CloudantConfig {
        url: url.trim_end_matches('/').to_string(),
        auth,
    })
}

/// The subset of a `VCAP_SERVICES` binding this app reads.
#[derive(Debug, Default, Deserialize)]
struct ServiceBinding {
    #[serde(rename = "cloudantNoSQLDB", default)]
    cloudant: Vec<BoundService>,
    #[serde(rename = "natural-language-understanding", default)]
    nlu: Vec<BoundService>,
}

#[derive(Debug, Deserialize)]
struct BoundService {
    #[serde(default)]
    credentials: HashMap<String, serde_json::Value>,
}

impl BoundService {
    fn credential(&self, key: &str) -> Option<String> {
        self.credentials
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

impl ServiceBinding {
    fn nlu_credentials(&self) -> Option<(String, String)> {
        let service = self.nlu.first()?;
        Some((service.credential("apikey")?, service.credential("url")?))
    }

    fn cloudant_config(&self) -> Option<CloudantConfig> {
        let service = self.cloudant.first()?;
        let url = service.credential("url")?;
        let auth = match (service.credential("username"), service.credential("password")) {
            (Some(username), Some(password)) => CloudantAuth::Basic { username, password },
            _ => CloudantAuth::ApiKey(service.credential("apikey")?),
        };
        Some(CloudantConfig {
            url: url.trim_end_matches('/').to_string(),
            auth,
        })
    }
}
