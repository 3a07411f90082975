use serde::Deserialize;

/// Which [`DeviceFarm`](crate::DeviceFarm) implementation the process talks to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VendorMode {
    /// AWS Device Farm through the official SDK.
    Aws,
    /// In-process vendor that keeps everything in memory.
    #[default]
    Memory,
}

/// Vendor account configuration. Read once at startup, never mutated.
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceFarmConfig {
    #[serde(default)]
    pub mode: VendorMode,
    /// AWS region. Device Farm only runs in us-west-2. Default: "us-west-2".
    #[serde(default = "default_region")]
    pub region: String,
    /// Static access key. Falls back to the default AWS credential chain when unset.
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Endpoint override. Default: `https://devicefarm.<region>.amazonaws.com`.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn default_region() -> String {
    "us-west-2".into()
}

impl DeviceFarmConfig {
    pub fn endpoint(&self) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://devicefarm.{}.amazonaws.com", self.region))
    }
}

impl Default for DeviceFarmConfig {
    fn default() -> Self {
        Self {
            mode: VendorMode::default(),
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
        }
    }
}
