use serde::{Deserialize, Serialize};

/// AWS client configuration.
///
/// Credentials come from the standard chain (environment, profile, instance
/// profile); only the region and an optional endpoint override live here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    /// AWS region (e.g., "us-east-1"). Falls back to the environment when
    /// omitted.
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint URL override for both the Firehose and Athena clients
    /// (useful for localstack testing).
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl AwsConfig {
    /// Load the shared SDK config with the configured region applied.
    pub async fn load_sdk_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::from_env();
        if let Some(region) = &self.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        loader.load().await
    }
}
