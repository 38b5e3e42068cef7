use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider rejected request: {0}")]
    Rejected(String),

    #[error("all credentials exhausted for {0}")]
    CredentialsExhausted(String),
}

/// Primary and secondary API credentials for one provider. On failure with
/// the primary, the adapter retries once with the secondary before giving up.
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

impl ProviderKeys {
    /// Credentials to attempt in order. Keyless providers get one anonymous
    /// attempt.
    pub fn attempts(&self) -> Vec<&str> {
        let keys: Vec<&str> = self
            .primary
            .iter()
            .chain(self.secondary.iter())
            .map(String::as_str)
            .collect();

        if keys.is_empty() {
            vec![""]
        } else {
            keys
        }
    }
}

/// One block-explorer endpoint (etherscan family) for one chain.
#[derive(Debug, Clone)]
pub struct ChainEndpoint {
    pub name: String,
    pub base_url: String,
    pub native_symbol: String,
    pub keys: ProviderKeys,
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Value,
}

/// Client for the etherscan-style block-explorer API family. Raw records are
/// returned unmodified; normalization happens downstream.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
}

impl ExplorerClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Fetch account records for one wallet and one action (`txlist`,
    /// `txlistinternal`, `tokentx`, `tokennfttx`), rotating from the primary
    /// to the secondary credential on failure.
    pub async fn account_records(
        &self,
        chain: &ChainEndpoint,
        address: &str,
        action: &str,
    ) -> Result<Vec<Value>, ExplorerError> {
        let mut last_err = None;

        for key in chain.keys.attempts() {
            match self.fetch_with_key(chain, address, action, key).await {
                Ok(records) => return Ok(records),
                Err(e) => {
                    tracing::debug!(
                        chain = %chain.name,
                        action = action,
                        error = %e,
                        "Explorer attempt failed, rotating credential"
                    );
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ExplorerError::CredentialsExhausted(chain.name.clone())))
    }

    async fn fetch_with_key(
        &self,
        chain: &ChainEndpoint,
        address: &str,
        action: &str,
        api_key: &str,
    ) -> Result<Vec<Value>, ExplorerError> {
        let resp = self
            .http
            .get(&chain.base_url)
            .query(&[
                ("module", "account"),
                ("action", action),
                ("address", address),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("sort", "desc"),
                ("apikey", api_key),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ExplorerResponse = resp.json().await?;

        match body.result {
            Value::Array(records) => {
                // status "0" with an empty array means "no transactions
                // found", which is data, not an error.
                if body.status.as_deref() == Some("1") || records.is_empty() {
                    Ok(records)
                } else {
                    Err(ExplorerError::Rejected(
                        body.message.unwrap_or_else(|| "unknown".into()),
                    ))
                }
            }
            _ => Err(ExplorerError::Rejected(
                body.message.unwrap_or_else(|| "malformed result".into()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_attempts_order() {
        let keys = ProviderKeys {
            primary: Some("key1".into()),
            secondary: Some("key2".into()),
        };
        assert_eq!(keys.attempts(), vec!["key1", "key2"]);
    }

    #[test]
    fn test_keyless_provider_gets_one_anonymous_attempt() {
        assert_eq!(ProviderKeys::default().attempts(), vec![""]);
    }
}
