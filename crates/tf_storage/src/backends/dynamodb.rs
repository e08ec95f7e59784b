//! DynamoDB table with `url` as the partition key.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tf_core::{CacheEntry, Config, Error, Result, ResultCache};
use tracing::debug;

use crate::StorageBackend;

pub struct DynamoDbCache {
    client: Client,
    table_name: String,
}

impl DynamoDbCache {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl StorageBackend for DynamoDbCache {
    fn get_error_message() -> &'static str {
        "DynamoDB should be reachable with the ambient AWS credentials"
    }

    async fn from_config(config: &Config) -> Result<Self> {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.dynamodb_endpoint {
            debug!("Using custom DynamoDB endpoint {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }
        Ok(Self::new(Client::from_conf(builder.build()), &config.table_name))
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, key: &str) -> Option<String> {
    item.get(key).and_then(|value| value.as_s().ok()).cloned()
}

#[async_trait]
impl ResultCache for DynamoDbCache {
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("url", AttributeValue::S(url.to_string()))
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Error retrieving from DynamoDB: {}", DisplayErrorContext(&e))))?;

        Ok(output.item().map(|item| CacheEntry {
            url: url.to_string(),
            result: string_attr(item, "result"),
            updated: string_attr(item, "updated"),
        }))
    }

    async fn put(&self, entry: &CacheEntry) -> Result<()> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("url", AttributeValue::S(entry.url.clone()));
        if let Some(result) = &entry.result {
            request = request.item("result", AttributeValue::S(result.clone()));
        }
        if let Some(updated) = &entry.updated {
            request = request.item("updated", AttributeValue::S(updated.clone()));
        }

        request
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Error saving to DynamoDB: {}", DisplayErrorContext(&e))))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_attr() {
        let mut item = HashMap::new();
        item.insert("result".to_string(), AttributeValue::S("{}".to_string()));
        item.insert("updated".to_string(), AttributeValue::N("42".to_string()));

        assert_eq!(string_attr(&item, "result").as_deref(), Some("{}"));
        // non-string values are treated as absent
        assert!(string_attr(&item, "updated").is_none());
        assert!(string_attr(&item, "missing").is_none());
    }
}
