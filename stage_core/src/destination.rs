//! Wire model for destination connectors as served by the platform API.

use crate::property_list::ConfigMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A destination connector record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Platform-assigned id; numeric on some deployments, so accept both.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Connector type, e.g. `postgresql`. Not editable.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Persisted properties. Missing or null loads as an empty map.
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: ConfigMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vaults: Vec<Value>,
}

/// Body of an edit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPatch {
    pub name: String,
    pub description: String,
    pub config: ConfigMap,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Human label for a connector type, falling back to the raw type.
pub fn connector_display_name(kind: &str) -> &str {
    match kind.to_ascii_lowercase().as_str() {
        "postgresql" | "postgres" => "PostgreSQL",
        "mysql" => "MySQL",
        "mariadb" => "MariaDB",
        "mongodb" | "mongo" => "MongoDB",
        "oracle" => "Oracle",
        "sqlserver" => "SQL Server",
        "db2" => "Db2",
        "kafka" => "Apache Kafka",
        "pulsar" => "Apache Pulsar",
        "rabbitmq" => "RabbitMQ",
        "nats-jetstream" | "nats" => "NATS JetStream",
        "redis" => "Redis",
        "kinesis" => "Amazon Kinesis",
        "pubsub" => "Google Cloud Pub/Sub",
        "eventhubs" => "Azure Event Hubs",
        "http" => "HTTP",
        "infinispan" => "Infinispan",
        _ => kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_keeps_config_order() {
        let raw = json!({
            "id": 7,
            "type": "postgresql",
            "name": "Orders DB",
            "description": null,
            "config": {"port": "5432", "host": "db.local"}
        });
        let dest: Destination = serde_json::from_value(raw).unwrap();
        assert_eq!(dest.id, "7");
        assert_eq!(dest.description, "");
        let keys: Vec<_> = dest.config.keys().cloned().collect();
        assert_eq!(keys, vec!["port", "host"]);
    }

    #[test]
    fn test_deserialize_missing_config() {
        let raw = json!({"id": "d1", "type": "kafka", "name": "x"});
        let dest: Destination = serde_json::from_value(raw).unwrap();
        assert!(dest.config.is_empty());
        assert!(dest.vaults.is_empty());
    }

    #[test]
    fn test_deserialize_null_name() {
        let raw = json!({"id": "d1", "type": "kafka", "name": null, "config": {}});
        let dest: Destination = serde_json::from_value(raw).unwrap();
        assert_eq!(dest.name, "");

        let raw = json!({"id": "d1", "type": "kafka"});
        let dest: Destination = serde_json::from_value(raw).unwrap();
        assert_eq!(dest.name, "");
    }

    #[test]
    fn test_patch_serialization() {
        let patch = DestinationPatch {
            name: "n".to_string(),
            description: "d".to_string(),
            config: ConfigMap::from([("a".to_string(), "1".to_string())]),
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({"name": "n", "description": "d", "config": {"a": "1"}}));
    }

    #[test]
    fn test_connector_display_name() {
        assert_eq!(connector_display_name("postgresql"), "PostgreSQL");
        assert_eq!(connector_display_name("Kafka"), "Apache Kafka");
        assert_eq!(connector_display_name("custom-sink"), "custom-sink");
    }
}
