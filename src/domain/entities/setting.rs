use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    Global,
    Daily,
}

impl std::fmt::Display for SettingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingType::Global => write!(f, "global"),
            SettingType::Daily => write!(f, "daily"),
        }
    }
}

impl FromStr for SettingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(SettingType::Global),
            "daily" => Ok(SettingType::Daily),
            other => Err(format!("invalid setting type '{}', expected global or daily", other)),
        }
    }
}

/// One settings row per type; the payload is an opaque JSON blob owned by
/// the dashboard forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_setting_type_parse() {
        assert_eq!("global".parse::<SettingType>().unwrap(), SettingType::Global);
        assert!("weekly".parse::<SettingType>().is_err());
    }

    #[test]
    fn test_setting_wire_shape() {
        let setting = Setting {
            id: 1,
            setting_type: SettingType::Daily,
            data: json!({"maxLoss": 500}),
        };
        let value = serde_json::to_value(&setting).unwrap();
        assert_eq!(value["type"], "daily");
        assert_eq!(value["data"]["maxLoss"], 500);
    }
}
