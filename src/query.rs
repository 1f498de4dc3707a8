//! Service list discovery query URLs

use serde::{Deserialize, Serialize};

/// A filter value: `Name=value` for one, `Name[]=value` per entry for many
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::One(value.to_string())
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Many(values)
    }
}

impl QueryValue {
    fn push_params(&self, name: &str, params: &mut Vec<String>) {
        match self {
            QueryValue::One(value) if !value.is_empty() => {
                params.push(format!("{}={}", name, urlencoding::encode(value)));
            }
            QueryValue::Many(values) => {
                for value in values.iter().filter(|v| !v.is_empty()) {
                    params.push(format!("{}[]={}", name, urlencoding::encode(value)));
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceListQuery {
    pub provider_name: Option<QueryValue>,
    pub language: Option<QueryValue>,
    pub genre: Option<QueryValue>,
    pub target_country: Option<QueryValue>,
    #[serde(default)]
    pub regulator_list: bool,
}

impl ServiceListQuery {
    /// Append the filters to `base_url`. No filters leaves it unchanged.
    pub fn build(&self, base_url: &str) -> String {
        let mut params = Vec::new();
        let filters = [
            ("ProviderName", &self.provider_name),
            ("Language", &self.language),
            ("Genre", &self.genre),
            ("TargetCountry", &self.target_country),
        ];
        for (name, value) in filters {
            if let Some(value) = value {
                value.push_params(name, &mut params);
            }
        }
        if self.regulator_list {
            params.push("regulatorListFlag=true".to_string());
        }

        if params.is_empty() {
            base_url.to_string()
        } else {
            format!("{}?{}", base_url, params.join("&"))
        }
    }
}
