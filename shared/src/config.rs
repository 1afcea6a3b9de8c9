use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpError, ValidatedUrl};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_LIST_ROUTE: &str = "/";

/// Runtime settings handed over by the shell at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub api_base_url: String,
    pub asset_base_url: String,
    pub list_route: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            asset_base_url: DEFAULT_ASSET_BASE_URL.into(),
            list_route: DEFAULT_LIST_ROUTE.into(),
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), HttpError> {
        self.api_base()?;
        ValidatedUrl::new(self.asset_base_url.as_str())?;
        if !self.list_route.starts_with('/') {
            return Err(HttpError::InvalidRequest {
                reason: format!("list route '{}' must start with '/'", self.list_route),
            });
        }
        Ok(())
    }

    pub fn api_base(&self) -> Result<ValidatedUrl, HttpError> {
        ValidatedUrl::new(self.api_base_url.as_str())
    }

    /// Display URL for a stored image path: the asset base and the path joined
    /// by a single slash. Paths that are already absolute are returned as-is.
    pub fn asset_url(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        let lower = path.to_ascii_lowercase();
        if ["http://", "https://", "data:", "blob:"]
            .iter()
            .any(|prefix| lower.starts_with(prefix))
        {
            return Some(path.to_string());
        }

        Some(format!(
            "{}/{}",
            self.asset_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}
