use serde::Serialize;

use crate::services::profile::ProfileDocument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub profile: ProfileDocument,
}
