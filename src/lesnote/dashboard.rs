//! 仪表盘统计与当前用户资料

use serde::{Deserialize, Serialize};

use crate::lesnote::error::ClientError;
use crate::lesnote::http::ApiClient;
use crate::lesnote::session::UserProfile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_classes: u64,
    #[serde(default)]
    pub total_subjects: u64,
    #[serde(default)]
    pub total_themes: u64,
    #[serde(default)]
    pub total_topics: u64,
    #[serde(default)]
    pub total_lesson_notes: u64,
    /// 只有管理员能看到用户总数
    #[serde(default)]
    pub total_users: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct DashboardApi {
    http: ApiClient,
}

impl DashboardApi {
    pub fn new(http: ApiClient) -> Self {
        Self { http }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ClientError> {
        self.http
            .get_json("/Dashboard/stats", &[], "仪表盘统计")
            .await
    }

    pub async fn user_profile(&self) -> Result<UserProfile, ClientError> {
        self.http
            .get_json("/Dashboard/user-profile", &[], "用户资料")
            .await
    }
}
