//! traQ REST client.
//!
//! Implements both [`Notifier`] (posting reminder messages) and
//! [`ChannelSource`] (reading the public channel tree).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::channels::{ChannelSource, RawChannel};
use crate::error::UpstreamError;
use crate::notify::{format_message, Notifier};

pub struct TraqClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ChannelList {
    #[serde(default)]
    public: Vec<RawChannel>,
}

impl TraqClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for TraqClient {
    async fn send(&self, channel_id: &str, mention: &str, text: &str) -> Result<(), UpstreamError> {
        // embed lets traQ turn the @mention into a real user/group mention
        let body = json!({
            "content": format_message(mention, text),
            "embed": true,
        });
        let response = self
            .client
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ChannelSource for TraqClient {
    async fn fetch_channels(&self) -> Result<Vec<RawChannel>, UpstreamError> {
        let response = self
            .client
            .get(self.url("/channels"))
            .query(&[("include-dm", "false")])
            .bearer_auth(&self.token)
            .send()
            .await?;
        let list: ChannelList = Self::check(response).await?.json().await?;
        tracing::debug!(channels = list.public.len(), "fetched traQ channels");
        Ok(list.public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_api_urls_without_double_slashes() {
        let client = TraqClient::new("https://q.example.com/", "token", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.url("/channels/abc/messages"),
            "https://q.example.com/api/v3/channels/abc/messages"
        );
    }

    #[test]
    fn decodes_the_public_channel_list() {
        let json = r#"{
            "public": [
                {"id": "a", "parentId": null, "archived": false, "force": false,
                 "topic": "", "name": "general", "children": ["b"]},
                {"id": "b", "parentId": "a", "archived": true, "force": false,
                 "topic": "", "name": "old", "children": []}
            ],
            "dm": []
        }"#;
        let list: ChannelList = serde_json::from_str(json).unwrap();
        assert_eq!(list.public.len(), 2);
        assert_eq!(list.public[0].children, vec!["b".to_string()]);
        assert_eq!(list.public[1].parent_id.as_deref(), Some("a"));
        assert!(list.public[1].archived);
    }
}
