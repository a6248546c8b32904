use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ticketbox_core::{Issue, IssueLink, LinkType};

use crate::http::{handle_response, is_not_found, transport_error, HttpClient};
use crate::{IssueTracker, SearchPage, TrackerError};

const ISSUE_FIELDS: &str = "summary,description,comment";
const LINK_FIELDS: &str = "issuelinks";

/// Jira REST API v2 client.
#[derive(Debug, Clone)]
pub struct JiraService {
    http: HttpClient,
}

impl JiraService {
    pub fn new(base_url: &str, auth_header: String) -> Result<Self, TrackerError> {
        Ok(Self {
            http: HttpClient::new(base_url, auth_header)?,
        })
    }

    /// Echo every outbound call to stdout.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.http.set_verbose(verbose);
        self
    }
}

#[async_trait]
impl IssueTracker for JiraService {
    async fn get_issue(&self, key: &str) -> Result<Option<Issue>, TrackerError> {
        let mut url = self.http.endpoint(&format!("rest/api/2/issue/{key}"))?;
        url.query_pairs_mut().append_pair("fields", ISSUE_FIELDS);

        let resp = self.http.get(url).await?;
        if is_not_found(&resp) {
            return Ok(None);
        }
        let issue: JiraIssue = handle_response(resp, &format!("Failed to get {key}")).await?;
        Ok(Some(issue.into()))
    }

    async fn post_comment(&self, key: &str, body: &str) -> Result<(), TrackerError> {
        let url = self.http.endpoint(&format!("rest/api/2/issue/{key}/comment"))?;
        let resp = self.http.post_json(url, &NewComment { body }).await?;
        if !resp.status().is_success() {
            return Err(transport_error(resp, &format!("Failed to post comment on {key}")).await);
        }
        Ok(())
    }

    async fn search_issues(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage, TrackerError> {
        let mut url = self.http.endpoint("rest/api/2/search")?;
        url.query_pairs_mut()
            .append_pair("jql", jql)
            .append_pair("fields", LINK_FIELDS)
            .append_pair("startAt", &start_at.to_string())
            .append_pair("maxResults", &max_results.to_string());

        let resp = self.http.get(url).await?;
        let page: JiraSearchResponse = handle_response(resp, "Failed to search issues").await?;
        Ok(SearchPage {
            total: page.total,
            issues: page.issues.into_iter().map(Issue::from).collect(),
        })
    }
}

// Jira API payloads

#[derive(Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    #[serde(default)]
    fields: JiraFields,
}

#[derive(Debug, Default, Deserialize)]
struct JiraFields {
    summary: Option<String>,
    description: Option<String>,
    comment: Option<JiraCommentField>,
    #[serde(default)]
    issuelinks: Vec<JiraIssueLink>,
}

#[derive(Debug, Deserialize)]
struct JiraCommentField {
    #[serde(default)]
    comments: Vec<JiraComment>,
}

#[derive(Debug, Deserialize)]
struct JiraComment {
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct JiraIssueLink {
    #[serde(rename = "type")]
    link_type: JiraLinkType,
    #[serde(rename = "outwardIssue")]
    outward_issue: Option<JiraIssueRef>,
}

#[derive(Debug, Deserialize)]
struct JiraLinkType {
    #[serde(default)]
    inward: String,
    #[serde(default)]
    outward: String,
}

#[derive(Debug, Deserialize)]
struct JiraIssueRef {
    key: String,
}

#[derive(Debug, Deserialize)]
struct JiraSearchResponse {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

impl From<JiraIssue> for Issue {
    fn from(issue: JiraIssue) -> Self {
        let fields = issue.fields;
        // Links where this issue is the inward side carry `inwardIssue`
        // instead and are not ours to mirror.
        let outward_links = fields
            .issuelinks
            .into_iter()
            .filter_map(|link| {
                let target = link.outward_issue?;
                Some(IssueLink {
                    link_type: LinkType::new(link.link_type.outward, link.link_type.inward),
                    target_key: target.key,
                })
            })
            .collect();

        Issue {
            key: issue.key,
            summary: fields.summary,
            description: fields.description,
            comments: fields
                .comment
                .map(|c| c.comments.into_iter().map(|c| c.body).collect())
                .unwrap_or_default(),
            outward_links,
        }
    }
}
