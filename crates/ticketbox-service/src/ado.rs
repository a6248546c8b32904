use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ticketbox_core::{Relation, WorkItem};

use crate::http::{handle_response, HttpClient};
use crate::{TrackerError, WorkItemTracker};

const API_VERSION: &str = "7.0";

/// Azure DevOps work item tracking client (read-only).
#[derive(Debug, Clone)]
pub struct AdoService {
    http: HttpClient,
}

impl AdoService {
    /// `base_url` is the organization or project URL,
    /// e.g. `https://dev.azure.com/contoso/Website`.
    pub fn new(base_url: &str, auth_header: String) -> Result<Self, TrackerError> {
        Ok(Self {
            http: HttpClient::new(base_url, auth_header)?,
        })
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.http.set_verbose(verbose);
        self
    }
}

#[async_trait]
impl WorkItemTracker for AdoService {
    async fn query_ids(&self, query: &str) -> Result<Vec<u64>, TrackerError> {
        let mut url = self.http.endpoint("_apis/wit/wiql")?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);

        let resp = self.http.post_json(url, &WiqlRequest { query }).await?;
        let result: WiqlResponse = handle_response(resp, "Failed to query work items").await?;
        Ok(result.work_items.into_iter().map(|w| w.id).collect())
    }

    async fn get_work_items(&self, ids: &[u64]) -> Result<Vec<WorkItem>, TrackerError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.http.endpoint("_apis/wit/workitems")?;
        url.query_pairs_mut()
            .append_pair("ids", &joined)
            .append_pair("$expand", "relations")
            .append_pair("api-version", API_VERSION);

        let resp = self.http.get(url).await?;
        let batch: WorkItemBatch = handle_response(resp, "Failed to get work items").await?;
        Ok(batch.value.into_iter().map(WorkItem::from).collect())
    }
}

// ADO API payloads

#[derive(Serialize)]
struct WiqlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct WiqlResponse {
    #[serde(rename = "workItems", default)]
    work_items: Vec<WorkItemRef>,
}

#[derive(Debug, Deserialize)]
struct WorkItemRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct WorkItemBatch {
    #[serde(default)]
    value: Vec<AdoWorkItem>,
}

#[derive(Debug, Deserialize)]
struct AdoWorkItem {
    id: u64,
    #[serde(default)]
    url: String,
    #[serde(default)]
    fields: AdoFields,
    #[serde(default)]
    relations: Option<Vec<AdoRelation>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdoFields {
    #[serde(rename = "System.Title", default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct AdoRelation {
    rel: String,
    url: String,
}

impl From<AdoWorkItem> for WorkItem {
    fn from(item: AdoWorkItem) -> Self {
        WorkItem {
            id: item.id,
            title: item.fields.title,
            url: item.url,
            relations: item
                .relations
                .unwrap_or_default()
                .into_iter()
                .map(|r| Relation::new(r.rel, r.url))
                .collect(),
        }
    }
}
