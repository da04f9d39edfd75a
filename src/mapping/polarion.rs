// src/mapping/polarion.rs
//! Polarion REST API client for test case work item queries.

use super::query::{TestCaseRecord, WorkItemSource};
use crate::config::PolarionConfig;
use crate::error::{PrepError, Result};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TEST_CASE_SCOPE: &str = "type:testcase";

pub struct PolarionClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct WorkItemsPage {
    #[serde(default)]
    data: Vec<WorkItemResource>,
    #[serde(default)]
    links: Option<PageLinks>,
}

#[derive(Debug, Deserialize)]
struct PageLinks {
    #[serde(default)]
    next: Option<String>,
}

impl WorkItemsPage {
    /// Whether another page follows. `links.next` is authoritative when the
    /// server sends links, since it may cap `page[size]` below the request.
    fn has_more(&self, requested_size: usize) -> bool {
        match &self.links {
            Some(links) => links.next.is_some(),
            None => !self.data.is_empty() && self.data.len() >= requested_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkItemResource {
    id: String,
    #[serde(default)]
    attributes: WorkItemAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct WorkItemAttributes {
    title: Option<String>,
    #[serde(rename = "testCaseID")]
    test_case_id: Option<String>,
}

impl From<WorkItemResource> for TestCaseRecord {
    fn from(res: WorkItemResource) -> Self {
        // REST IDs are `<project>/<work item>`.
        let work_item_id = res
            .id
            .rsplit_once('/')
            .map_or(res.id.as_str(), |(_, id)| id)
            .to_string();
        Self {
            work_item_id,
            test_case_id: res.attributes.test_case_id,
            title: res.attributes.title,
        }
    }
}

impl PolarionClient {
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<String>, page_size: usize) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            page_size: page_size.max(1),
        })
    }

    /// # Errors
    /// Returns error if no server URL is configured.
    pub fn from_config(config: &PolarionConfig) -> Result<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            PrepError::Config("no Polarion URL (set polarion.url or POLARION_URL)".into())
        })?;
        Self::new(url, config.token.clone(), config.page_size)
    }

    fn fetch_page(&self, url: &str, query: &str, fields: &str, page: usize) -> Result<WorkItemsPage> {
        let size = self.page_size.to_string();
        let number = page.to_string();
        let mut req = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("query", query),
                ("fields[workitems]", fields),
                ("page[size]", size.as_str()),
                ("page[number]", number.as_str()),
            ]);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PrepError::Remote(format!("{url} returned {status}")));
        }
        Ok(resp.json()?)
    }
}

fn scope_to_test_cases(query: &str) -> String {
    if query.trim().is_empty() {
        TEST_CASE_SCOPE.to_string()
    } else {
        format!("{TEST_CASE_SCOPE} AND ({query})")
    }
}

impl WorkItemSource for PolarionClient {
    fn query(&self, query: &str, fields: &[&str], project: &str) -> Result<Vec<TestCaseRecord>> {
        let url = format!("{}/polarion/rest/v1/projects/{project}/workitems", self.base_url);
        let scoped = scope_to_test_cases(query);
        let fields = fields.join(",");

        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let mut batch = self.fetch_page(&url, &scoped, &fields, page)?;
            let more = batch.has_more(self.page_size);
            records.extend(batch.data.drain(..).map(TestCaseRecord::from));
            if !more {
                break;
            }
            page += 1;
        }
        tracing::debug!(project, query = scoped.as_str(), matches = records.len(), "polarion query");
        Ok(records)
    }
}
