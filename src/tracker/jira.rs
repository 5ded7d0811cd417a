//! Jira REST client
//!
//! Implements [`IssueTracker`] over the Jira v2 REST API with basic auth.
//! Next-gen bulk linking uses the internal simplified-projects endpoint,
//! since next-gen projects reject the epic-link field at creation time.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{IssueTracker, TrackerError};
use crate::domain::{CreatedIssue, Field, NewIssue, Project, DUE_DATE_FORMAT};

/// Connection settings for a Jira instance
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,

    /// Request timeout
    pub timeout: Duration,

    /// Accept invalid TLS certificates (self-hosted instances)
    pub insecure_tls: bool,
}

impl JiraConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_secs(30),
            insecure_tls: false,
        }
    }
}

/// Project row returned by project listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// Issue row returned by search
#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub id: String,
    pub key: String,
    pub summary: String,
    pub status: Option<String>,
    pub issue_type: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Deserialize)]
struct RawIssue {
    id: String,
    key: String,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Default, Deserialize)]
struct RawFields {
    #[serde(default)]
    summary: String,
    status: Option<Named>,
    #[serde(rename = "issuetype")]
    issue_type: Option<Named>,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

impl From<RawIssue> for IssueSummary {
    fn from(raw: RawIssue) -> Self {
        Self {
            id: raw.id,
            key: raw.key,
            summary: raw.fields.summary,
            status: raw.fields.status.map(|s| s.name),
            issue_type: raw.fields.issue_type.map(|t| t.name),
        }
    }
}

/// Blocking Jira client
pub struct JiraClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, TrackerError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TrackerError::Config(
                "base URL is not set (use --base-url, JITZU_BASE_URL or the config file)"
                    .to_string(),
            ));
        }

        let http = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(format!("jitzu/{}", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()?;

        Ok(Self {
            http,
            base_url,
            username: config.username.trim().to_string(),
            password: config.password.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, TrackerError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.authed(self.http.get(&url).query(query)).send()?;
        debug!("GET response: {} {}", response.status(), url);
        decode(check_response(response)?)
    }

    fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, TrackerError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.authed(self.http.post(&url).json(body)).send()?;
        debug!("POST response: {} {}", response.status(), url);
        check_response(response)
    }

    /// Lists all projects visible to the user
    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>, TrackerError> {
        self.get_json("/rest/api/2/project", &[])
    }

    /// Runs a JQL search
    pub fn search_issues(
        &self,
        jql: &str,
        max_results: u32,
    ) -> Result<Vec<IssueSummary>, TrackerError> {
        let response: SearchResponse = self.get_json(
            "/rest/api/2/search",
            &[
                ("jql", jql.to_string()),
                ("maxResults", max_results.to_string()),
                ("fields", "summary,status,issuetype".to_string()),
            ],
        )?;
        Ok(response.issues.into_iter().map(IssueSummary::from).collect())
    }

    /// Lists the epics of a project, most recently updated first
    pub fn list_epics(&self, project_key: &str) -> Result<Vec<IssueSummary>, TrackerError> {
        let jql = format!("project = {} AND issuetype = Epic ORDER BY updated DESC", project_key);
        self.search_issues(&jql, 100)
    }
}

impl IssueTracker for JiraClient {
    fn get_project(&self, key: &str) -> Result<Project, TrackerError> {
        self.get_json(&format!("/rest/api/2/project/{}", key), &[])
            .map_err(|e| match e {
                TrackerError::Status { status: 404, .. } => {
                    TrackerError::NotFound(format!("project {}", key))
                }
                other => other,
            })
    }

    fn list_fields(&self) -> Result<Vec<Field>, TrackerError> {
        self.get_json("/rest/api/2/field", &[])
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, TrackerError> {
        let response = self.post_json("/rest/api/2/issue", &issue_payload(issue))?;
        decode(response)
    }

    fn get_issue(&self, key: &str) -> Result<CreatedIssue, TrackerError> {
        self.get_json(&format!("/rest/api/2/issue/{}", key), &[("fields", "summary".to_string())])
            .map_err(|e| match e {
                TrackerError::Status { status: 404, .. } => {
                    TrackerError::NotFound(format!("issue {}", key))
                }
                other => other,
            })
    }

    fn link_children(
        &self,
        project: &Project,
        epic: &CreatedIssue,
        issue_ids: &[u64],
    ) -> Result<(), TrackerError> {
        let path = format!(
            "/rest/internal/simplified/1.0/projects/{}/issues/{}/children",
            project.id, epic.id
        );
        self.post_json(&path, &serde_json::json!({ "issueIds": issue_ids }))?;
        Ok(())
    }
}

/// Builds the `POST /issue` body for a new issue
pub fn issue_payload(issue: &NewIssue) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    fields.insert("project".into(), serde_json::json!({ "key": issue.project_key }));
    fields.insert("summary".into(), issue.summary.clone().into());
    fields.insert("description".into(), issue.description.clone().into());
    fields.insert("issuetype".into(), serde_json::json!({ "name": issue.issue_type.name() }));

    if !issue.labels.is_empty() {
        fields.insert("labels".into(), serde_json::json!(issue.labels));
    }

    if let Some(parent) = &issue.parent {
        fields.insert("parent".into(), serde_json::json!({ "id": parent.id, "key": parent.key }));
    }

    if let Some(due) = issue.due_date {
        fields.insert("duedate".into(), due.format(DUE_DATE_FORMAT).to_string().into());
    }

    for (id, value) in &issue.extra_fields {
        fields.insert(id.clone(), value.clone());
    }

    serde_json::json!({ "fields": fields })
}

/// Converts non-2xx responses into errors carrying the body
fn check_response(response: Response) -> Result<Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(TrackerError::Status {
        status: status.as_u16(),
        body,
    })
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TrackerError> {
    let text = response.text()?;
    serde_json::from_str(&text)
        .map_err(|e| TrackerError::InvalidResponse(format!("{}: {}", e, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IssueRef, IssueType};
    use chrono::NaiveDate;

    #[test]
    fn task_payload_carries_epic_link_field() {
        let issue = NewIssue::new(IssueType::Task, "OPS", "[Q3] Setup")
            .description("Prepare")
            .labels(&["infra".to_string()])
            .field("customfield_10014", "OPS-1");

        let payload = issue_payload(&issue);
        let fields = &payload["fields"];

        assert_eq!(fields["project"]["key"], "OPS");
        assert_eq!(fields["summary"], "[Q3] Setup");
        assert_eq!(fields["description"], "Prepare");
        assert_eq!(fields["issuetype"]["name"], "Task");
        assert_eq!(fields["labels"], serde_json::json!(["infra"]));
        assert_eq!(fields["customfield_10014"], "OPS-1");
        assert!(fields.get("parent").is_none());
        assert!(fields.get("duedate").is_none());
    }

    #[test]
    fn empty_epic_link_field_id_is_still_sent() {
        let issue = NewIssue::new(IssueType::Task, "OPS", "Setup").field("", "OPS-1");

        let payload = issue_payload(&issue);
        assert_eq!(payload["fields"][""], "OPS-1");
    }

    #[test]
    fn subtask_payload_has_parent() {
        let issue = NewIssue::new(IssueType::SubTask, "OPS", "Provision").parent(IssueRef {
            id: "10001".into(),
            key: "OPS-2".into(),
        });

        let payload = issue_payload(&issue);
        assert_eq!(payload["fields"]["issuetype"]["name"], "Sub-task");
        assert_eq!(payload["fields"]["parent"]["id"], "10001");
        assert_eq!(payload["fields"]["parent"]["key"], "OPS-2");
        assert!(payload["fields"].get("labels").is_none());
    }

    #[test]
    fn epic_payload_formats_due_date() {
        let issue = NewIssue::new(IssueType::Epic, "OPS", "Launch")
            .due_date(NaiveDate::from_ymd_opt(2024, 3, 9));

        let payload = issue_payload(&issue);
        assert_eq!(payload["fields"]["duedate"], "2024-03-09");
    }

    #[test]
    fn client_requires_base_url() {
        let result = JiraClient::new(JiraConfig::new("  ", "me", "secret"));
        assert!(matches!(result, Err(TrackerError::Config(_))));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let config = JiraConfig::new("https://jira.example.com/", "me", "secret");
        let client = JiraClient::new(config).unwrap();
        assert_eq!(client.base_url(), "https://jira.example.com");
        assert_eq!(client.url("/rest/api/2/field"), "https://jira.example.com/rest/api/2/field");
    }

    #[test]
    fn search_response_maps_to_summaries() {
        let json = r#"{
            "total": 1,
            "issues": [
                {
                    "id": "10",
                    "key": "OPS-1",
                    "fields": {
                        "summary": "Launch",
                        "status": {"name": "To Do"},
                        "issuetype": {"name": "Epic"}
                    }
                }
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let summaries: Vec<IssueSummary> =
            response.issues.into_iter().map(IssueSummary::from).collect();

        assert_eq!(summaries[0].key, "OPS-1");
        assert_eq!(summaries[0].summary, "Launch");
        assert_eq!(summaries[0].status.as_deref(), Some("To Do"));
        assert_eq!(summaries[0].issue_type.as_deref(), Some("Epic"));
    }

    #[test]
    fn status_error_exposes_body() {
        let err = TrackerError::Status {
            status: 400,
            body: r#"{"errors":{"summary":"required"}}"#.to_string(),
        };
        assert_eq!(err.body(), Some(r#"{"errors":{"summary":"required"}}"#));
        assert_eq!(TrackerError::NotFound("x".into()).body(), None);
    }
}
