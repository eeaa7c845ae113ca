use crate::config::YouTrackConfig;
use crate::error::{Result, YouTrackError};
use crate::models::{Comment, Issue, Project};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const ISSUE_FIELDS: &str = "id,idReadable,summary,resolved,votes,\
reporter(login,fullName),project(shortName,name),\
customFields(name,$type,value(name,login,fullName,text,presentation,minutes,$type)),\
attachments(id,name,url,mimeType)";
pub const COMMENT_FIELDS: &str =
    "id,text,created,deleted,author(login,fullName),visibility($type)";
pub const PROJECT_FIELDS: &str = "id,shortName,name,archived";

/// Window size used when a whole collection is materialised page by page.
const LIST_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct YouTrackClient {
    http: HttpClient,
    config: YouTrackConfig,
    limiter: RateLimiter,
}

impl YouTrackClient {
    pub fn new(config: YouTrackConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.cooldown);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &YouTrackConfig {
        &self.config
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        let url = self.url_for(path);
        tracing::debug!(path, params = query.len(), "youtrack GET");
        let response = self.http.get(url).query(query).send().await?;
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "youtrack response");
        if status.is_success() {
            response.json::<T>().await.map_err(YouTrackError::from)
        } else if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            Err(YouTrackError::NotFound(
                extract_error_description(&body).unwrap_or(body),
            ))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(YouTrackError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(build_http_error(status, &body))
        }
    }

    /// Fetches consecutive windows until a short page signals the end.
    async fn collect_pages<T>(&self, path: &str, extra: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        loop {
            let mut params = extra.to_vec();
            params.push(("$skip", items.len().to_string()));
            params.push(("$top", LIST_PAGE_SIZE.to_string()));
            let page: Vec<T> = self.get_with_query(path, &params).await?;
            let fetched = page.len();
            items.extend(page);
            if fetched < LIST_PAGE_SIZE {
                return Ok(items);
            }
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.collect_pages("admin/projects", &[("fields", PROJECT_FIELDS.to_string())])
            .await
    }

    /// Runs a YouTrack search query and returns one window of the result set.
    pub async fn search_issues(&self, query: &str, skip: usize, top: usize) -> Result<Vec<Issue>> {
        let params = search_params(query, skip, top);
        self.get_with_query("issues", &params).await
    }

    pub async fn list_issues(&self, query: &str) -> Result<Vec<Issue>> {
        let mut params = vec![("fields", ISSUE_FIELDS.to_string())];
        if !query.trim().is_empty() {
            params.push(("query", query.trim().to_string()));
        }
        self.collect_pages("issues", &params).await
    }

    pub async fn get_issue(&self, issue_id: &str) -> Result<Issue> {
        let path = format!("issues/{}", issue_id);
        self.get_with_query(&path, &[("fields", ISSUE_FIELDS.to_string())])
            .await
    }

    pub async fn get_issue_comments(
        &self,
        issue_id: &str,
        skip: usize,
        top: usize,
    ) -> Result<Vec<Comment>> {
        let path = format!("issues/{}/comments", issue_id);
        let params = [
            ("fields", COMMENT_FIELDS.to_string()),
            ("$skip", skip.to_string()),
            ("$top", top.to_string()),
        ];
        self.get_with_query(&path, &params).await
    }

    pub async fn list_issue_comments(&self, issue_id: &str) -> Result<Vec<Comment>> {
        let path = format!("issues/{}/comments", issue_id);
        self.collect_pages(&path, &[("fields", COMMENT_FIELDS.to_string())])
            .await
    }
}

fn search_params(query: &str, skip: usize, top: usize) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("fields", ISSUE_FIELDS.to_string()),
        ("$skip", skip.to_string()),
        ("$top", top.to_string()),
    ];
    let trimmed = query.trim();
    if !trimmed.is_empty() {
        params.push(("query", trimmed.to_string()));
    }
    params
}

fn build_http_client(config: &YouTrackConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    if let Some(token) = config.token.as_deref().filter(|t| !t.trim().is_empty()) {
        headers.insert(AUTHORIZATION, header_value(format!("Bearer {}", token.trim()))?);
    }
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| YouTrackError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| YouTrackError::Other(err.to_string()))
}

fn build_http_error(status: StatusCode, body: &str) -> YouTrackError {
    let code = extract_error_code(body);
    let message = extract_error_description(body).unwrap_or_else(|| body.to_string());
    YouTrackError::http(status, code, message)
}

fn extract_error_code(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(|c| c.as_str()).map(|s| s.to_string()))
}

fn extract_error_description(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body).ok().and_then(|value| {
        value
            .get("error_description")
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> YouTrackClient {
        let config = YouTrackConfig::new(server.url()).with_token("perm:secret");
        YouTrackClient::new(config).expect("client builds")
    }

    #[tokio::test]
    async fn search_issues_sends_window_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/issues")
            .match_header("authorization", "Bearer perm:secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "project: DEMO #Unresolved".into()),
                Matcher::UrlEncoded("$skip".into(), "26".into()),
                Matcher::UrlEncoded("$top".into(), "25".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"idReadable":"DEMO-1","summary":"First"},{"idReadable":"DEMO-2"}]"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let issues = client
            .search_issues(" project: DEMO #Unresolved ", 26, 25)
            .await
            .expect("search succeeds");

        mock.assert_async().await;
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id_readable, "DEMO-1");
        assert_eq!(issues[0].summary.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn get_issue_maps_404_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/issues/DEMO-404")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"Not Found","error_description":"Entity with id DEMO-404 not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get_issue("DEMO-404").await.expect_err("missing issue");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("DEMO-404"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/admin/projects")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("no token")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.list_projects().await.expect_err("rejected");
        assert!(matches!(err, YouTrackError::Authentication(_)));
    }

    #[tokio::test]
    async fn server_error_keeps_status_and_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/issues")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"error":"server_error","error_description":"boom"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.search_issues("", 0, 10).await {
            Err(YouTrackError::Http {
                status,
                code,
                message,
            }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(code.as_deref(), Some("server_error"));
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected result: {:?}", other.map(|items| items.len())),
        }
    }

    #[tokio::test]
    async fn list_projects_stops_after_short_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/admin/projects")
            .match_query(Matcher::UrlEncoded("$skip".into(), "0".into()))
            .with_status(200)
            .with_body(r#"[{"id":"0-1","shortName":"DEMO","name":"Demo"},{"id":"0-2","shortName":"OPS"}]"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let projects = client.list_projects().await.expect("projects");

        mock.assert_async().await;
        let names: Vec<_> = projects.iter().map(|p| p.short_name.as_str()).collect();
        assert_eq!(names, vec!["DEMO", "OPS"]);
    }

    #[tokio::test]
    async fn comments_window_is_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/issues/DEMO-3/comments")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("$skip".into(), "0".into()),
                Matcher::UrlEncoded("$top".into(), "11".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id":"4-1","text":"hi","created":1700000000000,"author":{"login":"jane"},"visibility":{"$type":"LimitedVisibility"}}]"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let comments = client
            .get_issue_comments("DEMO-3", 0, 11)
            .await
            .expect("comments");

        mock.assert_async().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].created, Some(1_700_000_000_000));
        assert!(comments[0]
            .visibility
            .as_ref()
            .map(|v| v.is_limited())
            .unwrap_or(false));
    }

    #[test]
    fn blank_query_is_not_forwarded() {
        let params = search_params("   ", 0, 5);
        assert!(params.iter().all(|(name, _)| *name != "query"));
    }
}
