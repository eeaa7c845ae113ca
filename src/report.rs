//! Tabular issue report: query, header, rows and page strip.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, info};
use serde_json::Value;

use crate::config::EngineSettings;
use crate::descriptor::FieldDescriptor;
use crate::error::{redact_log_details, Result};
use crate::paginator::{Paginator, DEFAULT_CURRENT_PAGE};
use crate::remote::{within, Tracker};
use crate::resolver::{FieldResolver, RowComments};
use crate::snapshot::IssueSnapshot;
use crate::template::{
    escape_html, extend_context, HtmlTemplates, RenderContext, Template, TemplateRenderer,
    ISSUE_ID, LINKBASE,
};

pub const ALL_PROJECTS: &str = "all projects";
pub const PROJECT_PARAM: &str = "project";
pub const QUERY_PARAM: &str = "query";
pub const FIELDS_PARAM: &str = "fields";
pub const PAGE_SIZE_PARAM: &str = "pageSize";
pub const TOTAL_PAGES_PARAM: &str = "totalPages";

const ROW_OPEN: &str = r#"<tr class="yt yt-report-row">"#;

/// Parses a count parameter; anything that is not a non-negative integer
/// yields `default`.
pub fn int_param(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn non_empty_or(value: Option<&String>, default: &str) -> String {
    value
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Prefixes the query with a project clause unless every project is wanted.
pub fn issue_filter(project: &str, query: &str) -> String {
    if project.trim().eq_ignore_ascii_case(ALL_PROJECTS) {
        query.to_string()
    } else {
        format!("project: {} {}", project, query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportParams {
    pub project: String,
    pub query: Option<String>,
    pub fields: String,
    pub page_size: usize,
    pub current_page: usize,
    pub num_pages: usize,
    /// URL of the host page the report is embedded in, if addressable.
    pub page_url: Option<String>,
}

impl ReportParams {
    /// Builds params from raw macro parameters plus the host request's page
    /// parameter, applying configured defaults to missing or invalid values.
    pub fn from_macro(
        params: &HashMap<String, String>,
        requested_page: Option<&str>,
        page_url: Option<String>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            project: non_empty_or(params.get(PROJECT_PARAM), ALL_PROJECTS),
            query: params.get(QUERY_PARAM).cloned(),
            fields: non_empty_or(params.get(FIELDS_PARAM), &settings.default_fields),
            page_size: int_param(
                params.get(PAGE_SIZE_PARAM).map(String::as_str),
                settings.default_page_size,
            ),
            current_page: int_param(requested_page, DEFAULT_CURRENT_PAGE),
            num_pages: int_param(
                params.get(TOTAL_PAGES_PARAM).map(String::as_str),
                settings.default_total_pages,
            ),
            page_url,
        }
    }
}

/// Rendered pieces of one report page.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub header: String,
    pub rows: String,
    pub pagination: String,
    pub has_issues: bool,
    pub title: String,
    pub link_base: String,
    pub issue_count: usize,
}

impl Report {
    pub fn context(&self) -> RenderContext {
        let mut context = RenderContext::new();
        context.insert(LINKBASE.to_string(), Value::String(self.link_base.clone()));
        context.insert("header".to_string(), Value::String(self.header.clone()));
        context.insert("rows".to_string(), Value::String(self.rows.clone()));
        context.insert("pagination".to_string(), Value::String(self.pagination.clone()));
        context.insert("hasIssues".to_string(), Value::Bool(self.has_issues));
        context.insert("title".to_string(), Value::String(self.title.clone()));
        context
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// No query was supplied; the macro renders nothing.
    NoQuery,
    Rendered(Report),
}

impl ReportOutcome {
    pub fn has_issues(&self) -> bool {
        match self {
            ReportOutcome::NoQuery => false,
            ReportOutcome::Rendered(report) => report.has_issues,
        }
    }

    /// Context handed to the report body template; empty for [`ReportOutcome::NoQuery`].
    pub fn context(&self) -> RenderContext {
        match self {
            ReportOutcome::NoQuery => RenderContext::new(),
            ReportOutcome::Rendered(report) => report.context(),
        }
    }

    pub fn render(&self, renderer: &dyn TemplateRenderer) -> Result<String> {
        match self {
            ReportOutcome::NoQuery => Ok(String::new()),
            ReportOutcome::Rendered(report) => renderer.render(Template::ReportBody, &report.context()),
        }
    }
}

pub struct ReportEngine {
    tracker: Tracker,
    settings: EngineSettings,
    renderer: Arc<dyn TemplateRenderer>,
}

impl ReportEngine {
    pub fn new(tracker: Tracker, settings: EngineSettings) -> Self {
        Self::with_renderer(tracker, settings, Arc::new(HtmlTemplates))
    }

    pub fn with_renderer(
        tracker: Tracker,
        settings: EngineSettings,
        renderer: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            tracker,
            settings,
            renderer,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn base_context(&self) -> RenderContext {
        let mut context = RenderContext::new();
        context.insert(LINKBASE.to_string(), Value::String(self.settings.link_base()));
        context
    }

    pub async fn generate(&self, params: &ReportParams) -> Result<ReportOutcome> {
        let Some(query) = params.query.as_deref().filter(|q| !q.trim().is_empty()) else {
            debug!("report:generate skipped, no query supplied");
            return Ok(ReportOutcome::NoQuery);
        };

        let descriptors = FieldDescriptor::parse_list(&params.fields);
        let paginator = Paginator::new(params.page_size, params.current_page, params.num_pages);
        let filter = issue_filter(&params.project, query);
        info!(
            "report:generate project={} page={} page_size={} columns={}",
            params.project,
            paginator.current_page(),
            paginator.page_size(),
            descriptors.len()
        );

        let issues = within(
            self.settings.request_timeout,
            "issue query",
            self.tracker
                .issues
                .query(&filter, paginator.start_index(), paginator.page_size()),
        )
        .await?;

        let base = self.base_context();
        let renderer = self.renderer.as_ref();
        let resolver = FieldResolver::new(renderer, &base, self.settings.request_timeout);

        let mut rows = String::new();
        for issue in &issues {
            let snapshot = IssueSnapshot::capture(issue);
            let comments = RowComments::new(issue.comments.clone());

            rows.push_str(ROW_OPEN);
            rows.push_str("<td>");
            let link_context = extend_context(
                &base,
                [(ISSUE_ID, Value::String(escape_html(&snapshot.id().to_string())))],
            );
            rows.push_str(&renderer.render(Template::IssueLink, &link_context)?);
            rows.push_str("</td>");
            for descriptor in &descriptors {
                rows.push_str("<td>");
                rows.push_str(&resolver.resolve(&snapshot, &comments, descriptor).await?);
                rows.push_str("</td>");
            }
            rows.push_str("</tr>");
        }

        let pagination = paginator.render_strip(params.page_url.as_deref(), renderer, &base)?;
        debug!("report:generate fetched={}", issues.len());

        Ok(ReportOutcome::Rendered(Report {
            header: render_header(&descriptors),
            rows,
            pagination,
            has_issues: !issues.is_empty(),
            title: escape_html(&format!("{} from {}", query, params.project)),
            link_base: self.settings.link_base(),
            issue_count: issues.len(),
        }))
    }

    /// Generates and renders the report body in one step.
    pub async fn render(&self, params: &ReportParams) -> Result<String> {
        let outcome = self.generate(params).await.map_err(|err| {
            error!("YouTrack report macro failed: {}", redact_log_details(&err.to_string()));
            err
        })?;
        outcome.render(self.renderer.as_ref())
    }
}

fn render_header(descriptors: &[FieldDescriptor]) -> String {
    let mut header = String::from("<th>Issue</th>");
    for descriptor in descriptors {
        header.push_str("<th>");
        header.push_str(&escape_html(descriptor.title()));
        header.push_str("</th>");
    }
    header
}
