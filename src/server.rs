//! Headless mode: the report served over HTTP.
//!
//! The dataset is loaded once at startup and shared read-only. Every request
//! turns its query string into a [`ViewState`] and runs one independent
//! report pass, so concurrent requests never share mutable state.

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use maud::{Markup, html};
use serde::Deserialize;

use crate::app::TITLE;
use crate::chart::html::{self as chart_html, bar_plot, figure_block, violin_plot};
use crate::chart::palette::PaletteChoice;
use crate::chart::spec::VIOLIN_TITLE;
use crate::config::Theme;
use crate::data::filter::SortOrder;
use crate::data::model::SalaryDataset;
use crate::error::ExportError;
use crate::export::{ExportKind, export_bytes};
use crate::format::currency_or_na;
use crate::report::{Report, SimulationOutcome, build_report};
use crate::state::ViewState;

#[derive(Clone)]
pub struct ServerState {
    /// The dataset, or the load error shown on every page.
    data: Arc<Result<SalaryDataset, String>>,
    theme: Theme,
}

impl ServerState {
    pub fn new(data: Result<SalaryDataset, String>, theme: Theme) -> Self {
        Self {
            data: Arc::new(data),
            theme,
        }
    }
}

// ---------------------------------------------------------------------------
// Query string → view state
// ---------------------------------------------------------------------------

/// Optional view parameters; anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub sort: Option<SortOrder>,
    pub palette: Option<PaletteChoice>,
    pub errors: Option<bool>,
    /// Comma-separated department names.
    pub departments: Option<String>,
    pub simulate: Option<bool>,
    pub samples: Option<usize>,
}

impl ViewQuery {
    pub fn into_view(self) -> ViewState {
        let mut view = ViewState::default();
        if let Some(sort) = self.sort {
            view.sort = sort;
        }
        if let Some(palette) = self.palette {
            view.palette = palette;
        }
        if let Some(errors) = self.errors {
            view.show_error_bars = errors;
        }
        if let Some(list) = self.departments {
            view.selected_departments = parse_departments(&list);
        }
        if let Some(simulate) = self.simulate {
            view.show_simulation = simulate;
        }
        if let Some(samples) = self.samples {
            view.set_samples(samples);
        }
        view
    }
}

/// Split `A,B` into a selection, ignoring blanks.
pub fn parse_departments(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

enum ServeError {
    Load(String),
    Export(ExportError),
}

impl From<ExportError> for ServeError {
    fn from(e: ExportError) -> Self {
        ServeError::Export(e)
    }
}

impl ServeError {
    fn status(&self) -> StatusCode {
        match self {
            ServeError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServeError::Export(ExportError::RasterizerUnavailable) => StatusCode::NOT_IMPLEMENTED,
            ServeError::Export(ExportError::NothingToExport(_)) => StatusCode::NOT_FOUND,
            ServeError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServeError::Load(msg) => msg.clone(),
            ServeError::Export(e) => e.to_string(),
        };
        if status.is_server_error() {
            log::error!("Request failed: {message}");
        } else {
            log::warn!("Request failed ({status}): {message}");
        }
        let body = html! {
            h1 { (TITLE) }
            p class="error" { (message) }
        };
        (status, Html(chart_html::page(TITLE, body, &Theme::default()))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/chart.html", get(handle_chart_html))
        .route("/violin.html", get(handle_violin_html))
        .route("/chart.png", get(handle_chart_png))
        .route("/data.csv", get(handle_data_csv))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: ServerState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!(
        "Serving salary report on http://{}",
        listener.local_addr().context("reading bound address")?
    );
    axum::serve(listener, router(state))
        .await
        .context("serving report")?;
    Ok(())
}

fn report_for(state: &ServerState, query: ViewQuery) -> Result<Report, ServeError> {
    match state.data.as_ref() {
        Ok(dataset) => Ok(build_report(dataset, &query.into_view())),
        Err(msg) => Err(ServeError::Load(msg.clone())),
    }
}

fn download(state: &ServerState, query: ViewQuery, kind: ExportKind) -> Result<Response, ServeError> {
    let report = report_for(state, query)?;
    let bytes = export_bytes(&report, &state.theme, kind)?;
    let headers = [
        (header::CONTENT_TYPE, kind.mime().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", kind.file_name()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

async fn handle_index(
    State(state): State<ServerState>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, ServeError> {
    let report = report_for(&state, query)?;
    let body = index_body(&report, &state.theme);
    Ok(Html(chart_html::page(TITLE, body, &state.theme)))
}

async fn handle_chart_html(
    State(state): State<ServerState>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, ServeError> {
    download(&state, query, ExportKind::BarHtml)
}

async fn handle_violin_html(
    State(state): State<ServerState>,
    Query(mut query): Query<ViewQuery>,
) -> Result<Response, ServeError> {
    query.simulate = Some(true);
    download(&state, query, ExportKind::ViolinHtml)
}

async fn handle_chart_png(
    State(state): State<ServerState>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, ServeError> {
    download(&state, query, ExportKind::Png)
}

async fn handle_data_csv(
    State(state): State<ServerState>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, ServeError> {
    download(&state, query, ExportKind::Csv)
}

// ---------------------------------------------------------------------------
// Report page
// ---------------------------------------------------------------------------

fn index_body(report: &Report, theme: &Theme) -> Markup {
    let s = &report.summary;
    html! {
        h1 { (TITLE) }
        (figure_block("bar", &bar_plot(&report.bar_chart, theme)))
        p {
            a href="chart.png" { "PNG" } " | "
            a href="chart.html" { "Interactive chart" } " | "
            a href="data.csv" { "CSV" }
        }

        h2 { "Summary statistics" }
        ul {
            li { "Mean of department averages: " (currency_or_na(s.mean_of_averages)) }
            li { "Departments shown: " (s.departments) }
            li { "Min of mins: " (currency_or_na(s.min_of_mins)) }
            li { "Max of maxes: " (currency_or_na(s.max_of_maxes)) }
        }

        @match &report.simulation {
            Some(SimulationOutcome::Chart(spec)) => {
                h2 { (VIOLIN_TITLE) }
                (figure_block("violin", &violin_plot(spec, theme)))
            }
            Some(SimulationOutcome::NotEnoughData) => {
                h2 { (VIOLIN_TITLE) }
                p class="info" { "Not enough valid Min/Average/Max ranges to simulate distributions." }
            }
            None => {}
        }

        h2 { "Table (current view)" }
        table {
            tr { th { "Department" } th { "Average" } th { "Min" } th { "Max" } }
            @for r in &report.records {
                tr {
                    td { (r.department) }
                    td { (currency_or_na(r.average)) }
                    td { (currency_or_na(r.min)) }
                    td { (currency_or_na(r.max)) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::data::loader::example_table;

    fn app() -> Router {
        let dataset = SalaryDataset::from_table(&example_table().unwrap()).unwrap();
        router(ServerState::new(Ok(dataset), Theme::default()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[test]
    fn query_maps_to_view_state() {
        let query = ViewQuery {
            sort: Some(SortOrder::Department),
            errors: Some(false),
            departments: Some("IT, HR,,".into()),
            samples: Some(10_000),
            ..Default::default()
        };
        let view = query.into_view();
        assert_eq!(view.sort, SortOrder::Department);
        assert!(!view.show_error_bars);
        assert_eq!(view.selected_departments.len(), 2);
        assert_eq!(view.samples_per_department, 2000);
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(get(app(), "/health").await, (StatusCode::OK, "ok".to_string()));
    }

    #[tokio::test]
    async fn index_embeds_filtered_figure() {
        let (status, body) = get(app(), "/?departments=IT,HR&sort=avg_asc").await;
        assert_eq!(status, StatusCode::OK);
        let figure = chart_html::extract_figure(&body, "bar").unwrap();
        let names = &figure["data"][0]["y"];
        assert_eq!(names.as_array().unwrap().len(), 2);
        assert!(body.contains("Departments shown: 2"));
    }

    #[tokio::test]
    async fn csv_follows_the_view() {
        let (status, body) = get(app(), "/data.csv?sort=department").await;
        assert_eq!(status, StatusCode::OK);
        let first = body.lines().nth(1).unwrap();
        assert!(first.starts_with("Customer Service"));
    }

    #[tokio::test]
    async fn violin_missing_without_valid_ranges() {
        let (status, _) = get(app(), "/violin.html?departments=Nowhere").await;
        // Unknown departments filter everything out, so nothing can be simulated.
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = get(app(), "/violin.html").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("violin"));
    }

    #[cfg(not(feature = "png-export"))]
    #[tokio::test]
    async fn png_without_rasterizer_is_not_implemented() {
        let (status, body) = get(app(), "/chart.png").await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(body.contains("png-export"));
    }

    #[tokio::test]
    async fn load_error_is_unprocessable() {
        let app = router(ServerState::new(
            Err("CSV must contain columns: Average_Salary, Department, Max_Salary, Min_Salary.".into()),
            Theme::default(),
        ));
        let (status, body) = get(app, "/").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("must contain columns"));
    }

    #[tokio::test]
    async fn error_page_escapes_the_message() {
        let app = router(ServerState::new(
            Err("bad cell <script>alert(1)</script>".into()),
            Theme::default(),
        ));
        let (_, body) = get(app, "/").await;
        assert!(body.contains("bad cell &lt;script&gt;"));
        assert!(!body.contains("<script>alert"));
    }

    #[tokio::test]
    async fn bad_query_value_is_rejected() {
        let (status, _) = get(app(), "/?palette=rainbow").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
