use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use mep_core::{
    render_history_cards, standards, AuditReport, CommentMap, CommitEntry, DashboardSummary,
    DashboardView, Evidence, FailureInsight, FeedbackRecord, ReportSource, SearchPanel,
    StandardsMatch, StandardsNode,
};
use mep_git::{recent_history, HistoryOptions};
use mep_llm::{GenerationRequest, ReasoningPrompt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{files, ApiError, ApiJson, ApiResult, AppState, AuditRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAuditRequest {
    pub file_name: Option<String>,
    pub job_ref: Option<String>,
    pub file_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisionChatRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReasoningRequest {
    #[serde(default)]
    pub query: String,
    pub model: Option<String>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub hash: Option<String>,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub query: Option<String>,
    pub response: Option<String>,
    pub is_useful: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRequest {
    pub report: AuditReport,
    #[serde(default)]
    pub file_name: String,
    pub source: Option<ReportSource>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub summary: DashboardSummary,
    pub html: DashboardHtml,
}

#[derive(Debug, Serialize)]
pub struct DashboardHtml {
    pub rooms: String,
    pub equipment: String,
}

#[derive(Debug, Deserialize)]
pub struct StandardsQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub panel: SearchPanel,
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct RagQueryRequest {
    #[serde(default)]
    pub query: String,
}

pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let files = files::list_schedules(&state.settings.project_root()).await?;
    Ok(Json(files))
}

pub async fn run_audit(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RunAuditRequest>,
) -> ApiResult<Json<Value>> {
    let report = state
        .audit
        .run(AuditRequest {
            file_name: request.file_name,
            job_ref: request.job_ref,
            file_content: request.file_content,
        })
        .await?;
    Ok(Json(report))
}

pub async fn ai_chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let model = request
        .model
        .unwrap_or_else(|| state.settings.llm.default_model.clone());
    generate(&state, GenerationRequest::text(model, request.prompt)).await
}

pub async fn vision_chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VisionChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let model = request
        .model
        .unwrap_or_else(|| state.settings.llm.vision_model.clone());
    debug!(images = request.images.len(), %model, "vision request");
    generate(
        &state,
        GenerationRequest::vision(model, request.prompt, request.images),
    )
    .await
}

pub async fn reasoning(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ReasoningRequest>,
) -> ApiResult<Json<ChatResponse>> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Missing query".into()));
    }
    let model = request
        .model
        .unwrap_or_else(|| state.settings.llm.default_model.clone());
    let prompt = ReasoningPrompt::new(&request.query, &model)
        .with_evidence(&request.evidence)
        .build();
    generate(&state, GenerationRequest::text(model.as_str(), prompt)).await
}

async fn generate(state: &AppState, request: GenerationRequest) -> ApiResult<Json<ChatResponse>> {
    let response = state
        .llm
        .generate(&request)
        .await
        .map_err(|e| ApiError::llm_offline(state.llm.endpoint(), &e))?;
    Ok(Json(ChatResponse { response }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "online": state.llm.is_available().await }))
}

pub async fn get_comments(State(state): State<AppState>) -> ApiResult<Json<CommentMap>> {
    let comments = state
        .comments
        .all()
        .await
        .map_err(|e| ApiError::internal_with("Failed to read comments", e))?;
    Ok(Json(comments))
}

pub async fn save_comment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CommentRequest>,
) -> ApiResult<Json<Value>> {
    let hash = request
        .hash
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing hash".into()))?;
    state
        .comments
        .upsert(&hash, &request.comment)
        .await
        .map_err(|e| ApiError::internal_with("Failed to save comment", e))?;
    Ok(Json(json!({ "success": true })))
}

pub async fn get_feedback(State(state): State<AppState>) -> ApiResult<Json<Vec<FeedbackRecord>>> {
    let feedback = state
        .feedback
        .all()
        .await
        .map_err(|e| ApiError::internal_with("Failed to read feedback", e))?;
    Ok(Json(feedback))
}

pub async fn save_feedback(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FeedbackRequest>,
) -> ApiResult<Json<Value>> {
    let query = request.query.filter(|q| !q.trim().is_empty());
    let (Some(query), Some(response), Some(is_useful)) =
        (query, request.response, request.is_useful)
    else {
        return Err(ApiError::BadRequest(
            "Missing query, response or isUseful".into(),
        ));
    };
    let record = FeedbackRecord::new(query, response, is_useful);
    info!(status = ?record.status, "recording feedback");
    state
        .feedback
        .append(record)
        .await
        .map_err(|e| ApiError::internal_with("Failed to save feedback", e))?;
    Ok(Json(json!({ "success": true })))
}

pub async fn git_history(State(state): State<AppState>) -> ApiResult<Json<Vec<CommitEntry>>> {
    Ok(Json(load_history(&state).await?))
}

pub async fn history_cards(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let history = load_history(&state).await?;
    let comments = state.comments.all().await.unwrap_or_else(|e| {
        warn!(error = %e, "comments unavailable for history cards");
        CommentMap::new()
    });
    Ok(Html(render_history_cards(&history, &comments)))
}

async fn load_history(state: &AppState) -> ApiResult<Vec<CommitEntry>> {
    let dir = state.settings.project_root();
    let opts = HistoryOptions::from(&state.settings.git);
    tokio::task::spawn_blocking(move || recent_history(&dir, &opts))
        .await
        .map_err(|e| ApiError::internal_with("Failed to fetch git history", e))?
        .map_err(|e| {
            warn!(error = %e, "git history unavailable");
            ApiError::internal_with("Failed to fetch git history", e)
        })
}

pub async fn dashboard(ApiJson(request): ApiJson<DashboardRequest>) -> Json<DashboardResponse> {
    let source = request.source.unwrap_or(ReportSource::FileList);
    let view = DashboardView::new(&request.report, &request.file_name, source);
    Json(DashboardResponse {
        summary: view.summary(),
        html: DashboardHtml {
            rooms: view.render_room_rows(),
            equipment: view.render_equipment_rows(),
        },
    })
}

pub async fn standards_tree() -> Json<&'static StandardsNode> {
    Json(standards::standards_db())
}

pub async fn standards_search(Query(query): Query<StandardsQuery>) -> Json<Vec<StandardsMatch>> {
    Json(standards::search(&query.q))
}

pub async fn insight(Path(kind): Path<String>) -> ApiResult<Json<FailureInsight>> {
    standards::failure_insight(&kind)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown failure mode: {kind}")))
}

/// Composite search. Starting a new search cancels the evidence lookup of
/// any search still in flight; the cancelled request answers 409.
pub async fn search(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Missing query".into()));
    }
    let model = request
        .model
        .unwrap_or_else(|| state.settings.llm.default_model.clone());

    let ticket = state.search_slot.begin();
    let local = standards::search(&query);
    let lookup = async {
        tokio::join!(state.manuals.query(&query), state.llm.is_available())
    };

    let (evidence, llm_online) = tokio::select! {
        biased;
        _ = ticket.token().cancelled() => {
            info!(%query, "search superseded");
            return Err(ApiError::Conflict("Search superseded".into()));
        }
        (evidence, online) = lookup => (evidence, online),
    };
    drop(ticket);

    let evidence = evidence.unwrap_or_else(|e| {
        warn!(error = %e, "manual evidence unavailable");
        Vec::new()
    });
    let panel = SearchPanel::new(query, local, evidence, llm_online, model);
    let html = panel.render_html();
    Ok(Json(SearchResponse { panel, html }))
}

pub async fn rag_query(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RagQueryRequest>,
) -> ApiResult<Json<Value>> {
    let results = state.manuals.query(&request.query).await?;
    Ok(Json(json!({ "results": results })))
}

pub async fn list_manuals(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.manuals.list_manuals().await?))
}

pub async fn reindex(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let log = state.manuals.reindex().await?;
    Ok(Json(json!({ "log": log })))
}
