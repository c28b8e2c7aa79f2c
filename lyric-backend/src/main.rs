//! HTTP backend for the Korean lyrics study app.
//!
//! One long-lived process: tokenize pasted lyrics with Kiwi, tally the
//! content-word vocabulary, translate each line, and serve the quiz and the
//! downloadable reports from a per-user session.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{Json, Path, State},
    http::{StatusCode, header},
    response::Response,
    routing::{get, post},
};
use lyric_utils::grammar::{GRAMMAR_CARDS, GrammarCard};
use lyric_utils::quiz::{Feedback, QuizAnswer, QuizError, build_quiz, feedback};
use lyric_utils::report::{ExportError, ReportExporter, ReportInput};
use lyric_utils::{Language, PartOfSpeech, TranslatedLine};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

mod analyzer;
mod pipeline;
mod session;
#[cfg(test)]
mod test_support;
mod translate;

use analyzer::{Analyzer, KiwiAnalyzer};
use pipeline::{AnalysisOutcome, AnalyzeOptions, MEMO_TTL, MemoCache, run_analysis};
use session::{SESSION_TTL, Session, SessionStore};
use translate::{GoogleTranslator, Translator};

/// How many words the frequency chart shows.
const CHART_TOP_N: usize = 10;

pub struct AppState<A, T> {
    analyzer: Arc<A>,
    translator: Arc<T>,
    sessions: Arc<SessionStore>,
    memo: Arc<MemoCache>,
    exporter: ReportExporter,
}

impl<A, T> Clone for AppState<A, T> {
    fn clone(&self) -> Self {
        Self {
            analyzer: self.analyzer.clone(),
            translator: self.translator.clone(),
            sessions: self.sessions.clone(),
            memo: self.memo.clone(),
            exporter: self.exporter,
        }
    }
}

impl<A: Analyzer, T: Translator> AppState<A, T> {
    fn new(analyzer: Arc<A>, translator: Arc<T>, sessions: SessionStore, exporter: ReportExporter) -> Self {
        Self {
            analyzer,
            translator,
            sessions: Arc::new(sessions),
            memo: Arc::new(MemoCache::new(MEMO_TTL)),
            exporter,
        }
    }
}

// === Requests and responses ===

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
        }),
    )
}

fn default_target_language() -> Language {
    Language::English
}

fn default_min_chars() -> usize {
    lyric_utils::aggregate::DEFAULT_MIN_CHARS
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: String,
    /// Replace this session instead of creating a new one.
    #[serde(default)]
    session_id: Option<Uuid>,
    #[serde(default = "default_target_language")]
    target_language: Language,
    #[serde(default = "default_min_chars")]
    min_chars: usize,
}

#[derive(Debug, Serialize)]
struct Metrics {
    line_count: usize,
    token_count: usize,
    filtered_count: usize,
    unique_words: usize,
}

#[derive(Debug, Serialize)]
struct WordRow {
    word: String,
    pos: PartOfSpeech,
    pos_label: &'static str,
    count: u32,
    dictionary_url: String,
}

#[derive(Debug, Serialize)]
struct ChartData {
    labels: Vec<String>,
    counts: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct QuizItemView {
    index: usize,
    question: String,
    options: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    metrics: Metrics,
    transcript: Vec<TranslatedLine>,
    words: Vec<WordRow>,
    chart: ChartData,
    grammar_cards: Vec<GrammarCard>,
    quiz: Vec<QuizItemView>,
}

#[derive(Debug, Deserialize)]
struct QuizAnswerRequest {
    session_id: Uuid,
    item: usize,
    choice: String,
}

#[derive(Debug, Serialize)]
struct QuizAnswerResponse {
    correct: bool,
    score: u32,
    answered: usize,
    total: usize,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback: Option<Feedback>,
}

#[derive(Debug, Serialize)]
struct AnsweredView {
    choice: String,
    correct: bool,
}

#[derive(Debug, Serialize)]
struct QuizItemProgress {
    index: usize,
    question: String,
    options: Vec<String>,
    /// None while the item is still open; correct answers are never exposed
    /// ahead of time.
    answered: Option<AnsweredView>,
}

#[derive(Debug, Serialize)]
struct SessionView {
    session_id: Uuid,
    metrics: Metrics,
    transcript: Vec<TranslatedLine>,
    words: Vec<WordRow>,
    chart: ChartData,
    quiz: Vec<QuizItemProgress>,
    score: u32,
    answered: usize,
    total: usize,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback: Option<Feedback>,
}

fn metrics_of(outcome: &AnalysisOutcome) -> Metrics {
    Metrics {
        line_count: outcome.line_count,
        token_count: outcome.token_count,
        filtered_count: outcome.filtered_count,
        unique_words: outcome.word_counts.len(),
    }
}

fn word_rows(outcome: &AnalysisOutcome) -> Vec<WordRow> {
    outcome
        .word_counts
        .iter()
        .map(|wc| WordRow {
            word: wc.word.clone(),
            pos: wc.pos,
            pos_label: wc.pos.korean_label(),
            count: wc.count,
            dictionary_url: wc.dictionary_url(),
        })
        .collect()
}

fn chart_of(outcome: &AnalysisOutcome) -> ChartData {
    let top = lyric_utils::aggregate::top_n(&outcome.word_counts, CHART_TOP_N);
    ChartData {
        labels: top.iter().map(|wc| wc.word.clone()).collect(),
        counts: top.iter().map(|wc| wc.count).collect(),
    }
}

// === Handlers ===

async fn health() -> &'static str {
    "lyric-backend is up"
}

async fn analyze<A: Analyzer, T: Translator>(
    State(state): State<AppState<A, T>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "가사를 입력해 주세요.",
        ));
    }

    let opts = AnalyzeOptions {
        target_language: request.target_language,
        min_chars: request.min_chars.max(1),
    };
    let outcome = run_analysis(
        state.analyzer.as_ref(),
        state.translator.as_ref(),
        &state.memo,
        &request.text,
        opts,
    )
    .await
    .map_err(|e| {
        log::error!("analysis failed: {e}");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("형태소 분석에 실패했습니다: {e}"),
        )
    })?;

    let quiz = build_quiz(&outcome.word_counts, outcome.input_hash);
    let quiz_view = quiz
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| QuizItemView {
            index,
            question: item.question.clone(),
            options: item.options.clone(),
        })
        .collect();

    let session_id = state
        .sessions
        .put(request.session_id, Session::new(outcome.clone(), quiz));

    let warning = outcome
        .word_counts
        .is_empty()
        .then(|| "추출할 수 있는 단어가 없습니다. 더 긴 가사를 입력해 보세요.".to_string());

    Ok(Json(AnalyzeResponse {
        session_id,
        warning,
        metrics: metrics_of(&outcome),
        transcript: outcome.lines.clone(),
        words: word_rows(&outcome),
        chart: chart_of(&outcome),
        grammar_cards: GRAMMAR_CARDS.to_vec(),
        quiz: quiz_view,
    }))
}

async fn quiz_answer<A: Analyzer, T: Translator>(
    State(state): State<AppState<A, T>>,
    Json(request): Json<QuizAnswerRequest>,
) -> Result<Json<QuizAnswerResponse>, ApiError> {
    let outcome = state
        .sessions
        .with_mut(request.session_id, |session| {
            session.quiz.answer(request.item, &request.choice)
        })
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "세션을 찾을 수 없습니다."))?;

    let outcome = outcome.map_err(|e| match e {
        QuizError::AlreadyAnswered(_) => api_error(StatusCode::CONFLICT, e.to_string()),
        QuizError::NoSuchItem(_) | QuizError::UnknownOption { .. } => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    })?;

    Ok(Json(QuizAnswerResponse {
        correct: outcome.correct,
        score: outcome.score,
        answered: outcome.answered,
        total: outcome.total,
        complete: outcome.complete,
        feedback: outcome.complete.then(|| feedback(outcome.score)),
    }))
}

async fn get_session<A: Analyzer, T: Translator>(
    State(state): State<AppState<A, T>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .sessions
        .with(id, |session| {
            let quiz = &session.quiz;
            let items = quiz
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| QuizItemProgress {
                    index,
                    question: item.question.clone(),
                    options: item.options.clone(),
                    answered: match &item.answer {
                        QuizAnswer::Unanswered => None,
                        QuizAnswer::Answered { choice, correct } => Some(AnsweredView {
                            choice: choice.clone(),
                            correct: *correct,
                        }),
                    },
                })
                .collect();

            Json(SessionView {
                session_id: id,
                metrics: metrics_of(&session.outcome),
                transcript: session.outcome.lines.clone(),
                words: word_rows(&session.outcome),
                chart: chart_of(&session.outcome),
                quiz: items,
                score: quiz.score(),
                answered: quiz.answered(),
                total: quiz.total(),
                complete: quiz.is_complete(),
                feedback: quiz.is_complete().then(|| feedback(quiz.score())),
            })
        })
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "세션을 찾을 수 없습니다."))
}

async fn delete_session<A: Analyzer, T: Translator>(
    State(state): State<AppState<A, T>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, "세션을 찾을 수 없습니다."))
    }
}

fn report_input_of(session: &Session) -> ReportInput<'_> {
    ReportInput {
        lines: &session.outcome.lines,
        word_counts: &session.outcome.word_counts,
        filtered_tokens: session.outcome.filtered_count,
        quiz_score: session.quiz.score(),
        quiz_answered: session.quiz.answered(),
        quiz_total: session.quiz.total(),
    }
}

async fn report_text<A: Analyzer, T: Translator>(
    State(state): State<AppState<A, T>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let report = state
        .sessions
        .with(id, |session| state.exporter.export_text(&report_input_of(session)))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "세션을 찾을 수 없습니다."))?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"lyric_report.txt\"",
        )
        .body(axum::body::Body::from(report))
        .unwrap())
}

async fn report_pdf<A: Analyzer, T: Translator>(
    State(state): State<AppState<A, T>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let result = state
        .sessions
        .with(id, |session| state.exporter.export_pdf(&report_input_of(session)))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "세션을 찾을 수 없습니다."))?;

    let bytes = result.map_err(|e| match e {
        ExportError::PdfUnavailable => api_error(
            StatusCode::NOT_IMPLEMENTED,
            "PDF 내보내기를 사용할 수 없습니다. 텍스트 리포트를 이용해 주세요.",
        ),
        #[cfg(feature = "pdf")]
        ExportError::Pdf(_) => {
            log::error!("PDF generation failed: {e}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "PDF 생성에 실패했습니다.")
        }
    })?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"lyric_report.pdf\"",
        )
        .body(axum::body::Body::from(bytes))
        .unwrap())
}

fn app<A: Analyzer, T: Translator>(state: AppState<A, T>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/analyze", post(analyze::<A, T>))
        .route("/quiz/answer", post(quiz_answer::<A, T>))
        .route(
            "/session/{id}",
            get(get_session::<A, T>).delete(delete_session::<A, T>),
        )
        .route("/report/{id}/text", get(report_text::<A, T>))
        .route("/report/{id}/pdf", get(report_pdf::<A, T>))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let analyzer = Arc::new(KiwiAnalyzer::spawn().context("failed to start the Kiwi analyzer")?);
    let translator = Arc::new(GoogleTranslator::new(Language::Korean)?);
    let state = AppState::new(
        analyzer,
        translator,
        SessionStore::new(SESSION_TTL),
        ReportExporter::detect(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    let app = app(state).layer(CompressionLayer::new()).layer(cors);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("Listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
