use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::{
    BalancePoint, Direction, InputError, Parameter, PlannerInputs, ProjectionResult,
    SmoothedCurve, apply_adjustment, run_projection, smooth_curve, validate_inputs,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_PORT: u16 = 8080;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliParameter {
    AnnualSpending,
    InflationRate,
    InterestRate,
    YearsUntilRetirement,
}

impl From<CliParameter> for Parameter {
    fn from(value: CliParameter) -> Self {
        match value {
            CliParameter::AnnualSpending => Parameter::AnnualSpending,
            CliParameter::InflationRate => Parameter::InflationRate,
            CliParameter::InterestRate => Parameter::InterestRate,
            CliParameter::YearsUntilRetirement => Parameter::YearsUntilRetirement,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDirection {
    Up,
    Down,
}

impl From<CliDirection> for Direction {
    fn from(value: CliDirection) -> Self {
        match value {
            CliDirection::Up => Direction::Up,
            CliDirection::Down => Direction::Down,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiParameter {
    #[serde(
        alias = "annualSpending",
        alias = "annual_spending",
        alias = "Annual Spending Requirement"
    )]
    AnnualSpending,
    #[serde(
        alias = "inflationRate",
        alias = "inflation_rate",
        alias = "Inflation Rate"
    )]
    InflationRate,
    #[serde(
        alias = "interestRate",
        alias = "interest_rate",
        alias = "Interest Rate"
    )]
    InterestRate,
    #[serde(
        alias = "yearsUntilRetirement",
        alias = "years_until_retirement",
        alias = "Years Until Retirement"
    )]
    YearsUntilRetirement,
}

impl From<ApiParameter> for Parameter {
    fn from(value: ApiParameter) -> Self {
        match value {
            ApiParameter::AnnualSpending => Parameter::AnnualSpending,
            ApiParameter::InflationRate => Parameter::InflationRate,
            ApiParameter::InterestRate => Parameter::InterestRate,
            ApiParameter::YearsUntilRetirement => Parameter::YearsUntilRetirement,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiDirection {
    #[serde(alias = "Up", alias = "increase")]
    Up,
    #[serde(alias = "Down", alias = "decrease")]
    Down,
}

impl From<ApiDirection> for Direction {
    fn from(value: ApiDirection) -> Self {
        match value {
            ApiDirection::Up => Direction::Up,
            ApiDirection::Down => Direction::Down,
        }
    }
}

/// Request keys mirror the web form. Rates are in percent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_annual_spending: Option<f64>,
    inflation_rate: Option<f64>,
    interest_rate: Option<f64>,
    years_to_retirement: Option<u32>,
    retirement_duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjustPayload {
    #[serde(flatten)]
    inputs: ProjectPayload,
    parameter: ApiParameter,
    direction: ApiDirection,
}

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Retirement savings planner: future spending, lump sum and yearly deposit",
    version
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web planner and JSON API
    Serve {
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        host: IpAddr,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Print a single projection
    Project(ProjectArgs),
}

#[derive(Args, Debug, Clone)]
struct ProjectArgs {
    #[arg(long, default_value_t = 20_000.0, help = "Current annual spending in USD")]
    current_annual_spending: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual inflation rate in percent, e.g. 3")]
    inflation_rate: f64,
    #[arg(long, default_value_t = 8.0, help = "Annual interest rate in percent, e.g. 8")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30)]
    years_to_retirement: u32,
    #[arg(long, default_value_t = 20, help = "Retirement duration in years")]
    retirement_duration: u32,
    #[arg(
        long,
        value_enum,
        help = "Apply one Up/Down step to this parameter before projecting"
    )]
    adjust: Option<CliParameter>,
    #[arg(long, value_enum, default_value_t = CliDirection::Up)]
    direction: CliDirection,
    #[arg(long, help = "Print the full JSON response instead of the summary lines")]
    json: bool,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Inputs echoed back in request units so the form can be refreshed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputsEcho {
    current_annual_spending: f64,
    inflation_rate: f64,
    interest_rate: f64,
    years_to_retirement: u32,
    retirement_duration: u32,
}

impl From<&PlannerInputs> for InputsEcho {
    fn from(inputs: &PlannerInputs) -> Self {
        Self {
            current_annual_spending: inputs.current_annual_spending,
            inflation_rate: to_percent(inputs.inflation_rate),
            interest_rate: to_percent(inputs.interest_rate),
            years_to_retirement: inputs.years_to_retirement,
            retirement_duration: inputs.retirement_duration_years,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    inputs: InputsEcho,
    future_annual_spending: f64,
    adjusted_rate: f64,
    total_needed_at_retirement: f64,
    annual_deposit: f64,
    balance_series: Vec<BalancePoint>,
    smoothed_curve: SmoothedCurve,
    summary: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(args: &ProjectArgs) -> Result<PlannerInputs, InputError> {
    let inputs = PlannerInputs {
        current_annual_spending: args.current_annual_spending,
        inflation_rate: args.inflation_rate / 100.0,
        interest_rate: args.interest_rate / 100.0,
        years_to_retirement: args.years_to_retirement,
        retirement_duration_years: args.retirement_duration,
    };
    validate_inputs(&inputs)?;
    Ok(inputs)
}

fn default_args_for_api() -> ProjectArgs {
    let defaults = PlannerInputs::default();
    ProjectArgs {
        current_annual_spending: defaults.current_annual_spending,
        inflation_rate: to_percent(defaults.inflation_rate),
        interest_rate: to_percent(defaults.interest_rate),
        years_to_retirement: defaults.years_to_retirement,
        retirement_duration: defaults.retirement_duration_years,
        adjust: None,
        direction: CliDirection::Up,
        json: true,
    }
}

fn inputs_from_payload(payload: ProjectPayload) -> Result<PlannerInputs, InputError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.current_annual_spending {
        args.current_annual_spending = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.interest_rate {
        args.interest_rate = v;
    }
    if let Some(v) = payload.years_to_retirement {
        args.years_to_retirement = v;
    }
    if let Some(v) = payload.retirement_duration {
        args.retirement_duration = v;
    }

    build_inputs(&args)
}

fn adjusted_inputs_from_payload(payload: AdjustPayload) -> Result<PlannerInputs, InputError> {
    let inputs = inputs_from_payload(payload.inputs)?;
    let next = apply_adjustment(&inputs, payload.parameter.into(), payload.direction.into());
    validate_inputs(&next)?;
    Ok(next)
}

fn build_project_response(inputs: &PlannerInputs) -> ProjectResponse {
    let projection = run_projection(inputs);
    let smoothed_curve = smooth_curve(&projection.balance_series);
    let summary = summary_lines(&projection);
    let ProjectionResult {
        future_annual_spending,
        adjusted_rate,
        total_needed_at_retirement,
        annual_deposit,
        balance_series,
    } = projection;

    ProjectResponse {
        inputs: inputs.into(),
        future_annual_spending,
        adjusted_rate,
        total_needed_at_retirement,
        annual_deposit,
        balance_series,
        smoothed_curve,
        summary,
    }
}

fn summary_lines(projection: &ProjectionResult) -> Vec<String> {
    vec![
        format!(
            "Future Annual Spending Requirement: {} USD",
            format_usd(projection.future_annual_spending)
        ),
        format!(
            "Total Amount Needed at Retirement: {} USD",
            format_usd(projection.total_needed_at_retirement)
        ),
        format!(
            "Annual Deposit Required: {} USD",
            format_usd(projection.annual_deposit)
        ),
    ]
}

/// Two decimal places with comma thousands separators, e.g. `48,545.25`.
fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

fn to_percent(rate: f64) -> f64 {
    (rate * 100.0 * 1e6).round() / 1e6
}

pub async fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Serve { host, port } => {
            run_http_server(SocketAddr::new(host, port)).await?;
        }
        Command::Project(args) => {
            let mut inputs = build_inputs(&args)?;
            if let Some(parameter) = args.adjust {
                inputs = apply_adjustment(&inputs, parameter.into(), args.direction.into());
                validate_inputs(&inputs)?;
            }
            let response = build_project_response(&inputs);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                for line in &response.summary {
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "retirement planner listening");
    info!("local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/adjust", post(adjust_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(
    payload: Result<Query<ProjectPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => respond_with_projection(inputs_from_payload(payload)),
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn project_post_handler(payload: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => respond_with_projection(inputs_from_payload(payload)),
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn adjust_handler(payload: Result<Json<AdjustPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => respond_with_projection(adjusted_inputs_from_payload(payload)),
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

fn respond_with_projection(inputs: Result<PlannerInputs, InputError>) -> Response {
    match inputs {
        Ok(inputs) => json_response(StatusCode::OK, build_project_response(&inputs)),
        Err(err) => bad_request(&err.to_string()),
    }
}

fn bad_request(msg: &str) -> Response {
    warn!(error = msg, "rejected planner request");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
