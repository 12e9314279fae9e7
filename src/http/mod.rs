mod content_type;
mod error;

use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::spawn_blocking;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::expense::{Expense, ExpensePayload, ExpenseService};
use crate::pod::{PodError, ResourceClient, iri};
use crate::rdf::syntax::Syntax;

use self::content_type::RdfBody;
use self::error::ApiError;

type SharedService<C> = Arc<ExpenseService<C>>;

pub(crate) async fn serve<C>(config: &ServerConfig, service: ExpenseService<C>) -> Result<()>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let app = router(service);
    let address = format!("{}:{}", config.bind_address, config.http_port);
    let listener = TcpListener::bind(&address).await?;
    info!(target: "http", %address, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub(crate) fn router<C>(service: ExpenseService<C>) -> Router
where
    C: ResourceClient + Send + Sync + 'static,
{
    let api = Router::new()
        .route("/pods", get(get_pods::<C>))
        .route("/expenses/create", post(create_expense::<C>))
        .route("/expenses/get", get(get_expense::<C>))
        .route("/expenses/turtle", get(get_expense_rdf::<C>))
        .route("/expenses/update", put(update_expense::<C>))
        .route("/expenses/delete", delete(delete_expense::<C>))
        .route("/resource/nonRDF/add", put(add_file::<C>))
        .route("/expenses/receipts/add", put(add_receipt::<C>))
        .route("/expenses/receipts/remove", delete(remove_receipt::<C>));
    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(service))
}

async fn shutdown_signal() {
    let (Ok(mut sigterm), Ok(mut sigint)) = (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) else {
        return std::future::pending().await;
    };
    tokio::select! {
        _ = sigterm.recv() => {
            info!(target: "http", "Received the terminate signal; stopping");
        }
        _ = sigint.recv() => {
            info!(target: "http", "Received the interrupt signal; stopping");
        }
    }
}

/// Runs a blocking pod operation off the async workers.
async fn blocking<C, T, F>(service: SharedService<C>, operation: F) -> Result<T, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&ExpenseService<C>) -> Result<T, PodError> + Send + 'static,
{
    let result = spawn_blocking(move || operation(&service))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(result?)
}

#[derive(Deserialize)]
struct WebIdQuery {
    #[serde(default)]
    webid: String,
}

#[derive(Deserialize)]
struct ResourceQuery {
    #[serde(rename = "resourceURL", default)]
    resource_url: String,
}

#[derive(Deserialize)]
struct DestinationQuery {
    #[serde(rename = "destinationURL")]
    destination_url: String,
}

#[derive(Deserialize)]
struct UnlinkQuery {
    #[serde(rename = "expenseURL")]
    expense_url: String,
    #[serde(rename = "receiptURL")]
    receipt_url: String,
}

#[derive(Deserialize)]
struct ReceiptQuery {
    #[serde(rename = "expenseURL")]
    expense_url: String,
    #[serde(rename = "destinationURL")]
    destination_url: Option<String>,
}

async fn get_pods<C>(
    State(service): State<SharedService<C>>,
    Query(query): Query<WebIdQuery>,
) -> Result<Json<Vec<String>>, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let pods = blocking(service, move |s| s.pods(&query.webid)).await?;
    Ok(Json(pods.into_iter().collect()))
}

async fn create_expense<C>(
    State(service): State<SharedService<C>>,
    Json(payload): Json<ExpensePayload>,
) -> Result<Json<ExpensePayload>, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let expense = Expense::from_payload(payload)?;
    let created = blocking(service, move |s| s.create(expense)).await?;
    Ok(Json(created.to_payload()?))
}

async fn get_expense<C>(
    State(service): State<SharedService<C>>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<ExpensePayload>, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let expense = blocking(service, move |s| s.read(&query.resource_url)).await?;
    Ok(Json(expense.to_payload()?))
}

async fn get_expense_rdf<C>(
    State(service): State<SharedService<C>>,
    Query(query): Query<ResourceQuery>,
    headers: HeaderMap,
) -> Result<RdfBody, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let syntax = Syntax::negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()));
    let expense = blocking(service, move |s| s.read(&query.resource_url)).await?;
    let bytes = expense
        .serialize(syntax)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(RdfBody(syntax, bytes))
}

async fn update_expense<C>(
    State(service): State<SharedService<C>>,
    Json(payload): Json<ExpensePayload>,
) -> Result<Json<ExpensePayload>, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let updated = blocking(service, move |s| s.update_from_payload(payload)).await?;
    Ok(Json(updated.to_payload()?))
}

async fn delete_expense<C>(
    State(service): State<SharedService<C>>,
    Query(query): Query<ResourceQuery>,
) -> Result<StatusCode, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    blocking(service, move |s| s.delete(&query.resource_url)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_file<C>(
    State(service): State<SharedService<C>>,
    Query(query): Query<DestinationQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<String, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let content_type = content_type_of(&headers);
    blocking(service, move |s| {
        s.store_file(&query.destination_url, &content_type, body.to_vec())
    })
    .await
}

async fn add_receipt<C>(
    State(service): State<SharedService<C>>,
    Query(query): Query<ReceiptQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ExpensePayload>, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let content_type = content_type_of(&headers);
    let receipt = match query.destination_url {
        Some(destination) => destination,
        None => iri::sibling(&query.expense_url, &Uuid::now_v7().to_string())?,
    };
    let expense = blocking(service, move |s| {
        s.attach_receipt(body.to_vec(), &content_type, &query.expense_url, &receipt)
    })
    .await?;
    Ok(Json(expense.to_payload()?))
}

async fn remove_receipt<C>(
    State(service): State<SharedService<C>>,
    Query(query): Query<UnlinkQuery>,
) -> Result<Json<ExpensePayload>, ApiError>
where
    C: ResourceClient + Send + Sync + 'static,
{
    let expense = blocking(service, move |s| {
        s.detach_receipt(&query.expense_url, &query.receipt_url)
    })
    .await?;
    Ok(Json(expense.to_payload()?))
}

fn content_type_of(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string()
}
