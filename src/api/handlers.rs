// API request handlers
// Author: Gabriel Demetrios Lafis

use actix_web::{web, HttpResponse};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::data::{parse_dataset, FieldType};
use crate::processing::{DatasetProcessor, GroupMap};
use crate::utils::{validate_dataset_name, validate_field, validate_field_type};
use super::{models::*, ApiError, AppState};

fn processor_for(state: &AppState, name: &str) -> Result<DatasetProcessor, ApiError> {
    Ok(DatasetProcessor::new(state.storage.load(name)?))
}

/// List all datasets
pub async fn list_datasets(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let datasets = state.storage.list()?;

    Ok(HttpResponse::Ok().json(json!({
        "datasets": datasets,
    })))
}

/// Ingest an uploaded document and store it
pub async fn create_dataset(
    state: web::Data<AppState>,
    payload: web::Json<UploadRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = payload.into_inner();
    validate_dataset_name(&req.name).map_err(ApiError::ValidationError)?;

    let dataset = parse_dataset(&req.content, req.format, &state.ingest)?;
    let dataset = state.storage.store(&req.name, dataset)?;

    Ok(HttpResponse::Created().json(DatasetSummary {
        name: req.name,
        rows: dataset.len(),
        fields: dataset.schema.fields.clone(),
    }))
}

/// Get a dataset with its rows
pub async fn get_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let name = path.into_inner();
    let dataset = state.storage.load(&name)?;

    Ok(HttpResponse::Ok().json(json!({
        "name": name,
        "fields": dataset.schema.fields,
        "count": dataset.len(),
        "rows": dataset.rows,
    })))
}

/// Delete a dataset
pub async fn delete_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.storage.delete(&path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// Dataset-wide counts
pub async fn dataset_stats(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let processor = processor_for(&state, &path.into_inner())?;
    Ok(HttpResponse::Ok().json(processor.stats()))
}

/// Distinct non-missing values of a field
pub async fn field_unique_values(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (name, field) = path.into_inner();
    let processor = processor_for(&state, &name)?;
    validate_field(processor.schema(), &field).map_err(ApiError::NotFound)?;

    let values = processor.unique_values(&field);
    Ok(HttpResponse::Ok().json(json!({
        "field": field,
        "count": values.len(),
        "values": values,
    })))
}

/// Numeric summary of a field; 404 when unavailable
pub async fn field_numeric_stats(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (name, field) = path.into_inner();
    let processor = processor_for(&state, &name)?;
    validate_field_type(processor.schema(), &field, FieldType::Number)
        .map_err(ApiError::NotFound)?;

    match processor.numeric_stats(&field) {
        Some(stats) => Ok(HttpResponse::Ok().json(stats)),
        None => Err(ApiError::NotFound(format!(
            "Field '{}' has no numeric values",
            field
        ))),
    }
}

/// Build a working view and return it as rows or exported text
pub async fn query_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<QueryRequest>,
) -> Result<HttpResponse, ApiError> {
    let processor = processor_for(&state, &path.into_inner())?;
    let req = payload.into_inner();

    let mut rows = processor.filter(&req.filters);
    if !req.sort.is_empty() {
        rows = processor.sort(&rows, &req.sort);
    }

    if let Some(sample) = &req.sample {
        let view = DatasetProcessor::new(processor.dataset().derive(rows));
        rows = match sample.seed {
            Some(seed) => view.sample_with_rng(
                sample.size,
                sample.method,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => view.sample(sample.size, sample.method),
        };
    }

    if req.clean {
        rows = processor.clean_rows(&rows);
    }

    match req.format {
        Some(format) => {
            let text = processor.export(&rows, format)?;
            Ok(HttpResponse::Ok()
                .content_type(format.content_type())
                .body(text))
        }
        None => Ok(HttpResponse::Ok().json(QueryResponse {
            count: rows.len(),
            rows,
        })),
    }
}

/// Aggregate a value field per group
pub async fn aggregate_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<AggregateRequest>,
) -> Result<HttpResponse, ApiError> {
    let processor = processor_for(&state, &path.into_inner())?;
    let req = payload.into_inner();
    validate_field(processor.schema(), &req.group_field).map_err(ApiError::ValidationError)?;

    let result = processor.aggregate(&req.group_field, &req.value_field, req.op);
    Ok(HttpResponse::Ok().json(json!({
        "group_field": req.group_field,
        "value_field": req.value_field,
        "op": req.op.name(),
        "result": result,
    })))
}

/// Group sizes for a field
pub async fn group_dataset(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<GroupsRequest>,
) -> Result<HttpResponse, ApiError> {
    let processor = processor_for(&state, &path.into_inner())?;
    let req = payload.into_inner();

    let sizes: GroupMap<usize> = processor
        .group_by(&req.field)
        .into_iter()
        .map(|(key, rows)| (key, rows.len()))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "field": req.field,
        "groups": sizes,
    })))
}
