use tokio::sync::RwLock;

use super::errors::ApiResponseError;
use super::requests::{
    CreatePayload, DrawQuery, ResetPayload, RestorePayload, SetStatePayload, UpdateBatchPayload,
    UpdatePayload,
};
use super::responses::{CreateExperimentResponse, DrawResponse, ListExperimentsResponse};
use crate::repository::Repository;

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query, ServiceConfig},
    HttpResponse, Responder, Result,
};
use uuid::Uuid;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(ping)
        .service(list)
        .service(clear)
        .service(create)
        .service(restore)
        .service(delete_experiment)
        .service(reset)
        .service(draw)
        .service(update)
        .service(update_batch)
        .service(stats)
        .service(state)
        .service(set_state);
}

fn parse_experiment_id(path: Path<String>) -> Result<Uuid, ApiResponseError> {
    Uuid::try_parse(&path.into_inner()).map_err(ApiResponseError::ErrorBadUuid)
}

#[get("ping")]
async fn ping() -> Result<impl Responder> {
    Ok(HttpResponse::Ok().finish())
}

#[get("list")]
async fn list(repository: Data<RwLock<Repository>>) -> Result<impl Responder> {
    let experiment_ids = repository.read().await.list_experiments();

    Ok(Json(ListExperimentsResponse { experiment_ids }))
}

#[delete("clear")]
async fn clear(repository: Data<RwLock<Repository>>) -> Result<impl Responder> {
    repository.write().await.clear();

    Ok(HttpResponse::Ok())
}

#[post("create")]
async fn create(
    repository: Data<RwLock<Repository>>,
    payload: Json<CreatePayload>,
) -> Result<impl Responder> {
    let CreatePayload {
        arms,
        epsilon,
        seed,
    } = payload.into_inner();
    let experiment_id = repository
        .write()
        .await
        .create_experiment(arms, epsilon, seed)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(Json(CreateExperimentResponse { experiment_id }))
}

#[post("restore")]
async fn restore(
    repository: Data<RwLock<Repository>>,
    payload: Json<RestorePayload>,
) -> Result<impl Responder> {
    let RestorePayload {
        state: snapshot,
        seed,
    } = payload.into_inner();
    let experiment_id = repository
        .write()
        .await
        .restore_experiment(snapshot, seed)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(Json(CreateExperimentResponse { experiment_id }))
}

#[delete("{experiment_id}/delete")]
async fn delete_experiment(
    repository: Data<RwLock<Repository>>,
    path: Path<String>,
) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    repository
        .write()
        .await
        .delete_experiment(experiment_id)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(HttpResponse::Ok())
}

#[put("{experiment_id}/reset")]
async fn reset(
    repository: Data<RwLock<Repository>>,
    path: Path<String>,
    payload: Option<Json<ResetPayload>>,
) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    let arm_count = payload.and_then(|payload| payload.into_inner().arms);
    repository
        .read()
        .await
        .reset_experiment(experiment_id, arm_count)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(HttpResponse::Ok())
}

#[get("{experiment_id}/draw")]
async fn draw(
    repository: Data<RwLock<Repository>>,
    path: Path<String>,
    query: Query<DrawQuery>,
) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    let arm_id = repository
        .read()
        .await
        .draw_experiment(experiment_id, query.into_inner().draw)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(Json(DrawResponse { arm_id }))
}

#[put("{experiment_id}/update")]
async fn update(
    repository: Data<RwLock<Repository>>,
    path: Path<String>,
    payload: Json<UpdatePayload>,
) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    let UpdatePayload { arm_id, reward } = payload.into_inner();
    repository
        .read()
        .await
        .update_experiment(experiment_id, arm_id, reward)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(HttpResponse::Ok())
}

#[put("{experiment_id}/update_batch")]
async fn update_batch(
    repository: Data<RwLock<Repository>>,
    path: Path<String>,
    payload: Json<UpdateBatchPayload>,
) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    let updates: Vec<(usize, f64)> = payload
        .into_inner()
        .updates
        .iter()
        .map(|u| (u.arm_id, u.reward))
        .collect();

    repository
        .read()
        .await
        .batch_update_experiment(experiment_id, &updates)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(HttpResponse::Ok())
}

#[get("{experiment_id}/stats")]
async fn stats(repository: Data<RwLock<Repository>>, path: Path<String>) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    let response = repository
        .read()
        .await
        .experiment_stats(experiment_id)
        .map(Json)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(response)
}

#[get("{experiment_id}/state")]
async fn state(repository: Data<RwLock<Repository>>, path: Path<String>) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    let response = repository
        .read()
        .await
        .experiment_state(experiment_id)
        .map(Json)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(response)
}

#[put("{experiment_id}/state")]
async fn set_state(
    repository: Data<RwLock<Repository>>,
    path: Path<String>,
    payload: Json<SetStatePayload>,
) -> Result<impl Responder> {
    let experiment_id = parse_experiment_id(path)?;
    let SetStatePayload { counts, rewards } = payload.into_inner();
    repository
        .read()
        .await
        .set_experiment_state(experiment_id, counts, rewards)
        .map_err(ApiResponseError::ErrorBadRequest)?;

    Ok(HttpResponse::Ok())
}
