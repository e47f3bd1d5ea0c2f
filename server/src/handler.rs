use std::convert::Infallible;

use bytes::Bytes;
use msgs::{client_server_msg::LocationUpdate, BusId};
use serde_json::Value;
use warp::{http::StatusCode, reject::Rejection, Filter, Reply};

use crate::{context::TrackerContextRef, tracking::apply_location_update, ws, Result};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn routes(context_ref: TrackerContextRef) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let api_routes = warp::path("api").and(
        warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and_then(health_handler)
            .or(warp::path("locations")
                .and(warp::path::end())
                .and(warp::get())
                .and(with_context(context_ref.clone()))
                .and_then(locations_handler))
            .or(warp::path("ws")
                .and(warp::path::end())
                .and(warp::ws())
                .and(with_context(context_ref.clone()))
                .and_then(ws_handler)),
    );

    let update_location_route = warp::path("update_location")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_context(context_ref))
        .and_then(update_location_handler);

    api_routes.or(update_location_route).with(warp::cors().allow_any_origin())
}

fn with_context(context_ref: TrackerContextRef) -> impl Filter<Extract = (TrackerContextRef,), Error = Infallible> + Clone {
    warp::any().map(move || context_ref.clone())
}

pub async fn ws_handler(ws: warp::ws::Ws, context_ref: TrackerContextRef) -> Result<impl Reply> {
    Ok(ws.on_upgrade(move |socket| ws::frontend_connection_process(socket, context_ref)))
}

pub async fn health_handler() -> Result<impl Reply> {
    Ok(StatusCode::OK)
}

pub async fn locations_handler(context_ref: TrackerContextRef) -> Result<impl Reply> {
    let locations = context_ref.read().await.fleet.locations();
    Ok(warp::reply::json(&locations))
}

pub async fn update_location_handler(body: Bytes, context_ref: TrackerContextRef) -> Result<impl Reply> {
    let parsed = serde_json::from_slice::<Value>(&body).ok();
    let Some(update) = parsed.as_ref().and_then(parse_location_update) else {
        tracing::warn!("rejecting location update with missing or invalid data: {}", String::from_utf8_lossy(&body));
        return Ok(warp::reply::with_status("Missing or invalid data", StatusCode::BAD_REQUEST));
    };

    Ok(match apply_location_update(update, &context_ref).await {
        Ok(_) => warp::reply::with_status("OK", StatusCode::OK),
        Err(e) => {
            tracing::warn!("location update rejected: {e}");
            warp::reply::with_status(e.reason(), e.status())
        }
    })
}

/// Numbers may also arrive as numeric strings, as form-encoding clients send them.
fn parse_location_update(body: &Value) -> Option<LocationUpdate> {
    let id = match body.get("id")? {
        Value::Number(n) => BusId::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let lat = number(body.get("lat")?)?;
    let lng = number(body.get("lng")?)?;
    Some(LocationUpdate { id, lat, lng })
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
