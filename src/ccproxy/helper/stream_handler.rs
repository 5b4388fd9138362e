use crate::ccproxy::{
    adapter::OpenAIOutputAdapter,
    errors::{CCProxyError, ProxyResult},
};

use async_stream::stream;
use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use futures_util::Stream;
use http::{header, HeaderValue, StatusCode};
use std::convert::Infallible;
use std::time::Duration;

/// Byte stream of a pseudo-streamed reply.
///
/// Both payloads are serialized up front, so a failure surfaces before the
/// stream opens. The empty chunk is yielded immediately; the content chunk and
/// `[DONE]` follow after `delay`. The upstream reply is already complete at
/// this point, the delay only paces the events.
pub fn pseudo_stream(
    output_adapter: OpenAIOutputAdapter,
    content: String,
    delay: Duration,
) -> ProxyResult<impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static> {
    let opening = output_adapter.opening_event()?.to_string();
    let closing: String = output_adapter
        .closing_events(content)?
        .iter()
        .map(|event| event.to_string())
        .collect();
    let message_id = output_adapter.message_id().to_string();

    Ok(stream! {
        yield Ok::<_, Infallible>(Bytes::from(opening));

        tokio::time::sleep(delay).await;

        yield Ok(Bytes::from(closing));

        log::debug!("Pseudo stream {} finished", message_id);
    })
}

/// Wraps the pseudo stream in a `text/event-stream` response.
pub fn handle_pseudo_stream_response(
    output_adapter: OpenAIOutputAdapter,
    content: String,
    delay: Duration,
) -> ProxyResult<Response> {
    let body = Body::from_stream(pseudo_stream(output_adapter, content, delay)?);

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .body(body)
        .map_err(|e| CCProxyError::ResponseBuild(e.to_string()))?;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

    Ok(response)
}
