//! [`EventSource`] over a streaming HTTP GET.

use std::{collections::VecDeque, pin::Pin};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use reqwest::{Client, header::ACCEPT};
use url::Url;

use super::{
    link::{EventSource, FrameStream},
    sse::{SseDecoder, SseFrame},
};
use crate::error::HudError;

pub struct HttpEventSource {
    client: Client,
}

impl HttpEventSource {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl EventSource for HttpEventSource {
    async fn subscribe(&self, url: &Url) -> Result<FrameStream, HudError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HudError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(decode_frames(response.bytes_stream()).boxed_local())
    }
}

/// Run body chunks through an [`SseDecoder`], one frame per item.
///
/// A body error is yielded once and ends the stream.
pub fn decode_frames<B, E>(body: B) -> impl Stream<Item = Result<SseFrame, HudError>>
where
    B: Stream<Item = Result<Bytes, E>>,
    E: Into<HudError>,
{
    struct Decoding<B> {
        body: Option<Pin<Box<B>>>,
        decoder: SseDecoder,
        pending: VecDeque<SseFrame>,
    }

    let init = Decoding {
        body: Some(Box::pin(body)),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
    };

    stream::unfold(init, |mut st| async move {
        loop {
            if let Some(frame) = st.pending.pop_front() {
                return Some((Ok::<_, HudError>(frame), st));
            }
            let next = match st.body.as_mut() {
                Some(body) => body.next().await,
                None => return None,
            };
            match next {
                Some(Ok(chunk)) => st.pending.extend(st.decoder.feed(&chunk)),
                Some(Err(e)) => {
                    st.body = None;
                    let err: HudError = e.into();
                    return Some((Err(err), st));
                }
                None => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn chunks(parts: Vec<&'static str>) -> impl Stream<Item = Result<Bytes, HudError>> {
        stream::iter(parts.into_iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))))
    }

    #[tokio::test]
    async fn test_frames_across_chunks() {
        let body = chunks(vec!["retry: 1000\nevent: tele", "metry\ndata: {}\n", "\n: ping\n\n"]);
        let frames: Vec<_> = decode_frames(body).collect().await;
        assert_eq!(frames.len(), 3);
        assert!(matches!(&frames[0], Ok(SseFrame::Retry(d)) if *d == Duration::from_millis(1000)));
        assert!(matches!(&frames[1], Ok(SseFrame::Event(e)) if e.event == "telemetry" && e.data == "{}"));
        assert!(matches!(&frames[2], Ok(SseFrame::Comment)), "keep-alive surfaces as a frame");
    }

    #[tokio::test]
    async fn test_body_error_ends_stream() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"data: 1\n\n")),
            Err(HudError::EmptyStream),
            Ok(Bytes::from_static(b"data: 2\n\n")),
        ]);
        let frames: Vec<_> = decode_frames(body).collect().await;
        assert_eq!(frames.len(), 2, "nothing after the error");
        assert!(frames[0].is_ok());
        assert!(matches!(frames[1], Err(HudError::EmptyStream)));
    }

    #[tokio::test]
    async fn test_partial_event_at_end_is_dropped() {
        let frames: Vec<_> = decode_frames(chunks(vec!["data: unfinished\n"])).collect().await;
        assert!(frames.is_empty());
    }
}
