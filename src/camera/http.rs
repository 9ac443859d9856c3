//! [`CameraSource`] over HTTP.
//!
//! | Content type | Handling |
//! |--------------|----------|
//! | `multipart/x-mixed-replace` | MJPEG: split into JPEGs, decode each |
//! | anything else | one still image, decoded whole |
//!
//! Decoding runs on the blocking pool so a large frame never stalls the
//! render loop. When several MJPEG frames complete in one body chunk only the
//! newest is decoded.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use reqwest::{Client, Response, header::CONTENT_TYPE};
use url::Url;

use super::{BitmapStream, CameraSource, mjpeg::JpegSplitter};
use crate::{error::HudError, surface::Bitmap};

pub struct HttpCameraSource {
    client: Client,
}

impl HttpCameraSource {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl CameraSource for HttpCameraSource {
    async fn open(&self, url: &Url) -> Result<BitmapStream, HudError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HudError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if is_multipart(&response) {
            Ok(mjpeg_frames(response.bytes_stream()).boxed_local())
        } else {
            Ok(stream::once(decode_still(response)).boxed_local())
        }
    }
}

fn is_multipart(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/"))
}

async fn decode_still(response: Response) -> Result<Bitmap, HudError> {
    let body = response.bytes().await?;
    decode_off_thread(body).await
}

async fn decode_off_thread(jpeg: Bytes) -> Result<Bitmap, HudError> {
    tokio::task::spawn_blocking(move || Bitmap::decode(&jpeg)).await?
}

/// Decode an MJPEG body into bitmaps. A body error is yielded once and ends the stream.
pub fn mjpeg_frames<B, E>(body: B) -> impl Stream<Item = Result<Bitmap, HudError>>
where
    B: Stream<Item = Result<Bytes, E>>,
    E: Into<HudError>,
{
    struct Splitting<B> {
        body: Option<Pin<Box<B>>>,
        splitter: JpegSplitter,
    }

    let init = Splitting {
        body: Some(Box::pin(body)),
        splitter: JpegSplitter::new(),
    };

    stream::unfold(init, |mut st| async move {
        loop {
            let next = match st.body.as_mut() {
                Some(body) => body.next().await,
                None => return None,
            };
            match next {
                Some(Ok(chunk)) => {
                    if let Some(jpeg) = st.splitter.feed(&chunk).pop() {
                        return Some((decode_off_thread(jpeg).await, st));
                    }
                }
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
    use std::io::Cursor;

    use embedded_graphics::prelude::*;
    use image::{ImageFormat, RgbImage};

    use super::*;

    fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]))
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        out.into_inner()
    }

    fn part(jpeg: &[u8]) -> Vec<u8> {
        let mut v = b"--frame\r\nContent-Type: image/jpeg\r\n\r\n".to_vec();
        v.extend_from_slice(jpeg);
        v.extend_from_slice(b"\r\n");
        v
    }

    #[tokio::test]
    async fn test_mjpeg_body_decoded_per_frame() {
        let first = part(&encoded_jpeg(8, 6));
        let second = part(&encoded_jpeg(16, 9));
        let (head, tail) = second.split_at(second.len() / 2);
        let body = stream::iter(vec![
            Ok::<_, HudError>(Bytes::from(first)),
            Ok(Bytes::copy_from_slice(head)),
            Ok(Bytes::copy_from_slice(tail)),
        ]);

        let frames: Vec<_> = mjpeg_frames(body).collect().await;
        let sizes: Vec<_> = frames.into_iter().map(|f| f.unwrap().size()).collect();
        assert_eq!(sizes, vec![Size::new(8, 6), Size::new(16, 9)]);
    }

    #[tokio::test]
    async fn test_only_newest_frame_of_chunk_decoded() {
        let mut chunk = part(&encoded_jpeg(8, 6));
        chunk.extend(part(&encoded_jpeg(4, 4)));
        let body = stream::iter(vec![Ok::<_, HudError>(Bytes::from(chunk))]);

        let frames: Vec<_> = mjpeg_frames(body).collect().await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref().unwrap().size(), Size::new(4, 4));
    }

    #[tokio::test]
    async fn test_corrupt_frame_is_decode_error() {
        let body = stream::iter(vec![Ok::<_, HudError>(Bytes::from(part(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9])))]);
        let frames: Vec<_> = mjpeg_frames(body).collect().await;
        assert!(matches!(frames[0], Err(HudError::Decode(_))));
    }

    #[tokio::test]
    async fn test_body_error_ends_stream() {
        let body = stream::iter(vec![Err(HudError::EmptyStream), Ok(Bytes::from(part(&encoded_jpeg(2, 2))))]);
        let frames: Vec<_> = mjpeg_frames(body).collect().await;
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_err());
    }
}
