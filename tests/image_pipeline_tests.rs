mod common;

use anyhow::Result;
use futures::StreamExt;
use image::{ColorType, DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{RecordingApi, PEER_ID};
use vk_photo_bot::errors::BotError;
use vk_photo_bot::image_pipeline::{Monochrome, Transform};
use vk_photo_bot::vk::{Photo, PhotoSize};

fn sample_jpeg() -> Vec<u8> {
    let rgb = RgbImage::from_fn(16, 8, |x, y| Rgb([(x * 15) as u8, (y * 30) as u8, 200]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut buffer, ImageOutputFormat::Jpeg(90))
        .unwrap();
    buffer.into_inner()
}

fn size(kind: &str, url: String, width: u32, height: u32) -> PhotoSize {
    PhotoSize {
        kind: kind.to_string(),
        url,
        width,
        height,
    }
}

/// Photo whose only decodable size is the largest one
fn photo_on(server: &MockServer, id: i64) -> Photo {
    Photo {
        id,
        owner_id: PEER_ID,
        access_key: None,
        sizes: vec![
            size("s", format!("{}/small/{id}", server.uri()), 75, 40),
            size("w", format!("{}/large/{id}", server.uri()), 1600, 800),
            size("m", format!("{}/small/{id}", server.uri()), 130, 65),
        ],
    }
}

#[tokio::test]
async fn test_monochrome_uploads_grayscale_png() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large/1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sample_jpeg()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/large/2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sample_jpeg()))
        .expect(1)
        .mount(&server)
        .await;

    let api = RecordingApi::default();
    let transform = Monochrome;
    let attachments: Vec<String> = transform
        .apply(&api, PEER_ID, vec![photo_on(&server, 1), photo_on(&server, 2)])
        .map(|a| a.unwrap())
        .collect()
        .await;

    assert_eq!(attachments, vec!["photo-1_1", "photo-1_2"]);

    let uploads = api.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 2);
    for (peer_id, png) in uploads.iter() {
        assert_eq!(*peer_id, PEER_ID);
        assert_eq!(image::guess_format(png)?, image::ImageFormat::Png);
        let decoded = image::load_from_memory(png)?;
        assert_eq!(decoded.color(), ColorType::L8);
    }
    Ok(())
}

#[tokio::test]
async fn test_stream_is_lazy() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(sample_jpeg()))
        .expect(1)
        .mount(&server)
        .await;

    let api = RecordingApi::default();
    let transform = Monochrome;
    let photos = vec![photo_on(&server, 1), photo_on(&server, 2)];
    let mut stream = transform.apply(&api, PEER_ID, photos);

    assert!(api.uploads.lock().unwrap().is_empty());
    let first = stream.next().await.expect("one item")?;
    assert_eq!(first, "photo-1_1");
    assert_eq!(api.uploads.lock().unwrap().len(), 1);
    drop(stream);

    // Second photo was never fetched; `expect(1)` is verified on drop
    Ok(())
}

#[tokio::test]
async fn test_download_failure_propagates() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = RecordingApi::default();
    let transform = Monochrome;
    let mut stream = transform.apply(&api, PEER_ID, vec![photo_on(&server, 1)]);

    assert!(stream.next().await.expect("one item").is_err());
    assert!(api.uploads.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_undecodable_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a photo</html>"))
        .mount(&server)
        .await;

    let api = RecordingApi::default();
    let transform = Monochrome;
    let mut stream = transform.apply(&api, PEER_ID, vec![photo_on(&server, 1)]);

    assert!(stream.next().await.expect("one item").is_err());
    assert!(api.uploads.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_photo_without_sizes() -> Result<()> {
    let api = RecordingApi::default();
    let transform = Monochrome;
    let photo = Photo {
        id: 9,
        owner_id: PEER_ID,
        access_key: None,
        sizes: Vec::new(),
    };

    let err = transform
        .apply(&api, PEER_ID, vec![photo])
        .next()
        .await
        .expect("one item")
        .unwrap_err();

    assert_eq!(err.downcast_ref::<BotError>(), Some(&BotError::NoPhotoSizes(9)));
    Ok(())
}
