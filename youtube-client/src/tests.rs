#[cfg(test)]
mod tests {
    use crate::YouTubeSession;
    use crudpanel_core::{
        AppConfig, CoreError, ErrorExt, ErrorKind, YouTubeApiError, YouTubeCredentials,
    };
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> AppConfig {
        let mut config = AppConfig::default();
        config.request_timeout_secs = 5;
        config.youtube.api_base = format!("{}/youtube/v3", server.uri());
        config.youtube.upload_base = format!("{}/upload/youtube/v3", server.uri());
        config
    }

    fn session(server: &MockServer) -> YouTubeSession {
        let credentials = YouTubeCredentials::new("test-key").unwrap();
        YouTubeSession::new(&credentials, &test_config(server)).unwrap()
    }

    fn clip() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        file.write_all(b"\x00\x00\x00\x18ftypmp42").unwrap();
        file
    }

    #[tokio::test]
    async fn test_upload_uses_resumable_protocol() {
        let server = MockServer::start().await;
        let session_uri = format!("{}/upload-session/xyz", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/youtube/v3/videos"))
            .and(query_param("uploadType", "resumable"))
            .and(query_param("part", "snippet,status"))
            .and(query_param("key", "test-key"))
            .and(header("X-Upload-Content-Type", "video/mp4"))
            .and(body_partial_json(json!({
                "snippet": {
                    "title": "My clip",
                    "description": "About it",
                    "tags": ["a", "b", "c"],
                    "categoryId": "22"
                },
                "status": {"privacyStatus": "public"}
            })))
            .respond_with(ResponseTemplate::new(200).insert_header("Location", session_uri.as_str()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/upload-session/xyz"))
            .and(header("content-type", "video/mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#video",
                "id": "vid123",
                "snippet": {"title": "My clip"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = clip();
        let video_id = session(&server)
            .upload("My clip", "About it", "a,b,c", 22, file.path())
            .await
            .unwrap();
        assert_eq!(video_id, "vid123");
    }

    #[tokio::test]
    async fn test_upload_sends_single_empty_tag() {
        let server = MockServer::start().await;
        let session_uri = format!("{}/upload-session/empty", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/youtube/v3/videos"))
            .and(body_partial_json(json!({"snippet": {"tags": [""]}})))
            .respond_with(ResponseTemplate::new(200).insert_header("Location", session_uri.as_str()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/upload-session/empty"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "vid456"})))
            .mount(&server)
            .await;

        let file = clip();
        let video_id = session(&server)
            .upload("Untagged", "", "", 1, file.path())
            .await
            .unwrap();
        assert_eq!(video_id, "vid456");
    }

    #[tokio::test]
    async fn test_upload_without_session_uri_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let file = clip();
        let error = session(&server)
            .upload("T", "D", "x", 22, file.path())
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            CoreError::YouTubeApi(YouTubeApiError::UploadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_upload_missing_file_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let error = session(&server)
            .upload("T", "D", "x", 22, std::path::Path::new("/no/such/clip.mp4"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_video() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("id", "vid123"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        session(&server).delete("vid123").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_unknown_video() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "code": 404,
                    "message": "Video not found.",
                    "errors": [{"reason": "videoNotFound"}]
                }
            })))
            .mount(&server)
            .await;

        let error = session(&server).delete("nope").await.unwrap_err();
        assert!(matches!(
            error,
            CoreError::YouTubeApi(YouTubeApiError::VideoNotFound { ref video_id }) if video_id == "nope"
        ));
        assert_eq!(error.kind(), ErrorKind::RemoteApi);
    }

    #[tokio::test]
    async fn test_list_caps_max_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("chart", "mostPopular"))
            .and(query_param("part", "snippet"))
            .and(query_param("maxResults", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#videoListResponse",
                "items": [
                    {"id": "v1", "snippet": {"title": "One", "description": "", "tags": ["x"]}},
                    {"id": "v2", "snippet": {"title": "Two", "channelTitle": "Chan"}}
                ],
                "nextPageToken": "CAIQAA"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let videos = session(&server).list(100).await.unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].tags, vec!["x"]);
        assert_eq!(videos[1].channel_title.as_deref(), Some("Chan"));
    }

    #[tokio::test]
    async fn test_list_zero_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(0)
            .mount(&server)
            .await;

        let videos = session(&server).list(0).await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_key_surfaces_on_first_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "errors": [{"reason": "keyInvalid", "domain": "global"}]
                }
            })))
            .mount(&server)
            .await;

        let error = session(&server).list(5).await.unwrap_err();
        assert!(matches!(
            error,
            CoreError::YouTubeApi(YouTubeApiError::InvalidApiKey { .. })
        ));
        assert_eq!(error.kind(), ErrorKind::RemoteApi);
    }
}
