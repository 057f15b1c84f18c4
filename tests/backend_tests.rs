//! Backend client tests against a mock REST server

use resume_studio::backend::{BackendClient, FileStorage, ResumeRepository, RestResumeRepository};
use resume_studio::error::{ResumeStudioError, UNSUPPORTED_FILE_GUIDANCE};
use resume_studio::resume::{NewResume, ResumeData, ResumeStatus, ResumeUpdate};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), "anon-key")
        .unwrap()
        .with_access_token("user-token")
}

fn row(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": "u1",
        "title": title,
        "data": {"title": title, "personalInfo": {"fullName": "Ada Lovelace"}},
        "status": "draft",
        "file_path": null,
        "created_at": "2024-03-01T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z"
    })
}

#[tokio::test]
async fn test_create_inserts_row_for_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/resumes"))
        .and(header("apikey", "anon-key"))
        .and(header("Authorization", "Bearer user-token"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({"user_id": "u1", "title": "Analyst", "status": "draft"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row("r1", "Analyst")])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = RestResumeRepository::new(client(&server));
    let data = ResumeData {
        title: "Analyst".to_string(),
        ..Default::default()
    };
    let record = repo.create("u1", &NewResume::from_data(data)).await.unwrap();

    assert_eq!(record.id, "r1");
    assert_eq!(record.status, ResumeStatus::Draft);
    assert_eq!(record.data.personal_info.full_name, "Ada Lovelace");
}

#[tokio::test]
async fn test_list_filters_by_user_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/resumes"))
        .and(query_param("user_id", "eq.u1"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("r2", "Newer"), row("r1", "Older")])))
        .mount(&server)
        .await;

    let repo = RestResumeRepository::new(client(&server));
    let records = repo.list_by_user("u1").await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r2", "r1"]);
}

#[tokio::test]
async fn test_fetch_missing_row_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/resumes"))
        .and(query_param("id", "eq.missing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let repo = RestResumeRepository::new(client(&server));
    let err = repo.fetch("missing").await.unwrap_err();
    assert!(matches!(err, ResumeStudioError::NotFound(_)));
}

#[tokio::test]
async fn test_update_patches_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/resumes"))
        .and(query_param("id", "eq.r1"))
        .and(body_partial_json(json!({"title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("r1", "Renamed")])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = RestResumeRepository::new(client(&server));
    let update = ResumeUpdate {
        title: Some("Renamed".to_string()),
        ..Default::default()
    };
    let record = repo.update("r1", &update).await.unwrap();
    assert_eq!(record.title, "Renamed");
}

#[tokio::test]
async fn test_backend_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/resumes"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "message": "new row violates row-level security policy"
        })))
        .mount(&server)
        .await;

    let repo = RestResumeRepository::new(client(&server));
    let err = repo
        .create("u1", &NewResume::from_data(ResumeData::default()))
        .await
        .unwrap_err();

    match err {
        ResumeStudioError::Backend { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "new row violates row-level security policy");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_posts_file_under_user_folder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/resumes/u1/\d+_cv\.pdf$"))
        .and(header("Content-Type", "application/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "resumes/u1/cv.pdf"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("cv.pdf");
    std::fs::write(&file, b"%PDF-1.4 test").unwrap();

    let storage = FileStorage::new(client(&server), "resumes");
    let object = storage.upload("u1", &file).await.unwrap();
    assert!(object.starts_with("u1/"));
    assert!(object.ends_with("_cv.pdf"));
}

#[tokio::test]
async fn test_unsupported_upload_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "not a resume").unwrap();

    let storage = FileStorage::new(client(&server), "resumes");
    let err = storage.upload("u1", &file).await.unwrap_err();

    assert!(matches!(err, ResumeStudioError::UnsupportedFormat(_)));
    assert!(err.to_string().contains(UNSUPPORTED_FILE_GUIDANCE));
}

#[tokio::test]
async fn test_download_returns_object_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/storage/v1/object/resumes/u1/1_cv.json"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"{\"summary\":\"hi\"}".to_vec()))
        .mount(&server)
        .await;

    let storage = FileStorage::new(client(&server), "resumes");
    let bytes = storage.download("u1/1_cv.json").await.unwrap();
    assert_eq!(bytes, b"{\"summary\":\"hi\"}".to_vec());
}
