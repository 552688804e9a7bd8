//! REST client tests against the in-process mock backend

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use warta_api::{
    ApiClient, ApiConfig, ApiError, FileTokenStore, MemoryTokenStore, RetryPolicy, Route,
};
use warta_core::{Article, ArticleDraft, Contact, NewMessageRequest, RegisterRequest};
use warta_test_utils::{MockBackend, TEST_PASSWORD, TEST_TOKEN};

fn anonymous_client(backend: &MockBackend) -> ApiClient {
    let config = ApiConfig::new().with_base_url(backend.base_url());
    ApiClient::new(config, Arc::new(MemoryTokenStore::new())).expect("client builds")
}

fn authed_client(backend: &MockBackend) -> ApiClient {
    let config = ApiConfig::new().with_base_url(backend.base_url());
    ApiClient::new(config, Arc::new(MemoryTokenStore::preloaded(TEST_TOKEN)))
        .expect("client builds")
}

fn article(slug: &str, title: &str, category: &str) -> Article {
    Article {
        id: "1".to_string(),
        slug: slug.to_string(),
        title: title.to_string(),
        category: Some(category.to_string()),
        content: Some("body".to_string()),
        image_url: None,
        created_at: None,
    }
}

#[tokio::test]
async fn login_persists_token_and_flips_route() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let tokens = Arc::new(FileTokenStore::new(dir.path()));
    let config = ApiConfig::new().with_base_url(backend.base_url());
    let client = ApiClient::new(config, tokens.clone()).unwrap();

    assert_eq!(client.initial_route(), Route::Login);

    let user = client
        .login(&backend.user().email, TEST_PASSWORD)
        .await
        .expect("login succeeds");
    assert_eq!(user.email, backend.user().email);
    assert_eq!(client.initial_route(), Route::Main);

    // A second client over the same directory sees the persisted session
    let config = ApiConfig::new().with_base_url(backend.base_url());
    let restarted = ApiClient::new(config, tokens).unwrap();
    assert_eq!(restarted.initial_route(), Route::Main);
}

#[tokio::test]
async fn bad_credentials_surface_the_server_message() {
    let backend = MockBackend::start().await;
    let client = anonymous_client(&backend);

    let err = client
        .login(&backend.user().email, "wrong")
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message.as_deref(), Some("Invalid credentials"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn logout_drops_the_session() {
    let backend = MockBackend::start().await;
    let client = authed_client(&backend);

    assert_eq!(client.initial_route(), Route::Main);
    client.logout().expect("logout succeeds");
    assert_eq!(client.initial_route(), Route::Login);
}

#[tokio::test]
async fn register_succeeds() {
    let backend = MockBackend::start().await;
    let client = anonymous_client(&backend);

    let request = RegisterRequest {
        name: "Budi".to_string(),
        role: "Narasumber".to_string(),
        media: "Harian Test".to_string(),
        email: "budi@x.com".to_string(),
        password: "rahasia-baru".to_string(),
        password_confirmation: "rahasia-baru".to_string(),
    };
    client.register(&request).await.expect("register succeeds");
}

#[tokio::test]
async fn current_user_requires_a_session() {
    let backend = MockBackend::start().await;

    let err = anonymous_client(&backend).current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));

    let user = authed_client(&backend).current_user().await.unwrap();
    assert_eq!(user.name, "Ani");
}

#[tokio::test]
async fn message_history_round_trip() {
    let backend = MockBackend::start().await;
    let client = authed_client(&backend);

    backend.push_message("a@x.com", "b@x.com", "hello");
    backend.push_message("b@x.com", "a@x.com", "hi back");
    // unrelated conversation, filtered out
    backend.push_message("c@x.com", "d@x.com", "noise");

    let history = client.list_messages("a@x.com", "b@x.com").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].message, "hello");
    assert_eq!(history[1].message, "hi back");
}

#[tokio::test]
async fn malformed_history_payload_is_an_empty_list() {
    let backend = MockBackend::start().await;
    let client = authed_client(&backend);

    backend.push_message("a@x.com", "b@x.com", "hello");
    backend.malform_next(1);

    let history = client.list_messages("a@x.com", "b@x.com").await.unwrap();
    assert!(history.is_empty());

    // The next request sees the real payload again
    let history = client.list_messages("a@x.com", "b@x.com").await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn post_message_sends_the_exact_body() {
    let backend = MockBackend::start().await;
    let client = authed_client(&backend);

    let request = NewMessageRequest {
        sender: "a@x.com".to_string(),
        to: "b@x.com".to_string(),
        message: "halo".to_string(),
    };
    client.post_message(&request).await.unwrap();

    let posted = backend.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0], request);
}

#[tokio::test]
async fn rate_limited_request_retries_with_backoff() {
    let backend = MockBackend::start().await;
    let config = ApiConfig::new()
        .with_base_url(backend.base_url())
        .with_retry(RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(10),
        });
    let client =
        ApiClient::new(config, Arc::new(MemoryTokenStore::preloaded(TEST_TOKEN))).unwrap();

    backend.push_message("a@x.com", "b@x.com", "hello");
    backend.rate_limit_next(2);

    let history = client.list_messages("a@x.com", "b@x.com").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(backend.message_list_hits(), 3);
}

#[tokio::test]
async fn exhausted_retries_surface_the_429() {
    let backend = MockBackend::start().await;
    let config = ApiConfig::new()
        .with_base_url(backend.base_url())
        .with_retry(RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(5),
        });
    let client =
        ApiClient::new(config, Arc::new(MemoryTokenStore::preloaded(TEST_TOKEN))).unwrap();

    backend.rate_limit_next(10);
    let err = client.list_messages("a@x.com", "b@x.com").await.unwrap_err();
    match err {
        ApiError::Status { status, .. } => assert_eq!(status.as_u16(), 429),
        other => panic!("unexpected error: {other}"),
    }
    // Initial attempt plus two retries
    assert_eq!(backend.message_list_hits(), 3);
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let backend = MockBackend::start().await;
    let client = authed_client(&backend);

    backend.fail_next(1);
    let err = client.list_messages("a@x.com", "b@x.com").await.unwrap_err();
    match err {
        ApiError::Status { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.message_list_hits(), 1);
}

#[tokio::test]
async fn conversation_overview_requires_a_session() {
    let backend = MockBackend::start().await;
    backend.set_conversations(vec![]);

    let err = anonymous_client(&backend)
        .list_conversations()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));

    let rows = authed_client(&backend).list_conversations().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn contact_directory_decodes() {
    let backend = MockBackend::start().await;
    backend.set_contacts(vec![Contact {
        id: "2".to_string(),
        name: "Budi".to_string(),
        email: "budi@x.com".to_string(),
        role: Some("Narasumber".to_string()),
        media: None,
        location: Some("Jakarta".to_string()),
        image: None,
    }]);

    let contacts = authed_client(&backend)
        .list_contacts(Some("Narasumber"), None)
        .await
        .unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].email, "budi@x.com");
}

#[tokio::test]
async fn news_endpoints_decode_fixture_articles() {
    let backend = MockBackend::start().await;
    backend.set_articles(vec![
        article("banjir-jakarta", "Banjir di Jakarta", "Peristiwa"),
        article("pemilu-2026", "Menjelang Pemilu", "Politik"),
    ]);
    let client = anonymous_client(&backend);

    let feed = client.news_feed().await.unwrap();
    assert_eq!(feed.len(), 2);

    let breaking = client.breaking_news().await.unwrap();
    assert_eq!(breaking.len(), 2);

    let politics = client.news_by_category("Politik", false).await.unwrap();
    assert_eq!(politics.len(), 1);
    assert_eq!(politics[0].slug, "pemilu-2026");

    let found = client.search_news("Banjir").await.unwrap();
    assert_eq!(found.len(), 1);

    let detail = client.news_details("banjir-jakarta").await.unwrap();
    assert_eq!(detail.title, "Banjir di Jakarta");
}

#[tokio::test]
async fn category_listing_decodes_for_the_authoring_picker() {
    let backend = MockBackend::start().await;
    let client = anonymous_client(&backend);

    let categories = client.list_categories().await.unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Berita", "Acara"]);
}

#[tokio::test]
async fn missing_article_is_a_status_error() {
    let backend = MockBackend::start().await;
    let client = anonymous_client(&backend);

    let err = client.news_details("tidak-ada").await.unwrap_err();
    match err {
        ApiError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn authoring_endpoints_require_a_session() {
    let backend = MockBackend::start().await;
    let draft = ArticleDraft {
        judul_berita: "Judul Baru".to_string(),
        category: "Peristiwa".to_string(),
        content: "Isi berita.".to_string(),
    };

    let err = anonymous_client(&backend)
        .create_article(&draft)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingToken));

    let client = authed_client(&backend);
    client.create_article(&draft).await.unwrap();
    client.update_article("judul-baru", &draft).await.unwrap();

    backend.set_articles(vec![article("judul-baru", "Judul Baru", "Peristiwa")]);
    let own = client.list_by_author().await.unwrap();
    assert_eq!(own.len(), 1);
}
