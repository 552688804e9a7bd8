//! Testing utilities for the Warta workspace
//!
//! `MockBackend` is an in-process stand-in for the REST backend: a warp
//! server on an ephemeral port with seeded fixtures and scriptable failure
//! modes (500s, 429s, malformed payloads). Integration tests drive the real
//! client against it.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use warp::http::StatusCode;
use warp::Filter;
use warta_core::{
    now_timestamp, Article, Category, Contact, ConversationSummary, Message, NewMessageRequest,
    User,
};

/// The bearer token the mock accepts
pub const TEST_TOKEN: &str = "test-token";

/// Seeded account password
pub const TEST_PASSWORD: &str = "rahasia";

/// Shared mutable state behind the routes
#[derive(Debug)]
pub struct BackendState {
    user: User,
    messages: Mutex<Vec<Message>>,
    posted: Mutex<Vec<NewMessageRequest>>,
    conversations: Mutex<Vec<ConversationSummary>>,
    contacts: Mutex<Vec<Contact>>,
    articles: Mutex<Vec<Article>>,
    categories: Mutex<Vec<Category>>,
    next_id: AtomicUsize,
    fail_next: AtomicUsize,
    rate_limit_next: AtomicUsize,
    malform_next: AtomicUsize,
    message_list_hits: AtomicUsize,
}

impl BackendState {
    fn new(user: User) -> Self {
        Self {
            user,
            messages: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            conversations: Mutex::new(Vec::new()),
            contacts: Mutex::new(Vec::new()),
            articles: Mutex::new(Vec::new()),
            categories: Mutex::new(default_categories()),
            next_id: AtomicUsize::new(1),
            fail_next: AtomicUsize::new(0),
            rate_limit_next: AtomicUsize::new(0),
            malform_next: AtomicUsize::new(0),
            message_list_hits: AtomicUsize::new(0),
        }
    }

    fn assign_message(&self, request: &NewMessageRequest) -> Message {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Message {
            id: id.to_string(),
            sender: request.sender.clone(),
            to: request.to.clone(),
            message: request.message.clone(),
            created_at: now_timestamp(),
        }
    }

    fn take_scripted(&self, counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// In-process mock of the REST backend
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    /// Start the mock on an ephemeral port with the default seeded account
    /// (`ani@x.com` / [`TEST_PASSWORD`]).
    pub async fn start() -> Self {
        let user = User {
            id: "1".to_string(),
            name: "Ani".to_string(),
            email: "ani@x.com".to_string(),
            role: Some("Wartawan".to_string()),
            media: Some("Harian Test".to_string()),
        };
        Self::start_with_user(user).await
    }

    /// Start the mock with a specific seeded account
    pub async fn start_with_user(user: User) -> Self {
        let state = Arc::new(BackendState::new(user));
        let routes = routes(state.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(routes)
            .bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::spawn(server);

        Self {
            addr,
            state,
            shutdown: Some(tx),
        }
    }

    /// Base URL to hand to `ApiConfig`, including the `/api` prefix
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// The seeded account
    #[must_use]
    pub fn user(&self) -> User {
        self.state.user.clone()
    }

    /// Inject a server-side message (what another participant sends
    /// between polls). Returns the persisted record.
    pub fn push_message(&self, sender: &str, to: &str, text: &str) -> Message {
        let message = self.state.assign_message(&NewMessageRequest {
            sender: sender.to_string(),
            to: to.to_string(),
            message: text.to_string(),
        });
        self.state.messages.lock().push(message.clone());
        message
    }

    /// The next `n` message-history requests fail with HTTP 500
    pub fn fail_next(&self, n: usize) {
        self.state.fail_next.store(n, Ordering::SeqCst);
    }

    /// The next `n` message-history requests fail with HTTP 429
    pub fn rate_limit_next(&self, n: usize) {
        self.state.rate_limit_next.store(n, Ordering::SeqCst);
    }

    /// The next `n` message-history responses carry a non-array `data`
    pub fn malform_next(&self, n: usize) {
        self.state.malform_next.store(n, Ordering::SeqCst);
    }

    /// Bodies received on `POST /messages/post`, in order
    #[must_use]
    pub fn posted(&self) -> Vec<NewMessageRequest> {
        self.state.posted.lock().clone()
    }

    /// How many times the message-history endpoint was hit
    #[must_use]
    pub fn message_list_hits(&self) -> usize {
        self.state.message_list_hits.load(Ordering::SeqCst)
    }

    /// Replace the conversation-overview fixture
    pub fn set_conversations(&self, conversations: Vec<ConversationSummary>) {
        *self.state.conversations.lock() = conversations;
    }

    /// Replace the contact directory fixture
    pub fn set_contacts(&self, contacts: Vec<Contact>) {
        *self.state.contacts.lock() = contacts;
    }

    /// Replace the article fixture (served by every news listing)
    pub fn set_articles(&self, articles: Vec<Article>) {
        *self.state.articles.lock() = articles;
    }

    /// Replace the category fixture (default: Berita, Acara)
    pub fn set_categories(&self, categories: Vec<Category>) {
        *self.state.categories.lock() = categories;
    }
}

fn default_categories() -> Vec<Category> {
    vec![
        Category {
            id: "1".to_string(),
            name: "Berita".to_string(),
        },
        Category {
            id: "2".to_string(),
            name: "Acara".to_string(),
        },
    ]
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

type Reply = warp::reply::WithStatus<warp::reply::Json>;

fn json_reply(value: &serde_json::Value, status: StatusCode) -> Reply {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn unauthenticated() -> Reply {
    json_reply(
        &serde_json::json!({"message": "Unauthenticated."}),
        StatusCode::UNAUTHORIZED,
    )
}

fn authorized(header: &Option<String>) -> bool {
    header
        .as_deref()
        .map(|h| h.eq_ignore_ascii_case(&format!("bearer {TEST_TOKEN}")))
        .unwrap_or(false)
}

fn with_state(
    state: Arc<BackendState>,
) -> impl Filter<Extract = (Arc<BackendState>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || state.clone())
}

#[derive(Debug, serde::Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

fn routes(
    state: Arc<BackendState>,
) -> impl Filter<Extract = (Reply,), Error = warp::Rejection> + Clone {
    let login = warp::path!("api" / "login")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|body: LoginBody, state: Arc<BackendState>| {
            if body.email == state.user.email && body.password == TEST_PASSWORD {
                json_reply(
                    &serde_json::json!({
                        "access_token": TEST_TOKEN,
                        "user": state.user,
                    }),
                    StatusCode::OK,
                )
            } else {
                json_reply(
                    &serde_json::json!({"message": "Invalid credentials"}),
                    StatusCode::UNAUTHORIZED,
                )
            }
        });

    let register = warp::path!("api" / "register")
        .and(warp::post())
        .and(warp::body::json())
        .map(|_body: serde_json::Value| {
            json_reply(
                &serde_json::json!({"message": "Registered"}),
                StatusCode::CREATED,
            )
        });

    let current_user = warp::path!("api" / "user")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_state(state.clone()))
        .map(|auth: Option<String>, state: Arc<BackendState>| {
            if authorized(&auth) {
                json_reply(
                    &serde_json::to_value(&state.user).expect("user serializes"),
                    StatusCode::OK,
                )
            } else {
                unauthenticated()
            }
        });

    let conversations = warp::path!("api" / "messages")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_state(state.clone()))
        .map(|auth: Option<String>, state: Arc<BackendState>| {
            if authorized(&auth) {
                json_reply(
                    &serde_json::to_value(&*state.conversations.lock())
                        .expect("conversations serialize"),
                    StatusCode::OK,
                )
            } else {
                unauthenticated()
            }
        });

    let history = warp::path!("api" / "messages" / String / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|a: String, b: String, state: Arc<BackendState>| {
            state.message_list_hits.fetch_add(1, Ordering::SeqCst);

            if state.take_scripted(&state.fail_next) {
                return json_reply(
                    &serde_json::json!({"message": "Server Error"}),
                    StatusCode::INTERNAL_SERVER_ERROR,
                );
            }
            if state.take_scripted(&state.rate_limit_next) {
                return json_reply(
                    &serde_json::json!({"message": "Too Many Requests"}),
                    StatusCode::TOO_MANY_REQUESTS,
                );
            }
            if state.take_scripted(&state.malform_next) {
                return json_reply(
                    &serde_json::json!({"data": "unexpected"}),
                    StatusCode::OK,
                );
            }

            let history: Vec<Message> = state
                .messages
                .lock()
                .iter()
                .filter(|m| {
                    (m.sender == a && m.to == b) || (m.sender == b && m.to == a)
                })
                .cloned()
                .collect();
            json_reply(
                &serde_json::json!({ "data": history }),
                StatusCode::OK,
            )
        });

    let post_message = warp::path!("api" / "messages" / "post")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .map(|body: NewMessageRequest, state: Arc<BackendState>| {
            let record = state.assign_message(&body);
            state.posted.lock().push(body);
            state.messages.lock().push(record.clone());
            json_reply(
                &serde_json::to_value(&record).expect("message serializes"),
                StatusCode::CREATED,
            )
        });

    let contacts = warp::path!("api" / "get-users")
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_state(state.clone()))
        .map(|auth: Option<String>, state: Arc<BackendState>| {
            if authorized(&auth) {
                json_reply(
                    &serde_json::json!({"data": &*state.contacts.lock()}),
                    StatusCode::OK,
                )
            } else {
                unauthenticated()
            }
        });

    let news = warp::path!("api" / "news")
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: Arc<BackendState>| {
            json_reply(
                &serde_json::json!({"data": &*state.articles.lock()}),
                StatusCode::OK,
            )
        });

    let breaking = warp::path!("api" / "breaking-news")
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: Arc<BackendState>| {
            json_reply(
                &serde_json::json!({"data": &*state.articles.lock()}),
                StatusCode::OK,
            )
        });

    let by_category = warp::path!("api" / "news" / "category")
        .and(warp::get())
        .and(warp::query::<std::collections::HashMap<String, String>>())
        .and(with_state(state.clone()))
        .map(
            |query: std::collections::HashMap<String, String>, state: Arc<BackendState>| {
                let category = query.get("category").cloned().unwrap_or_default();
                let matching: Vec<Article> = state
                    .articles
                    .lock()
                    .iter()
                    .filter(|a| a.category.as_deref() == Some(category.as_str()))
                    .cloned()
                    .collect();
                json_reply(&serde_json::json!({ "data": matching }), StatusCode::OK)
            },
        );

    let search = warp::path!("api" / "news" / "search")
        .and(warp::get())
        .and(warp::query::<std::collections::HashMap<String, String>>())
        .and(with_state(state.clone()))
        .map(
            |query: std::collections::HashMap<String, String>, state: Arc<BackendState>| {
                let name = query.get("name").cloned().unwrap_or_default();
                let matching: Vec<Article> = state
                    .articles
                    .lock()
                    .iter()
                    .filter(|a| a.title.contains(name.as_str()))
                    .cloned()
                    .collect();
                json_reply(&serde_json::json!({ "data": matching }), StatusCode::OK)
            },
        );

    let categories = warp::path!("api" / "category-name")
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|state: Arc<BackendState>| {
            json_reply(
                &serde_json::json!({"success": true, "data": &*state.categories.lock()}),
                StatusCode::OK,
            )
        });

    let details = warp::path!("api" / "news-details" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(|slug: String, state: Arc<BackendState>| {
            let found = state
                .articles
                .lock()
                .iter()
                .find(|a| a.slug == slug)
                .cloned();
            match found {
                Some(article) => json_reply(
                    &serde_json::json!({ "data": article }),
                    StatusCode::OK,
                ),
                None => json_reply(
                    &serde_json::json!({"message": "Not Found"}),
                    StatusCode::NOT_FOUND,
                ),
            }
        });

    let create_article = warp::path!("api" / "post-berita")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json())
        .map(|auth: Option<String>, _body: serde_json::Value| {
            if authorized(&auth) {
                json_reply(
                    &serde_json::json!({"message": "Created"}),
                    StatusCode::CREATED,
                )
            } else {
                unauthenticated()
            }
        });

    let update_article = warp::path!("api" / "update-berita" / String)
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json())
        .map(|_slug: String, auth: Option<String>, _body: serde_json::Value| {
            if authorized(&auth) {
                json_reply(
                    &serde_json::json!({"message": "Updated"}),
                    StatusCode::OK,
                )
            } else {
                unauthenticated()
            }
        });

    let by_author = warp::path!("api" / "list-by-author")
        .and(warp::post())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_state(state))
        .map(|auth: Option<String>, state: Arc<BackendState>| {
            if authorized(&auth) {
                json_reply(
                    &serde_json::json!({"data": &*state.articles.lock()}),
                    StatusCode::OK,
                )
            } else {
                unauthenticated()
            }
        });

    login
        .or(register)
        .unify()
        .or(current_user)
        .unify()
        .or(conversations)
        .unify()
        .or(history)
        .unify()
        .or(post_message)
        .unify()
        .or(contacts)
        .unify()
        .or(news)
        .unify()
        .or(breaking)
        .unify()
        .or(by_category)
        .unify()
        .or(search)
        .unify()
        .or(categories)
        .unify()
        .or(details)
        .unify()
        .or(create_article)
        .unify()
        .or(update_article)
        .unify()
        .or(by_author)
        .unify()
}
