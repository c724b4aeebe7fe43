//! Test helpers for integration tests.
//!
//! Provides a local feed server and helpers for building feed documents and
//! seeding the store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use gator::config::ScraperConfig;
use gator::db::{NewUser, User, UserRepository};
use gator::feed::{Feed, FeedRepository, NewFeed};
use gator::{Database, FeedFetcher, FeedScheduler};

type Documents = Arc<Mutex<HashMap<String, String>>>;

/// HTTP server serving feed documents from memory.
///
/// `/feeds/{name}` returns the document stored under `name`, or 404.
/// `/ua` returns a feed whose single item is titled with the request's
/// User-Agent. `/stall` holds the response back for a minute.
pub struct FeedServer {
    pub addr: SocketAddr,
    documents: Documents,
}

impl FeedServer {
    /// Start a server on an ephemeral local port.
    pub async fn start() -> Self {
        let documents: Documents = Arc::new(Mutex::new(HashMap::new()));
        let app = Router::new()
            .route("/feeds/:name", get(serve_document))
            .route("/ua", get(serve_user_agent))
            .route("/stall", get(stall))
            .with_state(documents.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, documents }
    }

    /// URL of the document stored under `name`.
    pub fn url(&self, name: &str) -> String {
        format!("http://{}/feeds/{}", self.addr, name)
    }

    /// URL of the User-Agent echo feed.
    pub fn user_agent_url(&self) -> String {
        format!("http://{}/ua", self.addr)
    }

    /// URL that never answers within a test's lifetime.
    pub fn stall_url(&self) -> String {
        format!("http://{}/stall", self.addr)
    }

    /// Store or replace the document served under `name`.
    pub fn set(&self, name: &str, body: impl Into<String>) {
        self.documents
            .lock()
            .unwrap()
            .insert(name.to_string(), body.into());
    }
}

async fn serve_document(State(documents): State<Documents>, Path(name): Path<String>) -> Response {
    let body = documents.lock().unwrap().get(&name).cloned();
    match body {
        Some(body) => ([(header::CONTENT_TYPE, "application/rss+xml")], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve_user_agent(headers: HeaderMap) -> Response {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let body = rss_document("Echo", &[Item::new(&agent, "https://echo.example/ua")]);
    ([(header::CONTENT_TYPE, "application/rss+xml")], body).into_response()
}

async fn stall() -> Response {
    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    StatusCode::OK.into_response()
}

/// An item for [`rss_document`].
#[derive(Debug, Clone)]
pub struct Item {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

impl Item {
    pub fn new(title: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            description: String::new(),
            pub_date: "Mon, 02 Jan 2006 15:04:05 -0700".to_string(),
        }
    }

    pub fn with_pub_date(mut self, pub_date: &str) -> Self {
        self.pub_date = pub_date.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Build an RSS 2.0 document. Text is inserted as given, so callers
/// supply XML-escaped content.
pub fn rss_document(title: &str, items: &[Item]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push_str(r#"<rss version="2.0"><channel>"#);
    xml.push_str(&format!(
        "<title>{title}</title><link>https://example.com/</link><description>test feed</description>"
    ));
    for item in items {
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{}</title>", item.title));
        xml.push_str(&format!("<link>{}</link>", item.link));
        if !item.description.is_empty() {
            xml.push_str(&format!("<description>{}</description>", item.description));
        }
        if !item.pub_date.is_empty() {
            xml.push_str(&format!("<pubDate>{}</pubDate>", item.pub_date));
        }
        xml.push_str("</item>");
    }
    xml.push_str("</channel></rss>");
    xml
}

/// Open an in-memory store.
pub async fn setup_db() -> Arc<Database> {
    Arc::new(Database::open_in_memory().await.unwrap())
}

/// Create a user.
pub async fn create_user(db: &Database, name: &str) -> User {
    UserRepository::new(db.pool())
        .create(&NewUser::new(name))
        .await
        .unwrap()
}

/// Create a feed owned by `user`.
pub async fn create_feed(db: &Database, user: &User, name: &str, url: &str) -> Feed {
    FeedRepository::new(db.pool())
        .create(&NewFeed::new(name, url, user.id))
        .await
        .unwrap()
}

/// Scraper configuration with short timeouts.
pub fn test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        connect_timeout_secs: 2,
        read_timeout_secs: 2,
        request_timeout_secs: 5,
        ..ScraperConfig::default()
    }
}

/// Scheduler over `db` with [`test_scraper_config`].
pub fn scheduler(db: &Arc<Database>) -> FeedScheduler {
    scheduler_with(db, &test_scraper_config())
}

/// Scheduler over `db` with a custom configuration.
pub fn scheduler_with(db: &Arc<Database>, config: &ScraperConfig) -> FeedScheduler {
    let fetcher = FeedFetcher::new(config).unwrap();
    FeedScheduler::new(db.clone(), fetcher)
}
