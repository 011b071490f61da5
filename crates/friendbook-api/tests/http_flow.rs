use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use friendbook_api::{AppStateInner, MAX_SESSION_IDLE_HOURS, Settings, router};
use friendbook_db::Database;

/// Drives the router like a browser: remembers the session cookie.
struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    fn new(settings: Settings) -> Self {
        let db = Database::open_in_memory().unwrap();
        Self {
            app: router(AppStateInner::new(db, settings)),
            cookie: None,
        }
    }

    async fn send(&mut self, mut req: Request<Body>) -> Response {
        if let Some(cookie) = &self.cookie {
            req.headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let resp = self.app.clone().oneshot(req).await.unwrap();

        if let Some(set_cookie) = resp.headers().get(header::SET_COOKIE) {
            let set_cookie = set_cookie.to_str().unwrap();
            if set_cookie.contains("Max-Age=0") {
                self.cookie = None;
            } else {
                let pair = set_cookie.split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
        }
        resp
    }

    async fn get(&mut self, path: &str) -> Response {
        let req = Request::get(path).body(Body::empty()).unwrap();
        self.send(req).await
    }

    async fn post(&mut self, path: &str, form: &str) -> Response {
        let req = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn page(&mut self, path: &str) -> String {
        let resp = self.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        body_text(resp).await
    }

    async fn login(&mut self, username: &str, password: &str) {
        let resp = self
            .post("/login", &format!("username={username}&password={password}"))
            .await;
        assert_redirect(&resp, "/");
    }

    async fn register(&mut self, username: &str, password: &str) {
        let resp = self
            .post("/register", &format!("username={username}&password={password}"))
            .await;
        assert_redirect(&resp, "/login");
    }
}

async fn body_text(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn assert_redirect(resp: &Response, to: &str) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], to);
}

#[tokio::test]
async fn owner_only_edit_scenario() {
    let mut browser = Browser::new(Settings::default());

    browser.register("alice", "pw1").await;
    browser.login("alice", "pw1").await;
    let resp = browser.post("/post", "content=hello").await;
    assert_redirect(&resp, "/");

    assert_redirect(&browser.get("/logout").await, "/");
    browser.register("bob", "pw2").await;
    browser.login("bob", "pw2").await;

    let resp = browser.post("/edit_post/1", "content=hacked").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_text(resp).await.contains("Unauthorized"));

    let resp = browser.get("/delete_post/1").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    assert_redirect(&browser.get("/logout").await, "/");
    browser.login("alice", "pw1").await;
    let resp = browser.post("/edit_post/1", "content=hello+v2").await;
    assert_redirect(&resp, "/");

    let home = browser.page("/").await;
    assert!(home.contains("hello v2"));
    assert!(!home.contains("hacked"));
}

#[tokio::test]
async fn duplicate_registration_flashes_and_keeps_first_account() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;

    let resp = browser
        .post("/register", "username=alice&password=other")
        .await;
    assert_redirect(&resp, "/register");
    assert!(browser.page("/register").await.contains("Username already exists."));

    // Flash is consumed by the first render.
    assert!(!browser.page("/register").await.contains("Username already exists."));

    browser.login("alice", "pw1").await;
}

#[tokio::test]
async fn wrong_password_leaves_session_anonymous() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;

    let resp = browser.post("/login", "username=alice&password=nope").await;
    assert_redirect(&resp, "/login");
    assert!(browser.page("/login").await.contains("Invalid login."));

    let home = browser.page("/").await;
    assert!(home.contains("href=\"/login\""));
    assert!(!home.contains("href=\"/logout\""));
}

#[tokio::test]
async fn anonymous_post_and_comment_redirect_to_login() {
    let mut browser = Browser::new(Settings::default());

    assert_redirect(&browser.post("/post", "content=hi").await, "/login");
    assert_redirect(&browser.post("/comment/1", "comment=hi").await, "/login");
    assert!(browser.page("/login").await.contains("Please log in first."));
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;
    browser.login("alice", "pw1").await;

    let resp = browser.post("/comment/99", "comment=hello").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_post_removes_its_comments_from_the_feed() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;
    browser.login("alice", "pw1").await;

    browser.post("/post", "content=first+post").await;
    browser.post("/post", "content=second+post").await;
    browser.post("/comment/1", "comment=on+first").await;
    browser.post("/comment/2", "comment=on+second").await;

    assert_redirect(&browser.get("/delete_post/1").await, "/");

    let home = browser.page("/").await;
    assert!(!home.contains("first post"));
    assert!(!home.contains("on first"));
    assert!(home.contains("second post"));
    assert!(home.contains("on second"));
}

#[tokio::test]
async fn empty_post_is_flashed_not_stored() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;
    browser.login("alice", "pw1").await;

    assert_redirect(&browser.post("/post", "content=+++").await, "/");
    let home = browser.page("/").await;
    assert!(home.contains("Post cannot be empty."));
    assert!(!home.contains("/edit_post/"));
}

#[tokio::test]
async fn chat_keeps_order_and_clears() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;
    browser.login("alice", "pw1").await;

    for text in ["first", "second", "third"] {
        assert_redirect(&browser.post("/chat", &format!("message={text}")).await, "/chat");
    }

    let page = browser.page("/chat").await;
    let first = page.find("first").unwrap();
    let second = page.find("second").unwrap();
    let third = page.find("third").unwrap();
    assert!(first < second && second < third);

    assert_redirect(&browser.get("/clearchat").await, "/chat");
    assert!(!browser.page("/chat").await.contains("class=\"chat-line\""));
}

#[tokio::test]
async fn anonymous_visitor_cannot_chat_but_can_clear_by_default() {
    let mut writer = Browser::new(Settings::default());
    writer.register("alice", "pw1").await;
    writer.login("alice", "pw1").await;
    writer.post("/chat", "message=hello").await;

    // Same app, fresh cookie jar.
    let mut stranger = Browser {
        app: writer.app.clone(),
        cookie: None,
    };
    assert_redirect(&stranger.post("/chat", "message=spam").await, "/login");
    assert!(!stranger.page("/chat").await.contains("spam"));

    assert_redirect(&stranger.get("/clearchat").await, "/chat");
    assert!(!writer.page("/chat").await.contains("hello"));
}

#[tokio::test]
async fn clearing_chat_can_require_login() {
    let settings = Settings {
        clear_chat_requires_login: true,
        ..Settings::default()
    };
    let mut writer = Browser::new(settings);
    writer.register("alice", "pw1").await;
    writer.login("alice", "pw1").await;
    writer.post("/chat", "message=hello").await;

    let mut stranger = Browser {
        app: writer.app.clone(),
        cookie: None,
    };
    assert_redirect(&stranger.get("/clearchat").await, "/login");
    assert!(writer.page("/chat").await.contains("hello"));
}

#[tokio::test]
async fn unknown_path_renders_error_page() {
    let mut browser = Browser::new(Settings::default());
    let resp = browser.get("/nope").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Page not found."));

    assert_eq!(browser.page("/health").await, "ok");
}

#[tokio::test]
async fn non_owner_cannot_touch_a_comment() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;
    browser.register("bob", "pw2").await;

    browser.login("alice", "pw1").await;
    browser.post("/post", "content=hello").await;
    browser.post("/comment/1", "comment=mine").await;

    assert_redirect(&browser.get("/logout").await, "/");
    browser.login("bob", "pw2").await;

    let resp = browser.post("/edit_comment/1", "content=hacked").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_text(resp).await.contains("Unauthorized"));
    let resp = browser.get("/delete_comment/1").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Anonymous visitors fare no better.
    assert_redirect(&browser.get("/logout").await, "/");
    let resp = browser.get("/delete_comment/1").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let home = browser.page("/").await;
    assert!(home.contains("mine"));
    assert!(!home.contains("hacked"));
}

#[tokio::test]
async fn logout_when_anonymous_is_harmless() {
    let mut browser = Browser::new(Settings::default());
    assert_redirect(&browser.get("/logout").await, "/");
    assert_redirect(&browser.get("/logout").await, "/");

    let home = browser.page("/").await;
    assert!(home.contains("href=\"/login\""));
}

#[tokio::test]
async fn non_numeric_id_renders_error_page() {
    let mut browser = Browser::new(Settings::default());
    browser.register("alice", "pw1").await;
    browser.login("alice", "pw1").await;

    for path in ["/delete_post/abc", "/delete_comment/1x"] {
        let resp = browser.get(path).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {path}");
        assert!(body_text(resp).await.contains("Page not found."));
    }

    let resp = browser.post("/edit_post/abc", "content=x").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = browser.post("/comment/abc", "comment=x").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_session_lifetime_is_clamped() {
    let settings = Settings {
        session_idle_hours: i64::MAX / 10,
        ..Settings::default()
    };
    let mut browser = Browser::new(settings);
    browser.register("alice", "pw1").await;
    browser.login("alice", "pw1").await;
    assert!(browser.page("/").await.contains("href=\"/logout\""));

    let at_limit = Settings {
        session_idle_hours: MAX_SESSION_IDLE_HOURS,
        ..Settings::default()
    };
    let mut browser = Browser::new(at_limit);
    assert_eq!(browser.page("/health").await, "ok");
}
