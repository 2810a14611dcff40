#![allow(dead_code)]

use std::io::Cursor;
use std::sync::{Arc, Once};

use image::{ImageFormat, Rgba, RgbaImage};
use photo_settings::{
    app_with_state,
    models::AppState,
    services::{
        csrf::CsrfService,
        image_store::{ImageStore, MemoryImageStore},
        jwt::JwtService,
    },
};
use reqwest::{multipart, redirect};
use tokio::net::TcpListener;
use uuid::Uuid;

pub const JWT_SECRET: &[u8] = b"integration-test-jwt-secret";
pub const CSRF_SECRET: &[u8] = b"integration-test-csrf-secret";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("photo_settings=debug")
            .with_test_writer()
            .init();
    });
}

/// A running application over an in-memory store, plus handles to act on it.
pub struct TestApp {
    /// Format: `http://127.0.0.1:8492`
    pub address: String,
    pub store: Arc<MemoryImageStore>,
    pub jwt: JwtService,
    pub csrf: CsrfService,
    /// Client that reports redirects instead of following them
    pub client: reqwest::Client,
}

/// Spawns the application on a random port and waits until it answers.
pub async fn spawn_app() -> TestApp {
    init_tracing_once();

    let store = Arc::new(MemoryImageStore::new());
    let image_store: Arc<dyn ImageStore> = store.clone();
    let state = Arc::new(AppState::new(
        image_store,
        JwtService::from_secret(JWT_SECRET),
        CsrfService::new(CSRF_SECRET).expect("CSRF secret should be accepted"),
    ));

    // Randomly choose an available port
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app_with_state(state)).await.unwrap();
    });

    let address = format!("http://127.0.0.1:{port}");
    let client = reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to build client");

    // Wait for server to be ready
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        store,
        jwt: JwtService::from_secret(JWT_SECRET),
        csrf: CsrfService::new(CSRF_SECRET).expect("CSRF secret should be accepted"),
        client,
    }
}

impl TestApp {
    pub fn photo_url(&self) -> String {
        format!("{}/settings/profile/photo", self.address)
    }

    /// Registers a user and returns their id with a valid access token.
    pub fn register_user(&self, name: Option<&str>, username: &str) -> (Uuid, String) {
        let user_id = self.store.insert_user(name, username);
        let token = self
            .jwt
            .create_access_token(user_id)
            .expect("Failed to create access token");
        (user_id, token)
    }

    /// Returns a fresh anti-forgery token and the matching `Cookie` header value.
    pub fn csrf_pair(&self) -> (String, String) {
        let token = self.csrf.issue();
        let cookie = format!("csrf={token}");
        (token, cookie)
    }

    /// Posts a photo form with a valid anti-forgery token added to it.
    pub async fn post_photo(&self, access_token: &str, form: multipart::Form) -> reqwest::Response {
        let (token, cookie) = self.csrf_pair();
        self.client
            .post(self.photo_url())
            .bearer_auth(access_token)
            .header(reqwest::header::COOKIE, cookie)
            .multipart(form.text("csrf", token))
            .send()
            .await
            .expect("Failed to post photo form")
    }

    /// Posts a photo form the way the rendered page does, asking for HTML back.
    pub async fn post_photo_page(
        &self,
        access_token: &str,
        form: multipart::Form,
    ) -> reqwest::Response {
        let (token, cookie) = self.csrf_pair();
        self.client
            .post(self.photo_url())
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "text/html")
            .header(reqwest::header::COOKIE, cookie)
            .multipart(form.text("csrf", token))
            .send()
            .await
            .expect("Failed to post photo page")
    }

    /// Uploads `bytes` as a PNG with `intent=submit`.
    pub async fn submit_png(&self, access_token: &str, bytes: Vec<u8>) -> reqwest::Response {
        let form = multipart::Form::new()
            .text("intent", "submit")
            .part("photoFile", png_part(bytes));
        self.post_photo(access_token, form).await
    }
}

pub fn png_part(bytes: Vec<u8>) -> multipart::Part {
    multipart::Part::bytes(bytes)
        .file_name("profile.png")
        .mime_str("image/png")
        .unwrap()
}

/// Encodes a solid-color PNG of the given size.
pub fn create_test_image(width: u32, height: u32) -> Vec<u8> {
    let pixels = RgbaImage::from_pixel(width, height, Rgba([200, 80, 40, 255]));
    let mut bytes = Cursor::new(Vec::new());
    pixels
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes.into_inner()
}
