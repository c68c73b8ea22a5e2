use dioxus::prelude::*;

use crate::api::{ApiError, AuthClient, CatalogueClient, ReqwestTransport};
use crate::components::{
    AdminView, AppMedia, AudioBridge, LoginView, MusicView, RegisterView, SettingsView,
};
use crate::config::ClientConfig;
use crate::controller::{AppController, Forbidden};
use crate::db::LocalSessionStore;
use crate::error::ClientError;

pub type AppState = Signal<AppController<LocalSessionStore, AppMedia>>;

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[redirect("/", || Route::MusicView {})]
    #[route("/login")]
    LoginView {},
    #[route("/register")]
    RegisterView {},
    #[route("/music")]
    MusicView {},
    #[route("/admin")]
    AdminView {},
    #[route("/settings")]
    SettingsView {},
}

/// Shared handles every view pulls from context.
#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub controller: AppState,
    /// One-shot message shown on the login page after a forced logout.
    pub notice: Signal<Option<String>>,
}

impl AppContext {
    pub fn auth(&self) -> AuthClient<ReqwestTransport> {
        AuthClient::new(self.config.clone(), ReqwestTransport)
    }

    pub fn catalogue(&self) -> CatalogueClient<ReqwestTransport> {
        CatalogueClient::new(self.config.clone(), ReqwestTransport)
    }

    /// Bearer token of the active session, read without subscribing.
    pub fn token(&self) -> Option<String> {
        self.controller.peek().token().map(str::to_string)
    }

    pub fn send_to_login(&self, err: Option<&ClientError>) {
        if let Some(err) = err.filter(|err| **err != ClientError::Unauthenticated) {
            let mut notice = self.notice;
            notice.set(Some(err.to_string()));
        }
        navigator().replace(Route::LoginView {});
    }

    /// Route a failed session-scoped call through the controller. Returns the
    /// message to show inline, or `None` after sending the user to login.
    pub fn api_failure(
        &self,
        err: ApiError,
        forbidden: Forbidden,
        describe: impl FnOnce(ApiError) -> ClientError,
    ) -> Option<String> {
        let mut controller = self.controller;
        let shown = controller.write().handle_api_error(err, forbidden, describe);
        match shown {
            Some(err) if err.requires_login() => {
                self.send_to_login(Some(&err));
                None
            }
            Some(err) => Some(err.to_string()),
            None => {
                navigator().replace(Route::LoginView {});
                None
            }
        }
    }

    pub fn logout(&self) {
        let mut controller = self.controller;
        controller.write().logout();
        navigator().replace(Route::LoginView {});
    }
}

#[component]
pub fn App() -> Element {
    let context = use_hook(|| {
        let config = ClientConfig::from_env();
        let mut controller = AppController::new(LocalSessionStore::open(), AppMedia::new());
        let notice = match controller.start() {
            Ok(session) => {
                tracing::debug!("starting as {}", session.username);
                None
            }
            Err(ClientError::Unauthenticated) => None,
            Err(err) => Some(err.to_string()),
        };
        AppContext {
            config,
            controller: Signal::new(controller),
            notice: Signal::new(notice),
        }
    });
    use_context_provider(|| context.clone());

    rsx! {
        document::Title { "MusicStream" }
        document::Meta { name: "theme-color", content: "#09090b" }
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1" }
        document::Script { src: "https://cdn.tailwindcss.com" }

        div { class: "min-h-screen bg-zinc-950 text-white",
            AudioBridge {}
            Router::<Route> {}
        }
    }
}

/// Rendered by protected views when there is no session.
#[component]
pub fn LoginRedirect() -> Element {
    use_effect(move || {
        navigator().replace(Route::LoginView {});
    });
    rsx! {
        div { class: "flex items-center justify-center min-h-screen text-zinc-400",
            "Redirecting to login..."
        }
    }
}

/// Show a transient status line; it clears itself after a few seconds in the browser.
pub fn flash_status(mut status: Signal<Option<String>>, message: impl Into<String>) {
    status.set(Some(message.into()));
    #[cfg(target_arch = "wasm32")]
    {
        use gloo_timers::future::TimeoutFuture;
        spawn(async move {
            TimeoutFuture::new(3000).await;
            status.set(None);
        });
    }
}
