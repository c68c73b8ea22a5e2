use dioxus::prelude::*;

use crate::account::RegisterForm;
use crate::components::{AppContext, Icon, Route};
use crate::controller::{login_error, register_error};

const INPUT_CLASS: &str = "w-full px-4 py-3 rounded-lg border border-zinc-700 bg-zinc-900 text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50";
const PRIMARY_BUTTON_CLASS: &str = "w-full py-3 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-black font-semibold transition-colors disabled:opacity-50 flex items-center justify-center gap-2";

#[component]
fn AuthCard(title: String, subtitle: String, children: Element) -> Element {
    rsx! {
        div { class: "min-h-screen flex items-center justify-center px-4",
            div { class: "w-full max-w-md bg-zinc-900/60 border border-zinc-800 rounded-2xl p-8 space-y-6",
                div { class: "flex flex-col items-center gap-3",
                    div { class: "w-14 h-14 rounded-2xl bg-emerald-500/20 flex items-center justify-center",
                        Icon { name: "music".to_string(), class: "w-7 h-7 text-emerald-400".to_string() }
                    }
                    h1 { class: "text-2xl font-bold", "{title}" }
                    p { class: "text-sm text-zinc-400", "{subtitle}" }
                }
                {children}
            }
        }
    }
}

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut notice = ctx.notice;
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let controller = ctx.controller;
    use_effect(move || {
        if controller.read().session().is_some() {
            navigator().replace(Route::MusicView {});
        }
    });

    let on_submit = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if busy() {
                return;
            }
            let user = username().trim().to_string();
            let pass = password();
            if user.is_empty() || pass.is_empty() {
                error.set(Some("Please enter your username and password".to_string()));
                return;
            }

            busy.set(true);
            error.set(None);
            let ctx = ctx.clone();
            spawn(async move {
                match ctx.auth().login(&user, &pass).await {
                    Ok(response) => {
                        let mut controller = ctx.controller;
                        let completed = controller.write().complete_login(response);
                        match completed {
                            Ok(session) => {
                                notice.set(None);
                                let target = if session.is_admin() {
                                    Route::AdminView {}
                                } else {
                                    Route::MusicView {}
                                };
                                navigator().replace(target);
                            }
                            Err(err) => error.set(Some(err.to_string())),
                        }
                    }
                    Err(err) => {
                        tracing::warn!("login failed: {err}");
                        error.set(Some(login_error(err).to_string()));
                    }
                }
                busy.set(false);
            });
        }
    };

    rsx! {
        AuthCard {
            title: "Welcome back".to_string(),
            subtitle: "Sign in to start listening".to_string(),

            if let Some(message) = notice() {
                div { class: "px-4 py-3 rounded-lg bg-amber-500/10 border border-amber-500/40 text-amber-300 text-sm",
                    "{message}"
                }
            }
            if let Some(message) = error() {
                div { class: "px-4 py-3 rounded-lg bg-red-500/10 border border-red-500/40 text-red-300 text-sm",
                    "{message}"
                }
            }

            form { class: "space-y-4", onsubmit: on_submit,
                input {
                    class: INPUT_CLASS,
                    r#type: "text",
                    placeholder: "Username",
                    autocomplete: "username",
                    value: "{username}",
                    oninput: move |e| username.set(e.value()),
                }
                input {
                    class: INPUT_CLASS,
                    r#type: "password",
                    placeholder: "Password",
                    autocomplete: "current-password",
                    value: "{password}",
                    oninput: move |e| password.set(e.value()),
                }
                button {
                    class: PRIMARY_BUTTON_CLASS,
                    r#type: "submit",
                    disabled: busy(),
                    if busy() {
                        Icon { name: "loader".to_string(), class: "w-4 h-4".to_string() }
                        "Signing in..."
                    } else {
                        "Sign in"
                    }
                }
            }

            p { class: "text-sm text-center text-zinc-400",
                "No account yet? "
                Link { to: Route::RegisterView {}, class: "text-emerald-400 hover:underline", "Create one" }
            }
        }
    }
}

#[component]
pub fn RegisterView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut notice = ctx.notice;
    let mut form = use_signal(RegisterForm::default);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let on_submit = {
        let ctx = ctx.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            if busy() {
                return;
            }
            let request = match form.read().validate() {
                Ok(request) => request,
                Err(err) => {
                    error.set(Some(err.to_string()));
                    return;
                }
            };

            busy.set(true);
            error.set(None);
            let ctx = ctx.clone();
            spawn(async move {
                match ctx.auth().register(&request).await {
                    Ok(()) => {
                        tracing::info!("registered {}", request.username);
                        notice.set(Some("Registration successful! Please log in.".to_string()));
                        navigator().replace(Route::LoginView {});
                    }
                    Err(err) => error.set(Some(register_error(err).to_string())),
                }
                busy.set(false);
            });
        }
    };

    let current = form();

    rsx! {
        AuthCard {
            title: "Create an account".to_string(),
            subtitle: "Join and start streaming".to_string(),

            if let Some(message) = error() {
                div { class: "px-4 py-3 rounded-lg bg-red-500/10 border border-red-500/40 text-red-300 text-sm",
                    "{message}"
                }
            }

            form { class: "space-y-4", onsubmit: on_submit,
                input {
                    class: INPUT_CLASS,
                    r#type: "text",
                    placeholder: "Username",
                    value: "{current.username}",
                    oninput: move |e| form.write().username = e.value(),
                }
                input {
                    class: INPUT_CLASS,
                    r#type: "email",
                    placeholder: "Email",
                    value: "{current.email}",
                    oninput: move |e| form.write().email = e.value(),
                }
                input {
                    class: INPUT_CLASS,
                    r#type: "password",
                    placeholder: "Password (at least 6 characters)",
                    value: "{current.password}",
                    oninput: move |e| form.write().password = e.value(),
                }
                button {
                    class: PRIMARY_BUTTON_CLASS,
                    r#type: "submit",
                    disabled: busy(),
                    if busy() { "Creating account..." } else { "Create account" }
                }
            }

            p { class: "text-sm text-center text-zinc-400",
                "Already registered? "
                Link { to: Route::LoginView {}, class: "text-emerald-400 hover:underline", "Sign in" }
            }
        }
    }
}
