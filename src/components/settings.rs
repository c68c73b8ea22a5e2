use dioxus::prelude::*;

use crate::account::{password_error, password_strength, profile_error, PasswordForm, ProfileForm};
use crate::components::{flash_status, AppContext, Icon, LoginRedirect, Route};
use crate::controller::Forbidden;

const INPUT_CLASS: &str = "w-full px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50";

#[derive(Clone, Copy, PartialEq)]
enum SettingsTab {
    Profile,
    Password,
}

fn strength_color(score: u8) -> &'static str {
    match score {
        0 => "bg-red-500",
        1 => "bg-red-400",
        2 => "bg-yellow-500",
        3 => "bg-blue-500",
        _ => "bg-emerald-500",
    }
}

#[component]
pub fn SettingsView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut tab = use_signal(|| SettingsTab::Profile);
    let status = use_signal(|| None::<String>);

    let Some(session) = ctx.controller.read().session().cloned() else {
        return rsx! { LoginRedirect {} };
    };

    let tab_class = |active: bool| {
        if active {
            "w-full text-left px-4 py-2 rounded-lg bg-emerald-500/20 text-emerald-300"
        } else {
            "w-full text-left px-4 py-2 rounded-lg text-zinc-400 hover:text-white hover:bg-zinc-800"
        }
    };

    rsx! {
        div { class: "max-w-4xl mx-auto px-4 py-6 space-y-6",
            header { class: "flex items-center justify-between",
                div {
                    h1 { class: "text-2xl font-bold", "Account Settings" }
                    p { class: "text-sm text-zinc-400", "Manage your profile and security" }
                }
                Link { to: Route::MusicView {}, class: "px-3 py-2 rounded-lg bg-zinc-800 hover:bg-zinc-700 text-sm", "Back to music" }
            }

            if let Some(message) = status() {
                div { class: "fixed top-4 right-4 px-4 py-2 bg-emerald-500/20 border border-emerald-500/50 rounded-lg text-emerald-400 text-sm",
                    "{message}"
                }
            }

            div { class: "grid grid-cols-1 md:grid-cols-4 gap-6",
                aside { class: "space-y-2",
                    div { class: "flex items-center gap-3 p-3 mb-2 rounded-xl bg-zinc-900/60",
                        div { class: "w-10 h-10 rounded-full bg-gradient-to-br from-emerald-400 to-cyan-500 text-black font-bold flex items-center justify-center",
                            "{session.initial()}"
                        }
                        div { class: "min-w-0",
                            p { class: "font-medium truncate", "{session.username}" }
                            p { class: "text-xs text-zinc-400 truncate", "{session.email}" }
                        }
                    }
                    button {
                        class: tab_class(tab() == SettingsTab::Profile),
                        onclick: move |_| tab.set(SettingsTab::Profile),
                        "Profile"
                    }
                    button {
                        class: tab_class(tab() == SettingsTab::Password),
                        onclick: move |_| tab.set(SettingsTab::Password),
                        "Password"
                    }
                }
                section { class: "md:col-span-3 bg-zinc-900/40 rounded-2xl border border-zinc-800 p-6",
                    if tab() == SettingsTab::Profile {
                        ProfileSettings { username: session.username.clone(), email: session.email.clone(), status }
                    } else {
                        PasswordSettings { status }
                    }
                }
            }
        }
    }
}

#[component]
fn ProfileSettings(username: String, email: String, status: Signal<Option<String>>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut form = use_signal(|| ProfileForm::from_profile(&username, &email));
    let mut error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let profile = match form.read().validate() {
            Ok(profile) => profile,
            Err(err) => {
                error.set(Some(err.to_string()));
                return;
            }
        };
        let Some(token) = ctx.token() else {
            return;
        };

        saving.set(true);
        error.set(None);
        let ctx = ctx.clone();
        spawn(async move {
            match ctx.auth().update_profile(&token, &profile).await {
                Ok(updated) => {
                    let mut controller = ctx.controller;
                    let applied = controller.write().update_profile(&updated);
                    match applied {
                        Ok(session) => {
                            form.set(ProfileForm::from_profile(&session.username, &session.email));
                            flash_status(status, "Profile updated successfully!");
                        }
                        Err(err) => ctx.send_to_login(Some(&err)),
                    }
                }
                Err(err) => {
                    if let Some(message) = ctx.api_failure(err, Forbidden::Expire, profile_error) {
                        error.set(Some(message));
                    }
                }
            }
            saving.set(false);
        });
    };

    let current = form();

    rsx! {
        h2 { class: "text-lg font-semibold mb-6", "Profile Information" }
        if let Some(message) = error() {
            div { class: "mb-4 px-4 py-3 rounded-lg bg-red-500/10 border border-red-500/40 text-red-300 text-sm",
                "{message}"
            }
        }
        form { class: "space-y-4", onsubmit: on_submit,
            label { class: "block space-y-1",
                span { class: "text-sm text-zinc-400", "Username" }
                input {
                    class: INPUT_CLASS,
                    value: "{current.username}",
                    oninput: move |e| form.write().username = e.value(),
                }
            }
            label { class: "block space-y-1",
                span { class: "text-sm text-zinc-400", "Email" }
                input {
                    class: INPUT_CLASS,
                    r#type: "email",
                    value: "{current.email}",
                    oninput: move |e| form.write().email = e.value(),
                }
            }
            button {
                class: "px-6 py-2.5 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-black font-semibold disabled:opacity-50 flex items-center gap-2",
                r#type: "submit",
                disabled: saving(),
                if saving() {
                    Icon { name: "loader".to_string(), class: "w-4 h-4".to_string() }
                    "Saving..."
                } else {
                    "Save profile"
                }
            }
        }
    }
}

#[component]
fn PasswordSettings(status: Signal<Option<String>>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut form = use_signal(PasswordForm::default);
    let mut error = use_signal(|| None::<String>);
    let mut saving = use_signal(|| false);

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() {
            return;
        }
        let change = match form.read().validate() {
            Ok(change) => change,
            Err(err) => {
                error.set(Some(err.to_string()));
                return;
            }
        };
        let Some(token) = ctx.token() else {
            return;
        };

        saving.set(true);
        error.set(None);
        let ctx = ctx.clone();
        spawn(async move {
            match ctx.auth().change_password(&token, &change).await {
                Ok(()) => {
                    form.set(PasswordForm::default());
                    flash_status(status, "Password changed successfully!");
                }
                Err(err) => {
                    if let Some(message) = ctx.api_failure(err, Forbidden::Expire, password_error) {
                        error.set(Some(message));
                    }
                }
            }
            saving.set(false);
        });
    };

    let current = form();
    let strength = password_strength(&current.new);
    let matches = current.confirmation_matches();

    rsx! {
        h2 { class: "text-lg font-semibold mb-6", "Change Password" }
        if let Some(message) = error() {
            div { class: "mb-4 px-4 py-3 rounded-lg bg-red-500/10 border border-red-500/40 text-red-300 text-sm",
                "{message}"
            }
        }
        form { class: "space-y-4", onsubmit: on_submit,
            label { class: "block space-y-1",
                span { class: "text-sm text-zinc-400", "Current password" }
                input {
                    class: INPUT_CLASS,
                    r#type: "password",
                    autocomplete: "current-password",
                    value: "{current.current}",
                    oninput: move |e| form.write().current = e.value(),
                }
            }
            label { class: "block space-y-1",
                span { class: "text-sm text-zinc-400", "New password" }
                input {
                    class: INPUT_CLASS,
                    r#type: "password",
                    autocomplete: "new-password",
                    value: "{current.new}",
                    oninput: move |e| form.write().new = e.value(),
                }
            }
            if let Some(strength) = strength {
                div { class: "space-y-1",
                    div { class: "flex justify-between text-xs text-zinc-400",
                        span { "Password strength" }
                        span { "{strength.label}" }
                    }
                    div { class: "h-1.5 bg-zinc-800 rounded-full overflow-hidden",
                        div {
                            class: "h-full {strength_color(strength.score)} transition-all",
                            style: "width: {strength.percent()}%",
                        }
                    }
                }
            }
            label { class: "block space-y-1",
                span { class: "text-sm text-zinc-400", "Confirm new password" }
                input {
                    class: INPUT_CLASS,
                    r#type: "password",
                    autocomplete: "new-password",
                    value: "{current.confirm}",
                    oninput: move |e| form.write().confirm = e.value(),
                }
            }
            {
                match matches {
                    Some(true) => rsx! { p { class: "text-xs text-emerald-400", "Passwords match" } },
                    Some(false) => rsx! { p { class: "text-xs text-red-400", "Passwords do not match" } },
                    None => rsx! {},
                }
            }
            button {
                class: "px-6 py-2.5 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-black font-semibold disabled:opacity-50 flex items-center gap-2",
                r#type: "submit",
                disabled: saving(),
                if saving() {
                    Icon { name: "loader".to_string(), class: "w-4 h-4".to_string() }
                    "Updating..."
                } else {
                    "Change password"
                }
            }
        }
    }
}
