use dioxus::prelude::*;

use crate::api::models::{format_duration, Song};
use crate::components::{AppContext, Icon, LoginRedirect, Route};
use crate::controller::LoadOutcome;
use crate::error::ClientError;
use crate::player::format_time;

/// Fetch the playlist for the current session and hand it to the controller.
/// `refresh` re-fetches even when a playlist is already installed.
fn load_songs(
    ctx: AppContext,
    refresh: bool,
    mut loading: Signal<bool>,
    mut load_error: Signal<Option<String>>,
) {
    let ticket = if refresh {
        ctx.controller.peek().begin_playlist_load()
    } else {
        ctx.controller.peek().initial_playlist_load()
    };
    let Some(ticket) = ticket else {
        return;
    };
    loading.set(true);
    load_error.set(None);

    spawn(async move {
        let result = ctx.catalogue().list_songs(&ticket.token).await;
        let mut controller = ctx.controller;
        let outcome = controller.write().finish_playlist_load(ticket, result);
        loading.set(false);
        match outcome {
            Ok(LoadOutcome::Loaded(count)) => tracing::debug!("playlist has {count} songs"),
            Ok(LoadOutcome::Discarded) => {}
            Err(err) if err.requires_login() => ctx.send_to_login(Some(&err)),
            Err(err) => load_error.set(Some(err.to_string())),
        }
    });
}

#[component]
pub fn MusicView() -> Element {
    let ctx = use_context::<AppContext>();
    let loading = use_signal(|| false);
    let load_error = use_signal(|| None::<String>);
    let mut menu_open = use_signal(|| false);

    {
        let ctx = ctx.clone();
        use_hook(move || load_songs(ctx, false, loading, load_error));
    }

    let on_retry = {
        let ctx = ctx.clone();
        move |_| load_songs(ctx.clone(), true, loading, load_error)
    };

    let on_logout = {
        let ctx = ctx.clone();
        move |_| {
            menu_open.set(false);
            ctx.logout();
        }
    };

    let Some(session) = ctx.controller.read().session().cloned() else {
        return rsx! { LoginRedirect {} };
    };

    rsx! {
        div { class: "max-w-5xl mx-auto px-4 py-6 space-y-6",
            header { class: "flex items-center justify-between",
                div { class: "flex items-center gap-3",
                    Icon { name: "music".to_string(), class: "w-7 h-7 text-emerald-400".to_string() }
                    h1 { class: "text-xl font-bold", "MusicStream" }
                }
                div { class: "flex items-center gap-3",
                    if session.is_admin() {
                        Link {
                            to: Route::AdminView {},
                            class: "flex items-center gap-2 px-3 py-2 rounded-lg bg-zinc-800 hover:bg-zinc-700 text-sm",
                            Icon { name: "shield".to_string(), class: "w-4 h-4".to_string() }
                            "Admin"
                        }
                    }
                    div { class: "relative",
                        button {
                            class: "w-10 h-10 rounded-full bg-gradient-to-br from-emerald-400 to-cyan-500 text-black font-bold",
                            onclick: move |_| menu_open.set(!menu_open()),
                            "{session.initial()}"
                        }
                        if menu_open() {
                            div { class: "absolute right-0 mt-2 w-60 bg-zinc-900 border border-zinc-800 rounded-xl shadow-xl z-10 overflow-hidden",
                                div { class: "px-4 py-3 border-b border-zinc-800",
                                    p { class: "font-medium", "{session.username}" }
                                    if !session.email.is_empty() {
                                        p { class: "text-sm text-zinc-400 truncate", "{session.email}" }
                                    }
                                    span { class: "inline-block mt-2 px-2 py-0.5 rounded text-xs bg-zinc-800 text-zinc-300",
                                        "{session.role.label()}"
                                    }
                                }
                                Link {
                                    to: Route::SettingsView {},
                                    class: "flex items-center gap-2 px-4 py-3 hover:bg-zinc-800 text-sm",
                                    Icon { name: "settings".to_string(), class: "w-4 h-4".to_string() }
                                    "Settings"
                                }
                                button {
                                    class: "w-full flex items-center gap-2 px-4 py-3 hover:bg-zinc-800 text-sm text-red-300",
                                    onclick: on_logout,
                                    Icon { name: "logout".to_string(), class: "w-4 h-4".to_string() }
                                    "Log out"
                                }
                            }
                        }
                    }
                }
            }

            NowPlaying {}

            section { class: "bg-zinc-900/40 rounded-2xl border border-zinc-800 p-4",
                h2 { class: "text-lg font-semibold mb-4", "Songs" }
                if loading() {
                    div { class: "flex items-center gap-2 text-zinc-400 py-8 justify-center",
                        Icon { name: "loader".to_string(), class: "w-5 h-5".to_string() }
                        "Loading songs..."
                    }
                } else if let Some(message) = load_error() {
                    div { class: "flex flex-col items-center gap-3 py-8",
                        p { class: "text-red-300 text-sm", "{message}" }
                        button {
                            class: "px-4 py-2 rounded-lg bg-zinc-800 hover:bg-zinc-700 text-sm",
                            onclick: on_retry,
                            "Retry"
                        }
                    }
                } else {
                    SongList {}
                }
            }
        }
    }
}

#[component]
fn NowPlaying() -> Element {
    let ctx = use_context::<AppContext>();
    let mut controller = ctx.controller;

    let app = controller.read();
    let player = app.player();
    let song = player.current_song().cloned();
    let is_playing = player.is_playing();
    let position = player.position();
    let duration = player.display_duration();
    let seek_max = player.duration().unwrap_or(0.0);
    let progress = player.progress_percent();
    let volume = player.volume();
    let muted = player.is_muted();
    let has_songs = !player.playlist().is_empty();
    let playback_error = player.error().map(str::to_string);
    drop(app);

    let Some(song) = song else {
        return rsx! {
            section { class: "bg-zinc-900/40 rounded-2xl border border-zinc-800 p-6 text-center text-zinc-400",
                if has_songs { "Pick a song to start listening" } else { "Nothing to play yet" }
            }
        };
    };

    let report = |result: Result<(), ClientError>| {
        if let Err(err) = result {
            tracing::debug!("transport command failed: {err}");
        }
    };

    rsx! {
        section { class: "bg-zinc-900/40 rounded-2xl border border-zinc-800 p-6 space-y-5",
            div { class: "flex items-center gap-4",
                div { class: "w-16 h-16 rounded-xl bg-gradient-to-br from-emerald-500/40 to-cyan-500/40 flex items-center justify-center text-2xl font-bold",
                    "{song.initial()}"
                }
                div { class: "min-w-0",
                    p { class: "text-lg font-semibold truncate", "{song.title}" }
                    p { class: "text-sm text-zinc-400 truncate",
                        "{song.artist}"
                        if let Some(album) = song.album.as_ref() {
                            " · {album}"
                        }
                    }
                }
            }

            if let Some(message) = playback_error {
                div { class: "flex items-center justify-between px-4 py-2 rounded-lg bg-red-500/10 border border-red-500/40 text-red-300 text-sm",
                    span { "{message}" }
                    button {
                        onclick: move |_| controller.write().player_mut().clear_error(),
                        Icon { name: "x".to_string(), class: "w-4 h-4".to_string() }
                    }
                }
            }

            div { class: "space-y-1",
                div { class: "relative h-2 bg-zinc-800 rounded-full overflow-hidden",
                    div {
                        class: "absolute inset-y-0 left-0 bg-emerald-500",
                        style: "width: {progress}%",
                    }
                }
                input {
                    r#type: "range",
                    min: "0",
                    max: "{seek_max}",
                    step: "0.1",
                    value: "{position}",
                    class: "w-full accent-emerald-500",
                    oninput: move |e: FormEvent| {
                        if let Ok(target) = e.value().parse::<f64>() {
                            controller.write().player_mut().seek(target);
                        }
                    },
                }
                div { class: "flex justify-between text-xs text-zinc-400",
                    span { "{format_time(position)}" }
                    span { "{format_time(duration)}" }
                }
            }

            div { class: "flex items-center justify-between",
                div { class: "flex items-center gap-4",
                    button {
                        class: "p-2 rounded-full hover:bg-zinc-800",
                        onclick: move |_| controller.write().player_mut().previous(),
                        Icon { name: "prev".to_string(), class: "w-5 h-5".to_string() }
                    }
                    button {
                        class: "p-4 rounded-full bg-emerald-500 hover:bg-emerald-400 text-black",
                        onclick: move |_| report(controller.write().player_mut().toggle_play()),
                        Icon {
                            name: if is_playing { "pause".to_string() } else { "play".to_string() },
                            class: "w-6 h-6".to_string(),
                        }
                    }
                    button {
                        class: "p-2 rounded-full hover:bg-zinc-800",
                        onclick: move |_| controller.write().player_mut().next(),
                        Icon { name: "next".to_string(), class: "w-5 h-5".to_string() }
                    }
                }
                div { class: "flex items-center gap-3 w-48",
                    button {
                        class: "p-2 rounded-full hover:bg-zinc-800",
                        onclick: move |_| controller.write().player_mut().toggle_mute(),
                        Icon {
                            name: if muted { "volume-x".to_string() } else { "volume".to_string() },
                            class: "w-5 h-5 text-zinc-300".to_string(),
                        }
                    }
                    input {
                        r#type: "range",
                        min: "0",
                        max: "100",
                        value: (volume * 100.0).round() as i32,
                        class: "flex-1 accent-emerald-500",
                        oninput: move |e: FormEvent| {
                            if let Ok(percent) = e.value().parse::<f64>() {
                                controller.write().player_mut().set_volume(percent / 100.0);
                            }
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn SongList() -> Element {
    let mut controller = use_context::<AppContext>().controller;

    let app = controller.read();
    let songs: Vec<Song> = app.player().playlist().to_vec();
    let current = app.player().current_index();
    let is_playing = app.player().is_playing();
    drop(app);

    if songs.is_empty() {
        return rsx! {
            p { class: "text-center text-zinc-400 py-8", "No songs available yet." }
        };
    }

    rsx! {
        ul { class: "divide-y divide-zinc-800",
            for (index, song) in songs.into_iter().enumerate() {
                li {
                    key: "{song.id}",
                    class: if current == Some(index) { "flex items-center gap-4 px-3 py-3 rounded-lg bg-emerald-500/10 cursor-pointer" } else { "flex items-center gap-4 px-3 py-3 rounded-lg hover:bg-zinc-800/60 cursor-pointer" },
                    onclick: move |_| controller.write().player_mut().select(index),
                    span { class: "w-6 text-sm text-zinc-500",
                        if current == Some(index) && is_playing {
                            Icon { name: "volume".to_string(), class: "w-4 h-4 text-emerald-400".to_string() }
                        } else {
                            "{index + 1}"
                        }
                    }
                    div { class: "flex-1 min-w-0",
                        p { class: "font-medium truncate", "{song.title}" }
                        p { class: "text-sm text-zinc-400 truncate", "{song.artist}" }
                    }
                    span { class: "hidden md:block text-sm text-zinc-500 truncate w-40", "{song.album_label()}" }
                    span { class: "text-sm text-zinc-500 w-12 text-right", "{format_duration(song.duration_seconds)}" }
                }
            }
        }
    }
}
