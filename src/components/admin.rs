use dioxus::prelude::*;

use crate::admin::{
    distinct_artists, mutation_error, showing_label, visible_songs, Mutation, SongFilter,
    SongForm, SongFormMode, SortConfig, SortKey,
};
use crate::api::models::{format_duration, AudioFile, Song};
use crate::api::ApiError;
use crate::components::{flash_status, AppContext, Icon, LoginRedirect, Route};
use crate::controller::Forbidden;
use crate::error::ClientError;

#[cfg(target_arch = "wasm32")]
use crate::admin::{FormError, MAX_UPLOAD_BYTES};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

const FILE_INPUT_ID: &str = "song-file-input";
const INPUT_CLASS: &str = "w-full px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white placeholder-zinc-500 focus:outline-none focus:border-emerald-500/50";

/// Read the file currently selected in the upload input.
#[cfg(target_arch = "wasm32")]
async fn read_selected_file() -> Result<Option<AudioFile>, String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "No document available".to_string())?;
    let input: web_sys::HtmlInputElement = document
        .get_element_by_id(FILE_INPUT_ID)
        .ok_or_else(|| "File input not found".to_string())?
        .dyn_into()
        .map_err(|_| "File input has the wrong type".to_string())?;
    let Some(file) = input.files().and_then(|files| files.get(0)) else {
        return Ok(None);
    };
    if file.size() > MAX_UPLOAD_BYTES as f64 {
        return Err(FormError::TooLarge.to_string());
    }

    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Could not read {}: {e:?}", file.name()))?;
    Ok(Some(AudioFile {
        name: file.name(),
        mime: file.type_(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    }))
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_selected_file() -> Result<Option<AudioFile>, String> {
    Err("File upload is only available in the browser".to_string())
}

fn load_admin_songs(
    ctx: AppContext,
    mut songs: Signal<Vec<Song>>,
    mut loading: Signal<bool>,
    mut load_error: Signal<Option<String>>,
) {
    let Some(token) = ctx.token() else {
        return;
    };
    loading.set(true);
    load_error.set(None);
    spawn(async move {
        let result = ctx.catalogue().admin_list_songs(&token).await;
        loading.set(false);
        match result {
            Ok(list) => songs.set(list),
            Err(err) => {
                let shown = ctx.api_failure(err, Forbidden::Expire, |err| {
                    ClientError::LoadFailed(format!("Failed to load songs: {err}"))
                });
                if let Some(message) = shown {
                    load_error.set(Some(message));
                }
            }
        }
    });
}

/// Message for a failed write, or `None` when the session ended instead.
fn write_failure(ctx: &AppContext, mutation: Mutation, err: ApiError) -> Option<String> {
    ctx.api_failure(err, mutation.forbidden(), |err| {
        tracing::warn!("{mutation:?} failed: {err}");
        mutation_error(mutation, err)
    })
}

#[component]
pub fn AdminView() -> Element {
    let ctx = use_context::<AppContext>();
    let songs = use_signal(Vec::<Song>::new);
    let loading = use_signal(|| false);
    let load_error = use_signal(|| None::<String>);
    let mut filter = use_signal(SongFilter::default);
    let mut sort = use_signal(SortConfig::default);
    let mut form = use_signal(|| None::<SongForm>);
    let mut pending_delete = use_signal(|| None::<Song>);
    let status = use_signal(|| None::<String>);
    let mut action_error = use_signal(|| None::<String>);

    let is_admin = ctx
        .controller
        .read()
        .session()
        .map(|session| session.is_admin());

    {
        let ctx = ctx.clone();
        use_hook(move || {
            if ctx.controller.peek().session().is_some_and(|s| s.is_admin()) {
                load_admin_songs(ctx, songs, loading, load_error);
            }
        });
    }

    let on_confirm_delete = {
        let ctx = ctx.clone();
        move |_| {
            let Some(song) = pending_delete() else {
                return;
            };
            let Some(token) = ctx.token() else {
                return;
            };
            pending_delete.set(None);
            let ctx = ctx.clone();
            spawn(async move {
                match ctx.catalogue().delete_song(&token, &song.id).await {
                    Ok(()) => {
                        flash_status(status, format!("Deleted \"{}\"", song.title));
                        load_admin_songs(ctx, songs, loading, load_error);
                    }
                    Err(err) => {
                        if let Some(message) = write_failure(&ctx, Mutation::Delete, err) {
                            action_error.set(Some(message));
                        }
                    }
                }
            });
        }
    };

    let on_retry = {
        let ctx = ctx.clone();
        move |_| load_admin_songs(ctx.clone(), songs, loading, load_error)
    };

    match is_admin {
        None => return rsx! { LoginRedirect {} },
        Some(false) => {
            return rsx! {
                div { class: "min-h-screen flex flex-col items-center justify-center gap-4 text-center px-4",
                    Icon { name: "shield".to_string(), class: "w-12 h-12 text-zinc-500".to_string() }
                    h1 { class: "text-xl font-semibold", "Admin access only" }
                    p { class: "text-zinc-400", "Only administrators can manage the song catalogue." }
                    Link { to: Route::MusicView {}, class: "text-emerald-400 hover:underline", "Back to music" }
                }
            };
        }
        Some(true) => {}
    }

    let all_songs = songs();
    let current_filter = filter();
    let current_sort = sort();
    let rows: Vec<Song> = visible_songs(&all_songs, &current_filter, current_sort)
        .into_iter()
        .cloned()
        .collect();
    let artists = distinct_artists(&all_songs);
    let showing = showing_label(rows.len(), all_songs.len());

    rsx! {
        div { class: "max-w-6xl mx-auto px-4 py-6 space-y-6",
            header { class: "flex items-center justify-between",
                div {
                    h1 { class: "text-2xl font-bold", "Song Management" }
                    p { class: "text-sm text-zinc-400", "Upload, edit and remove songs" }
                }
                div { class: "flex items-center gap-3",
                    Link { to: Route::MusicView {}, class: "px-3 py-2 rounded-lg bg-zinc-800 hover:bg-zinc-700 text-sm", "Player" }
                    button {
                        class: "flex items-center gap-2 px-4 py-2 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-black font-medium text-sm",
                        onclick: move |_| {
                            action_error.set(None);
                            form.set(Some(SongForm::create()));
                        },
                        Icon { name: "upload".to_string(), class: "w-4 h-4".to_string() }
                        "Upload song"
                    }
                }
            }

            if let Some(message) = status() {
                div { class: "fixed top-4 right-4 px-4 py-2 bg-emerald-500/20 border border-emerald-500/50 rounded-lg text-emerald-400 text-sm",
                    "{message}"
                }
            }
            if let Some(message) = action_error() {
                div { class: "px-4 py-3 rounded-lg bg-red-500/10 border border-red-500/40 text-red-300 text-sm",
                    "{message}"
                }
            }

            if form().is_some() {
                SongFormPanel {
                    form,
                    on_saved: move |message: String| {
                        form.set(None);
                        flash_status(status, message);
                        load_admin_songs(ctx.clone(), songs, loading, load_error);
                    },
                }
            }

            if let Some(song) = pending_delete() {
                div { class: "flex items-center justify-between px-4 py-3 rounded-lg bg-red-500/10 border border-red-500/40",
                    span { class: "text-sm", "Delete \"{song.title}\" by {song.artist}? This cannot be undone." }
                    div { class: "flex gap-2",
                        button {
                            class: "px-3 py-1.5 rounded-lg bg-red-500 hover:bg-red-400 text-sm",
                            onclick: on_confirm_delete,
                            "Delete"
                        }
                        button {
                            class: "px-3 py-1.5 rounded-lg bg-zinc-800 hover:bg-zinc-700 text-sm",
                            onclick: move |_| pending_delete.set(None),
                            "Cancel"
                        }
                    }
                }
            }

            section { class: "bg-zinc-900/40 rounded-2xl border border-zinc-800 p-4 space-y-4",
                div { class: "flex flex-col md:flex-row gap-3",
                    div { class: "relative flex-1",
                        Icon { name: "search".to_string(), class: "w-4 h-4 absolute left-3 top-3 text-zinc-500".to_string() }
                        input {
                            class: "{INPUT_CLASS} pl-9",
                            r#type: "text",
                            placeholder: "Search title, artist or album",
                            value: "{current_filter.search}",
                            oninput: move |e| filter.write().search = e.value(),
                        }
                    }
                    select {
                        class: "px-3 py-2 rounded-lg border border-zinc-700 bg-zinc-900 text-white",
                        value: "{current_filter.artist}",
                        onchange: move |e| filter.write().artist = e.value(),
                        option { value: "", "All artists" }
                        for artist in artists {
                            option { key: "{artist}", value: "{artist}", "{artist}" }
                        }
                    }
                }

                p { class: "text-sm text-zinc-400", "{showing}" }

                if loading() {
                    div { class: "flex items-center justify-center gap-2 py-8 text-zinc-400",
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
                    table { class: "w-full text-sm",
                        thead {
                            tr { class: "text-left text-zinc-400 border-b border-zinc-800",
                                for key in SortKey::ALL {
                                    th {
                                        key: "{key.label()}",
                                        class: "py-2 px-2 cursor-pointer select-none hover:text-white",
                                        onclick: move |_| sort.set(sort().toggle(key)),
                                        "{key.label()} {current_sort.indicator(key)}"
                                    }
                                }
                                th { class: "py-2 px-2 text-right", "Actions" }
                            }
                        }
                        tbody {
                            for song in rows {
                                tr { key: "{song.id}", class: "border-b border-zinc-800/60 hover:bg-zinc-800/40",
                                    td { class: "py-2 px-2 font-medium", "{song.title}" }
                                    td { class: "py-2 px-2 text-zinc-300", "{song.artist}" }
                                    td { class: "py-2 px-2 text-zinc-400", "{song.album_label()}" }
                                    td { class: "py-2 px-2 text-zinc-400", "{format_duration(song.duration_seconds)}" }
                                    td { class: "py-2 px-2",
                                        div { class: "flex justify-end gap-1",
                                            button {
                                                class: "p-2 rounded-lg hover:bg-zinc-700",
                                                title: "Edit",
                                                onclick: {
                                                    let song = song.clone();
                                                    move |_| {
                                                        action_error.set(None);
                                                        form.set(Some(SongForm::edit(&song)));
                                                    }
                                                },
                                                Icon { name: "edit".to_string(), class: "w-4 h-4".to_string() }
                                            }
                                            button {
                                                class: "p-2 rounded-lg hover:bg-red-500/20 text-red-300",
                                                title: "Delete",
                                                onclick: {
                                                    let song = song.clone();
                                                    move |_| pending_delete.set(Some(song.clone()))
                                                },
                                                Icon { name: "trash".to_string(), class: "w-4 h-4".to_string() }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn SongFormPanel(form: Signal<Option<SongForm>>, on_saved: EventHandler<String>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut form = form;
    let mut saving = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut reading_file = use_signal(|| false);

    let on_file_change = move |_| {
        reading_file.set(true);
        spawn(async move {
            match read_selected_file().await {
                Ok(Some(file)) => {
                    let attached = form.write().as_mut().map(|current| current.attach(file));
                    match attached {
                        Some(Err(err)) => error.set(Some(err.to_string())),
                        _ => error.set(None),
                    }
                }
                Ok(None) => {}
                Err(message) => error.set(Some(message)),
            }
            reading_file.set(false);
        });
    };

    let on_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if saving() || reading_file() {
            return;
        }
        let Some(current) = form() else {
            return;
        };
        let (metadata, file) = match current.validate() {
            Ok(valid) => valid,
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
            let catalogue = ctx.catalogue();
            let result = match (&current.mode, file) {
                (SongFormMode::Edit(id), _) => catalogue
                    .update_song(&token, id, &metadata)
                    .await
                    .map_err(|err| (Mutation::Update, err)),
                (SongFormMode::Create, Some(file)) => catalogue
                    .upload_song(&token, &metadata, file)
                    .await
                    .map_err(|err| (Mutation::Upload, err)),
                (SongFormMode::Create, None) => {
                    saving.set(false);
                    return;
                }
            };
            saving.set(false);
            match result {
                Ok(song) => {
                    let verb = if current.is_edit() { "Updated" } else { "Uploaded" };
                    on_saved.call(format!("{verb} \"{}\"", song.title));
                }
                Err((mutation, err)) => {
                    if let Some(message) = write_failure(&ctx, mutation, err) {
                        error.set(Some(message));
                    }
                }
            }
        });
    };

    let Some(current) = form() else {
        return rsx! {};
    };
    let is_edit = current.is_edit();
    let file_label = current
        .file
        .as_ref()
        .map(|file| format!("{} ({:.1} MB)", file.name, file.bytes.len() as f64 / 1_048_576.0));

    rsx! {
        section { class: "bg-zinc-900/60 rounded-2xl border border-zinc-800 p-6",
            div { class: "flex items-center justify-between mb-4",
                h2 { class: "text-lg font-semibold",
                    if is_edit { "Edit song" } else { "Upload new song" }
                }
                button {
                    class: "p-2 rounded-lg hover:bg-zinc-800",
                    onclick: move |_| form.set(None),
                    Icon { name: "x".to_string(), class: "w-4 h-4".to_string() }
                }
            }

            if let Some(message) = error() {
                div { class: "mb-4 px-4 py-3 rounded-lg bg-red-500/10 border border-red-500/40 text-red-300 text-sm",
                    "{message}"
                }
            }

            form { class: "grid grid-cols-1 md:grid-cols-2 gap-4", onsubmit: on_submit,
                label { class: "space-y-1",
                    span { class: "text-sm text-zinc-400", "Title *" }
                    input {
                        class: INPUT_CLASS,
                        value: "{current.title}",
                        oninput: move |e| {
                            if let Some(current) = form.write().as_mut() {
                                current.title = e.value();
                            }
                        },
                    }
                }
                label { class: "space-y-1",
                    span { class: "text-sm text-zinc-400", "Artist *" }
                    input {
                        class: INPUT_CLASS,
                        value: "{current.artist}",
                        oninput: move |e| {
                            if let Some(current) = form.write().as_mut() {
                                current.artist = e.value();
                            }
                        },
                    }
                }
                label { class: "space-y-1",
                    span { class: "text-sm text-zinc-400", "Album" }
                    input {
                        class: INPUT_CLASS,
                        value: "{current.album}",
                        oninput: move |e| {
                            if let Some(current) = form.write().as_mut() {
                                current.album = e.value();
                            }
                        },
                    }
                }
                label { class: "space-y-1",
                    span { class: "text-sm text-zinc-400", "Duration (seconds)" }
                    input {
                        class: INPUT_CLASS,
                        r#type: "number",
                        min: "0",
                        value: "{current.duration}",
                        oninput: move |e| {
                            if let Some(current) = form.write().as_mut() {
                                current.duration = e.value();
                            }
                        },
                    }
                }
                if !is_edit {
                    label { class: "md:col-span-2 space-y-1",
                        span { class: "text-sm text-zinc-400", "Audio file *" }
                        input {
                            id: FILE_INPUT_ID,
                            class: "block w-full text-sm text-zinc-400",
                            r#type: "file",
                            accept: "audio/*",
                            onchange: on_file_change,
                        }
                        span { class: "text-xs text-zinc-500",
                            if reading_file() {
                                "Reading file..."
                            } else if let Some(label) = file_label {
                                "{label}"
                            } else {
                                "Max 50MB · Supports most audio formats"
                            }
                        }
                    }
                }
                div { class: "md:col-span-2 flex gap-3",
                    button {
                        class: "flex-1 py-2.5 rounded-lg bg-emerald-500 hover:bg-emerald-400 text-black font-semibold disabled:opacity-50",
                        r#type: "submit",
                        disabled: saving() || reading_file(),
                        if saving() {
                            if is_edit { "Saving..." } else { "Uploading..." }
                        } else if is_edit {
                            "Save changes"
                        } else {
                            "Upload song"
                        }
                    }
                    button {
                        class: "px-6 py-2.5 rounded-lg bg-zinc-800 hover:bg-zinc-700",
                        r#type: "button",
                        onclick: move |_| form.set(None),
                        "Cancel"
                    }
                }
            }
        }
    }
}
