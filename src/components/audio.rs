//! The media output behind the playback controller and the component that
//! feeds its events back in.

use dioxus::prelude::*;

use crate::components::{AppContext, AppState};
use crate::player::MediaEvent;

#[cfg(target_arch = "wasm32")]
use crate::player::{MediaError, MediaResource};
#[cfg(target_arch = "wasm32")]
use dioxus::core::{Runtime, RuntimeGuard};
#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

#[cfg(target_arch = "wasm32")]
pub type AppMedia = WebAudio;
#[cfg(not(target_arch = "wasm32"))]
pub type AppMedia = crate::player::HeadlessMedia;

#[cfg(target_arch = "wasm32")]
const AUDIO_ELEMENT_ID: &str = "musicstream-audio";

/// Minimum gap between forwarded time updates, in seconds.
#[cfg(target_arch = "wasm32")]
const TIME_UPDATE_STEP: f64 = 0.2;

/// Hand one media event to the controller. Events for a player with no
/// current song are stale and dropped.
fn deliver(mut controller: AppState, event: MediaEvent) {
    let mut app = controller.write();
    if app.player().current_index().is_none() {
        return;
    }
    if let Err(err) = app.player_mut().handle_media_event(event) {
        tracing::debug!("media event surfaced an error: {err}");
    }
}

/// The page's single `<audio>` element, created on first use.
#[cfg(target_arch = "wasm32")]
pub fn get_or_create_audio_element() -> Option<HtmlAudioElement> {
    let document = window()?.document()?;

    if let Some(existing) = document.get_element_by_id(AUDIO_ELEMENT_ID) {
        return existing.dyn_into::<HtmlAudioElement>().ok();
    }

    let audio: HtmlAudioElement = document.create_element("audio").ok()?.dyn_into().ok()?;
    audio.set_id(AUDIO_ELEMENT_ID);
    audio.set_attribute("preload", "metadata").ok()?;
    document.body()?.append_child(&audio).ok()?;

    Some(audio)
}

#[cfg(target_arch = "wasm32")]
thread_local! {
    static REJECTION_HANDLER: RefCell<Option<Box<dyn Fn(String)>>> = RefCell::new(None);
}

#[cfg(target_arch = "wasm32")]
fn install_rejection_handler(handler: impl Fn(String) + 'static) {
    REJECTION_HANDLER.with(|slot| *slot.borrow_mut() = Some(Box::new(handler)));
}

#[cfg(target_arch = "wasm32")]
fn report_rejection(reason: String) {
    REJECTION_HANDLER.with(|slot| {
        if let Some(handler) = slot.borrow().as_ref() {
            handler(reason);
        }
    });
}

/// `play()` rejects with `AbortError` whenever a newer `load`/`pause`
/// interrupts it; that is a superseded request, not a failure.
#[cfg(target_arch = "wasm32")]
fn rejection_reason(err: &wasm_bindgen::JsValue) -> Option<String> {
    let name = js_sys::Reflect::get(err, &"name".into())
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default();
    if name == "AbortError" {
        return None;
    }
    let message = js_sys::Reflect::get(err, &"message".into())
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    Some(if name.is_empty() {
        message
    } else {
        format!("{name}: {message}")
    })
}

#[cfg(target_arch = "wasm32")]
fn element_error_message(audio: &HtmlAudioElement) -> String {
    let code = audio.error().map(|error| error.code()).unwrap_or(0);
    match code {
        1 => "Playback was aborted.".to_string(),
        2 => "A network error interrupted playback.".to_string(),
        3 => "This audio file could not be decoded.".to_string(),
        4 => "This audio source is not supported.".to_string(),
        _ => "Unable to load this audio source.".to_string(),
    }
}

/// Drives the page's `<audio>` element.
#[cfg(target_arch = "wasm32")]
pub struct WebAudio {
    element: Option<HtmlAudioElement>,
}

#[cfg(target_arch = "wasm32")]
impl WebAudio {
    pub fn new() -> Self {
        let element = get_or_create_audio_element();
        if element.is_none() {
            tracing::error!("could not create the audio element");
        }
        Self { element }
    }
}

#[cfg(target_arch = "wasm32")]
impl std::fmt::Debug for WebAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebAudio")
            .field("attached", &self.element.is_some())
            .finish()
    }
}

#[cfg(target_arch = "wasm32")]
impl MediaResource for WebAudio {
    fn load(&mut self, src: &str) {
        if let Some(audio) = &self.element {
            audio.set_src(src);
            audio.load();
        }
    }

    fn unload(&mut self) {
        if let Some(audio) = &self.element {
            let _ = audio.pause();
            let _ = audio.remove_attribute("src");
            audio.load();
        }
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let audio = self.element.as_ref().ok_or(MediaError::Unavailable)?;
        let promise = audio
            .play()
            .map_err(|err| MediaError::Rejected(format!("{err:?}")))?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
                if let Some(reason) = rejection_reason(&err) {
                    report_rejection(reason);
                }
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(audio) = &self.element {
            let _ = audio.pause();
        }
    }

    fn seek(&mut self, seconds: f64) {
        if let Some(audio) = &self.element {
            audio.set_current_time(seconds);
        }
    }

    fn set_volume(&mut self, volume: f64) {
        if let Some(audio) = &self.element {
            audio.set_volume(volume);
        }
    }
}

/// Wires the `<audio>` element's events into the controller.
#[cfg(target_arch = "wasm32")]
#[component]
pub fn AudioBridge() -> Element {
    let controller = use_context::<AppContext>().controller;

    use_hook(move || {
        let Some(audio) = get_or_create_audio_element() else {
            return;
        };

        let runtime = Runtime::current();

        let runtime_reject = runtime.clone();
        install_rejection_handler(move |reason| {
            let _guard = RuntimeGuard::new(runtime_reject.clone());
            deliver(controller, MediaEvent::Failed(reason));
        });

        let runtime_time = runtime.clone();
        let mut last_emit = -1.0f64;
        let time_closure = Closure::wrap(Box::new(move || {
            let _guard = RuntimeGuard::new(runtime_time.clone());
            if let Some(audio) = get_or_create_audio_element() {
                let time = audio.current_time();
                if time < last_emit || time - last_emit >= TIME_UPDATE_STEP {
                    last_emit = time;
                    deliver(controller, MediaEvent::TimeUpdate(time));
                }
            }
        }) as Box<dyn FnMut()>);
        audio.set_ontimeupdate(Some(time_closure.as_ref().unchecked_ref()));
        time_closure.forget();

        let runtime_loaded = runtime.clone();
        let loaded_closure = Closure::wrap(Box::new(move || {
            let _guard = RuntimeGuard::new(runtime_loaded.clone());
            if let Some(audio) = get_or_create_audio_element() {
                let duration = audio.duration();
                let duration = (duration.is_finite() && duration > 0.0).then_some(duration);
                deliver(controller, MediaEvent::Loaded { duration });
            }
        }) as Box<dyn FnMut()>);
        audio.set_onloadedmetadata(Some(loaded_closure.as_ref().unchecked_ref()));
        loaded_closure.forget();

        // The element also pauses right before `ended`; that one is not forwarded.
        let runtime_pause = runtime.clone();
        let pause_closure = Closure::wrap(Box::new(move || {
            let _guard = RuntimeGuard::new(runtime_pause.clone());
            if let Some(audio) = get_or_create_audio_element() {
                if !audio.ended() {
                    deliver(controller, MediaEvent::Paused);
                }
            }
        }) as Box<dyn FnMut()>);
        audio.set_onpause(Some(pause_closure.as_ref().unchecked_ref()));
        pause_closure.forget();

        let runtime_play = runtime.clone();
        let play_closure = Closure::wrap(Box::new(move || {
            let _guard = RuntimeGuard::new(runtime_play.clone());
            deliver(controller, MediaEvent::Resumed);
        }) as Box<dyn FnMut()>);
        audio.set_onplay(Some(play_closure.as_ref().unchecked_ref()));
        play_closure.forget();

        let runtime_end = runtime.clone();
        let end_closure = Closure::wrap(Box::new(move || {
            let _guard = RuntimeGuard::new(runtime_end.clone());
            deliver(controller, MediaEvent::Ended);
        }) as Box<dyn FnMut()>);
        audio.set_onended(Some(end_closure.as_ref().unchecked_ref()));
        end_closure.forget();

        let runtime_error = runtime.clone();
        let error_closure = Closure::wrap(Box::new(move || {
            let _guard = RuntimeGuard::new(runtime_error.clone());
            if let Some(audio) = get_or_create_audio_element() {
                if audio.get_attribute("src").is_some() {
                    deliver(controller, MediaEvent::Failed(element_error_message(&audio)));
                }
            }
        }) as Box<dyn FnMut()>);
        audio.set_onerror(Some(error_closure.as_ref().unchecked_ref()));
        error_closure.forget();
    });

    rsx! {}
}

/// Without an audio element a new source is "loaded" as soon as it is set, so
/// a pending start is completed right away.
#[cfg(not(target_arch = "wasm32"))]
#[component]
pub fn AudioBridge() -> Element {
    let controller = use_context::<AppContext>().controller;

    use_effect(move || {
        let waiting = controller.read().player().awaiting_start();
        if waiting {
            deliver(controller, MediaEvent::Loaded { duration: None });
        }
    });

    rsx! {}
}
