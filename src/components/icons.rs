use dioxus::prelude::*;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Play,
    Pause,
    Prev,
    Next,
    Volume,
    VolumeMute,
    Music,
    Search,
    Settings,
    Shield,
    Logout,
    Upload,
    Edit,
    Trash,
    Close,
    Loader,
    Unknown,
}

impl Glyph {
    fn from_name(name: &str) -> Self {
        match name {
            "play" => Glyph::Play,
            "pause" => Glyph::Pause,
            "prev" => Glyph::Prev,
            "next" => Glyph::Next,
            "volume" => Glyph::Volume,
            "volume-x" => Glyph::VolumeMute,
            "music" => Glyph::Music,
            "search" => Glyph::Search,
            "settings" => Glyph::Settings,
            "shield" => Glyph::Shield,
            "logout" => Glyph::Logout,
            "upload" => Glyph::Upload,
            "edit" => Glyph::Edit,
            "trash" => Glyph::Trash,
            "x" => Glyph::Close,
            "loader" => Glyph::Loader,
            _ => Glyph::Unknown,
        }
    }

    /// Transport glyphs are solid; everything else is drawn with strokes.
    fn is_solid(self) -> bool {
        matches!(self, Glyph::Play | Glyph::Pause | Glyph::Prev | Glyph::Next)
    }
}

#[component]
pub fn Icon(name: String, class: String) -> Element {
    let glyph = Glyph::from_name(&name);
    let class = if glyph == Glyph::Loader {
        format!("{class} animate-spin")
    } else {
        class
    };
    let (fill, stroke) = if glyph.is_solid() {
        ("currentColor", "none")
    } else {
        ("none", "currentColor")
    };

    rsx! {
        svg {
            class: "{class}",
            view_box: "0 0 24 24",
            fill,
            stroke,
            stroke_width: "2",
            stroke_linecap: "round",
            stroke_linejoin: "round",
            {
                match glyph {
                    Glyph::Play => rsx! {
                        polygon { points: "5 3 19 12 5 21 5 3" }
                    },
                    Glyph::Pause => rsx! {
                        rect { x: "6", y: "4", width: "4", height: "16" }
                        rect { x: "14", y: "4", width: "4", height: "16" }
                    },
                    Glyph::Prev => rsx! {
                        polygon { points: "19 20 9 12 19 4 19 20" }
                        line { x1: "5", y1: "19", x2: "5", y2: "5", stroke: "currentColor" }
                    },
                    Glyph::Next => rsx! {
                        polygon { points: "5 4 15 12 5 20 5 4" }
                        line { x1: "19", y1: "5", x2: "19", y2: "19", stroke: "currentColor" }
                    },
                    Glyph::Volume => rsx! {
                        polygon { points: "11 5 6 9 2 9 2 15 6 15 11 19 11 5" }
                        path { d: "M15.54 8.46a5 5 0 0 1 0 7.07" }
                        path { d: "M19.07 4.93a10 10 0 0 1 0 14.14" }
                    },
                    Glyph::VolumeMute => rsx! {
                        polygon { points: "11 5 6 9 2 9 2 15 6 15 11 19 11 5" }
                        line { x1: "23", y1: "9", x2: "17", y2: "15" }
                        line { x1: "17", y1: "9", x2: "23", y2: "15" }
                    },
                    Glyph::Music => rsx! {
                        path { d: "M9 18V5l12-2v13" }
                        circle { cx: "6", cy: "18", r: "3" }
                        circle { cx: "18", cy: "16", r: "3" }
                    },
                    Glyph::Search => rsx! {
                        circle { cx: "11", cy: "11", r: "8" }
                        path { d: "M21 21l-4.35-4.35" }
                    },
                    Glyph::Settings => rsx! {
                        circle { cx: "12", cy: "12", r: "3" }
                        path { d: "M12 1v3M12 20v3M4.22 4.22l2.12 2.12M17.66 17.66l2.12 2.12M1 12h3M20 12h3M4.22 19.78l2.12-2.12M17.66 6.34l2.12-2.12" }
                    },
                    Glyph::Shield => rsx! {
                        path { d: "M12 22s8-4 8-10V5l-8-3-8 3v7c0 6 8 10 8 10z" }
                    },
                    Glyph::Logout => rsx! {
                        path { d: "M9 21H5a2 2 0 0 1-2-2V5a2 2 0 0 1 2-2h4" }
                        polyline { points: "16 17 21 12 16 7" }
                        line { x1: "21", y1: "12", x2: "9", y2: "12" }
                    },
                    Glyph::Upload => rsx! {
                        path { d: "M21 15v4a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2v-4" }
                        polyline { points: "17 8 12 3 7 8" }
                        line { x1: "12", y1: "3", x2: "12", y2: "15" }
                    },
                    Glyph::Edit => rsx! {
                        path { d: "M12 20h9" }
                        path { d: "M16.5 3.5a2.12 2.12 0 0 1 3 3L7 19l-4 1 1-4z" }
                    },
                    Glyph::Trash => rsx! {
                        polyline { points: "3 6 5 6 21 6" }
                        path { d: "M19 6v14a2 2 0 0 1-2 2H7a2 2 0 0 1-2-2V6m3 0V4a2 2 0 0 1 2-2h4a2 2 0 0 1 2 2v2" }
                    },
                    Glyph::Close => rsx! {
                        line { x1: "18", y1: "6", x2: "6", y2: "18" }
                        line { x1: "6", y1: "6", x2: "18", y2: "18" }
                    },
                    Glyph::Loader => rsx! {
                        circle { cx: "12", cy: "12", r: "10", opacity: "0.25" }
                        path { d: "M12 2a10 10 0 0 1 10 10", opacity: "0.75" }
                    },
                    Glyph::Unknown => rsx! {
                        circle { cx: "12", cy: "12", r: "10" }
                    },
                }
            }
        }
    }
}
