use dioxus::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    /// Error flags follow the `error...` naming of the banner keys.
    pub fn for_key(key: &str) -> Self {
        if key.starts_with("error") {
            AlertKind::Error
        } else {
            AlertKind::Success
        }
    }

    fn style(self) -> &'static str {
        match self {
            AlertKind::Success => "background: #e8f5e9; border: 1px solid #81c784; color: #1b5e20;",
            AlertKind::Error => "background: #fdecea; border: 1px solid #e57373; color: #b71c1c;",
        }
    }
}

#[component]
pub fn Alerts(alerts: Vec<(String, String)>) -> Element {
    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 8px;",
            {alerts.iter().map(|(key, message)| {
                let style = AlertKind::for_key(key).style();
                rsx!(
                    div {
                        key: "{key}",
                        style: "padding: 10px 14px; border-radius: 6px; {style}",
                        "{message}"
                    }
                )
            })}
        }
    }
}
