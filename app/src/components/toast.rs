//! Transient messages (saved, failed request, ...) shown in a corner stack.

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

const MAX_VISIBLE: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ToastSeverity {
    Info,
    Error,
}

impl ToastSeverity {
    fn lifetime_ms(self) -> u32 {
        match self {
            ToastSeverity::Info => 3500,
            ToastSeverity::Error => 7000,
        }
    }

    fn class(self) -> &'static str {
        match self {
            ToastSeverity::Info => "toast toast-info",
            ToastSeverity::Error => "toast toast-error",
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub message: String,
    pub severity: ToastSeverity,
}

/// Context handle; copy it freely.
#[derive(Clone, Copy)]
pub struct ToastManager {
    toasts: Signal<Vec<Toast>>,
    next_id: Signal<u32>,
}

impl ToastManager {
    fn new() -> Self {
        Self {
            toasts: Signal::new(Vec::new()),
            next_id: Signal::new(0),
        }
    }

    pub fn show(&mut self, message: impl Into<String>, severity: ToastSeverity) {
        let id = *self.next_id.peek();
        self.next_id.set(id.wrapping_add(1));

        {
            let mut toasts = self.toasts.write();
            if toasts.len() >= MAX_VISIBLE {
                toasts.remove(0);
            }
            toasts.push(Toast {
                id,
                message: message.into(),
                severity,
            });
        }

        let mut toasts = self.toasts;
        spawn(async move {
            TimeoutFuture::new(severity.lifetime_ms()).await;
            toasts.write().retain(|t| t.id != id);
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(message, ToastSeverity::Info);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, ToastSeverity::Error);
    }

    pub fn dismiss(&mut self, id: u32) {
        self.toasts.write().retain(|t| t.id != id);
    }
}

pub fn use_toast_provider() -> ToastManager {
    use_context_provider(ToastManager::new)
}

pub fn use_toast() -> ToastManager {
    use_context::<ToastManager>()
}

#[component]
pub fn ToastFrame() -> Element {
    let mut manager = use_toast();
    let toasts = manager.toasts.read().clone();

    rsx! {
        div { class: "toast-stack",
            for toast in toasts {
                div { key: "{toast.id}", class: toast.severity.class(),
                    span { class: "toast-message", "{toast.message}" }
                    button {
                        class: "toast-close",
                        onclick: move |_| manager.dismiss(toast.id),
                        "×"
                    }
                }
            }
        }
    }
}
