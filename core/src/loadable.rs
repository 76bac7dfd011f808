//! Per-query loading state

use std::fmt::Display;

/// State of one asynchronous query as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

impl<T> Loadable<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => Loadable::Failed(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Loadable<&T> {
        match self {
            Loadable::Loading => Loadable::Loading,
            Loadable::Ready(value) => Loadable::Ready(value),
            Loadable::Failed(msg) => Loadable::Failed(msg.clone()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Loadable::Loading => Loadable::Loading,
            Loadable::Ready(value) => Loadable::Ready(f(value)),
            Loadable::Failed(msg) => Loadable::Failed(msg),
        }
    }
}

/// Badge text for a count query. Nothing while loading or at zero; a failed
/// query shows `?` rather than passing for zero.
pub fn count_badge(state: &Loadable<u64>) -> Option<String> {
    match state {
        Loadable::Loading | Loadable::Ready(0) => None,
        Loadable::Ready(count) => Some(count.to_string()),
        Loadable::Failed(_) => Some("?".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_badge_flags_failures() {
        assert_eq!(count_badge(&Loadable::Loading), None);
        assert_eq!(count_badge(&Loadable::Ready(0)), None);
        assert_eq!(count_badge(&Loadable::Ready(4)), Some("4".to_string()));
        assert_eq!(
            count_badge(&Loadable::Failed("timeout".into())),
            Some("?".to_string())
        );
    }

    #[test]
    fn test_from_result() {
        let ok: Loadable<u32> = Loadable::from_result(Ok::<_, String>(3));
        assert_eq!(ok.ready(), Some(&3));

        let failed: Loadable<u32> = Loadable::from_result(Err("timeout"));
        assert_eq!(failed.error(), Some("timeout"));
        assert!(failed.is_settled());
    }

    #[test]
    fn test_map_keeps_state() {
        assert!(Loadable::<u32>::Loading.map(|n| n * 2).is_loading());
        assert_eq!(Loadable::Ready(2).map(|n| n * 2), Loadable::Ready(4));
    }
}
