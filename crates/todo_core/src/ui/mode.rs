//! List/grid presentation mode.

use crate::signal::{Signal, SubscriptionId};

/// Layout family used for every visible cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PresentationMode {
    #[default]
    List,
    Grid,
}

impl PresentationMode {
    /// Maps the boolean flag form (`true` = list).
    pub fn from_is_list(is_list: bool) -> Self {
        if is_list {
            Self::List
        } else {
            Self::Grid
        }
    }

    pub fn is_list(self) -> bool {
        self == Self::List
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::List => Self::Grid,
            Self::Grid => Self::List,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Grid => "grid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" => Some(Self::List),
            "grid" => Some(Self::Grid),
            _ => None,
        }
    }
}

/// Cell template family chosen per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    List,
    Grid,
}

impl From<PresentationMode> for ViewType {
    fn from(mode: PresentationMode) -> Self {
        match mode {
            PresentationMode::List => Self::List,
            PresentationMode::Grid => Self::Grid,
        }
    }
}

/// Owning context for the presentation mode.
///
/// Shared with renderers through `Rc` so each renderer instance can be given
/// its own selector.
pub struct ModeSelector {
    mode: Signal<PresentationMode>,
}

impl ModeSelector {
    pub fn new(initial: PresentationMode) -> Self {
        Self {
            mode: Signal::new(initial),
        }
    }

    /// Mode read by renderers on every pass.
    pub fn current(&self) -> PresentationMode {
        self.mode.get()
    }

    pub fn is_list(&self) -> bool {
        self.current().is_list()
    }

    /// Sets the mode and broadcasts it, even when unchanged.
    pub fn set(&self, mode: PresentationMode) {
        self.mode.set(mode);
    }

    /// Flag form of [`ModeSelector::set`].
    pub fn set_list(&self, is_list: bool) {
        self.set(PresentationMode::from_is_list(is_list));
    }

    /// Flips the mode and returns the new value.
    pub fn toggle(&self) -> PresentationMode {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    /// Observes every later mode change.
    pub fn subscribe(&self, observer: impl FnMut(&PresentationMode) + 'static) -> SubscriptionId {
        self.mode.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.mode.unsubscribe(id);
    }
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::new(PresentationMode::default())
    }
}
