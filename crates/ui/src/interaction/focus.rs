/// Focusable regions of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    /// The composer text box
    #[default]
    Input,
    /// The scrollable transcript pane
    Transcript,
}

impl FocusTarget {
    pub fn toggle(self) -> Self {
        match self {
            FocusTarget::Input => FocusTarget::Transcript,
            FocusTarget::Transcript => FocusTarget::Input,
        }
    }
}

/// Host capability that moves keyboard focus
pub trait Focus {
    fn focus_element(&mut self, target: FocusTarget);
}

/// Focus tracker for the terminal view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaneFocus {
    current: FocusTarget,
}

impl PaneFocus {
    pub fn new(current: FocusTarget) -> Self {
        Self { current }
    }

    pub fn current(&self) -> FocusTarget {
        self.current
    }

    pub fn is_input(&self) -> bool {
        self.current == FocusTarget::Input
    }

    pub fn toggle(&mut self) {
        self.current = self.current.toggle();
    }
}

impl Focus for PaneFocus {
    fn focus_element(&mut self, target: FocusTarget) {
        if self.current != target {
            tracing::trace!(?target, "focus moved");
        }
        self.current = target;
    }
}

/// Focuses the input when sending becomes possible
///
/// Fires on a false to true transition of `can_send`, or when it is already
/// true at the first evaluation. Re-evaluating while it stays true does
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusOnReady {
    last: Option<bool>,
}

impl FocusOnReady {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether focus was requested
    pub fn observe(&mut self, can_send: bool, focus: &mut impl Focus) -> bool {
        let fire = can_send && self.last != Some(true);
        self.last = Some(can_send);

        if fire {
            focus.focus_element(FocusTarget::Input);
        }
        fire
    }
}
