use super::handshake::Group;

/// Handler for a single-bit signal edge: `(group, level, user)`.
pub type LineCallback<U> = fn(Group, bool, &mut U);

/// Handler for the output-buffer-full signal, which also carries a data byte:
/// `(group, level, data, user)`.
pub type DataCallback<U> = fn(Group, bool, u8, &mut U);

/// Signal handlers wired to other simulated devices.
///
/// Every handler is optional and independently set. The device owns the
/// user context `U` and passes it to each handler unmodified. Handlers run
/// synchronously on the caller's thread and must not call back into the
/// device that invoked them.
pub struct Callbacks<U> {
    /// STB line level changed (`false` = asserted).
    pub strobe_changed: Option<LineCallback<U>>,
    /// ACK line level changed (`false` = asserted).
    pub ack_changed: Option<LineCallback<U>>,
    /// Input buffer full flip-flop changed.
    pub ibf_changed: Option<LineCallback<U>>,
    /// Output buffer full flip-flop changed. `data` is the output byte when
    /// the buffer becomes not-full, and 0xFF when it becomes full.
    pub obf_changed: Option<DataCallback<U>>,
    /// Interrupt request flip-flop changed.
    pub intr_changed: Option<LineCallback<U>>,
}

impl<U> Callbacks<U> {
    /// A set with every handler absent.
    pub const fn none() -> Self {
        Self {
            strobe_changed: None,
            ack_changed: None,
            ibf_changed: None,
            obf_changed: None,
            intr_changed: None,
        }
    }

    pub(crate) fn strobe(&self, group: Group, level: bool, user: &mut U) {
        if let Some(f) = self.strobe_changed {
            f(group, level, user);
        }
    }

    pub(crate) fn ack(&self, group: Group, level: bool, user: &mut U) {
        if let Some(f) = self.ack_changed {
            f(group, level, user);
        }
    }

    pub(crate) fn ibf(&self, group: Group, level: bool, user: &mut U) {
        if let Some(f) = self.ibf_changed {
            f(group, level, user);
        }
    }

    pub(crate) fn obf(&self, group: Group, level: bool, data: u8, user: &mut U) {
        if let Some(f) = self.obf_changed {
            f(group, level, data, user);
        }
    }

    pub(crate) fn intr(&self, group: Group, level: bool, user: &mut U) {
        if let Some(f) = self.intr_changed {
            f(group, level, user);
        }
    }
}

// Manual impls: fn pointers are Copy regardless of U.
impl<U> Clone for Callbacks<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for Callbacks<U> {}

impl<U> Default for Callbacks<U> {
    fn default() -> Self {
        Self::none()
    }
}

impl<U> std::fmt::Debug for Callbacks<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("strobe_changed", &self.strobe_changed.is_some())
            .field("ack_changed", &self.ack_changed.is_some())
            .field("ibf_changed", &self.ibf_changed.is_some())
            .field("obf_changed", &self.obf_changed.is_some())
            .field("intr_changed", &self.intr_changed.is_some())
            .finish()
    }
}
