// /////////////////////////////////////////////////////////////////////////////
// Cocotuned
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Gates requests on the device's current mode (display on/off, doze).
//! A request whose `mode_gate` doesn't intersect the current mode is parked
//! in `pending`, a plain FIFO, rather than inserted into the table; it is
//! resumed in arrival order the first time the mode changes into something
//! the gate accepts.

use cocotuned_domain::{Mode, ModeMask, RequestHandle};
use std::collections::VecDeque;

struct PendingRequest {
    handle: RequestHandle,
    mode_gate: ModeMask,
}

pub struct ModeController {
    current: ModeMask,
    pending: VecDeque<PendingRequest>,
}

impl ModeController {
    pub fn new(initial: Mode) -> Self {
        ModeController { current: ModeMask::single(initial), pending: VecDeque::new() }
    }

    pub fn current(&self) -> ModeMask {
        self.current
    }

    /// `true` if `mode_gate` accepts the current mode right now; otherwise
    /// parks `handle` in the pending queue and returns `false`.
    pub fn gate(&mut self, handle: RequestHandle, mode_gate: ModeMask) -> bool {
        if self.current.intersects(mode_gate) {
            true
        } else {
            self.pending.push_back(PendingRequest { handle, mode_gate });
            false
        }
    }

    /// Applies a mode transition and returns the handles of pending requests
    /// that now pass their gate, in the FIFO order they were parked.
    pub fn notify(&mut self, new_mode: Mode) -> Vec<RequestHandle> {
        self.current = ModeMask::single(new_mode);
        let mut resumed = Vec::new();
        let mut still_pending = VecDeque::with_capacity(self.pending.len());
        for entry in self.pending.drain(..) {
            if self.current.intersects(entry.mode_gate) {
                resumed.push(entry.handle);
            } else {
                still_pending.push_back(entry);
            }
        }
        self.pending = still_pending;
        resumed
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Parks `handle` directly, without the intersection check `gate`
    /// performs. Used when the mode transition itself is what just made
    /// `mode_gate` stop matching an already-live request -- the caller has
    /// already unlinked its arbitration nodes and only needs the pending
    /// bookkeeping updated.
    pub fn park(&mut self, handle: RequestHandle, mode_gate: ModeMask) {
        self.pending.push_back(PendingRequest { handle, mode_gate });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_passes_when_mode_matches() {
        let mut controller = ModeController::new(Mode::DisplayOn);
        assert!(controller.gate(RequestHandle::new(1), ModeMask::single(Mode::DisplayOn)));
        assert_eq!(controller.pending_count(), 0);
    }

    #[test]
    fn gate_parks_when_mode_does_not_match() {
        let mut controller = ModeController::new(Mode::DisplayOn);
        assert!(!controller.gate(RequestHandle::new(1), ModeMask::single(Mode::Doze)));
        assert_eq!(controller.pending_count(), 1);
    }

    #[test]
    fn notify_resumes_matching_pending_in_fifo_order() {
        let mut controller = ModeController::new(Mode::DisplayOn);
        controller.gate(RequestHandle::new(1), ModeMask::single(Mode::Doze));
        controller.gate(RequestHandle::new(2), ModeMask::single(Mode::Doze));
        controller.gate(RequestHandle::new(3), ModeMask::single(Mode::DisplayOff));

        let resumed = controller.notify(Mode::Doze);
        assert_eq!(resumed, vec![RequestHandle::new(1), RequestHandle::new(2)]);
        assert_eq!(controller.pending_count(), 1);
    }
}
