// SPDX-License-Identifier: CC-BY-NC-ND-4.0

//! Ctrl-C handling
//!
//! An interrupt ends the process immediately with a short message instead
//! of a panic or a half-printed prompt. The exit status depends on which
//! step was running: cancelling the optional backup is a normal exit.

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicI32, Ordering};

/// Conventional status for a process ended by SIGINT
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static EXIT_CODE: AtomicI32 = AtomicI32::new(INTERRUPTED_EXIT_CODE);

extern "C" fn interrupt_handler(_signal: nix::libc::c_int) {
    const MESSAGE: &[u8] = b"\nShutdown\n";
    // Only async-signal-safe calls in here
    unsafe {
        nix::libc::write(
            nix::libc::STDOUT_FILENO,
            MESSAGE.as_ptr().cast(),
            MESSAGE.len(),
        );
        nix::libc::_exit(EXIT_CODE.load(Ordering::SeqCst));
    }
}

/// Install the handler for SIGINT and SIGTERM
pub fn install_handlers() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(interrupt_handler),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    for sig in [Signal::SIGINT, Signal::SIGTERM] {
        unsafe {
            signal::sigaction(sig, &action)?;
        }
    }

    Ok(())
}

pub fn exit_code() -> i32 {
    EXIT_CODE.load(Ordering::SeqCst)
}

/// Sets the interrupt exit status until dropped
#[derive(Debug)]
#[must_use = "the previous exit code is restored when the scope is dropped"]
pub struct ExitCodeScope {
    previous: i32,
}

impl ExitCodeScope {
    pub fn enter(code: i32) -> Self {
        Self {
            previous: EXIT_CODE.swap(code, Ordering::SeqCst),
        }
    }
}

impl Drop for ExitCodeScope {
    fn drop(&mut self) {
        EXIT_CODE.store(self.previous, Ordering::SeqCst);
    }
}
