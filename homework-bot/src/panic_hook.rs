//! Panic reporting.
//!
//! Panics are logged through `tracing`, so they reach both the console and
//! the log file. The build unwinds and the poller catches panics inside a
//! cycle, so the non-blocking file writer is still alive when a panic is
//! logged and no separate file write is needed.

use std::{
    any::Any,
    backtrace::{Backtrace, BacktraceStatus},
    panic::{PanicHookInfo, take_hook},
    thread,
};

/// Install a global panic hook that logs the panic, then runs the previous
/// hook.
pub fn install() {
    let previous_hook = take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            log_panic(panic_info);
        }));

        previous_hook(panic_info);
    }));
}

fn log_panic(panic_info: &PanicHookInfo<'_>) {
    let location = panic_info
        .location()
        .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        .unwrap_or_else(|| "<unknown>".to_string());
    let thread_name = thread::current()
        .name()
        .unwrap_or("<unnamed>")
        .to_string();
    let payload = payload_message(panic_info.payload());

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        tracing::error!(
            target: "homework_bot::panic",
            thread = %thread_name,
            location = %location,
            "panic: {payload}\n{backtrace}"
        );
    } else {
        tracing::error!(
            target: "homework_bot::panic",
            thread = %thread_name,
            location = %location,
            "panic: {payload}"
        );
    }
}

/// Text of a panic payload. `panic!` produces either a `&str` or a `String`.
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}
