use chrono::Local;
use std::{
    backtrace::Backtrace,
    cell::RefCell,
    panic::{PanicHookInfo, take_hook},
    thread,
};

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Installs a global panic hook that logs panics via `tracing` and keeps the
/// backtrace on the panicking thread so the recovery layer can attach it to
/// the error event.
pub fn install() {
    let previous_hook = take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let backtrace = Backtrace::force_capture().to_string();
            let panic_record = format_panic_record(panic_info, &backtrace);

            tracing::error!(target: "error_relay::panic", "{panic_record}");

            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
        }));

        previous_hook(panic_info);
    }));
}

/// Take the backtrace recorded by the hook for the last panic on this thread.
pub fn take_recorded_backtrace() -> Option<String> {
    LAST_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

fn format_panic_record(panic_info: &PanicHookInfo<'_>, backtrace: &str) -> String {
    let payload = panic_payload_to_string(panic_info.payload())
        .unwrap_or_else(|| panic_info.to_string());
    let location = panic_info
        .location()
        .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let thread_name = thread::current()
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| "<unnamed>".to_string());

    let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");

    format!(
        "{ts} PANIC thread={thread_name} location={location} payload={payload}\nBacktrace:\n{backtrace}"
    )
}

/// Extract the message of a panic payload (`&str` or `String` payloads).
pub fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> Option<String> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return Some((*s).to_string());
    }
    payload.downcast_ref::<String>().cloned()
}
