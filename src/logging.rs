use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Route tracing to the browser console. Safe to call more than once.
        pub fn init() {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use once_cell::sync::OnceCell;
        use std::env;
        use std::io;
        use std::path::Path;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        /// Set to a file path to also write a daily-rolled log there.
        pub const LOG_FILE_ENV: &str = "DUSKSHOT_LOG_FILE";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Install the stderr subscriber, plus the file layer when
        /// [`LOG_FILE_ENV`] is set. Safe to call more than once.
        pub fn init() {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let file_layer = env::var(LOG_FILE_ENV).ok().map(|log_path| {
                let path = Path::new(&log_path);
                let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
                let name = path.file_name().unwrap_or(std::ffi::OsStr::new("duskshot.log"));
                let (nb_writer, guard) =
                    tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
                let _ = FILE_GUARD.set(guard);

                fmt::layer()
                    .with_writer(nb_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .compact()
            });

            let installed = tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_ok();
            if !installed {
                return;
            }

            std::panic::set_hook(Box::new(|info| {
                let mut msg = String::new();
                if let Some(loc) = info.location() {
                    msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
                }
                if let Some(s) = info.payload().downcast_ref::<&str>() { msg.push_str(s); }
                else if let Some(s) = info.payload().downcast_ref::<String>() { msg.push_str(s); }
                else { msg.push_str("<non-string panic>"); }
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
            }));
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
        tracing::info!("logging_ready");
    }
}
