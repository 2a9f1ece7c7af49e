use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use chat_tree::SystemClock;
use treechat::app::{system_prompt_from_env, App};
use treechat::providers;
use treechat::runtime::RuntimeController;
use treechat::tui::AppComponent;
use treechat_tui::config::EnvConfig;
use treechat_tui::logging::init_file_logging;
use treechat_tui::{ProcessTerminal, TUI};

fn main() -> io::Result<()> {
    // Local offset detection must happen before any thread is spawned.
    let clock = Arc::new(SystemClock::detect());
    let env_config = EnvConfig::from_env();
    init_file_logging(env_config.log_path.as_deref())?;

    let provider = providers::provider_from_env().map_err(io::Error::other)?;
    let provider_profile = provider.profile();
    tracing::info!(
        provider = %provider_profile.provider_id,
        model = %provider_profile.model_id,
        "provider ready"
    );

    let app = Arc::new(Mutex::new(App::with_clock(
        clock,
        Some(system_prompt_from_env()),
    )));

    let terminal = ProcessTerminal::new().with_write_log(env_config.write_log);
    let mut tui = TUI::new(terminal);
    let runtime_handle = tui.runtime_handle();

    let host = RuntimeController::new(Arc::clone(&app), runtime_handle, provider);
    let root_component = tui.register_component(AppComponent::new(
        Arc::clone(&app),
        Arc::clone(&host),
        provider_profile,
    ));
    tui.set_root(vec![root_component]);
    tui.set_focus(root_component);

    tui.start()?;

    while !lock_unpoisoned(&app).should_exit {
        tui.run_blocking_once();
    }

    host.cancel_active_request();
    tui.stop()
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
