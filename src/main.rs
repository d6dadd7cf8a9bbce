//! Focusbar - A menubar Pomodoro timer.
//!
//! Alternates focus sessions with short and long breaks, keeps a small task
//! checklist, and tracks today's focus time. Run without arguments for the
//! tray app, or use the subcommands to manage data from a terminal.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use clap::Parser;
use muda::MenuEvent;
use tray_icon::{TrayIcon, TrayIconBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

mod app;
mod audio;
mod cli;
mod clipboard;
mod event;
mod menu;
mod models;
mod notifications;
mod persistence;
mod quotes;
mod shortcuts;
mod tasks;
mod ticker;
mod tray;

use app::{App, CompletionEvent};
use audio::AudioPlayer;
use cli::Args;
use event::EventResult;
use menu::MenuItems;
use models::Theme;
use ticker::{Countdown, TimerMessage};

/// How often the event loop wakes up to drain timer and menu events.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Application handler for the winit event loop.
struct Focusbar {
    app: App,
    tray: Option<TrayIcon>,
    menu_items: Option<MenuItems>,
    timer_rx: Receiver<TimerMessage>,
    countdown: Countdown,
    audio: Option<AudioPlayer>,
    icon_theme: Theme,
}

impl Focusbar {
    fn new(
        app: App,
        tray: TrayIcon,
        menu_items: MenuItems,
        countdown: Countdown,
        timer_rx: Receiver<TimerMessage>,
    ) -> Self {
        // Audio is created on the main thread to avoid Send issues
        let audio = match AudioPlayer::new() {
            Ok(player) => Some(player),
            Err(e) => {
                log::warn!("Audio unavailable: {}", e);
                None
            }
        };
        let icon_theme = app.settings.theme;

        Self {
            app,
            tray: Some(tray),
            menu_items: Some(menu_items),
            timer_rx,
            countdown,
            audio,
            icon_theme,
        }
    }

    fn refresh(&self) {
        if let Some(ref items) = self.menu_items {
            menu::update_menu_items(items, &self.app);
        }
        if let Some(ref tray) = self.tray {
            let title = ticker::format_tray_title(&self.app.session, self.app.zen_mode);
            tray.set_title(Some(title));
        }
    }

    fn rebuild_menu(&mut self) {
        let Some(ref tray) = self.tray else {
            return;
        };

        match menu::build_menu(&self.app) {
            Ok((built_menu, items)) => {
                tray.set_menu(Some(Box::new(built_menu)));
                self.menu_items = Some(items);
            }
            Err(e) => log::warn!("Failed to rebuild menu: {}", e),
        }

        if self.icon_theme != self.app.settings.theme {
            match tray::load_icon(self.app.settings.theme) {
                Ok(icon) => {
                    if let Err(e) = tray.set_icon(Some(icon)) {
                        log::warn!("Failed to update tray icon: {}", e);
                    }
                    self.icon_theme = self.app.settings.theme;
                }
                Err(e) => log::warn!("Failed to load tray icon: {}", e),
            }
        }

        self.refresh();
    }

    fn handle_completion(&self, event: CompletionEvent) {
        log::info!(
            "{} complete, next up: {}",
            event.finished.label(),
            event.next.label()
        );

        if self.app.settings.sound_enabled {
            if let Some(ref audio) = self.audio {
                audio.play_alert(self.app.settings.sound_volume);
            }
        }

        if self.app.settings.notifications_enabled {
            notifications::notify_session_complete(event);
        }
    }

    fn process_timer_messages(&mut self) {
        while let Ok(msg) = self.timer_rx.try_recv() {
            if !self.countdown.accepts(&msg) {
                continue;
            }

            let (changed, completion) = self.app.tick();
            if let Some(event) = completion {
                self.handle_completion(event);
            }
            self.countdown.sync(self.app.session.is_running);

            if changed {
                self.refresh();
            }
        }
    }

    fn process_menu_events(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(menu_event) = MenuEvent::receiver().try_recv() {
            let result = event::handle_menu_event(&mut self.app, menu_event.id().as_ref());
            self.countdown.sync(self.app.session.is_running);

            match result {
                EventResult::Quit => {
                    event_loop.exit();
                    return;
                }
                EventResult::StateChanged => self.refresh(),
                EventResult::MenuRebuild => self.rebuild_menu(),
                EventResult::Continue => {}
            }
        }
    }
}

impl ApplicationHandler for Focusbar {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        // Nothing to do on resume for a tray-only app
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        _event: WindowEvent,
    ) {
        // No window events for a tray-only app
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::wait_duration(POLL_INTERVAL));

        // Process timer messages from the ticker thread
        self.process_timer_messages();

        // Process menu events
        self.process_menu_events(event_loop);
    }
}

/// Asks on the terminal before erasing everything.
fn confirm_reset() -> io::Result<bool> {
    print!("Reset all data? This cannot be undone. [y/N] ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn run_tray(app: App) -> Result<(), Box<dyn std::error::Error>> {
    // Create event loop (required for tray on macOS)
    let event_loop = EventLoop::new()?;

    let (built_menu, menu_items) = menu::build_menu(&app)?;

    let tray = TrayIconBuilder::new()
        .with_menu(Box::new(built_menu))
        .with_icon(tray::load_icon(app.settings.theme)?)
        .with_title(ticker::format_tray_title(&app.session, app.zen_mode))
        .with_tooltip("Focusbar - Pomodoro Timer")
        .build()?;

    // Ticks arrive on this channel while the timer runs
    let (tx, rx) = mpsc::channel();
    let countdown = Countdown::new(tx);

    let mut focusbar = Focusbar::new(app, tray, menu_items, countdown, rx);
    event_loop.run_app(&mut focusbar)?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let mut app = App::open(args.db.as_deref())?;

    match args.command {
        Some(command) => {
            let mut out = io::stdout().lock();
            cli::run_command(&mut app, command, &mut out, confirm_reset)?;
            Ok(())
        }
        None => run_tray(app),
    }
}
