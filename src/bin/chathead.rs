use std::path::PathBuf;
use std::time::Duration;

use chathead::actor::broadcast::BroadcastReceiver;
use chathead::actor::reactor::{self, Event, Reactor, Record};
use chathead::common::config::{Config, config_file};
use chathead::common::log;
use chathead::model::bubble::{BubbleId, BubbleOptions, ChildId};
use chathead::model::touch::{TouchAction, TouchEvent};
use chathead::sys::geometry::{Point, Size};
use chathead::sys::haptics::NoopHaptics;
use chathead::sys::screen::ScreenMetrics;
use chathead::sys::timer::{Clock, SystemClock};
use chathead::sys::window::{OverlayHost, WindowId};
use clap::Parser;
use tokio::join;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const SCREEN: ScreenMetrics = ScreenMetrics {
    width: 1080,
    height: 1920,
    density: 2.0,
    status_bar_height: 48,
};

/// Bubble edge length in dp.
const BUBBLE_DP: f32 = 72.0;

#[derive(Parser)]
struct Cli {
    /// Read the configuration from this file instead of ~/.chathead.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Check the configuration and exit.
    #[arg(long)]
    validate: bool,

    /// Record reactor events to the specified file path. Overwrites the file if
    /// exists.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Replay a recording made with --record instead of running the demo.
    #[arg(long, conflicts_with = "record")]
    replay: Option<PathBuf>,
}

/// Stands in for the platform window manager by logging every call.
struct LogHost;

impl OverlayHost for LogHost {
    fn add_window(&mut self, window: WindowId, position: Point) {
        info!(?window, ?position, "add window");
    }

    fn update_window(&mut self, window: WindowId, position: Point) {
        debug!(?window, ?position, "update window");
    }

    fn remove_window(&mut self, window: WindowId) {
        info!(?window, "remove window");
    }

    fn set_scale(&mut self, window: WindowId, scale: f32) {
        info!(?window, scale, "set scale");
    }

    fn set_visible(&mut self, window: WindowId, visible: bool) {
        info!(?window, visible, "set visible");
    }

    fn perform_click(&mut self, bubble: BubbleId, child: ChildId) -> bool {
        info!(?bubble, ?child, "click");
        true
    }

    fn cancel_long_press(&mut self, window: WindowId) {
        debug!(?window, "cancel long press");
    }
}

fn load_config(opt: &Cli) -> anyhow::Result<Config> {
    let path = opt.config.clone().unwrap_or_else(config_file);
    let mut config = if path.exists() {
        Config::read(&path)?
    } else {
        Config::default()
    };
    for issue in config.validate() {
        warn!("{issue}");
    }
    let fixed = config.auto_fix_values();
    if fixed > 0 {
        warn!(fixed, "Corrected invalid config values");
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let opt: Cli = Parser::parse();
    log::init_logging();

    if let Some(path) = &opt.replay {
        let reactor = reactor::replay(path, Box::new(LogHost), Box::new(NoopHaptics), None)?;
        for &id in reactor.bubble_ids() {
            if let Some(bubble) = reactor.bubble(id) {
                info!(?id, position = ?bubble.position(), state = ?bubble.state(), "Bubble after replay");
            }
        }
        return Ok(());
    }

    let config = load_config(&opt)?;
    if opt.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    let clock = SystemClock::new();
    let (broadcast_tx, broadcast_rx) = chathead::actor::channel();
    let mut reactor = Reactor::new(
        config.clone(),
        SCREEN,
        Box::new(LogHost),
        Box::new(NoopHaptics),
        Box::new(clock),
        Record::new(opt.record.as_deref())?,
        Some(broadcast_tx),
    );
    let (events_tx, events_rx) = chathead::actor::channel();

    let side = SCREEN.dp_to_px(BUBBLE_DP) as i32;
    let options = BubbleOptions::from_settings(&config.bubble).with_child(ChildId(0), true);
    let id = reactor.add_bubble(options);
    reactor.handle_event(Event::BubbleMeasured(id, Size::new(side, side)));

    // Where a finger must be for the bubble to sit on the shown trash icon.
    let trash_y = (SCREEN.height - config.trash.bottom_margin - config.trash.icon_height / 2) as f32;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    runtime.block_on(async move {
        join!(
            reactor.run(events_rx),
            play_gestures(events_tx, clock, id, side as f32 / 2.0, trash_y),
            log_broadcasts(broadcast_rx),
        );
    });
    Ok(())
}

/// Flings the bubble across the screen, then drags it onto the trash.
async fn play_gestures(
    tx: reactor::Sender,
    clock: SystemClock,
    id: BubbleId,
    local: f32,
    trash_y: f32,
) {
    let frame = Duration::from_millis(16);
    let touch = |action, x: f32, y: f32, down| {
        let event = TouchEvent::new(action, x, y, down, clock.now()).with_local(local, local);
        tx.send(Event::Touch(id, event));
    };

    let down = clock.now();
    touch(TouchAction::Down, 80.0, 1700.0, down);
    for i in 1..=20 {
        sleep(frame).await;
        let t = i as f32 / 20.0;
        touch(TouchAction::Move, 80.0 + 700.0 * t, 1700.0 - 900.0 * t, down);
    }
    touch(TouchAction::Up, 780.0, 800.0, down);
    sleep(Duration::from_millis(1000)).await;

    let down = clock.now();
    touch(TouchAction::Down, 900.0, 800.0, down);
    for i in 1..=30 {
        sleep(frame).await;
        let t = i as f32 / 30.0;
        let x = 900.0 + (SCREEN.width as f32 / 2.0 - 900.0) * t;
        touch(TouchAction::Move, x, 800.0 + (trash_y - 800.0) * t, down);
    }
    sleep(Duration::from_millis(600)).await;
    touch(TouchAction::Up, SCREEN.width as f32 / 2.0, trash_y, down);
    sleep(Duration::from_millis(1000)).await;
    info!("Gestures done");
}

async fn log_broadcasts(mut rx: BroadcastReceiver) {
    while let Some((_span, event)) = rx.recv().await {
        info!(?event, "Broadcast");
    }
}
