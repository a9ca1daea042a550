//! Holler Hen entry point
//!
//! Wires the capture sampler, the stub wallet, and the terminal screen around
//! the fixed-tick simulation, then drives everything at 60 Hz. The loop never
//! blocks on anything but the frame-pacing sleep.

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use holler_hen::audio::IntensitySampler;
use holler_hen::config::GameConfig;
use holler_hen::consts::TICK_HZ;
use holler_hen::reward::{RewardSink, StubWallet, lamports_to_sol};
use holler_hen::sim::{GameEvent, GameState, TickInput, tick};
use holler_hen::tui::{Command, Screen};

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args().nth(1);
    let cfg = GameConfig::load(config_path.as_deref()).context("loading config")?;
    let seed = cfg.seed.unwrap_or_else(wall_clock_seed);
    log::info!("Holler Hen starting (seed {})", seed);

    // Capture must come up before the terminal takes over: a missing
    // microphone is fatal and should print as a plain error.
    let mut sampler = IntensitySampler::start(&cfg).context("opening microphone")?;
    let mut wallet = StubWallet::connect(cfg.wallet_address.as_deref(), cfg.reward_threshold)
        .context("connecting wallet")?;

    let mut state = GameState::new(seed, &cfg);
    let mut screen = Screen::open(&cfg).context("opening terminal")?;

    let result = run(&mut state, &cfg, &mut sampler, &mut wallet, &mut screen);

    // Teardown order: terminal first so any capture-shutdown warnings print
    // onto a sane screen.
    screen.close().ok();
    sampler.stop();
    log::info!(
        "Session over: score {}, balance {:.3} SOL",
        state.score,
        lamports_to_sol(wallet.balance_lamports())
    );
    result
}

fn run(
    state: &mut GameState,
    cfg: &GameConfig,
    sampler: &mut IntensitySampler,
    wallet: &mut StubWallet,
    screen: &mut Screen,
) -> Result<()> {
    let frame = Duration::from_nanos(1_000_000_000 / TICK_HZ as u64);

    loop {
        let frame_start = Instant::now();

        let mut input = TickInput {
            intensity: sampler.sample(),
            ..Default::default()
        };
        for command in screen.poll_commands().context("reading input")? {
            match command {
                Command::Quit => return Ok(()),
                Command::Start => input.start = true,
                Command::Restart => input.restart = true,
            }
        }

        for event in tick(state, &input, cfg) {
            handle_event(event, state, wallet);
        }

        screen
            .present(&state.snapshot(input.intensity))
            .context("rendering frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
}

/// Act on sim events; reward settlement is fire-and-forget
fn handle_event(event: GameEvent, state: &mut GameState, wallet: &mut StubWallet) {
    match event {
        GameEvent::Jumped { multiplier } => {
            log::debug!("Jump x{:.2}", multiplier);
        }
        GameEvent::Scored { retired } => {
            log::debug!("Cleared {} obstacle(s), score {}", retired, state.score);
        }
        GameEvent::RewardReady { score } => match wallet.on_score_threshold(score) {
            Ok(receipt) => {
                log::info!("Reward redeemed: {}", receipt);
                state.settle_reward(true);
            }
            Err(err) => {
                log::warn!("Reward failed: {}", err);
                state.settle_reward(false);
            }
        },
        GameEvent::Crashed => {
            log::info!(
                "Round over at score {} (balance {:.3} SOL)",
                state.score,
                lamports_to_sol(wallet.balance_lamports())
            );
        }
    }
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
