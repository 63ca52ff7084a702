//! Headless demo driver
//!
//! Runs each of the four modes with a simple autoplay policy at a
//! synthetic 60 Hz frame clock and prints the resulting summaries as
//! JSON. Useful for eyeballing balance changes without a renderer:
//!
//! ```text
//! RUST_LOG=info minicade [seed]
//! ```

use glam::Vec2;

use minicade::config::{
    BattleProfile, BreakerProfile, RhythmProfile, RunnerProfile, SessionConfig,
};
use minicade::consts::MS_PER_TICK;
use minicade::sim::avatar::Avatar;
use minicade::sim::kinematics::NOTE_HIT_X;
use minicade::sim::{EntityKind, InputCategory, InputEvent, Phase, Session, SessionSummary};

/// Per-frame autoplay policy for one mode
type Policy = fn(&mut Session, f64);

fn rhythm_policy(session: &mut Session, now: f64) {
    // Press a note's category the frame it reaches the hit zone
    let due: Vec<InputCategory> = session
        .renderable_entities()
        .iter()
        .filter(|e| e.pos.x <= NOTE_HIT_X + 2.0)
        .filter_map(|e| match e.kind {
            EntityKind::NoteDon => Some(InputCategory::Don),
            EntityKind::NoteKa => Some(InputCategory::Ka),
            _ => None,
        })
        .collect();
    for category in due {
        session.on_input(InputEvent {
            category,
            timestamp_ms: now,
        });
    }
}

fn battle_policy(session: &mut Session, now: f64) {
    // Orbit the box center; crude but keeps the soul moving
    let t = (now / 1000.0) as f32;
    session.set_control_axis(Vec2::new(t.cos(), t.sin()));
}

fn runner_policy(session: &mut Session, now: f64) {
    let approaching = session
        .renderable_entities()
        .iter()
        .any(|e| e.kind.is_obstacle() && (180.0..260.0).contains(&e.pos.x));
    if approaching {
        session.on_input(InputEvent {
            category: InputCategory::Jump,
            timestamp_ms: now,
        });
    }
}

fn breaker_policy(session: &mut Session, _now: f64) {
    if let Avatar::Paddle { ball_pos, .. } = session.avatar() {
        let width = session.config().playfield.width();
        // Track the ball slightly off-center so bounces stay angled
        let target = (ball_pos.x + 15.0).clamp(0.0, width);
        session.set_control_axis(Vec2::new(target / width * 2.0 - 1.0, 0.0));
    }
}

fn run_demo(
    name: &str,
    config: SessionConfig,
    seed: u64,
    limit_ms: f64,
    policy: Policy,
) -> SessionSummary {
    let mut session = Session::new(config, seed).expect("preset config must validate");
    session.start();

    let mut now = 0.0;
    while session.phase() == Phase::Running && now < limit_ms {
        session.advance(now);
        policy(&mut session, now);
        for event in session.drain_events() {
            log::debug!("[{name}] {event:?}");
        }
        now += MS_PER_TICK;
    }

    let summary = session.summary();
    log::info!(
        "[{name}] finished after {:.1}s: {:?}, score={}",
        now / 1000.0,
        summary.phase,
        summary.score
    );
    summary
}

fn main() {
    env_logger::init();
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xC0FFEE);

    let results = [
        (
            "rhythm",
            run_demo(
                "rhythm",
                SessionConfig::rhythm(RhythmProfile::normal()),
                seed,
                120_000.0,
                rhythm_policy,
            ),
        ),
        (
            "battle",
            run_demo(
                "battle",
                SessionConfig::battle(BattleProfile::normal()),
                seed,
                20_000.0,
                battle_policy,
            ),
        ),
        (
            "runner",
            run_demo(
                "runner",
                SessionConfig::runner(RunnerProfile::default()),
                seed,
                30_000.0,
                runner_policy,
            ),
        ),
        (
            "breaker",
            run_demo(
                "breaker",
                SessionConfig::breaker(BreakerProfile::default()),
                seed,
                90_000.0,
                breaker_policy,
            ),
        ),
    ];

    let report: serde_json::Map<String, serde_json::Value> = results
        .into_iter()
        .map(|(name, summary)| {
            (
                name.to_string(),
                serde_json::to_value(summary).expect("summary serializes"),
            )
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(report)).expect("report serializes")
    );
}
