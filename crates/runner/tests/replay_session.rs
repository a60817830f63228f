//! End-to-end replay sessions: recorded or synthetic feed, paper gateway,
//! window strategy and the event loop wired together by `Session`.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempo_core::{AccountId, InstrumentId, Recipient, Timestamp, UserCommand};
use tempo_gateway::{BookChange, PlatformEvent, ProcessSignal, TradeTick, UserMessage};
use tempo_ports::{BookLevel, TopOfBook};
use tempo_runner::{RecordedFeed, RunnerConfig, Session};

fn at(hour: u32, minute: u32, second: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, second).unwrap()
}

fn instrument() -> InstrumentId {
    InstrumentId::new("IF2403")
}

fn config(fill_ratio: f64) -> RunnerConfig {
    let json = serde_json::json!({
        "account": 1001,
        "session_date": "2024-03-01",
        "mode": "replay",
        "paper": { "fill_ratio": fill_ratio },
        "strategy": {
            "market": "CFFEX",
            "instruments": ["IF2403"],
            "start_hour": 9, "start_minute": 0, "start_second": 0,
            "end_hour": 12, "end_minute": 0, "end_second": 0,
            "entry_hour": 10,
            "exit_hour": 11,
            "shares": 100
        }
    });
    RunnerConfig::from_json(&json.to_string()).unwrap()
}

fn tick(time: Timestamp, price: Decimal, opening: bool) -> PlatformEvent {
    PlatformEvent::Tick {
        instrument: instrument(),
        tick: TradeTick::new(price, 1, time, time),
        opening,
    }
}

fn book(time: Timestamp, bid: (Decimal, i64), ask: (Decimal, i64)) -> PlatformEvent {
    PlatformEvent::Book(BookChange {
        instrument: instrument(),
        bid_level_changed: Some(0),
        ask_level_changed: Some(0),
        top: TopOfBook::new(Some(BookLevel::new(bid.0, bid.1)), Some(BookLevel::new(ask.0, ask.1))),
        timestamp: time,
    })
}

fn command(recipient: Recipient, command: UserCommand) -> PlatformEvent {
    PlatformEvent::UserMessage(UserMessage::new(recipient, command))
}

fn recording(events: &[PlatformEvent]) -> String {
    events
        .iter()
        .map(|e| e.to_json_line().unwrap())
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_full_day_replay() {
    let _ = env_logger::try_init();

    let tape = recording(&[
        tick(at(8, 59, 0), dec!(100), true),
        book(at(8, 59, 0), (dec!(99.9), 5), (dec!(100.1), 7)),
        tick(at(9, 30, 0), dec!(100), false),
        // Book reaction: short 5 at the bid, buy 7 at the ask
        book(at(9, 30, 0), (dec!(99.9), 5), (dec!(100.1), 7)),
        // Entry: buy 100 at market
        tick(at(10, 0, 0), dec!(100), false),
        // Hourly IOC fires first at 11:00, then the exit sells everything
        tick(at(11, 0, 0), dec!(100), false),
        book(at(11, 30, 0), (dec!(99.8), 3), (dec!(100.0), 4)),
    ]);
    let mut feed = RecordedFeed::new(tape.as_bytes());

    let report = Session::new(config(1.0))
        .unwrap()
        .without_signal_handlers()
        .run_with_feed(&mut feed)
        .await
        .unwrap();

    // reaction x2, entry, hourly 11:00, exit, hourly 12:00 (flushed after the tape)
    assert_eq!(report.orders.orders_sent, 6);
    assert_eq!(report.orders.fills, 6);
    assert_eq!(report.orders.filled_orders, 6);
    assert_eq!(report.orders.cancels_sent, 0);
    assert_eq!(report.orders.anomalies, 0);

    // pre-warning, two hourly firings, periodic completion
    assert_eq!(report.summary.timers_fired, 4);
    assert_eq!(report.summary.ticks, 4);
    assert_eq!(report.summary.book_changes, 3);
    assert_eq!(report.summary.fills, 6);
    assert_eq!(report.summary.position_updates, 6);
    assert!(!report.summary.exit_requested);

    // Exit flattened at 11:00; the 12:00 hourly bought another 100
    assert_eq!(report.open_positions, vec![(instrument(), 100)]);
}

#[tokio::test]
async fn test_partial_fills_cancel_the_remainder() {
    let _ = env_logger::try_init();

    let tape = recording(&[
        tick(at(9, 30, 0), dec!(100), true),
        tick(at(10, 0, 0), dec!(100), false),
    ]);
    let mut feed = RecordedFeed::new(tape.as_bytes());

    let report = Session::new(config(0.6))
        .unwrap()
        .without_signal_handlers()
        .run_with_feed(&mut feed)
        .await
        .unwrap();

    // entry plus two hourly orders, each 60% filled and then cancelled once
    assert_eq!(report.orders.orders_sent, 3);
    assert_eq!(report.orders.fills, 3);
    assert_eq!(report.orders.cancels_sent, 3);
    assert_eq!(report.orders.cancelled_orders, 3);
    assert_eq!(report.orders.cancel_failures, 0);
    assert_eq!(report.open_positions, vec![(instrument(), 180)]);
}

#[tokio::test]
async fn test_signal_exits_after_grace_period() {
    let _ = env_logger::try_init();

    let tape = recording(&[
        tick(at(9, 30, 0), dec!(100), true),
        PlatformEvent::Signal {
            signal: ProcessSignal::Interrupt,
        },
        tick(at(9, 30, 2), dec!(100), false),
        tick(at(9, 31, 0), dec!(100), false),
        tick(at(10, 0, 0), dec!(100), false),
    ]);
    let mut feed = RecordedFeed::new(tape.as_bytes());

    let report = Session::new(config(1.0))
        .unwrap()
        .without_signal_handlers()
        .run_with_feed(&mut feed)
        .await
        .unwrap();

    // The grace timer (09:30:03) fires before the 09:31 tick is dispatched
    assert!(report.summary.exit_requested);
    assert_eq!(report.summary.signals, 1);
    assert_eq!(report.summary.ticks, 2);
    assert_eq!(report.summary.timers_fired, 1);
    assert_eq!(report.orders.orders_sent, 0);
}

#[tokio::test]
async fn test_second_shutdown_command_exits_immediately() {
    let _ = env_logger::try_init();

    let tape = recording(&[
        tick(at(9, 30, 0), dec!(100), true),
        command(Recipient::Account(AccountId(2002)), UserCommand::Shutdown),
        command(Recipient::Account(AccountId(1001)), UserCommand::Shutdown),
        command(Recipient::All, UserCommand::Shutdown),
        tick(at(9, 30, 1), dec!(100), false),
    ]);
    let mut feed = RecordedFeed::new(tape.as_bytes());

    let report = Session::new(config(1.0))
        .unwrap()
        .without_signal_handlers()
        .run_with_feed(&mut feed)
        .await
        .unwrap();

    assert!(report.summary.exit_requested);
    assert_eq!(report.summary.user_messages, 3);
    assert_eq!(report.summary.ticks, 1);
    assert_eq!(report.summary.timers_fired, 0);
}

#[tokio::test]
async fn test_synthetic_replay_session() {
    let _ = env_logger::try_init();

    let report = Session::new(config(1.0))
        .unwrap()
        .without_signal_handlers()
        .run()
        .await
        .unwrap();

    assert!(report.summary.ticks > 0);
    assert!(report.summary.book_changes > 0);
    // book reaction (2), entry, hourly x2, exit
    assert_eq!(report.orders.orders_sent, 6);
    assert_eq!(report.orders.send_failures, 0);
    assert_eq!(report.summary.timers_fired, 4);
    assert!(!report.summary.exit_requested);
}
