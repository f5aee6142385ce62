//! 端到端流程：串口帧 → Bowl → 仪表盘状态 / 告警 → 设备命令

use smart_bowl::models::RefillState;
use smart_bowl::notification::{AlertManager, DashboardChannel, NotificationChannel, Notify};
use smart_bowl::serial::{open_replay, SerialMonitor};
use std::path::Path;
use smart_bowl::tui::{self, InputMode};
use smart_bowl::{Bowl, IncomingEvent};
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

const SESSION: &str = "\
Simulation started\n\
<time_ms=100 type=BOWL_CAPACITY value=500>\n\
<time_ms=200 type=BOWL_WEIGHT value=250>\n\
<time_ms=200 type=BOWL_WEIGHT value=250>\n\
<time_ms=300 type=TARGET_WEIGHT_UPDATE value=300>\n\
<time_ms=400 type=TARGET_WEIGHT_UPDATE value=900 error=\"Target exceeds capacity\">\n\
{\"time_ms\": 500, \"type\": \"REFILL_STATE_UPDATE\", \"value\": 1}\n\
<time_ms=600 type=BOWL_WEIGHT value=0>\n\
<time_ms=600 type=EMPTY_BOWL_ALERT value=0>\n\
<time_ms=600 type=BOWL_WEIGHT value=0>\n\
<time_ms=600 type=EMPTY_BOWL_ALERT value=0>\n";

#[test]
fn test_serial_session_drives_dashboard() {
    let (gui, mut app) = tui::new_dashboard();
    let gui = Arc::new(gui);
    let out = SharedBuf::default();

    let sms_log = Arc::new(Mutex::new(Vec::new()));
    let sms_sink = sms_log.clone();
    let mut manager = AlertManager::new();
    manager.register_channel(Arc::new(DashboardChannel::new((*gui).clone())));
    manager.register_channel(Arc::new(NotificationChannel::new("sms", move |msg: &str| {
        sms_sink.lock().unwrap().push(msg.to_string());
        Ok(())
    })));

    let monitor = SerialMonitor::new(
        Box::new(Cursor::new(SESSION.as_bytes().to_vec())),
        Box::new(out.clone()),
        IncomingEvent::TIME_FIELD,
    );
    let input = monitor.input();
    let bowl = Bowl::new(
        gui.clone(),
        Box::new(move |alert| manager.on_new_alert(&alert).unwrap()),
        Arc::new(move |message: &str| input.send_smi_input(message)),
    );

    monitor
        .run(|message| bowl.on_new_event(message).map_err(anyhow::Error::from))
        .unwrap();
    app.apply_pending();

    let state = &app.state;
    assert_eq!(state.capacity, 500.0);
    assert_eq!(state.target_weight, 300.0);
    assert_eq!(state.current_weight, 0.0);
    assert_eq!(state.refill_state, RefillState::On);
    assert!(state.food.is_empty());
    assert!(state.is_empty());
    assert_eq!(state.denial.as_deref(), Some("Target exceeds capacity"));
    assert_eq!(state.alerts.len(), 1);
    assert_eq!(state.alerts[0].message, "Bowl is empty :(");
    assert_eq!(*sms_log.lock().unwrap(), vec!["Bowl is empty :("]);

    // 用户操作经回调写回设备
    app.dismiss_denial();
    app.request_refill();
    app.begin_target_input();
    app.target_input.push_str("275");
    app.submit_target_input();
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(
        out.text(),
        "<value=0 command=REFILL>\n<value=275 command=NEW_TARGET_WEIGHT>\n"
    );
}

#[test]
fn test_invalid_target_input_never_reaches_device() {
    let (gui, mut app) = tui::new_dashboard();
    let sent = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = sent.clone();
    let _bowl = Bowl::new(
        Arc::new(gui),
        Box::new(|_| {}),
        Arc::new(move |message: &str| {
            sink.lock().unwrap().push(message.to_string());
            Ok(())
        }),
    );

    app.begin_target_input();
    app.target_input.push_str("abc");
    app.submit_target_input();

    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(app.state.denial.as_deref(), Some(tui::INVALID_WEIGHT_MESSAGE));
}

#[test]
fn test_alert_delivery_stops_at_failing_channel() {
    let (gui, mut app) = tui::new_dashboard();
    let later = Arc::new(Mutex::new(0));
    let counter = later.clone();

    let channels: Vec<Arc<dyn Notify>> = vec![
        Arc::new(NotificationChannel::new("broken", |_: &str| {
            anyhow::bail!("modem offline")
        })) as Arc<dyn Notify>,
        Arc::new(DashboardChannel::new(gui.clone())) as Arc<dyn Notify>,
        Arc::new(NotificationChannel::new("counter", move |_: &str| {
            *counter.lock().unwrap() += 1;
            Ok(())
        })) as Arc<dyn Notify>,
    ];
    let manager = AlertManager::with_channels(channels);

    let err = manager
        .on_new_alert(&smart_bowl::Alert::new("Bowl is empty :("))
        .unwrap_err();
    assert!(err.to_string().contains("modem offline"));

    app.apply_pending();
    assert!(app.state.alerts.is_empty());
    assert_eq!(*later.lock().unwrap(), 0);
}

#[test]
fn test_replay_demo_session() {
    let (gui, mut app) = tui::new_dashboard();
    let gui = Arc::new(gui);

    let mut manager = AlertManager::new();
    manager.register_channel(Arc::new(DashboardChannel::new((*gui).clone())));

    let log = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/sample_session.log");
    let monitor = open_replay(&log, 0, IncomingEvent::TIME_FIELD).unwrap();
    let input = monitor.input();
    let bowl = Bowl::new(
        gui.clone(),
        Box::new(move |alert| manager.on_new_alert(&alert).unwrap()),
        Arc::new(move |message: &str| input.send_smi_input(message)),
    );

    monitor
        .run(|message| bowl.on_new_event(message).map_err(anyhow::Error::from))
        .unwrap();
    app.apply_pending();

    // 与容量同一时刻的目标重量、与空碗重量同一时刻的告警都应到达
    let state = &app.state;
    assert_eq!(state.capacity, 500.0);
    assert_eq!(state.target_weight, 300.0);
    assert_eq!(state.current_weight, 300.0);
    assert_eq!(state.refill_state, RefillState::Off);
    assert_eq!(state.denial.as_deref(), Some("Target exceeds capacity"));
    assert_eq!(state.alerts.len(), 1);
    assert_eq!(state.alerts[0].message, "Bowl is empty :(");
}
