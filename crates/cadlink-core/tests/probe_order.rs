//! 探测顺序与重试规则

use cadlink_core::prelude::*;
use std::time::{Duration, Instant};

fn manager(registry: &SimulatedRegistry) -> ConnectionManager<SimulatedRegistry> {
    ConnectionManager::new(registry.clone(), ConnectionConfig::instant())
}

fn attach(id: &str) -> HostCall {
    HostCall::Attach(id.to_string())
}

fn launch(id: &str) -> HostCall {
    HostCall::Launch(id.to_string())
}

#[test]
fn test_third_identifier_matches() {
    let registry = SimulatedRegistry::new();
    registry.add_running("AutoCAD.Application.24");

    let mut manager = manager(&registry);
    let label = manager.connect().unwrap();

    assert_eq!(label, "AutoCAD (AutoCAD.Application.24)");
    // 只尝试前三个 AutoCAD 标识符，不涉及 ZWCAD 和启动
    assert_eq!(
        registry.probes(),
        vec![
            attach("AutoCAD.Application.25"),
            attach("AutoCAD.Application.24.1"),
            attach("AutoCAD.Application.24"),
        ]
    );
}

#[test]
fn test_full_order_when_nothing_available() {
    let registry = SimulatedRegistry::new();
    let mut manager = manager(&registry);

    let err = manager.connect().unwrap_err();

    let autocad = [
        "AutoCAD.Application.25",
        "AutoCAD.Application.24.1",
        "AutoCAD.Application.24",
        "AutoCAD.Application",
    ];
    let mut expected: Vec<HostCall> = autocad.iter().map(|id| attach(id)).collect();
    expected.push(attach("ZwCAD.Application"));
    expected.extend(autocad.iter().map(|id| launch(id)));
    expected.push(launch("ZwCAD.Application"));
    assert_eq!(registry.probes(), expected);

    match err {
        CadError::NoHostAvailable { attempts } => {
            assert_eq!(attempts.len(), 10);
            assert_eq!(attempts[0].phase, ProbePhase::Attach);
            assert_eq!(attempts[4].host, "ZWCAD");
            assert_eq!(attempts[9].phase, ProbePhase::Launch);
            assert!(attempts
                .iter()
                .all(|a| matches!(a.error, HostError::NotRegistered { .. })));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!manager.is_connected());
    assert_eq!(manager.connected_application(), None);
}

#[test]
fn test_running_zwcad_attached_before_launching_autocad() {
    let registry = SimulatedRegistry::new();
    registry.add_running("ZwCAD.Application");
    registry.add_installed("AutoCAD.Application.25");

    let mut manager = manager(&registry);
    assert_eq!(manager.connect().unwrap(), "ZWCAD");
    assert!(!registry
        .probes()
        .iter()
        .any(|call| matches!(call, HostCall::Launch(_))));
}

#[test]
fn test_launch_makes_host_visible() {
    let registry = SimulatedRegistry::new();
    registry.add_installed("AutoCAD.Application");

    let mut manager = manager(&registry);
    assert_eq!(manager.connect().unwrap(), "AutoCAD (AutoCAD.Application)");
    assert!(registry.is_visible());
    assert!(registry.journal().contains(&HostCall::SetVisible(true)));
}

#[test]
fn test_launch_zwcad_last() {
    let registry = SimulatedRegistry::new();
    registry.add_installed("ZwCAD.Application");

    let mut manager = manager(&registry);
    assert_eq!(manager.connect().unwrap(), "ZWCAD");
    assert_eq!(registry.probes().last(), Some(&launch("ZwCAD.Application")));
}

#[test]
fn test_unavailable_retried_once() {
    let registry = SimulatedRegistry::new();
    registry.add_running("AutoCAD.Application.25");
    registry.set_unavailable("AutoCAD.Application.25", 1);

    let mut manager = manager(&registry);
    assert_eq!(manager.connect().unwrap(), "AutoCAD (AutoCAD.Application.25)");
    assert_eq!(
        registry.probes(),
        vec![attach("AutoCAD.Application.25"), attach("AutoCAD.Application.25")]
    );
}

#[test]
fn test_unavailable_never_retried_twice() {
    let registry = SimulatedRegistry::new();
    registry.add_running("AutoCAD.Application.25");
    registry.add_running("AutoCAD.Application.24.1");
    registry.set_unavailable("AutoCAD.Application.25", 5);

    let mut manager = manager(&registry);
    assert_eq!(manager.connect().unwrap(), "AutoCAD (AutoCAD.Application.24.1)");
    assert_eq!(
        registry.probes(),
        vec![
            attach("AutoCAD.Application.25"),
            attach("AutoCAD.Application.25"),
            attach("AutoCAD.Application.24.1"),
        ]
    );
}

#[test]
fn test_retry_recorded_in_attempts() {
    let registry = SimulatedRegistry::new();
    registry.set_unavailable("ZwCAD.Application", 2);

    let mut manager = manager(&registry);
    let Err(CadError::NoHostAvailable { attempts }) = manager.connect() else {
        panic!("expected probe failure");
    };

    let zwcad = attempts
        .iter()
        .find(|a| a.phase == ProbePhase::Attach && a.prog_id == "ZwCAD.Application")
        .unwrap();
    assert!(zwcad.retried);
    assert!(zwcad.error.is_unavailable());
    assert!(attempts
        .iter()
        .filter(|a| a.prog_id != "ZwCAD.Application" || a.phase == ProbePhase::Launch)
        .all(|a| !a.retried));
}

#[test]
fn test_document_failure_releases_application() {
    let registry = SimulatedRegistry::new();
    registry.add_running("AutoCAD.Application.25");
    registry.fail_member("ActiveDocument");

    let mut manager = manager(&registry);
    assert!(manager.connect().is_err());
    assert_eq!(registry.live_handles(), 0);
    assert!(registry.journal().contains(&HostCall::ReleaseApplication));
}

#[test]
fn test_connect_when_connected_is_noop() {
    let registry = SimulatedRegistry::demo();
    let mut manager = manager(&registry);

    let first = manager.connect().unwrap();
    registry.clear_journal();

    let second = manager.connect().unwrap();
    assert_eq!(first, second);
    assert!(registry.journal().is_empty());
    assert_eq!(registry.live_handles(), 2);
}

#[test]
fn test_reconnect_after_disconnect() {
    let registry = SimulatedRegistry::demo();
    let mut manager = manager(&registry);

    manager.connect().unwrap();
    manager.disconnect();
    assert_eq!(registry.live_handles(), 0);

    manager.connect().unwrap();
    assert!(manager.is_connected());
    assert_eq!(registry.live_handles(), 2);
}

#[test]
fn test_custom_host_list() {
    let registry = SimulatedRegistry::new();
    registry.add_running("ZwCAD.Application.2025");

    let config = ConnectionConfig {
        hosts: vec![HostProfile::new("ZWCAD", ["ZwCAD.Application.2025", "ZwCAD.Application"])],
        timings: ProbeTimings::ZERO,
    };
    let mut manager = ConnectionManager::new(registry.clone(), config);

    assert_eq!(manager.connect().unwrap(), "ZWCAD");
    assert_eq!(registry.probes(), vec![attach("ZwCAD.Application.2025")]);
}

fn timed_manager(
    registry: &SimulatedRegistry,
    timings: ProbeTimings,
) -> ConnectionManager<SimulatedRegistry> {
    ConnectionManager::new(
        registry.clone(),
        ConnectionConfig::default().with_timings(timings),
    )
}

#[test]
fn test_retry_waits_before_second_attach() {
    let registry = SimulatedRegistry::new();
    registry.add_running("AutoCAD.Application.25");
    registry.set_unavailable("AutoCAD.Application.25", 1);

    // 启动等待远大于其余两项，用错字段时会超出上限
    let timings = ProbeTimings {
        attach_settle: Duration::from_millis(20),
        unavailable_retry: Duration::from_millis(40),
        launch_settle: Duration::from_secs(2),
    };
    let mut manager = timed_manager(&registry, timings);

    let started = Instant::now();
    manager.connect().unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(60), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
    assert_eq!(
        registry.probes(),
        vec![attach("AutoCAD.Application.25"), attach("AutoCAD.Application.25")]
    );
}

#[test]
fn test_attach_settles_before_reading_document() {
    let registry = SimulatedRegistry::demo();
    let timings = ProbeTimings {
        attach_settle: Duration::from_millis(50),
        unavailable_retry: Duration::from_secs(2),
        launch_settle: Duration::from_secs(2),
    };
    let mut manager = timed_manager(&registry, timings);

    let started = Instant::now();
    manager.connect().unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(50), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
}

#[test]
fn test_launch_settles_before_reading_document() {
    let registry = SimulatedRegistry::new();
    registry.add_installed("ZwCAD.Application");
    let timings = ProbeTimings {
        attach_settle: Duration::from_secs(2),
        unavailable_retry: Duration::from_secs(2),
        launch_settle: Duration::from_millis(50),
    };
    let mut manager = timed_manager(&registry, timings);

    let started = Instant::now();
    assert_eq!(manager.connect().unwrap(), "ZWCAD");
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(50), "elapsed {:?}", elapsed);
    // 所有附加均失败，因此不应出现附加后的等待
    assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
}
