// End-to-end fan-out: real pollers over the in-memory filesystem,
// messages delivered to registered callbacks.

mod common;

use std::time::Duration;

use hostwatch::{MetricListener, SessionManager};
use tokio::sync::mpsc;
use tokio::time::timeout;

use common::{StubConnector, fast_config, seeded_fs, target};

const DEADLINE: Duration = Duration::from_secs(10);

#[tokio::test]
async fn memory_listener_receives_parsed_snapshot() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_memory(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("memory message in time")
        .expect("channel open");

    assert_eq!(message.origin, host);
    assert!(message.sampled_at > 0);
    // 4194304 kB scales to exactly 4 GB
    assert_eq!(message.total_mem_unit, "GB");
    assert!((message.total_mem - 4.0).abs() < 1e-9);
    assert!((message.free_mem_occupy - 0.25).abs() < 1e-9);
    assert!((message.available_mem_occupy - 0.5).abs() < 1e-9);
    assert!((message.swap_free_occupy - 0.75).abs() < 1e-9);
}

#[tokio::test]
async fn uptime_splits_into_calendar_components() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_uptime(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("uptime message in time")
        .expect("channel open");

    assert_eq!(message.up_day, 1);
    assert_eq!(message.up_hour, 2);
    assert_eq!(message.up_min, 3);
    assert_eq!(message.up_sec, 4);
}

#[tokio::test]
async fn topology_reports_package_core_processor_tree() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_cpu_topology(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("topology message in time")
        .expect("channel open");

    assert_eq!(message.packages.len(), 1);
    let package = &message.packages[&0];
    assert_eq!(package.vendor_id, "GenuineIntel");
    assert_eq!(
        package.model_name,
        "Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz"
    );
    assert_eq!(package.siblings, 2);
    assert_eq!(package.cpu_cores, 2);
    assert_eq!(package.cores.len(), 2);
    assert_eq!(package.cores[&1].processors[&1].apic_id, 2);
    assert!((package.cores[&0].processors[&0].cpu_mhz - 1800.0).abs() < 1e-9);
}

#[tokio::test]
async fn utilization_arrives_once_two_samples_exist() {
    let fs = seeded_fs();
    let connector = StubConnector::new(fs.clone());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_cpu_utilization(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    // advance the counters between poll ticks; every step adds user 10,
    // system 10, idle 50 (half per core), so any two distinct samples
    // are 5/7 idle over the window
    tokio::spawn(async move {
        for step in 1i64..40 {
            tokio::time::sleep(Duration::from_millis(250)).await;
            let (user, system, idle) = (1000 + 10 * step, 300 + 10 * step, 8000 + 50 * step);
            let (cu, cs, ci) = (500 + 5 * step, 150 + 5 * step, 4000 + 25 * step);
            fs.put_file(
                "/proc/stat",
                &format!(
                    "cpu  {user} 50 {system} {idle} 120 0 30 0 0 0\n\
                     cpu0 {cu} 25 {cs} {ci} 60 0 15 0 0 0\n\
                     cpu1 {cu} 25 {cs} {ci} 60 0 15 0 0 0\n\
                     ctxt 123456\n",
                ),
            );
        }
    });

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("utilization message in time")
        .expect("channel open");

    // idle fraction 50/70 leaves 200/7 percent busy
    let expected = 100.0 - 100.0 * 50.0 / 70.0;
    assert!((message.total.utilization - expected).abs() < 1e-6);
    assert!((message.total.free - (100.0 - expected)).abs() < 1e-6);
    assert_eq!(message.cores.len(), 2);
    let core0 = &message.cores[&0];
    assert_eq!(core0.processor, 0);
    assert!((core0.utilization - expected).abs() < 1e-6);
}

#[tokio::test]
async fn loadavg_waits_for_cpu_count_then_divides() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_loadavg(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("loadavg message in time")
        .expect("channel open");

    assert!((message.one - 0.5).abs() < 1e-9);
    assert!((message.one_occupy - 0.25).abs() < 1e-9);
    assert!((message.five_occupy - 0.2).abs() < 1e-9);
    assert!((message.fifteen_occupy - 0.15).abs() < 1e-9);
    assert_eq!(message.running, 2);
    assert_eq!(message.active, 345);
    assert_eq!(message.last_pid, 6789);
}

#[tokio::test]
async fn temperature_zones_come_back_in_whole_degrees() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_temperature(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("temperature message in time")
        .expect("channel open");

    assert_eq!(message.zones.len(), 2);
    assert_eq!(message.zones["thermal_zone0"], 45);
    assert_eq!(message.zones["thermal_zone1"], 47);
}

#[tokio::test]
async fn interfaces_carry_addresses_and_virtual_flags() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_net_dev(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("interfaces message in time")
        .expect("channel open");

    let eth0 = &message.interfaces["eth0"];
    assert!(!eth0.is_virtual);
    assert_eq!(eth0.ip, vec!["192.168.1.20".to_string()]);
    assert_eq!(eth0.up_bytes, 2_500_000);
    assert_eq!(eth0.down_bytes, 5_000_000);

    let lo = &message.interfaces["lo"];
    assert!(lo.is_virtual);

    // loopback is excluded from the physical aggregate
    assert_eq!(message.total.up_bytes, 2_500_000);
    assert_eq!(message.total.down_bytes, 5_000_000);
    assert_eq!(message.total.up_packets, 30_000);
    assert_eq!(message.total.down_packets, 40_000);
    assert_eq!(message.total.up_speed, 0.0);
}

#[tokio::test]
async fn protocol_counters_compute_retransmission_rate() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_net_proto(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("protocol message in time")
        .expect("channel open");

    assert_eq!(message.tcp.active_opens, 100);
    assert_eq!(message.tcp.curr_conn, 10);
    assert!((message.tcp.retrans_rate - 0.01).abs() < 1e-12);
    assert_eq!(message.udp.in_datagrams, 800);
    assert_eq!(message.udp.send_buf_errors, 2);
}

#[tokio::test]
async fn disk_table_is_keyed_by_mount_point() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_disk(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("disk message in time")
        .expect("channel open");

    // pseudo-filesystems from the mount table never show up
    assert_eq!(message.disks.len(), 2);

    let root = &message.disks["/"];
    assert_eq!(root.dev_name, "sda1");
    assert_eq!(root.file_system, "ext4");
    assert_eq!(root.total_unit, "MB");
    assert!((root.total - 390.625).abs() < 1e-9);
    assert!((root.free - 97.65625).abs() < 1e-9);
    assert!((root.free_rate - 0.25).abs() < 1e-9);
    // 380000 sectors of 512 bytes read since boot
    assert_eq!(root.read_unit, "MB");
    assert!((root.read - 185.546875).abs() < 1e-9);
    assert_eq!(root.read_iops, 0);

    let data = &message.disks["/data"];
    assert_eq!(data.dev_name, "sdb1");
    assert_eq!(data.file_system, "xfs");
    assert!((data.free_rate - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn process_ranking_orders_by_cpu_then_memory() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_process(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    let message = timeout(DEADLINE, rx.recv())
        .await
        .expect("process message in time")
        .expect("channel open");

    // both are idle across the window, so memory breaks the tie
    assert_eq!(message.processes.len(), 2);
    assert_eq!(message.processes[0].pid, 42);
    assert_eq!(message.processes[0].name, "nginx");
    assert_eq!(message.processes[0].mem_raw, 2000 * 4096);
    assert_eq!(message.processes[1].pid, 1);
    assert_eq!(message.processes[1].name, "systemd");
    assert_eq!(message.processes[1].mem_raw, 800 * 4096);
}

#[tokio::test]
async fn summary_converges_on_collector_results() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector, fast_config());
    let host = target("10.0.0.1");

    let (tx, mut rx) = mpsc::unbounded_channel();
    manager
        .register_listener(
            &host,
            "secret",
            "dashboard",
            MetricListener::on_summary(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await
        .expect("register");

    // early summaries may predate the contributing collectors; wait for
    // one that has absorbed their results
    let message = timeout(DEADLINE, async {
        loop {
            let m = rx.recv().await.expect("channel open");
            if m.cpu.logical_cpus == 2 && m.memory.free_mem_occupy > 0.0 && m.temp.highest_temp > 0
            {
                break m;
            }
        }
    })
    .await
    .expect("summary converged in time");

    assert_eq!(message.cpu.logical_cpus, 2);
    assert_eq!(message.temp.highest_temp, 47);
    assert!((message.memory.free_mem_occupy - 0.25).abs() < 1e-9);
    assert!((message.loadavg.one_occupy - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn failed_dial_never_invokes_callbacks() {
    let connector = StubConnector::new(seeded_fs());
    let manager = SessionManager::new(connector.clone(), fast_config());
    let host = target("10.0.0.1");

    connector.fail_dials(true);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let result = manager
        .register_listener(
            &host,
            "secret",
            "ui",
            MetricListener::on_memory(move |m| {
                let _ = tx.send(m.clone());
            }),
        )
        .await;
    assert!(result.is_err());

    // the listener was dropped without ever being called, so the
    // channel closes with nothing in it
    assert!(rx.recv().await.is_none());
    assert_eq!(manager.session_count().await, 0);
    assert_eq!(connector.dial_count(), 1);
    assert_eq!(connector.close_count(), 0);
}
