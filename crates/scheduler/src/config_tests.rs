// SPDX-License-Identifier: MIT

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn default_config_is_sane() {
    let cfg = SchedulerConfig::default();
    assert_eq!(cfg.default_quiet_period, Duration::from_secs(5));
    assert_eq!(cfg.max_backup_generations, 3);
}

#[test]
fn partial_toml_falls_back_to_defaults() {
    let mut f = NamedTempFile::new().expect("tmp file");
    writeln!(f, "default_quiet_period = 30").expect("write");
    let cfg = SchedulerConfig::load(f.path()).expect("load");
    assert_eq!(cfg.default_quiet_period, Duration::from_secs(30));
    assert_eq!(
        cfg.maintenance_tick_interval,
        SchedulerConfig::default().maintenance_tick_interval
    );
}

#[test]
fn missing_file_is_an_error() {
    let result = SchedulerConfig::load(Path::new("/nonexistent/scheduler.toml"));
    assert!(result.is_err());
}
