use std::sync::Mutex;

use tempfile::NamedTempFile;

use gesture_server::GesturedConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "GESTURED_CONFIG",
        "GESTURED_LISTEN_ADDR",
        "GESTURED_ESTIMATOR",
        "GESTURED_ESTIMATOR_SCRIPT",
        "GESTURED_STABILITY_FRAMES",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_when_no_file_or_env() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = GesturedConfig::load().expect("load config");

    assert_eq!(cfg.listen_addr, "127.0.0.1:8765");
    assert_eq!(cfg.estimator.backend, "stub");
    assert_eq!(cfg.inference.width, 160);
    assert_eq!(cfg.inference.height, 120);
    assert_eq!(cfg.stabilizer.required_fist_frames, 3);
    assert_eq!(cfg.stabilizer.required_no_fist_frames, 2);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "listen_addr": "0.0.0.0:9100",
        "estimator": {
            "backend": "mediapipe",
            "command": "python3",
            "script": "/opt/gestured/hand_detect.py"
        },
        "inference": {
            "width": 320,
            "height": 240
        },
        "stabilizer": {
            "required_fist_frames": 4,
            "required_no_fist_frames": 3
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("GESTURED_CONFIG", file.path());
    std::env::set_var("GESTURED_LISTEN_ADDR", "127.0.0.1:9200");
    std::env::set_var("GESTURED_STABILITY_FRAMES", "6");

    let cfg = GesturedConfig::load().expect("load config");

    assert_eq!(cfg.listen_addr, "127.0.0.1:9200");
    assert_eq!(cfg.estimator.backend, "mediapipe");
    assert_eq!(
        cfg.estimator.script.as_deref().unwrap().to_str().unwrap(),
        "/opt/gestured/hand_detect.py"
    );
    assert_eq!(cfg.inference.width, 320);
    assert_eq!(cfg.inference.height, 240);
    assert_eq!(cfg.stabilizer.required_fist_frames, 6);
    assert_eq!(cfg.stabilizer.required_no_fist_frames, 3);

    clear_env();
}

#[test]
fn rejects_zero_stability_frames() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("GESTURED_STABILITY_FRAMES", "0");
    assert!(GesturedConfig::load().is_err());

    std::env::set_var("GESTURED_STABILITY_FRAMES", "three");
    assert!(GesturedConfig::load().is_err());

    clear_env();
}

#[test]
fn rejects_zero_inference_resolution() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{"inference": {"width": 0, "height": 120}}"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    std::env::set_var("GESTURED_CONFIG", file.path());

    assert!(GesturedConfig::load().is_err());

    clear_env();
}
