use super::*;
use crate::domain::{ControlKind, ControlSpec};

#[test]
fn control_change_decodes_from_panel_frame() {
    let msg = ClientMessage::decode(
        r#"{"type":"control_change","control_id":"device_1_control_2","value":3}"#,
    )
    .expect("decode");
    assert_eq!(
        msg,
        ClientMessage::ControlChange {
            control_id: ControlId::from("device_1_control_2"),
            value: 3,
        }
    );
}

#[test]
fn unknown_type_decodes_to_ignored() {
    let msg = ClientMessage::decode(r#"{"type":"heartbeat","at":12}"#).expect("decode");
    assert_eq!(msg, ClientMessage::Ignored);
}

#[test]
fn control_change_without_value_is_malformed() {
    let err = ClientMessage::decode(r#"{"type":"control_change","control_id":"x"}"#)
        .expect_err("should fail");
    assert!(matches!(err, ProtocolError::Malformed(_)));
}

#[test]
fn init_event_uses_flat_fields_and_wire_names() {
    let spec = ControlSpec::new("Warp", ControlKind::PushButton, "grün", 0, 4);
    let event = ServerEvent::Init {
        device_id: DeviceId(3),
        controls: vec![AssignedControl::from_spec(
            ControlId::for_device(DeviceId(3), 0),
            &spec,
        )],
    };

    let json: serde_json::Value =
        serde_json::from_str(&event.encode().expect("encode")).expect("json");
    assert_eq!(json["type"], "init");
    assert_eq!(json["device_id"], "device_3");
    assert_eq!(json["controls"][0]["id"], "device_3_control_0");
    assert_eq!(json["controls"][0]["type"], "push_button");
    assert_eq!(json["controls"][0]["label"], "Warp");
    assert_eq!(json["controls"][0]["position"], 0);
}

#[test]
fn new_task_event_names_target_device() {
    let event = ServerEvent::NewTask {
        problem: "p".into(),
        instruction: "i".into(),
        target_device: DeviceId(12),
    };
    let json: serde_json::Value =
        serde_json::from_str(&event.encode().expect("encode")).expect("json");
    assert_eq!(json["type"], "new_task");
    assert_eq!(json["target_device"], "device_12");
}

#[test]
fn device_id_rejects_foreign_prefix() {
    let err = DeviceId::try_from("panel_4".to_string()).expect_err("should fail");
    assert!(matches!(err, ProtocolError::InvalidDeviceId(id) if id == "panel_4"));
}

#[test]
fn status_omits_missing_task() {
    let json = serde_json::to_value(SessionStatus::default()).expect("json");
    assert!(json.get("task").is_none());
    assert_eq!(json["device_count"], 0);
}
