use super::*;
use time::macros::datetime;

fn stored() -> Sport {
    Sport {
        id: Uuid::new_v4(),
        name: "Basketball".into(),
        kind: "team".into(),
        image_url: Some("https://cdn.example/basketball.png".into()),
        created_at: datetime!(2026-03-01 08:00 UTC),
    }
}

#[test]
fn draft_requires_name() {
    let err = SportDraft::default().validate().unwrap_err();
    assert_eq!(err.field, "name");
}

#[test]
fn draft_defaults_kind_to_team() {
    let draft = SportDraft { name: Some("Volleyball".into()), ..SportDraft::default() };
    let fields = draft.validate().unwrap();
    assert_eq!(fields.kind, SportKind::Team);
    assert_eq!(fields.image_url, None);
}

#[test]
fn draft_rejects_unknown_kind() {
    let draft = SportDraft { name: Some("Chess".into()), kind: Some("board".into()), image_url: None };
    let err = draft.validate().unwrap_err();
    assert_eq!(err.field, "kind");
}

#[test]
fn kind_parse_is_case_insensitive() {
    assert_eq!(SportKind::parse("Individual"), Some(SportKind::Individual));
    assert_eq!(SportKind::parse(" TEAM "), Some(SportKind::Team));
    assert_eq!(SportKind::parse("relay"), None);
}

#[test]
fn patch_null_clears_image() {
    let patch: SportPatch = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
    let fields = stored().apply(&patch).unwrap();
    assert_eq!(fields.name, "Basketball");
    assert_eq!(fields.image_url, None);
}

#[test]
fn patch_missing_keeps_image() {
    let patch: SportPatch = serde_json::from_str(r#"{"name":"3x3 Basketball"}"#).unwrap();
    let fields = stored().apply(&patch).unwrap();
    assert_eq!(fields.name, "3x3 Basketball");
    assert_eq!(fields.image_url.as_deref(), Some("https://cdn.example/basketball.png"));
}

#[test]
fn patch_blank_name_is_rejected() {
    let patch = SportPatch { name: Some("  ".into()), ..SportPatch::default() };
    assert_eq!(stored().apply(&patch).unwrap_err().field, "name");
}

#[test]
fn sport_serializes_timestamp_as_rfc3339() {
    let json = serde_json::to_value(stored()).unwrap();
    assert_eq!(json["created_at"], "2026-03-01T08:00:00Z");
    assert_eq!(json["kind"], "team");
}
