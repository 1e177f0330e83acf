use super::*;
use time::macros::datetime;

#[test]
fn draft_requires_title_then_content() {
    let err = RuleDraft::default().validate().unwrap_err();
    assert_eq!(err.field, "title");

    let draft = RuleDraft { title: Some("Eligibility".into()), ..RuleDraft::default() };
    assert_eq!(draft.validate().unwrap_err().field, "content");
}

#[test]
fn draft_defaults_sort_order_and_general_scope() {
    let draft = RuleDraft {
        title: Some("Eligibility".into()),
        content: Some("Enrolled students only.".into()),
        ..RuleDraft::default()
    };
    let fields = draft.validate().unwrap();
    assert_eq!(fields.sort_order, 0);
    assert_eq!(fields.sport_id, None);
}

#[test]
fn patch_can_make_rule_general() {
    let stored = Rule {
        id: Uuid::new_v4(),
        sport_id: Some(Uuid::new_v4()),
        title: "Substitutions".into(),
        content: "Unlimited rolling substitutions.".into(),
        document_url: None,
        sort_order: 3,
        created_at: datetime!(2026-03-01 00:00 UTC),
    };
    let patch: RulePatch = serde_json::from_str(r#"{"sport_id":null,"sort_order":1}"#).unwrap();
    let fields = stored.apply(&patch).unwrap();
    assert_eq!(fields.sport_id, None);
    assert_eq!(fields.sort_order, 1);
    assert_eq!(fields.title, "Substitutions");
}
